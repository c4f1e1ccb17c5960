// Domain layer - Measurement logs, channel configuration and chart descriptors
pub mod channel;
pub mod error;
pub mod label;
pub mod log;
pub mod series;
