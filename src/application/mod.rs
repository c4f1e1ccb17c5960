// Application layer - Normalization pipeline and chart use cases
pub mod aggregator;
pub mod chart_service;
pub mod counter;
pub mod gap_filler;
pub mod interpolation;
pub mod log_source;
pub mod numeric;
pub mod pipeline;
pub mod strategies;
pub mod strategy;
