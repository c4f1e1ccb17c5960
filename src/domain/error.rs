// Errors surfaced by the chart pipeline and the services around it
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("logs are not sorted: timestamp {current} at index {index} follows {previous}")]
    UnsortedLogs {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("duplicate log timestamp {timestamp} at index {index}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },

    #[error("unknown channel measurement type {0:?}")]
    UnknownChannelType(String),

    #[error("unknown channel {0}")]
    UnknownChannel(u32),

    #[error("unknown aggregation {0:?}")]
    UnknownAggregation(String),

    #[error("unknown chart mode {0:?}")]
    UnknownChartMode(String),

    #[error("log source failed for channel {channel_id}: {source}")]
    LogSource {
        channel_id: u32,
        #[source]
        source: anyhow::Error,
    },
}

impl ChartError {
    /// Whether the caller supplied bad input, as opposed to a broken setup.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ChartError::UnsortedLogs { .. }
                | ChartError::DuplicateTimestamp { .. }
                | ChartError::UnknownAggregation(_)
                | ChartError::UnknownChartMode(_)
        )
    }
}
