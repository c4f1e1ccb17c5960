// Log retrieval trait
use crate::domain::log::RawLog;
use async_trait::async_trait;

#[async_trait]
pub trait LogSource: Send + Sync {
    /// All recorded logs of a channel, oldest first.
    ///
    /// A channel without logs yields an empty list, not an error.
    async fn fetch_logs(&self, channel_id: u32) -> anyhow::Result<Vec<RawLog>>;
}
