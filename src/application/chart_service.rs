// Chart service - fetches channel logs and runs the normalization pipeline
use crate::application::log_source::LogSource;
use crate::application::pipeline::{ChartRequest, Pipeline};
use crate::domain::channel::ChannelConfig;
use crate::domain::error::ChartError;
use crate::domain::series::NormalizedSeries;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ChartService {
    source: Arc<dyn LogSource>,
    channels: Arc<HashMap<u32, ChannelConfig>>,
}

impl ChartService {
    pub fn new(source: Arc<dyn LogSource>, channels: HashMap<u32, ChannelConfig>) -> Self {
        Self {
            source,
            channels: Arc::new(channels),
        }
    }

    pub fn channel(&self, channel_id: u32) -> Option<&ChannelConfig> {
        self.channels.get(&channel_id)
    }

    pub async fn render(
        &self,
        channel_id: u32,
        request: &ChartRequest,
    ) -> Result<NormalizedSeries, ChartError> {
        let config = self
            .channel(channel_id)
            .ok_or(ChartError::UnknownChannel(channel_id))?;
        // Resolve the strategy before touching the log source
        let pipeline = Pipeline::for_channel(config)?;

        let start = Instant::now();
        let raw = self
            .source
            .fetch_logs(channel_id)
            .await
            .map_err(|source| ChartError::LogSource { channel_id, source })?;

        let chart = pipeline.run(&raw, request)?;
        tracing::debug!(
            channel_id,
            series = chart.series.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rendered channel chart"
        );
        Ok(chart)
    }

    /// Renders every channel concurrently; one failing channel does not fail
    /// the others.
    pub async fn render_many(
        &self,
        channel_ids: &[u32],
        request: &ChartRequest,
    ) -> Vec<(u32, Result<NormalizedSeries, ChartError>)> {
        let renders = channel_ids.iter().map(|&channel_id| async move {
            (channel_id, self.render(channel_id, request).await)
        });
        join_all(renders).await
    }
}
