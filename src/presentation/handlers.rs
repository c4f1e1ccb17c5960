// HTTP request handlers
use crate::application::aggregator::{Aggregation, CalendarBuckets};
use crate::application::pipeline::ChartRequest;
use crate::application::strategy::EnergyMode;
use crate::domain::series::NormalizedSeries;
use crate::infrastructure::http_response::{json_response, ApiError};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::Response,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub aggregation: Option<String>,
    pub mode: Option<String>,
    /// Expected seconds between logs.
    pub interval: Option<i64>,
    /// Seconds east of UTC used for calendar buckets.
    pub utc_offset: Option<i32>,
}

impl ChartQuery {
    pub fn to_request(&self, default_interval: Option<i64>) -> Result<ChartRequest, ApiError> {
        let offset = FixedOffset::east_opt(self.utc_offset.unwrap_or(0)).ok_or_else(|| {
            ApiError::bad_request(format!("invalid utc_offset {:?}", self.utc_offset))
        })?;
        let buckets = self
            .aggregation
            .as_deref()
            .map(|name| name.parse::<Aggregation>())
            .transpose()?
            .map(|aggregation| CalendarBuckets::new(aggregation, offset));
        let mode = self
            .mode
            .as_deref()
            .map(str::parse::<EnergyMode>)
            .transpose()?
            .unwrap_or_default();
        let expected_interval = match self.interval.or(default_interval) {
            Some(interval) if interval <= 0 => {
                return Err(ApiError::bad_request(format!("invalid interval {}", interval)));
            }
            interval => interval,
        };

        Ok(ChartRequest {
            buckets,
            mode,
            expected_interval,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartsQuery {
    /// Comma separated channel ids.
    pub channels: String,
    pub aggregation: Option<String>,
    pub mode: Option<String>,
    pub interval: Option<i64>,
    pub utc_offset: Option<i32>,
}

impl ChartsQuery {
    fn chart_query(&self) -> ChartQuery {
        ChartQuery {
            aggregation: self.aggregation.clone(),
            mode: self.mode.clone(),
            interval: self.interval,
            utc_offset: self.utc_offset,
        }
    }
}

fn parse_channel_ids(list: &str) -> Result<Vec<u32>, ApiError> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u32>()
                .map_err(|_| ApiError::bad_request(format!("invalid channel id {:?}", id)))
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChannelChart {
    Rendered(NormalizedSeries),
    Failed { error: String },
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Chart of a single channel
pub async fn channel_chart(
    Path(id): Path<u32>,
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let request = query.to_request(state.default_interval)?;
    let chart = state.chart_service.render(id, &request).await?;
    json_response(&chart.localize(state.labels.as_ref()))
}

/// Charts of several channels, rendered concurrently
pub async fn charts(
    Query(query): Query<ChartsQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, ApiError> {
    let ids = parse_channel_ids(&query.channels)?;
    let request = query.chart_query().to_request(state.default_interval)?;

    let results: BTreeMap<u32, ChannelChart> = state
        .chart_service
        .render_many(&ids, &request)
        .await
        .into_iter()
        .map(|(id, result)| {
            let chart = match result {
                Ok(chart) => ChannelChart::Rendered(chart.localize(state.labels.as_ref())),
                Err(e) => {
                    tracing::warn!(channel_id = id, error = %e, "channel chart failed");
                    ChannelChart::Failed {
                        error: e.to_string(),
                    }
                }
            };
            (id, chart)
        })
        .collect();
    json_response(&results)
}
