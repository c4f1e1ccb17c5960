// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::domain::label::LabelLookup;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub chart_service: ChartService,
    pub labels: Arc<dyn LabelLookup>,
    /// Expected log interval used when a request does not give one.
    pub default_interval: Option<i64>,
}
