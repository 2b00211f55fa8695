use std::sync::Arc;

use crate::dashboards::d402_top_customers::ReportSettings;
use crate::shared::llm::LlmProvider;

/// Общее состояние приложения: неизменяемо после старта
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn LlmProvider>,
    pub reports: Arc<ReportSettings>,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, reports: ReportSettings) -> Self {
        Self {
            provider,
            reports: Arc::new(reports),
        }
    }
}
