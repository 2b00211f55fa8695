use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use contracts::dashboards::d402_top_customers::TopCustomersResponse;

use crate::dashboards::d402_top_customers::{service, ReportError, ReportQuery};
use crate::shared::state::AppState;

/// Query pairs are kept raw: duplicates and non-numeric values must not
/// turn into a plain-text extractor rejection
pub type QueryPairs = Vec<(String, String)>;

/// GET /api/customers/top/:year/:month?limit=5
pub async fn get_top_customers(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<TopCustomersResponse>, ReportError> {
    let Path((year, month)) = path.map_err(|rejection| {
        tracing::warn!("D402: rejected path: {}", rejection.body_text());
        ReportError::InputMalformed(rejection.body_text())
    })?;
    let Query(pairs) = query.map_err(|rejection| {
        tracing::warn!("D402: rejected query: {}", rejection.body_text());
        ReportError::InputMalformed(rejection.body_text())
    })?;

    let query = ReportQuery::from_raw(&year, &month, limit_param(&pairs), &state.reports)
        .map_err(|e| {
            tracing::warn!("D402: rejected request {}/{}: {}", year, month, e);
            e
        })?;

    tracing::info!(
        "D402: top {} customers for {}-{:02}",
        query.limit,
        query.year,
        query.month
    );

    match service::get_top_customers(state.provider.as_ref(), &state.reports, query).await {
        Ok(response) => {
            tracing::info!(
                "D402: returning {} customers for {} ({} skipped)",
                response.count,
                response.period,
                response.skipped
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D402: failed to get top customers: {}", e);
            Err(e)
        }
    }
}

/// First `limit` wins when the parameter is repeated
fn limit_param(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str())
}
