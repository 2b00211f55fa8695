use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::shared::api_error::{ApiErrorResponse, ErrorKind};
use std::time::Duration;
use thiserror::Error;

use super::response_parser::ParseError;
use crate::shared::llm::LlmError;

/// Ошибки отчёта "топ клиентов"; каждая превращается в JSON с `success: false`
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    InputMalformed(String),

    #[error("LLM provider call failed: {0}")]
    ProviderCallFailed(#[source] LlmError),

    #[error("LLM provider did not respond within {} s", .0.as_secs_f64())]
    ProviderTimeout(Duration),

    #[error("{source}")]
    ResponseUnparseable {
        #[source]
        source: ParseError,
        /// First 200 characters of the model output
        raw_preview: String,
    },
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputMalformed(_) => ErrorKind::InputMalformed,
            Self::ProviderCallFailed(_) => ErrorKind::ProviderCallFailed,
            Self::ProviderTimeout(_) => ErrorKind::ProviderTimeout,
            Self::ResponseUnparseable { .. } => ErrorKind::ResponseUnparseable,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InputMalformed(_) => StatusCode::BAD_REQUEST,
            Self::ProviderCallFailed(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::ResponseUnparseable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<LlmError> for ReportError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(secs) => Self::ProviderTimeout(Duration::from_secs(secs)),
            other => Self::ProviderCallFailed(other),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ApiErrorResponse::new(self.kind(), self.to_string());
        if let Self::ResponseUnparseable { raw_preview, .. } = self {
            body = body.with_raw_response(raw_preview);
        }
        (status, Json(body)).into_response()
    }
}
