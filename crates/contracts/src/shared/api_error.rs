use serde::{Deserialize, Serialize};

/// Failure class reported to API consumers in `errorKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InputMalformed,
    ProviderCallFailed,
    ProviderTimeout,
    ResponseUnparseable,
}

/// Error body returned by every failing API call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_kind: ErrorKind,
    /// First 200 characters of the model output, when parsing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ApiErrorResponse {
    pub fn new(error_kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_kind,
            raw_response: None,
        }
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ApiErrorResponse::new(ErrorKind::ResponseUnparseable, "No JSON array found")
            .with_raw_response("Sorry, I cannot");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["errorKind"], "ResponseUnparseable");
        assert_eq!(value["rawResponse"], "Sorry, I cannot");

        let body = ApiErrorResponse::new(ErrorKind::InputMalformed, "bad month");
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("rawResponse").is_none());
    }
}
