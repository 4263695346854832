//! Serializable success/failure envelope returned by the driving surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SyncError;

/// `{"success": true, "data": ...}` or
/// `{"success": false, "error": {"code": ..., "message": ...}}`, both with
/// `meta`.
#[derive(Debug, Serialize)]
pub struct OperationOutcome<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: OutcomeMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OutcomeMeta {
    pub operation: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> OperationOutcome<T> {
    pub fn from_result(operation: &'static str, result: Result<T, SyncError>) -> Self {
        let meta = OutcomeMeta {
            operation,
            timestamp: Utc::now(),
        };
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                meta,
            },
            Err(e) => {
                tracing::error!(operation, code = e.reason_code(), error = %e, "operation failed");
                Self {
                    success: false,
                    data: None,
                    error: Some(ErrorBody {
                        code: e.reason_code().to_owned(),
                        message: e.to_string(),
                    }),
                    meta,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use catsync_core::Source;

    use super::*;

    #[test]
    fn success_serializes_data_without_error() {
        let outcome = OperationOutcome::from_result("analyze", Ok(vec![1, 2]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("error").is_none());
        assert_eq!(json["meta"]["operation"], "analyze");
    }

    #[test]
    fn failure_serializes_code_and_message() {
        let outcome: OperationOutcome<()> = OperationOutcome::from_result(
            "finalize",
            Err(SyncError::StagingMissing {
                catalog: Source::Retail,
            }),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "staging_missing");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("retail"));
    }
}
