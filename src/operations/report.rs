//! Outcome of a finished operation.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::PipAction;
use crate::error::{PipdeskError, Result};

/// Terminal state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Succeeded,
    Failed,
    Cancelled,
}

/// Whether an interpreter currently has an operation running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    Idle,
    Running,
}

/// Summary of one pip run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OperationReport {
    pub action: PipAction,
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Last lines of combined output, stderr lines prefixed.
    pub tail: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl OperationReport {
    /// Whether pip exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }

    /// `Ok(self)` on success, the matching error otherwise.
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            OperationStatus::Succeeded => Ok(self),
            OperationStatus::Failed => Err(PipdeskError::OperationFailed {
                action: self.action.to_string(),
                package: self.package,
                code: self.exit_code,
                output: self.tail,
            }),
            OperationStatus::Cancelled => Err(PipdeskError::OperationCancelled {
                action: self.action.to_string(),
                package: self.package,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: OperationStatus, exit_code: Option<i32>) -> OperationReport {
        OperationReport {
            action: PipAction::Install,
            package: "flask".into(),
            version: None,
            status,
            exit_code,
            tail: vec!["[stderr] ERROR: boom".into()],
            started_at: Utc::now(),
            duration_ms: 12,
        }
    }

    #[test]
    fn success_passes_through() {
        let ok = report(OperationStatus::Succeeded, Some(0)).into_result().unwrap();
        assert!(ok.succeeded());
    }

    #[test]
    fn failure_maps_to_operation_failed() {
        let err = report(OperationStatus::Failed, Some(1)).into_result().unwrap_err();
        match err {
            PipdeskError::OperationFailed { code, output, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(output.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cancellation_maps_to_operation_cancelled() {
        let err = report(OperationStatus::Cancelled, None).into_result().unwrap_err();
        assert_eq!(err.kind(), "operation_cancelled");
    }

    #[test]
    fn serializes_status_lowercase() {
        let json = serde_json::to_value(report(OperationStatus::Failed, Some(2))).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["action"], "install");
        assert!(json.get("version").is_none());
    }
}
