//! Domain error taxonomy
//!
//! Managers surface these typed errors; store clients return `anyhow::Result`
//! with context and are wrapped into `Storage` at the domain boundary. The
//! API layer maps each variant onto an HTTP status (see `api::handlers`).

use crate::workflow::models::TrackerStatusRequest;
use thiserror::Error;

/// Errors surfaced by the map / workflow / cycle managers.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Malformed input: empty tracker set, unknown enum value. No side
    /// effects have occurred.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Request or entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate pending submission, or deciding an already-decided
    /// request. Carries the existing request so the caller can reconcile.
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        existing: Option<Box<TrackerStatusRequest>>,
    },

    /// Caller lacks the administrator capability.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Snapshot Store failure — fatal to the triggering operation. The
    /// context names the tenant and, for writes, the attempted version.
    #[error("storage failure ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl OpsError {
    /// Wrap a store failure with tenant/operation context.
    pub fn storage(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Conflict without an attached request.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            existing: None,
        }
    }

    /// Conflict carrying the existing request for client display.
    pub fn conflict_with(message: impl Into<String>, existing: TrackerStatusRequest) -> Self {
        Self::Conflict {
            message: message.into(),
            existing: Some(Box::new(existing)),
        }
    }
}

/// Result alias used throughout the managers.
pub type OpsResult<T> = Result<T, OpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_keeps_context() {
        let err = OpsError::storage(
            "tenant=alpha-plant version=7",
            anyhow::anyhow!("connection refused"),
        );
        let msg = err.to_string();
        assert!(msg.contains("tenant=alpha-plant"));
        assert!(msg.contains("version=7"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_conflict_without_existing() {
        let err = OpsError::conflict("already decided");
        match err {
            OpsError::Conflict { existing, .. } => assert!(existing.is_none()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
