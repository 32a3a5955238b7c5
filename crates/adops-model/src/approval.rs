use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    NotPending {
        id: String,
        status: ApprovalStatus,
    },
    MissingReason {
        id: String,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPending { id, status } => {
                write!(f, "record {id} is {} and can no longer change", status.as_str())
            }
            Self::MissingReason { id } => write!(f, "rejecting record {id} requires a reason"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// Only pending records may be decided.
pub(crate) fn ensure_pending(id: &str, status: ApprovalStatus) -> Result<(), TransitionError> {
    if status == ApprovalStatus::Pending {
        Ok(())
    } else {
        Err(TransitionError::NotPending {
            id: id.to_string(),
            status,
        })
    }
}

pub(crate) fn rejection_reason(id: &str, reason: &str) -> Result<String, TransitionError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(TransitionError::MissingReason { id: id.to_string() });
    }
    Ok(reason.to_string())
}
