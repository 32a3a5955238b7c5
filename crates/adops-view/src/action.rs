// SPDX-License-Identifier: Apache-2.0

//! Save, approve and reject actions.
//!
//! An action turns the record snapshot it was started against into a
//! replacement set. It never mutates records in place.

use std::fmt;

use adops_core::RecordId;
use adops_model::{Organization, Tabular, TransitionError, UpdateRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    NotFound { id: String },
    Transition(TransitionError),
    Failed(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "record {id} is not in the current set"),
            Self::Transition(err) => write!(f, "{err}"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransitionError> for ActionError {
    fn from(value: TransitionError) -> Self {
        Self::Transition(value)
    }
}

pub trait RecordAction<R>: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, records: &[R]) -> Result<Vec<R>, ActionError>;
}

/// Records with a pending → approved/rejected workflow.
pub trait Decidable: Tabular {
    fn approve(&self) -> Result<Self, TransitionError>;

    fn reject(&self, reason: &str) -> Result<Self, TransitionError>;
}

impl Decidable for Organization {
    fn approve(&self) -> Result<Self, TransitionError> {
        Organization::approve(self)
    }

    fn reject(&self, reason: &str) -> Result<Self, TransitionError> {
        Organization::reject(self, reason)
    }
}

impl Decidable for UpdateRequest {
    fn approve(&self) -> Result<Self, TransitionError> {
        UpdateRequest::approve(self)
    }

    fn reject(&self, reason: &str) -> Result<Self, TransitionError> {
        UpdateRequest::reject(self, reason)
    }
}

/// Copies the set with the record `id` replaced by `edit(record)`.
pub fn replace_record<R: Tabular>(
    records: &[R],
    id: &RecordId,
    edit: impl FnOnce(&R) -> Result<R, ActionError>,
) -> Result<Vec<R>, ActionError> {
    let position = records
        .iter()
        .position(|r| r.record_id() == id)
        .ok_or_else(|| ActionError::NotFound {
            id: id.to_string(),
        })?;
    let replacement = edit(&records[position])?;
    if replacement.record_id() != id {
        return Err(ActionError::Failed(format!(
            "edit of {id} changed its identity to {}",
            replacement.record_id()
        )));
    }
    let mut next = records.to_vec();
    next[position] = replacement;
    Ok(next)
}

pub struct Approve {
    pub id: RecordId,
}

impl<R: Decidable> RecordAction<R> for Approve {
    fn name(&self) -> &str {
        "approve"
    }

    fn apply(&self, records: &[R]) -> Result<Vec<R>, ActionError> {
        replace_record(records, &self.id, |r| Ok(r.approve()?))
    }
}

pub struct Reject {
    pub id: RecordId,
    pub reason: String,
}

impl<R: Decidable> RecordAction<R> for Reject {
    fn name(&self) -> &str {
        "reject"
    }

    fn apply(&self, records: &[R]) -> Result<Vec<R>, ActionError> {
        replace_record(records, &self.id, |r| Ok(r.reject(&self.reason)?))
    }
}

/// Saves an edited copy of an existing record.
pub struct Save<R> {
    pub record: R,
}

impl<R: Tabular> RecordAction<R> for Save<R> {
    fn name(&self) -> &str {
        "save"
    }

    fn apply(&self, records: &[R]) -> Result<Vec<R>, ActionError> {
        replace_record(records, self.record.record_id(), |_| Ok(self.record.clone()))
    }
}
