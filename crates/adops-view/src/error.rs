// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use adops_core::{ExitCode, MachineError};
use adops_query::QueryError;

use crate::action::ActionError;
use crate::source::{SourceError, SourceErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewErrorCode {
    Validation,
    NotReady,
    Unmounted,
    Load,
    Timeout,
    Action,
}

impl ViewErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotReady => "not_ready",
            Self::Unmounted => "unmounted",
            Self::Load => "load_failed",
            Self::Timeout => "load_timeout",
            Self::Action => "action_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub code: ViewErrorCode,
    pub message: String,
    /// The user may simply invoke the same operation again.
    pub retryable: bool,
}

impl ViewError {
    #[must_use]
    pub fn new(code: ViewErrorCode, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code,
            message: message.into(),
            retryable,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ViewErrorCode::Validation, message, false)
    }

    #[must_use]
    pub fn unmounted() -> Self {
        Self::new(ViewErrorCode::Unmounted, "view is unmounted", false)
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self.code {
            ViewErrorCode::Validation => ExitCode::Validation,
            ViewErrorCode::Load | ViewErrorCode::Timeout | ViewErrorCode::Action => {
                ExitCode::DependencyFailure
            }
            ViewErrorCode::NotReady | ViewErrorCode::Unmounted => ExitCode::Internal,
        }
    }

    #[must_use]
    pub fn to_machine_error(&self) -> MachineError {
        MachineError::from_exit(self.exit_code(), &self.message)
            .with_detail("view_code", self.code.as_str())
            .with_detail("retryable", if self.retryable { "true" } else { "false" })
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ViewError {}

impl From<QueryError> for ViewError {
    fn from(value: QueryError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<SourceError> for ViewError {
    fn from(value: SourceError) -> Self {
        let code = match value.code {
            SourceErrorCode::Timeout => ViewErrorCode::Timeout,
            _ => ViewErrorCode::Load,
        };
        Self::new(code, value.message, true)
    }
}

impl From<ActionError> for ViewError {
    fn from(value: ActionError) -> Self {
        Self::new(ViewErrorCode::Action, value.to_string(), true)
    }
}
