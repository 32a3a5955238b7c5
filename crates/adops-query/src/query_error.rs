// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    Validation,
    UnknownField,
    Comparator,
    Aggregate,
}

impl QueryErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::UnknownField => "unknown_field",
            Self::Comparator => "comparator",
            Self::Aggregate => "aggregate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Validation, message)
    }

    /// Errors raised while deriving a view rather than while compiling it.
    #[must_use]
    pub const fn is_computation(&self) -> bool {
        matches!(
            self.code,
            QueryErrorCode::Comparator | QueryErrorCode::Aggregate
        )
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}
impl std::error::Error for QueryError {}

impl From<adops_core::Error> for QueryError {
    fn from(value: adops_core::Error) -> Self {
        Self::new(QueryErrorCode::Validation, value.to_string())
    }
}
