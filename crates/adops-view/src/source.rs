use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorCode {
    Unavailable,
    Timeout,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub code: SourceErrorCode,
    pub message: String,
}

impl SourceError {
    #[must_use]
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Unavailable, message)
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Invalid, message)
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for SourceError {}

/// Supplies one immutable snapshot of a screen's records per load.
#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    async fn load(&self) -> Result<Vec<R>, SourceError>;

    fn describe(&self) -> String {
        "records".to_string()
    }
}

/// An in-memory snapshot shared by every view that loads from it.
pub struct StaticSource<R> {
    records: Arc<Vec<R>>,
    label: String,
}

impl<R> StaticSource<R> {
    pub fn new(label: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            records: Arc::new(records),
            label: label.into(),
        }
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> RecordSource<R> for StaticSource<R> {
    async fn load(&self) -> Result<Vec<R>, SourceError> {
        Ok(self.records.as_ref().clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Scriptable source for tests: counts loads, can stall or fail.
pub struct FakeSource<R> {
    pub records: Mutex<Vec<R>>,
    pub load_calls: AtomicU64,
    pub failure: Mutex<Option<SourceError>>,
    pub slow_read: Option<Duration>,
}

impl<R> FakeSource<R> {
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            load_calls: AtomicU64::new(0),
            failure: Mutex::new(None),
            slow_read: None,
        }
    }

    #[must_use]
    pub fn slow(mut self, delay: Duration) -> Self {
        self.slow_read = Some(delay);
        self
    }

    #[must_use]
    pub fn calls(&self) -> u64 {
        self.load_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> RecordSource<R> for FakeSource<R> {
    async fn load(&self) -> Result<Vec<R>, SourceError> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.slow_read {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failure.lock().await.clone() {
            return Err(err);
        }
        Ok(self.records.lock().await.clone())
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}
