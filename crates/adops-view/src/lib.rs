#![forbid(unsafe_code)]
//! Per-screen view models over the filter → sort → aggregate engine.
//!
//! A [`ViewModel`] owns one screen's record set and derived state. Loads
//! and record actions simulate backend latency on cancellable tokio tasks;
//! unmounting or dropping the view aborts them so no completion ever lands
//! on a disposed view.

mod action;
mod config;
mod error;
mod export;
mod screens;
mod source;
mod task;
mod view_model;

pub use action::{replace_record, ActionError, Approve, Decidable, RecordAction, Reject, Save};
pub use config::{
    ConfigFile, ViewConfig, ENV_LOAD_LATENCY_MS, ENV_LOAD_TIMEOUT_MS, ENV_MAX_FILTERS, ENV_MAX_SEARCH_LEN,
    ENV_MAX_SELECTION, ENV_SAVE_LATENCY_MS,
};
pub use error::{ViewError, ViewErrorCode};
pub use export::ExportBatch;
pub use screens::{screen_catalog, FieldInfo, ScreenInfo, ScreenKind, ScreenPreset};
pub use source::{FakeSource, RecordSource, SourceError, SourceErrorCode, StaticSource};
pub use task::{PendingTasks, TaskKind, TaskTicket};
pub use view_model::{CompletionReport, ComputationError, ComputeStage, Phase, ViewModel};

pub const CRATE_NAME: &str = "adops-view";
