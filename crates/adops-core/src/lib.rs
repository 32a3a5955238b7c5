#![forbid(unsafe_code)]
//! Shared foundation for the ad-ops workspace.
//!
//! Everything here is deterministic: no wall-clock time, no I/O beyond
//! reading environment variables for path resolution.

pub mod domain;
pub mod errors;
pub mod types;

pub use domain::canonical;
pub use domain::{resolve_adops_config_path, sha256_hex, Hash256};
pub use errors::{ConfigPathScope, Error, ExitCode, MachineError, Result};
pub use types::{FieldName, RecordId};

pub const CRATE_NAME: &str = "adops-core";

pub const ENV_ADOPS_LOG_LEVEL: &str = "ADOPS_LOG_LEVEL";
pub const ENV_ADOPS_LOG_JSON: &str = "ADOPS_LOG_JSON";
pub const ENV_ADOPS_CONFIG: &str = "ADOPS_CONFIG";
