pub mod canonical;
pub mod config;

pub use canonical::{sha256_hex, Hash256};
pub use config::resolve_adops_config_path;
