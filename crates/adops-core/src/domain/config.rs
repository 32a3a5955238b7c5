use std::path::PathBuf;

use crate::errors::ConfigPathScope;

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves where the ad-ops config file lives.
///
/// An explicit `ADOPS_CONFIG` wins for both scopes. The user scope then
/// follows XDG, then `$HOME/.config`.
#[must_use]
pub fn resolve_adops_config_path(scope: ConfigPathScope) -> PathBuf {
    if let Some(explicit) = non_blank_env(crate::ENV_ADOPS_CONFIG) {
        return PathBuf::from(explicit);
    }
    match scope {
        ConfigPathScope::User => {
            if let Some(xdg_config_home) = non_blank_env("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg_config_home)
                    .join("adops")
                    .join("config.json");
            }
            if let Some(home) = non_blank_env("HOME") {
                return PathBuf::from(home)
                    .join(".config")
                    .join("adops")
                    .join("config.json");
            }
            PathBuf::from(".adops").join("config.json")
        }
        ConfigPathScope::Workspace => PathBuf::from(".adops").join("config.json"),
    }
}
