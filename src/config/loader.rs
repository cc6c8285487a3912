//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::apply_runtime_env_overrides;
use super::sources::{config_root_dir, read_config_text_with_sources};
use super::{Config, LoadedConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_source(path_override)?.config)
}

/// Load configuration and report which source supplied it.
pub fn load_config_with_source(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    tracing::debug!(?source, "configuration loaded");
    Ok(LoadedConfig { config, source })
}

/// Reject values the driver cannot run with.
pub(super) fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.driver.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "driver.poll_interval_ms must be greater than zero".to_string(),
        ));
    }
    if config.driver.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "driver.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.driver.stuck_typed_polls == 0 {
        return Err(ConfigError::Invalid(
            "driver.stuck_typed_polls must be greater than zero".to_string(),
        ));
    }
    if config.session.tmux.trim().is_empty() {
        return Err(ConfigError::Invalid("session.tmux must not be empty".to_string()));
    }
    if config.session.width == 0 || config.session.height == 0 {
        return Err(ConfigError::Invalid(
            "session.width and session.height must be greater than zero".to_string(),
        ));
    }
    if config.session.submit_key.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "session.submit_key must not be empty".to_string(),
        ));
    }
    if config.screen.echo_prefix_chars == Some(0) {
        return Err(ConfigError::Invalid(
            "screen.echo_prefix_chars must be greater than zero when set".to_string(),
        ));
    }
    if config.screen.min_rule_width < 2 {
        return Err(ConfigError::Invalid(
            "screen.min_rule_width must be at least 2".to_string(),
        ));
    }
    Ok(())
}
