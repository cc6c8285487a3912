//! Environment overrides.
//!
//! `NUDGE_*` variables win over every file source so one-off runs can retune
//! timing without editing `nudge.toml`.

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_POLL_INTERVAL_MS: &str = "NUDGE_POLL_INTERVAL_MS";
pub(super) const ENV_TIMEOUT_SECS: &str = "NUDGE_TIMEOUT_SECS";
pub(super) const ENV_SUBMIT_RETRIES: &str = "NUDGE_SUBMIT_RETRIES";
pub(super) const ENV_TMUX: &str = "NUDGE_TMUX";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_empty(env_lookup, ENV_POLL_INTERVAL_MS) {
        config.driver.poll_interval_ms = parse_env_number(ENV_POLL_INTERVAL_MS, &raw)?;
    }
    if let Some(raw) = non_empty(env_lookup, ENV_TIMEOUT_SECS) {
        config.driver.timeout_secs = parse_env_number(ENV_TIMEOUT_SECS, &raw)?;
    }
    if let Some(raw) = non_empty(env_lookup, ENV_SUBMIT_RETRIES) {
        config.driver.submit_retries = parse_env_number(ENV_SUBMIT_RETRIES, &raw)?;
    }
    if let Some(tmux) = non_empty(env_lookup, ENV_TMUX) {
        config.session.tmux = tmux;
    }
    Ok(())
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| {
        ConfigError::Invalid(format!(
            "invalid {name} value `{raw}`: expected a non-negative integer"
        ))
    })
}
