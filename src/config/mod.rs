//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`NUDGE_POLL_INTERVAL_MS`, `NUDGE_TIMEOUT_SECS`,
//!    `NUDGE_SUBMIT_RETRIES`, `NUDGE_TMUX`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./nudge.toml in the current directory
//! 4. $XDG_CONFIG_HOME/nudge/nudge.toml (or ~/.config/nudge/nudge.toml)
//! 5. Built-in defaults
//!
//! CLI flags such as `--timeout` are applied on top by the binary.

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use loader::{load_config, load_config_with_source};
pub use sources::config_root_dir;
pub use types::{Config, ConfigSource, DriverConfig, LoadedConfig, ScreenConfig, SessionConfig};
