//! Compile-time build metadata for the CLI.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit hash captured by `build.rs` (suffixed `-dirty` for modified trees).
pub const GIT_COMMIT: &str = env!("NUDGE_BUILD_GIT_HASH");

/// UTC build timestamp captured by `build.rs`.
pub const BUILD_TIMESTAMP: &str = env!("NUDGE_BUILD_TIMESTAMP");

/// Trailer appended to `nudge --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("NUDGE_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("NUDGE_BUILD_TIMESTAMP")
);

/// Text printed by `nudge version`.
pub fn version_text() -> String {
    format!("nudge {VERSION}\ncommit: {GIT_COMMIT}\nbuilt: {BUILD_TIMESTAMP}")
}
