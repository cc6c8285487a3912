//! CLI argument parsing via clap.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};

/// Drive an interactive terminal program in tmux: type a query, submit it,
/// and print the response once the screen settles.
#[derive(Debug, Parser)]
#[command(
    name = "nudge",
    version,
    after_help = nudge::build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./nudge.toml or ~/.config/nudge/nudge.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable color output and the spinner.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deliver a query and print the settled response.
    Ask(AskArgs),
    /// Create the session if it does not exist.
    Ensure(SessionArgs),
    /// Print the current screen of a session.
    Capture(SessionArgs),
    /// Classify a saved frame offline.
    Classify(ClassifyArgs),
    /// Print version and build metadata.
    Version,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct SessionArgs {
    /// tmux session name.
    #[arg(short = 's', long = "session")]
    pub session: String,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct AskArgs {
    #[command(flatten)]
    pub target: SessionArgs,

    /// Overall deadline in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Delay between screen captures in milliseconds.
    #[arg(long = "poll-interval", value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Extra submits allowed when the query stays in the input box.
    #[arg(long = "submit-retries", value_name = "N")]
    pub submit_retries: Option<u32>,

    /// Text the program is expected to echo, when it differs from the query.
    #[arg(long = "echo", value_name = "TEXT")]
    pub echo: Option<String>,

    /// Print a JSON object instead of the bare response.
    #[arg(long = "json")]
    pub json: bool,

    /// Query text, or `-` to read it from stdin.
    pub query: String,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ClassifyArgs {
    /// Query text whose echo to look for.
    #[arg(short = 'q', long = "query")]
    pub query: String,

    /// File holding a captured frame, or `-` for stdin.
    pub frame: String,
}
