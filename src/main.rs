//! CLI entry point for nudge.

mod cli;

use std::io::Read;
use std::sync::Arc;

use clap::Parser;
use crossterm::style::Stylize;
use serde_json::json;
use tokio::sync::watch;

use cli::{AskArgs, ClassifyArgs, Command, SessionArgs};
use nudge::build_info::version_text;
use nudge::channel::{SessionChannel, SessionId};
use nudge::config::{load_config, Config};
use nudge::driver::{Driver, DriverOptions, InteractionState, Query};
use nudge::error::DriverError;
use nudge::logging::init_logging;
use nudge::progress::start_progress;
use nudge::screen::{Classifier, Frame};
use nudge::tmux::TmuxChannel;

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_SESSION: i32 = 2;
const EXIT_TIMEOUT: i32 = 3;
const EXIT_OCCUPIED: i32 = 4;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    let color = !args.no_color;
    init_logging(args.verbose, color);

    if matches!(args.command, Command::Version) {
        println!("{}", version_text());
        return;
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("{e}"), color);
            std::process::exit(EXIT_USAGE);
        }
    };

    let code = match args.command {
        Command::Version => EXIT_OK,
        Command::Ensure(target) => run_ensure(&config, &target, color).await,
        Command::Capture(target) => run_capture(&config, &target, color).await,
        Command::Classify(classify) => run_classify(&config, &classify, color),
        Command::Ask(ask) => {
            if let Err(msg) = apply_ask_overrides(&mut config, &ask) {
                report_error(&msg, color);
                std::process::exit(EXIT_USAGE);
            }
            run_ask(&config, &ask, color).await
        }
    };
    std::process::exit(code);
}

/// Layer `ask` flags over the loaded config.
fn apply_ask_overrides(config: &mut Config, ask: &AskArgs) -> Result<(), String> {
    if let Some(secs) = ask.timeout {
        if secs == 0 {
            return Err("--timeout must be greater than zero".to_string());
        }
        config.driver.timeout_secs = secs;
    }
    if let Some(ms) = ask.poll_interval {
        if ms == 0 {
            return Err("--poll-interval must be greater than zero".to_string());
        }
        config.driver.poll_interval_ms = ms;
    }
    if let Some(retries) = ask.submit_retries {
        config.driver.submit_retries = retries;
    }
    Ok(())
}

fn channel_for(config: &Config) -> Arc<dyn SessionChannel> {
    Arc::new(TmuxChannel::new(&config.session))
}

async fn run_ask(config: &Config, ask: &AskArgs, color: bool) -> i32 {
    let session = match SessionId::new(ask.target.session.as_str()) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), color);
            return EXIT_SESSION;
        }
    };
    let text = match read_input(&ask.query) {
        Ok(text) => text,
        Err(e) => {
            report_error(&format!("failed to read query: {e}"), color);
            return EXIT_USAGE;
        }
    };
    let mut query = Query::new(text);
    if let Some(echo) = &ask.echo {
        query = query.with_echo(echo.as_str());
    }

    let (state_tx, state_rx) = watch::channel(InteractionState::Typed);
    let driver = Driver::new(
        channel_for(config),
        DriverOptions::from_config(config),
        config.screen.clone(),
    )
    .with_state_observer(state_tx);

    let mut spinner = start_progress(
        move || state_rx.borrow().to_string(),
        color && !ask.json,
        color,
    );
    let result = driver.deliver(&session, &query).await;
    spinner.finish();

    match result {
        Ok(delivery) => {
            if ask.json {
                match serde_json::to_string_pretty(&delivery) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        report_error(&format!("failed to encode response: {e}"), color);
                        return EXIT_USAGE;
                    }
                }
            } else {
                println!("{}", delivery.response);
            }
            EXIT_OK
        }
        Err(e) => report_driver_error(&e, ask.json, color),
    }
}

fn report_driver_error(err: &DriverError, as_json: bool, color: bool) -> i32 {
    let (code, kind, partial) = match err {
        DriverError::SessionUnavailable(_) => (EXIT_SESSION, "session_unavailable", None),
        DriverError::ResponseTimeout { partial, .. } => {
            (EXIT_TIMEOUT, "response_timeout", Some(partial.as_str()))
        }
        DriverError::InputOccupied { .. } => (EXIT_OCCUPIED, "input_occupied", None),
        DriverError::EmptyQuery => (EXIT_USAGE, "empty_query", None),
    };
    if as_json {
        let body = json!({
            "error": kind,
            "message": err.to_string(),
            "partial": partial,
        });
        println!("{body}");
        return code;
    }
    report_error(&err.to_string(), color);
    if let Some(partial) = partial.filter(|p| !p.trim().is_empty()) {
        eprintln!("--- partial response ---\n{partial}");
    }
    code
}

async fn run_ensure(config: &Config, target: &SessionArgs, color: bool) -> i32 {
    let result = match SessionId::new(target.session.as_str()) {
        Ok(session) => channel_for(config).ensure(&session).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            report_error(&e.to_string(), color);
            EXIT_SESSION
        }
    }
}

async fn run_capture(config: &Config, target: &SessionArgs, color: bool) -> i32 {
    let result = match SessionId::new(target.session.as_str()) {
        Ok(session) => channel_for(config).capture_frame(&session).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(frame) => {
            print!("{}", frame.text());
            EXIT_OK
        }
        Err(e) => {
            report_error(&e.to_string(), color);
            EXIT_SESSION
        }
    }
}

fn run_classify(config: &Config, args: &ClassifyArgs, color: bool) -> i32 {
    let text = match read_frame(&args.frame) {
        Ok(text) => text,
        Err(e) => {
            report_error(&format!("failed to read frame `{}`: {e}", args.frame), color);
            return EXIT_USAGE;
        }
    };
    let classification = Classifier::new(&args.query, &config.screen).classify(&Frame::new(text));
    match serde_json::to_string_pretty(&classification) {
        Ok(out) => {
            println!("{out}");
            EXIT_OK
        }
        Err(e) => {
            report_error(&format!("failed to encode classification: {e}"), color);
            EXIT_USAGE
        }
    }
}

/// Query text, or stdin when the argument is `-`.
fn read_input(arg: &str) -> std::io::Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(arg.to_string())
}

/// Frame file contents, or stdin when the path is `-`.
fn read_frame(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
}

fn report_error(msg: &str, color: bool) {
    if color {
        eprintln!("{} {msg}", "error:".red().bold());
    } else {
        eprintln!("error: {msg}");
    }
}
