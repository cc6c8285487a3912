//! Nudge: deliver queries to an interactive terminal program running in
//! tmux, and tell from the rendered screen alone when the answer is done.
//!
//! The managed program sends no acknowledgment. Each captured frame is
//! classified as typed, submitted, processing, or unrecognized, and the
//! driver turns that stream of verdicts into one settled response.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nudge::channel::SessionId;
//! use nudge::config::load_config;
//! use nudge::driver::{Driver, DriverOptions, Query};
//! use nudge::tmux::TmuxChannel;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let channel = Arc::new(TmuxChannel::new(&config.session));
//! let driver = Driver::new(channel, DriverOptions::from_config(&config), config.screen.clone());
//! let session = SessionId::new("assistant").unwrap();
//! let delivery = driver.deliver(&session, &Query::new("What is 2 + 2?")).await.unwrap();
//! println!("{}", delivery.response);
//! # }
//! ```

pub mod build_info;
pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod progress;
pub mod screen;
#[cfg(test)]
pub mod testsupport;
pub mod tmux;
