//! Stderr liveness spinner for long-running deliveries.

use crossterm::style::{Color, Stylize};
use std::io::{self, IsTerminal, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

const CLEAR_LINE: &str = "\r\x1b[2K";
const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const TICK_MS: u64 = 100;

/// RAII handle for an active spinner. Dropping it stops and erases the line.
pub struct ProgressHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ProgressHandle {
    fn disabled() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(true)),
            thread: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.thread.is_some()
    }

    pub fn finish(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Start a spinner on stderr. `label` is re-read on every tick so it can
/// follow live state. Nothing is drawn unless `enabled` and stderr is a
/// terminal.
pub fn start_progress<F>(label: F, enabled: bool, color: bool) -> ProgressHandle
where
    F: Fn() -> String + Send + 'static,
{
    if !enabled || !io::stderr().is_terminal() {
        return ProgressHandle::disabled();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let thread = thread::spawn(move || {
        let start = Instant::now();
        let mut idx = 0usize;
        while !stop_flag.load(Ordering::Relaxed) {
            let line = progress_line(FRAMES[idx % FRAMES.len()], &label(), start.elapsed(), color);
            let mut err = io::stderr();
            let _ = write!(err, "{line}");
            let _ = err.flush();
            idx += 1;
            thread::sleep(Duration::from_millis(TICK_MS));
        }
        let mut err = io::stderr();
        let _ = write!(err, "{CLEAR_LINE}");
        let _ = err.flush();
    });

    ProgressHandle {
        stop,
        thread: Some(thread),
    }
}

fn progress_line(frame: char, label: &str, elapsed: Duration, color: bool) -> String {
    let elapsed_s = elapsed.as_millis() as f64 / 1000.0;
    if color {
        format!(
            "{CLEAR_LINE}{} {} {}",
            format!("[{frame}]").with(Color::Cyan),
            label.with(Color::DarkGrey),
            format!("({elapsed_s:.1}s)").with(Color::DarkGrey),
        )
    } else {
        format!("{CLEAR_LINE}[{frame}] {label} ({elapsed_s:.1}s)")
    }
}
