//! Operator-facing output: coloured line prefixes and the progress spinner.
//!
//! Colour is decided once by [`Style`] and passed down; nothing here looks at
//! the terminal on its own.

use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

pub(crate) const BLUE: &str = "\x1b[34m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const RESET: &str = "\x1b[0m";

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Whether stdout and stderr get ANSI colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub stdout_color: bool,
    pub stderr_color: bool,
}

impl Style {
    /// Colour each stream that is a terminal.
    pub fn detect() -> Self {
        Self {
            stdout_color: io::stdout().is_terminal(),
            stderr_color: io::stderr().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self::default()
    }

    pub fn colored() -> Self {
        Self {
            stdout_color: true,
            stderr_color: true,
        }
    }

    pub(crate) fn clap_color(self) -> clap::ColorChoice {
        if self.stdout_color {
            clap::ColorChoice::Always
        } else {
            clap::ColorChoice::Never
        }
    }
}

/// `[tag]` wrapped in `color` when enabled.
pub(crate) fn tag(tag: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}[{tag}]{RESET}")
    } else {
        format!("[{tag}]")
    }
}

/// `[-] msg`, for stdout.
pub fn info_line(style: Style, msg: &str) -> String {
    format!("{} {msg}", tag("-", BLUE, style.stdout_color))
}

/// `[!] msg`, for stderr.
pub fn error_line(style: Style, msg: &str) -> String {
    format!("{} {msg}", tag("!", RED, style.stderr_color))
}

/// Run `job` while a spinner repaints `msg` on `out`, then print `[OK] msg` or
/// `[FAIL] msg` and return the job's result.
///
/// Without colour only the final line is written.
pub fn spin<W, T, E>(out: &mut W, color: bool, msg: &str, job: impl FnOnce() -> Result<T, E>) -> Result<T, E>
where
    W: Write + Send,
{
    let result = if color {
        let (stop, stopped) = mpsc::channel::<()>();
        thread::scope(|scope| {
            let painter = {
                let out = &mut *out;
                scope.spawn(move || {
                    let mut frame = 0;
                    while let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(FRAME_INTERVAL) {
                        let _ = write!(out, "\r{} {msg}", tag(&FRAMES[frame].to_string(), BLUE, true));
                        let _ = out.flush();
                        frame = (frame + 1) % FRAMES.len();
                    }
                })
            };
            let result = job();
            let _ = stop.send(());
            // The painter owns `out` until it is joined.
            let _ = painter.join();
            result
        })
    } else {
        job()
    };

    let status = match &result {
        Ok(_) => tag("OK", BLUE, color),
        Err(_) => tag("FAIL", RED, color),
    };
    let _ = if color {
        writeln!(out, "\r{status} {msg}")
    } else {
        writeln!(out, "{status} {msg}")
    };
    let _ = out.flush();
    result
}
