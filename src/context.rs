use std::fmt::Display;
use std::io;

use crate::term::{self, Style};

/// Handle on the running application, injectable into any action.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    version: Option<String>,
    style: Style,
}

impl Context {
    pub(crate) fn new(name: String, version: Option<String>, style: Style) -> Self {
        Self {
            name,
            version,
            style,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Print `[-] msg` to stdout.
    pub fn info(&self, msg: impl Display) {
        println!("{}", term::info_line(self.style, &msg.to_string()));
    }

    /// Print `[!] msg` to stderr.
    pub fn error(&self, msg: impl Display) {
        eprintln!("{}", term::error_line(self.style, &msg.to_string()));
    }

    /// Print an error line and exit with status 1.
    pub fn fatal(&self, msg: impl Display) -> ! {
        self.error(msg);
        std::process::exit(1)
    }

    /// Run `job` behind a stdout spinner. See [`term::spin`].
    pub fn spin<T, E>(&self, msg: &str, job: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut out = io::stdout();
        term::spin(&mut out, self.style.stdout_color, msg, job)
    }
}
