//! Bind a plain config struct to command-line flags, a config file and
//! interactive prompts, then call your action with exactly the values it asks
//! for.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Clone, Default)]
//! struct Opts {
//!     verbose: bool,
//!     name: String,
//! }
//!
//! impl Record for Opts {
//!     fn tags() -> Tags {
//!         Tags::new()
//!             .field("verbose", FieldTags::new().short('v'))
//!             .field("name", FieldTags::new().usage("Your name").prompt("yes"))
//!     }
//! }
//!
//! App::with_config(Opts::default())
//!     .action(|Config(opts): Config<Opts>, ctx: Context| {
//!         ctx.info(format!("hello {}", opts.name));
//!         Ok::<(), String>(())
//!     })
//!     .run();
//! ```
//!
//! That gives the program `-v/--verbose` and `--name`, reads
//! `~/.config/{app}/config.yml` for defaults, asks for `name` when neither the
//! flag nor the file supplied it, and runs the action.
//!
//! # Records
//!
//! A record is any serde struct implementing [`Record`]. Each member becomes
//! a field: the flag `--{member lower-cased}`, the config key of the same
//! name, and optionally a prompt. Per-member metadata that serde has no slot
//! for comes from [`Record::tags`]:
//!
//! - **`long`** overrides the flag and config key name.
//! - **`short`** adds a one-character flag.
//! - **`usage`** is the help text and prompt label (default: member name).
//! - **`prompt`** set to `yes` (any case) makes the field promptable.
//!
//! Members are typed by their declared type, read through `Deserialize`.
//! `bool`, signed integers, unsigned integers, `String` and `Vec<String>`
//! are bound, as are `Option`s of them. Anything else (floats, nested
//! structs, maps, enums, `Vec<u32>`) is described but left alone.
//!
//! # Precedence
//!
//! ```text
//! Record value          the struct handed to App::with_config / Command::with_config
//!        ↑ overridden by
//! Config file           top-level keys, or the section named after the command
//!        ↑ overridden by
//! Command-line flags
//!        ↑ filled in by
//! Prompts               only promptable fields that no flag or config key set
//! ```
//!
//! The config file is applied before parsing, so its values show up as the
//! defaults in `--help`. A key whose value has the wrong type for its field
//! is an error, never a silent skip. A missing or malformed file is treated
//! as empty.
//!
//! # Actions
//!
//! An action is a closure or function of up to five parameters drawn from:
//!
//! - [`Args`]: positional arguments.
//! - [`Config<C>`]: the context's own record.
//! - [`Global<R>`]: the app's root record (command actions only).
//! - [`Context`]: name, version, output helpers and the spinner.
//!
//! It returns `Result<(), E>` for any `E: Display`. Parameters are checked
//! against what the context can offer before anything runs; asking for one
//! that is not available fails with a message listing the accepted types.
//!
//! # Commands
//!
//! [`Command`]s add one level of subcommands. The first positional argument
//! picks the command; everything after it is parsed against the command's
//! own flags plus the root flags. Root prompts are answered before the
//! command's. Hidden commands run but are left out of usage.
//!
//! # Testing
//!
//! [`App::try_run_with`] takes the arguments and a [`Prompter`] over any
//! reader and writer, and returns an [`Outcome`] instead of exiting.
//!
//! # Error handling
//!
//! All fallible operations return [`ClapbindError`]. [`App::run`] prints the
//! error as `[!] message` and exits with status 1.

pub mod error;
pub mod types;

mod app;
mod command;
mod context;
mod dispatch;
mod document;
mod fields;
mod file;
mod flags;
mod flatten;
mod merge;
mod prompt;
mod record;
mod schema;
mod term;

#[cfg(test)]
mod fixtures;

pub use app::{App, Outcome};
pub use command::Command;
pub use context::Context;
pub use dispatch::{Action, ActionResult, Args, Config, Global, Inject, Injectables, Slot};
pub use document::{DocValue, Document, Section};
pub use error::ClapbindError;
pub use fields::{Field, describe};
pub use file::{default_config_path, load_document};
pub use prompt::{Prompter, Retry, parse_bool};
pub use record::{FieldTags, Record, Tags};
pub use term::Style;
pub use types::{FieldValue, Kind};
