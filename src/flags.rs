//! Registering fields as clap arguments and reading parsed values back.
//!
//! Each bindable field becomes one `Arg` whose id is the field's long name.
//! Values are not written by clap; after parsing, [`collect`] copies every
//! flag that was given on the command line into the record.

use std::collections::HashSet;

use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, value_parser};

use crate::error::ClapbindError;
use crate::fields::Field;
use crate::record::Record;
use crate::types::{FieldValue, Kind};

/// Id of the trailing positional argument list.
pub const ARGS_ID: &str = "clapbind::args";

/// Flag names already taken in a parse scope.
#[derive(Debug, Clone)]
pub struct Reserved {
    longs: HashSet<String>,
    shorts: HashSet<char>,
}

impl Reserved {
    /// `--help` and `-h` are always taken.
    pub fn new() -> Self {
        Self {
            longs: HashSet::from(["help".to_string()]),
            shorts: HashSet::from(['h']),
        }
    }

    pub fn with_version(mut self) -> Self {
        self.longs.insert("version".to_string());
        self.shorts.insert('v');
        self
    }

    /// Take the names of every bindable field, failing on the first clash.
    pub fn claim(&mut self, fields: &[Field]) -> Result<(), ClapbindError> {
        for field in fields.iter().filter(|f| f.kind.is_bindable()) {
            if !self.longs.insert(field.long.clone()) {
                return Err(ClapbindError::DuplicateFlag(field.long.clone()));
            }
            if let Some(c) = field.short
                && !self.shorts.insert(c)
            {
                return Err(ClapbindError::DuplicateFlag(c.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for Reserved {
    fn default() -> Self {
        Self::new()
    }
}

/// Add one argument per bindable field to `cmd`.
///
/// Help text carries the record's current value, so config-file values show
/// up as the effective defaults. `global` makes the flags usable after a
/// subcommand token.
pub fn register<R: Record>(
    mut cmd: clap::Command,
    fields: &[Field],
    record: &R,
    global: bool,
) -> clap::Command {
    for field in fields {
        let Some(arg) = arg_for(field) else {
            continue;
        };
        let help = match field.current(record) {
            Some(current) if !current.is_empty() => format!("{} [{current}]", field.usage),
            _ => field.usage.clone(),
        };
        cmd = cmd.arg(arg.help(help).global(global));
    }
    cmd
}

fn arg_for(field: &Field) -> Option<Arg> {
    let arg = Arg::new(field.long.clone())
        .long(field.long.clone())
        .short(field.short);
    let arg = match field.kind {
        Kind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new())
            .action(ArgAction::Set),
        Kind::Str => arg
            .value_name("TEXT")
            .value_parser(value_parser!(String))
            .action(ArgAction::Set),
        Kind::Int => arg
            .value_name("NUM")
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64))
            .action(ArgAction::Set),
        Kind::Uint => arg
            .value_name("NUM")
            .value_parser(value_parser!(u64))
            .action(ArgAction::Set),
        Kind::List => arg
            .value_name("ITEM")
            .value_delimiter(',')
            .value_parser(value_parser!(String))
            .action(ArgAction::Append),
        Kind::Unsupported => return None,
    };
    // Repeating a single-valued flag keeps the last value.
    let arg = match field.kind {
        Kind::List => arg,
        _ => arg.overrides_with(field.long.clone()),
    };
    Some(arg)
}

/// Add the trailing positional argument list. Hidden unless the action
/// takes [`Args`](crate::dispatch::Args).
pub fn register_positional(cmd: clap::Command, visible: bool) -> clap::Command {
    cmd.arg(
        Arg::new(ARGS_ID)
            .value_name("ARGS")
            .num_args(0..)
            .trailing_var_arg(true)
            .action(ArgAction::Append)
            .value_parser(value_parser!(String))
            .hide(!visible),
    )
}

/// True when the flag for `field` was given on the command line.
///
/// `matches` must come from a command `field` was registered on.
pub fn seen(matches: &ArgMatches, field: &Field) -> bool {
    field.kind.is_bindable() && matches.value_source(&field.long) == Some(ValueSource::CommandLine)
}

/// Write every flag given on the command line into `record`. Returns the long
/// names of the fields that were set.
pub fn collect<R: Record>(
    matches: &ArgMatches,
    fields: &[Field],
    record: &mut R,
) -> Result<HashSet<String>, ClapbindError> {
    let mut set = HashSet::new();
    for field in fields.iter().filter(|f| seen(matches, f)) {
        if let Some(value) = read(matches, field) {
            field.write(record, value)?;
            tracing::debug!(flag = %field.long, "applied command-line value");
            set.insert(field.long.clone());
        }
    }
    Ok(set)
}

fn read(matches: &ArgMatches, field: &Field) -> Option<FieldValue> {
    let id = field.long.as_str();
    match field.kind {
        Kind::Bool => matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .map(|b| FieldValue::Bool(*b)),
        Kind::Str => matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(|s| FieldValue::Str(s.clone())),
        Kind::Int => matches
            .try_get_one::<i64>(id)
            .ok()
            .flatten()
            .map(|i| FieldValue::Int(*i)),
        Kind::Uint => matches
            .try_get_one::<u64>(id)
            .ok()
            .flatten()
            .map(|u| FieldValue::Uint(*u)),
        Kind::List => matches
            .try_get_many::<String>(id)
            .ok()
            .flatten()
            .map(|items| FieldValue::List(items.cloned().collect())),
        Kind::Unsupported => None,
    }
}

/// The positional arguments after the command (or program) name.
pub fn positional(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>(ARGS_ID)
        .ok()
        .flatten()
        .map(|items| items.cloned().collect())
        .unwrap_or_default()
}
