use thiserror::Error;

use crate::types::Kind;

#[derive(Debug, Error)]
pub enum ClapbindError {
    #[error("Command names cannot be empty")]
    EmptyCommandName,

    #[error("Command descriptions cannot be empty (command '{0}')")]
    EmptyCommandDescription(String),

    #[error("Command '{0}' is registered more than once")]
    DuplicateCommand(String),

    #[error("Command '{0}' has no action")]
    MissingAction(String),

    #[error("Config must be a struct, got {type_name}: {reason}")]
    NotARecord { type_name: String, reason: String },

    #[error("Member '{member}' has an empty long name")]
    EmptyLongName { member: String },

    #[error("Flag '{0}' is declared more than once")]
    DuplicateFlag(String),

    #[error("Invalid value for '{key}' in config file: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: Kind,
        found: String,
    },

    #[error("Malformed config document: {0}")]
    MalformedDocument(String),

    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Action can only accept parameters of type {accepted} (parameter {position} is not one of them)")]
    UnmatchedParameter { position: usize, accepted: String },

    #[error("{0}")]
    ActionFailed(String),

    #[error("Input closed while waiting for '{0}'")]
    InputClosed(String),

    #[error("No valid answer after {0} attempts")]
    RetriesExhausted(usize),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cli(#[from] clap::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_formats_correctly() {
        let err = ClapbindError::TypeMismatch {
            key: "port".into(),
            expected: Kind::Int,
            found: "string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("port"));
        assert!(msg.contains("integer"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn unmatched_parameter_lists_accepted_types() {
        let err = ClapbindError::UnmatchedParameter {
            position: 2,
            accepted: "Args, Context or Config<Opts>".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Action can only accept parameters of type Args"));
        assert!(msg.contains("parameter 2"));
    }

    #[test]
    fn action_failure_is_verbatim() {
        let err = ClapbindError::ActionFailed("remote rejected push".into());
        assert_eq!(err.to_string(), "remote rejected push");
    }

    #[test]
    fn empty_description_names_command() {
        let err = ClapbindError::EmptyCommandDescription("sync".into());
        assert!(err.to_string().contains("sync"));
    }
}
