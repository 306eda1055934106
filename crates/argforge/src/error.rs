use std::fmt;
use thiserror::Error;

use crate::spec::{Cardinality, ValueKind};

/// Relation kinds between arguments, as named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Requires,
    RequiredBy,
    ConflictsWith,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requires => "requires",
            Self::RequiredBy => "required-by",
            Self::ConflictsWith => "conflicts-with",
        })
    }
}

/// Errors raised while registering arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("argument '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("argument '{name}': min-args {min} is greater than max-args {max}")]
    InvalidCardinality { name: String, min: usize, max: usize },

    #[error("argument '{name}': choices must not be empty")]
    EmptyChoices { name: String },

    #[error("schema error: '{name}' {relation} unknown argument '{other}'")]
    UnknownRelation {
        name: String,
        relation: Relation,
        other: String,
    },
}

/// Errors raised by a render call. No output is produced when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unknown argument '{name}'")]
    UnknownArgument { name: String },

    #[error("argument '{name}' requires '{dependency}', which was not supplied and has no default")]
    MissingDependency { name: String, dependency: String },

    #[error("argument '{name}' cannot be used with '{other}'")]
    ConflictingArguments { name: String, other: String },

    #[error("missing mandatory argument '{name}': no value supplied and no default")]
    MissingMandatory { name: String },

    #[error("argument '{name}' expects {expected} value(s), got {got}")]
    CardinalityViolation {
        name: String,
        got: usize,
        expected: Cardinality,
    },

    #[error(
        "invalid value '{value}' for '{name}'. possible values: {}",
        choices.join(", ")
    )]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("invalid value '{value}' for '{name}': expected {expected}")]
    InvalidType {
        name: String,
        value: String,
        expected: ValueKind,
    },
}

impl RenderError {
    /// Name of the argument the error is reported against.
    pub fn argument(&self) -> &str {
        match self {
            Self::UnknownArgument { name }
            | Self::MissingDependency { name, .. }
            | Self::ConflictingArguments { name, .. }
            | Self::MissingMandatory { name }
            | Self::CardinalityViolation { name, .. }
            | Self::InvalidChoice { name, .. }
            | Self::InvalidType { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_constraint() {
        let err = RenderError::InvalidChoice {
            name: "level".to_string(),
            value: "mid".to_string(),
            choices: vec!["low".to_string(), "high".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'mid' for 'level'. possible values: low, high"
        );

        let err = RenderError::CardinalityViolation {
            name: "files".to_string(),
            got: 3,
            expected: Cardinality::new(1, Some(2)),
        };
        assert_eq!(err.to_string(), "argument 'files' expects 1..=2 value(s), got 3");
        assert_eq!(err.argument(), "files");
    }

    #[test]
    fn relation_display() {
        let err = ConfigError::UnknownRelation {
            name: "a".to_string(),
            relation: Relation::ConflictsWith,
            other: "zz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "schema error: 'a' conflicts-with unknown argument 'zz'"
        );
    }
}
