// ABOUTME: Error types for the template function library
// ABOUTME: Covers numeric operand failures, integer parsing, include lookups and auxiliary helpers

use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("{op}: unsupported operand type {found}")]
    UnsupportedOperand { op: &'static str, found: String },

    #[error("modulo: unsupported operand type for modulo ({found})")]
    UnsupportedModuloOperand { found: String },

    #[error("{op}: integer divide by zero")]
    IntegerDivideByZero { op: &'static str },

    #[error("parseInt: parse failure for {input:?}: {source}")]
    ParseFailure {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{function}: missing required argument '{argument}'")]
    MissingArgument {
        function: &'static str,
        argument: &'static str,
    },

    #[error("Issue running command: {output}")]
    Shell { output: String },

    #[error("Issue marshaling yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Failures of the `include` function.
///
/// `Render` carries the nested engine error untouched so callers can
/// propagate it as-is.
#[derive(Error, Debug)]
pub enum IncludeError<E> {
    #[error("include accepts at most one context value, got {count}")]
    InvalidArity { count: usize },

    #[error("no such template '{name}'")]
    NoSuchTemplate { name: String },

    #[error("{0}")]
    Render(E),
}

pub type Result<T> = std::result::Result<T, FunctionError>;
