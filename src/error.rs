// ABOUTME: Error types for the scanning/parsing/evaluation pipeline

use crate::token::Token;
use thiserror::Error;

/// A runtime error, carrying enough context to report `<message>\n[line L]`.
///
/// Runtime errors are the only failure kind modeled as a `thiserror`
/// type: they're the only one that propagates through `?` across
/// interpreter call frames. Lexical and syntax errors are reported
/// straight to the `Diagnostics` sink at the point of failure instead.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            message: message.into(),
        }
    }
}

/// A parser failure. The diagnostic has already been reported to the
/// sink at the raise site; this marker just unwinds the current grammar
/// production so the parser can synchronize and keep going.
#[derive(Debug, Clone, Copy)]
pub struct ParseError;
