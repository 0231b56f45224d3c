// ABOUTME: The diagnostic sink tracking syntax/runtime error state
// An explicit struct threaded by `&mut` reference into the scanner,
// parser, and interpreter rather than a module-level singleton, so the
// REPL can own one sink per session and reset just the syntax-error
// flag between lines.

use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};

#[derive(Debug, Default)]
pub struct Diagnostics {
    pub had_syntax_error: bool,
    pub had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Reports a lexical or otherwise line-anchored syntax error.
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Reports a parser error anchored at a specific token.
    pub fn error_at(&mut self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn report(&mut self, line: usize, where_: &str, message: &str) {
        eprintln!("[line {line}] Error{where_}: {message}");
        self.had_syntax_error = true;
    }

    /// Reports a runtime error that unwound to the top of `interpret`.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error = true;
    }

    /// The REPL clears the syntax-error flag between lines so a typo
    /// doesn't poison subsequent input; the runtime-error flag is left
    /// alone, matching spec: the REPL continues regardless.
    pub fn reset_syntax_error(&mut self) {
        self.had_syntax_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Literal;

    #[test]
    fn error_sets_syntax_flag_only() {
        let mut d = Diagnostics::new();
        d.error(3, "Unexpected character '@'.");
        assert!(d.had_syntax_error);
        assert!(!d.had_runtime_error);
    }

    #[test]
    fn error_at_eof_reports_at_end() {
        let mut d = Diagnostics::new();
        let eof = Token::eof(5);
        d.error_at(&eof, "Expect expression.");
        assert!(d.had_syntax_error);
    }

    #[test]
    fn runtime_error_sets_runtime_flag_only() {
        let mut d = Diagnostics::new();
        let token = Token::new(TokenKind::Plus, "+", Literal::Nil, 1);
        let err = RuntimeError::new(token, "Operands must be a number.");
        d.runtime_error(&err);
        assert!(d.had_runtime_error);
        assert!(!d.had_syntax_error);
    }

    #[test]
    fn reset_syntax_error_leaves_runtime_flag() {
        let mut d = Diagnostics::new();
        d.had_syntax_error = true;
        d.had_runtime_error = true;
        d.reset_syntax_error();
        assert!(!d.had_syntax_error);
        assert!(d.had_runtime_error);
    }
}
