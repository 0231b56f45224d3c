// ABOUTME: Scanner module turning source text into a token stream

use crate::diagnostics::Diagnostics;
use crate::token::{keyword, Literal, Token, TokenKind};

pub struct Scanner<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, diagnostics: &'a mut Diagnostics) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            diagnostics,
        }
    }

    /// Scans the whole source, always terminating with an `EOF` token.
    /// Scanning never stops early on an error so the caller can see
    /// every lexical error in one pass.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::eof(self.line));
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_literal(kind, Literal::Nil);
    }

    fn add_token_literal(&mut self, kind: TokenKind, literal: Literal) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn scan_token(&mut self) {
        use TokenKind::*;

        let c = self.advance();
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '%' => self.add_token(Percent),
            '!' => {
                let kind = if self.matches('=') { BangEqual } else { Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { EqualEqual } else { Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { LessEqual } else { Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { GreaterEqual } else { Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            other => {
                self.diagnostics
                    .error(self.line, &format!("Unexpected character '{other}'."));
            }
        }
    }

    fn string(&mut self) {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.error(start_line, "Unterminated string.");
            return;
        }

        // Consume the closing quote.
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.add_token_literal(TokenKind::String, Literal::String(value));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned digits must parse as f64");
        self.add_token_literal(TokenKind::Number, Literal::Number(value));
    }

    fn identifier(&mut self) {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        match keyword(&text) {
            Some(TokenKind::True) => self.add_token_literal(TokenKind::True, Literal::Bool(true)),
            Some(TokenKind::False) => {
                self.add_token_literal(TokenKind::False, Literal::Bool(false))
            }
            Some(TokenKind::Nil) => self.add_token_literal(TokenKind::Nil, Literal::Nil),
            Some(kind) => self.add_token(kind),
            None => self.add_token(TokenKind::Identifier),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> (Vec<Token>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = {
            let scanner = Scanner::new(src, &mut diagnostics);
            scanner.scan_tokens()
        };
        (tokens, diagnostics)
    }

    #[test]
    fn ends_with_single_eof() {
        let (tokens, _) = scan("1 + 2");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn lexeme_is_exact_source_slice() {
        let (tokens, _) = scan("foobar");
        assert_eq!(tokens[0].lexeme, "foobar");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn compound_operators_are_single_tokens() {
        let (tokens, _) = scan("!= == <= >=");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_with_fraction() {
        let (tokens, _) = scan("3.14");
        assert_eq!(tokens[0].literal, Literal::Number(3.14));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let (tokens, _) = scan("42.");
        assert_eq!(tokens[0].literal, Literal::Number(42.0));
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn string_literal_strips_quotes_but_lexeme_keeps_them() {
        let (tokens, _) = scan("\"hi\"");
        assert_eq!(tokens[0].literal, Literal::String("hi".to_string()));
        assert_eq!(tokens[0].lexeme, "\"hi\"");
    }

    #[test]
    fn unterminated_string_reports_opening_line() {
        let (_, diagnostics) = scan("\"abc\ndef");
        assert!(diagnostics.had_syntax_error);
    }

    #[test]
    fn multiline_string_bumps_line_counter() {
        let (tokens, _) = scan("\"a\nb\" 1");
        // The NUMBER token after the string should be on line 2.
        let number = tokens.iter().find(|t| t.kind == TokenKind::Number).unwrap();
        assert_eq!(number.line, 2);
    }

    #[test]
    fn line_comment_is_skipped() {
        let (tokens, _) = scan("1 // a comment\n2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn keywords_recognized_with_literal_for_true_false_nil() {
        let (tokens, _) = scan("true false nil var");
        assert_eq!(tokens[0].kind, TokenKind::True);
        assert_eq!(tokens[0].literal, Literal::Bool(true));
        assert_eq!(tokens[1].kind, TokenKind::False);
        assert_eq!(tokens[1].literal, Literal::Bool(false));
        assert_eq!(tokens[2].kind, TokenKind::Nil);
        assert_eq!(tokens[2].literal, Literal::Nil);
        assert_eq!(tokens[3].kind, TokenKind::Var);
    }

    #[test]
    fn unexpected_character_reports_error_but_keeps_scanning() {
        let (tokens, diagnostics) = scan("1 @ 2");
        assert!(diagnostics.had_syntax_error);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }
}
