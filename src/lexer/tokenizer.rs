use crate::error::{EngineError, Result};
use crate::lexer::span::Span;
use crate::lexer::token::{Token, TokenKind};
use crate::value::{self, Value};

/// Scans an expression string into a stream of tokens. Holds the input plus the
/// byte offsets of the token currently being scanned. No comments, no blob
/// literals, no quoted identifiers, and no exponent notation in numbers.
pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    start: usize,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            start: 0,
            pos: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(b) = self.peek() else {
            return Ok(self.make(TokenKind::Eof));
        };

        if b.is_ascii_digit() {
            return self.scan_number();
        }
        if b == b'"' {
            return self.scan_string();
        }
        if b == b'_' || b.is_ascii_alphabetic() {
            return self.scan_identifier_or_keyword();
        }

        self.advance();
        let kind = match b {
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Le
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Ne
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'=' => TokenKind::Eq,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            other => {
                return Err(EngineError::Parsing(format!(
                    "unexpected character `{}`",
                    other as char
                )))
            }
        };
        Ok(self.make(kind))
    }

    fn scan_number(&mut self) -> Result<Token> {
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(b) if b.is_ascii_digit())
        {
            self.advance();
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.advance();
            }
        }
        let lexeme = self.lexeme();
        let value = match value::lexeme_to_value(lexeme) {
            v @ (Value::Integer(_) | Value::Floating(_)) => v,
            Value::Text(_) => {
                return Err(EngineError::NumberFormat(lexeme.to_string()));
            }
        };
        Ok(self.make(TokenKind::Number(value)))
    }

    fn scan_string(&mut self) -> Result<Token> {
        self.advance(); // opening quote
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(_) => continue,
                None => {
                    return Err(EngineError::Parsing(
                        "unterminated string literal".to_string(),
                    ))
                }
            }
        }
        let content = &self.input[self.start + 1..self.pos - 1];
        Ok(self.make(TokenKind::String(content.to_string())))
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<Token> {
        while matches!(self.peek(), Some(b) if b == b'_' || b.is_ascii_alphanumeric()) {
            self.advance();
        }
        let lexeme = self.lexeme();
        let kind = match lexeme.to_ascii_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => TokenKind::Identifier(lexeme.to_string()),
        };
        Ok(self.make(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input_yields_eof() {
        let kinds = kinds("");
        assert_eq!(kinds.len(), 1);
        assert!(matches!(kinds[0], TokenKind::Eof));
    }

    #[test]
    fn scans_integer_and_float() {
        let kinds = kinds("42 3.5");
        assert!(matches!(&kinds[0], TokenKind::Number(Value::Integer(42))));
        assert!(matches!(&kinds[1], TokenKind::Number(Value::Floating(v)) if *v == 3.5));
    }

    #[test]
    fn rejects_exponent_syntax() {
        // '1e6' tokenizes as identifier-like? no: '1' then scan_number stops at digits,
        // leaving 'e6' as a separate identifier token — exponent syntax is simply not
        // special-cased.
        let result = Tokenizer::new("1e6").tokenize().unwrap();
        assert!(matches!(result[0].kind, TokenKind::Number(Value::Integer(1))));
        assert!(matches!(&result[1].kind, TokenKind::Identifier(s) if s == "e6"));
    }

    #[test]
    fn scans_string_literal_without_escapes() {
        let kinds = kinds("\"hello world\"");
        assert!(matches!(&kinds[0], TokenKind::String(s) if s == "hello world"));
    }

    #[test]
    fn scans_identifiers_and_keywords_case_insensitively() {
        let kinds = kinds("budget AND zipCode or Or");
        assert!(matches!(&kinds[0], TokenKind::Identifier(s) if s == "budget"));
        assert!(matches!(kinds[1], TokenKind::And));
        assert!(matches!(&kinds[2], TokenKind::Identifier(s) if s == "zipCode"));
        assert!(matches!(kinds[3], TokenKind::Or));
        assert!(matches!(kinds[4], TokenKind::Or));
    }

    #[test]
    fn scans_operators_longest_match_first() {
        let kinds = kinds("<= >= <> = < > + - * / ( ) ,");
        let expected = [
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Ne,
            TokenKind::Eq,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Comma,
        ];
        for (actual, expect) in kinds.iter().zip(expected.iter()) {
            assert_eq!(
                std::mem::discriminant(actual),
                std::mem::discriminant(expect)
            );
        }
    }

    #[test]
    fn tracks_span_offsets() {
        let tokens = Tokenizer::new("  budget").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(2, 8));
    }
}
