// buildrelay-filter/src/lexer.rs
// ============================================================================
// Module: Filter Lexer
// Description: Byte-level tokenizer for the filter expression language.
// Purpose: Turn expression text into spanned tokens for the parser.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! The lexer produces spanned tokens so every later diagnostic can point at
//! a byte offset in the original expression. String literals accept single
//! or double quotes and carry no escape sequences.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::CompileError;

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Lexer token produced from the expression input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Identifier token.
    Ident(&'a str),
    /// String literal without its quotes.
    Str(&'a str),
    /// Logical AND operator (`&&`).
    And,
    /// Logical OR operator (`||`).
    Or,
    /// Logical NOT operator (`!`).
    Not,
    /// Equality operator (`==`).
    EqEq,
    /// Inequality operator (`!=`).
    NotEq,
    /// Membership keyword (`in`).
    In,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Path separator (`.`).
    Dot,
    /// Left bracket.
    LBracket,
    /// Right bracket.
    RBracket,
    /// End-of-input marker.
    Eof,
}

impl Token<'_> {
    /// Formats the token for diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => (*name).to_string(),
            Self::Str(text) => format!("\"{text}\""),
            Self::And => "&&".to_string(),
            Self::Or => "||".to_string(),
            Self::Not => "!".to_string(),
            Self::EqEq => "==".to_string(),
            Self::NotEq => "!=".to_string(),
            Self::In => "in".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Dot => ".".to_string(),
            Self::LBracket => "[".to_string(),
            Self::RBracket => "]".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Token paired with its byte offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpannedToken<'a> {
    /// Token value.
    pub(crate) token: Token<'a>,
    /// Byte offset into the input.
    pub(crate) position: usize,
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer for the filter expression language.
pub(crate) struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub(crate) const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    pub(crate) fn lex(&mut self) -> Result<Vec<SpannedToken<'a>>, CompileError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while self.offset < bytes.len() {
            let ch = bytes[self.offset];
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => {
                    tokens.push(self.simple(Token::LParen));
                    self.offset += 1;
                }
                b')' => {
                    tokens.push(self.simple(Token::RParen));
                    self.offset += 1;
                }
                b'[' => {
                    tokens.push(self.simple(Token::LBracket));
                    self.offset += 1;
                }
                b']' => {
                    tokens.push(self.simple(Token::RBracket));
                    self.offset += 1;
                }
                b'.' => {
                    tokens.push(self.simple(Token::Dot));
                    self.offset += 1;
                }
                b'!' => {
                    if self.peek(bytes) == Some(b'=') {
                        tokens.push(self.simple(Token::NotEq));
                        self.offset += 2;
                    } else {
                        tokens.push(self.simple(Token::Not));
                        self.offset += 1;
                    }
                }
                b'=' => {
                    if self.peek(bytes) == Some(b'=') {
                        tokens.push(self.simple(Token::EqEq));
                        self.offset += 2;
                    } else {
                        return Err(CompileError::UnexpectedToken {
                            expected: "==",
                            found: "=".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'&' => {
                    if self.peek(bytes) == Some(b'&') {
                        tokens.push(self.simple(Token::And));
                        self.offset += 2;
                    } else {
                        return Err(CompileError::UnexpectedToken {
                            expected: "&&",
                            found: "&".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'|' => {
                    if self.peek(bytes) == Some(b'|') {
                        tokens.push(self.simple(Token::Or));
                        self.offset += 2;
                    } else {
                        return Err(CompileError::UnexpectedToken {
                            expected: "||",
                            found: "|".to_string(),
                            position: self.offset,
                        });
                    }
                }
                b'"' | b'\'' => {
                    tokens.push(self.lex_string(bytes, ch)?);
                }
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                    let start = self.offset;
                    self.consume_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_');
                    let slice = &self.input[start .. self.offset];
                    let token = if slice == "in" { Token::In } else { Token::Ident(slice) };
                    tokens.push(SpannedToken {
                        token,
                        position: start,
                    });
                }
                _ => {
                    return Err(CompileError::UnexpectedToken {
                        expected: "identifier, literal, or operator",
                        found: char::from(ch).to_string(),
                        position: self.offset,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(CompileError::EmptyExpression);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Lexes a quoted string literal.
    fn lex_string(&mut self, bytes: &[u8], quote: u8) -> Result<SpannedToken<'a>, CompileError> {
        let start = self.offset;
        self.offset += 1;
        let content_start = self.offset;
        while let Some(&b) = bytes.get(self.offset) {
            if b == quote {
                let slice = &self.input[content_start .. self.offset];
                self.offset += 1;
                return Ok(SpannedToken {
                    token: Token::Str(slice),
                    position: start,
                });
            }
            self.offset += 1;
        }
        Err(CompileError::UnterminatedString {
            position: start,
        })
    }

    /// Builds a token at the current offset.
    const fn simple(&self, token: Token<'a>) -> SpannedToken<'a> {
        SpannedToken {
            token,
            position: self.offset,
        }
    }

    /// Returns the next byte without advancing.
    fn peek(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }
}
