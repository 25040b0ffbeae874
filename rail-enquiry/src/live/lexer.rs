//! Tokens of the live status payload.
//!
//! The payload is JavaScript-literal-like rather than JSON: keys are often
//! bare identifiers, strings may use single quotes, and values may be bare
//! words. The lexer is pulled one token at a time so trailing script after
//! the value is never looked at.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::error::LiveParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    /// Quoted string, escapes resolved
    Str(String),
    /// Bare identifier, number or keyword
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Word(w) => write!(f, "word {w:?}"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-' | '+')
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Next token and its byte offset, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<(Token, usize)>, LiveParseError> {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }

        let Some((offset, c)) = self.chars.next() else {
            return Ok(None);
        };

        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '"' | '\'' => Token::Str(self.string(c, offset)?),
            c if is_word_char(c) => {
                let mut end = offset + c.len_utf8();
                while let Some(&(i, next)) = self.chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    self.chars.next();
                }
                Token::Word(self.input[offset..end].to_string())
            }
            ch => return Err(LiveParseError::UnexpectedChar { ch, offset }),
        };

        Ok(Some((token, offset)))
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String, LiveParseError> {
        let mut out = String::new();
        loop {
            let Some((offset, c)) = self.chars.next() else {
                return Err(LiveParseError::UnterminatedString { offset: start });
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => {
                    let Some((_, escaped)) = self.chars.next() else {
                        return Err(LiveParseError::UnterminatedString { offset: start });
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => out.push(self.unicode_escape(offset)?),
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, offset: usize) -> Result<char, LiveParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or(LiveParseError::InvalidEscape { offset })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiveParseError::InvalidEscape { offset })
    }
}
