//! Integer arithmetic expressions read off captcha images.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | atom
//! atom   := INT | '(' expr ')'
//! ```
//!
//! Whitespace is ignored. Arithmetic is checked; division must be exact.
//! Nesting of `-` and parentheses is limited to [`MAX_DEPTH`] levels.

/// Deepest nesting of unary minus and parentheses accepted.
pub const MAX_DEPTH: usize = 128;

/// Errors from tokenising or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {ch:?} at {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at {offset}")]
    UnexpectedToken { offset: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{lhs} is not divisible by {rhs}")]
    InexactDivision { lhs: i64, rhs: i64 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("expression nested more than {MAX_DEPTH} levels deep")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Int(i64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::Open,
            ')' => Token::Close,
            c if c.is_ascii_digit() => {
                let mut value = i64::from(c as u8 - b'0');
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    chars.next();
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(d as u8 - b'0')))
                        .ok_or(ExprError::Overflow)?;
                }
                Token::Int(value)
            }
            ch => return Err(ExprError::UnexpectedChar { ch, offset }),
        };
        tokens.push((token, offset));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, o)| *o).unwrap_or_default()
    }

    fn expr(&mut self) -> Result<i64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or(ExprError::Overflow)?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or(ExprError::Overflow)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<i64, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.unary()?;
                    value = value.checked_mul(rhs).ok_or(ExprError::Overflow)?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.unary()?;
                    value = divide(value, rhs)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<i64, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let value = if self.peek() == Some(Token::Minus) {
            self.advance();
            self.unary()
                .and_then(|v| v.checked_neg().ok_or(ExprError::Overflow))
        } else {
            self.atom()
        };
        self.depth -= 1;
        value
    }

    fn atom(&mut self) -> Result<i64, ExprError> {
        let offset = self.offset();
        match self.advance() {
            Some(Token::Int(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    Some(_) => Err(ExprError::UnexpectedToken {
                        offset: self.tokens[self.pos - 1].1,
                    }),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ExprError::UnexpectedToken { offset }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn divide(lhs: i64, rhs: i64) -> Result<i64, ExprError> {
    if rhs == 0 {
        return Err(ExprError::DivisionByZero);
    }
    if lhs.checked_rem(rhs).ok_or(ExprError::Overflow)? != 0 {
        return Err(ExprError::InexactDivision { lhs, rhs });
    }
    lhs.checked_div(rhs).ok_or(ExprError::Overflow)
}

/// Evaluate an integer arithmetic expression.
///
/// ```
/// use rail_enquiry::captcha::evaluate;
///
/// assert_eq!(evaluate("7+5").unwrap(), 12);
/// assert_eq!(evaluate("2 * (3 - 1)").unwrap(), 4);
/// assert!(evaluate("7+").is_err());
/// ```
pub fn evaluate(input: &str) -> Result<i64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if parser.pos < parser.tokens.len() {
        return Err(ExprError::UnexpectedToken {
            offset: parser.offset(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sums() {
        assert_eq!(evaluate("7+5"), Ok(12));
        assert_eq!(evaluate("12 - 30"), Ok(-18));
        assert_eq!(evaluate("6*7"), Ok(42));
        assert_eq!(evaluate("84/2"), Ok(42));
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2+3*4"), Ok(14));
        assert_eq!(evaluate("(2+3)*4"), Ok(20));
        assert_eq!(evaluate("10-4-3"), Ok(3));
        assert_eq!(evaluate("-3+5"), Ok(2));
        assert_eq!(evaluate("--3"), Ok(3));
    }

    #[test]
    fn nesting_depth_is_limited() {
        let deep_parens = format!("{}1", "(".repeat(200_000));
        assert_eq!(evaluate(&deep_parens), Err(ExprError::TooDeep));

        let deep_minus = format!("{}1", "-".repeat(200_000));
        assert_eq!(evaluate(&deep_minus), Err(ExprError::TooDeep));

        let nested = format!("{}7{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&nested), Ok(7));
    }

    #[test]
    fn errors() {
        assert_eq!(evaluate(""), Err(ExprError::Empty));
        assert_eq!(evaluate("   "), Err(ExprError::Empty));
        assert_eq!(evaluate("7+"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("7 5"), Err(ExprError::UnexpectedToken { offset: 2 }));
        assert_eq!(
            evaluate("7?5"),
            Err(ExprError::UnexpectedChar { ch: '?', offset: 1 })
        );
        assert_eq!(evaluate("(1+2"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1/0"), Err(ExprError::DivisionByZero));
        assert_eq!(
            evaluate("7/2"),
            Err(ExprError::InexactDivision { lhs: 7, rhs: 2 })
        );
        assert_eq!(evaluate("99999999999999999999"), Err(ExprError::Overflow));
    }
}
