//! Lenient value parser for the live status payload.
//!
//! ```text
//! value  := object | array | STRING | WORD
//! object := '{' (key ':' value (',' key ':' value)* ','?)? '}'
//! array  := '[' (value (',' value)* ','?)? ']'
//! key    := STRING | WORD
//! ```
//!
//! Bare words become booleans, nulls or numbers when they spell one and
//! strings otherwise. Objects and arrays nest at most [`MAX_DEPTH`] deep.

use serde_json::{Map, Number, Value};

use super::error::LiveParseError;
use super::lexer::{Lexer, Token};

/// Deepest nesting of objects and arrays accepted.
pub const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<(Token, usize)>,
    /// Offset added to every reported position.
    base: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Result<(Token, usize), LiveParseError> {
        if let Some(spanned) = self.peeked.take() {
            return Ok(spanned);
        }
        match self.lexer.next_token().map_err(|e| self.rebase(e))? {
            Some((token, offset)) => Ok((token, offset + self.base)),
            None => Err(LiveParseError::UnexpectedEnd),
        }
    }

    fn peek(&mut self) -> Result<&Token, LiveParseError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next()?);
        }
        match &self.peeked {
            Some((token, _)) => Ok(token),
            None => Err(LiveParseError::UnexpectedEnd),
        }
    }

    fn rebase(&self, err: LiveParseError) -> LiveParseError {
        match err {
            LiveParseError::UnexpectedChar { ch, offset } => LiveParseError::UnexpectedChar {
                ch,
                offset: offset + self.base,
            },
            LiveParseError::UnterminatedString { offset } => LiveParseError::UnterminatedString {
                offset: offset + self.base,
            },
            LiveParseError::InvalidEscape { offset } => LiveParseError::InvalidEscape {
                offset: offset + self.base,
            },
            other => other,
        }
    }

    fn value(&mut self) -> Result<Value, LiveParseError> {
        let (token, offset) = self.next()?;
        match token {
            Token::LBrace => self.nested(offset, Self::object),
            Token::LBracket => self.nested(offset, Self::array),
            Token::Str(s) => Ok(Value::String(s)),
            Token::Word(w) => Ok(word_value(w)),
            other => Err(unexpected(&other, offset)),
        }
    }

    /// Parse the body of a container opened at `offset`.
    fn nested(
        &mut self,
        offset: usize,
        body: fn(&mut Self) -> Result<Value, LiveParseError>,
    ) -> Result<Value, LiveParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(LiveParseError::TooDeep { offset });
        }
        self.depth += 1;
        let value = body(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, LiveParseError> {
        let mut map = Map::new();
        loop {
            let (token, offset) = self.next()?;
            let key = match token {
                Token::RBrace => return Ok(Value::Object(map)),
                Token::Str(s) | Token::Word(s) => s,
                other => return Err(unexpected(&other, offset)),
            };

            match self.next()? {
                (Token::Colon, _) => {}
                (other, offset) => return Err(unexpected(&other, offset)),
            }

            let value = self.value()?;
            map.insert(key, value);

            match self.next()? {
                (Token::Comma, _) => {}
                (Token::RBrace, _) => return Ok(Value::Object(map)),
                (other, offset) => return Err(unexpected(&other, offset)),
            }
        }
    }

    fn array(&mut self) -> Result<Value, LiveParseError> {
        let mut items = Vec::new();
        loop {
            if *self.peek()? == Token::RBracket {
                self.next()?;
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            match self.next()? {
                (Token::Comma, _) => {}
                (Token::RBracket, _) => return Ok(Value::Array(items)),
                (other, offset) => return Err(unexpected(&other, offset)),
            }
        }
    }
}

fn unexpected(token: &Token, offset: usize) -> LiveParseError {
    LiveParseError::UnexpectedToken {
        found: token.to_string(),
        offset,
    }
}

fn word_value(word: String) -> Value {
    match word.as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "undefined" => return Value::Null,
        _ => {}
    }

    if let Ok(n) = word.parse::<i64>() {
        return Value::Number(n.into());
    }

    let looks_numeric = word
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if looks_numeric
        && let Ok(f) = word.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        return Value::Number(n);
    }

    Value::String(word)
}

/// Parse one value from a complete payload.
pub fn parse_value(input: &str) -> Result<Value, LiveParseError> {
    let mut parser = Parser {
        lexer: Lexer::new(input),
        peeked: None,
        base: 0,
        depth: 0,
    };
    parser.value()
}

/// Parse the first object or array embedded in a payload, ignoring any
/// script text before or after it.
pub fn parse_embedded(payload: &str) -> Result<Value, LiveParseError> {
    let start = payload
        .find(['{', '['])
        .ok_or(LiveParseError::NoValue)?;

    let mut parser = Parser {
        lexer: Lexer::new(&payload[start..]),
        peeked: None,
        base: start,
        depth: 0,
    };
    parser.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_strict_json() {
        let value = parse_value(r#"{"a": [1, 2.5, "x"], "b": {"c": null, "d": true}}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2.5, "x"], "b": {"c": null, "d": true}}));
    }

    #[test]
    fn parses_bare_keys_single_quotes_and_trailing_commas() {
        let value = parse_value("{trainNo: '12301', late: 5, stations: [{stnCode: NDLS,},],}").unwrap();
        assert_eq!(
            value,
            json!({"trainNo": "12301", "late": 5, "stations": [{"stnCode": "NDLS"}]})
        );
    }

    #[test]
    fn nesting_depth_is_limited() {
        assert_eq!(
            parse_embedded(&"[".repeat(200_000)),
            Err(LiveParseError::TooDeep { offset: MAX_DEPTH })
        );
        assert_eq!(
            parse_embedded(&format!("var d = {}", "{a:".repeat(200_000))),
            Err(LiveParseError::TooDeep {
                offset: 8 + 3 * MAX_DEPTH
            })
        );

        let deepest = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_value(&deepest).is_ok());
    }

    #[test]
    fn bare_words() {
        assert_eq!(parse_value("undefined").unwrap(), Value::Null);
        assert_eq!(parse_value("-12").unwrap(), json!(-12));
        assert_eq!(parse_value("1.5e3").unwrap(), json!(1500.0));
        assert_eq!(parse_value("ON-TIME").unwrap(), json!("ON-TIME"));
        assert_eq!(parse_value("08-Mar-2024").unwrap(), json!("08-Mar-2024"));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(parse_value("[]").unwrap(), json!([]));
        assert_eq!(parse_value("{ }").unwrap(), json!({}));
    }

    #[test]
    fn embedded_value_ignores_surrounding_script() {
        let payload = "var trainData = [{trainNo:\"12301\"}];\nshowData();";
        let value = parse_embedded(payload).unwrap();
        assert_eq!(value, json!([{"trainNo": "12301"}]));
    }

    #[test]
    fn errors_carry_positions() {
        assert_eq!(parse_embedded("no data"), Err(LiveParseError::NoValue));
        assert_eq!(parse_value("[1, 2"), Err(LiveParseError::UnexpectedEnd));
        assert_eq!(
            parse_value("{a 1}"),
            Err(LiveParseError::UnexpectedToken {
                found: "word \"1\"".into(),
                offset: 3,
            })
        );
        assert_eq!(
            parse_embedded("x = {a: ;}"),
            Err(LiveParseError::UnexpectedChar { ch: ';', offset: 8 })
        );
        assert!(matches!(
            parse_value("[,]"),
            Err(LiveParseError::UnexpectedToken { offset: 1, .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| Value::from(i64::from(n))),
            "[a-zA-Z0-9 :/-]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_]{0,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Anything serde_json writes, we read back unchanged.
        #[test]
        fn accepts_json(value in json_value()) {
            let text = serde_json::to_string(&value).unwrap();
            prop_assert_eq!(parse_value(&text).unwrap(), value);
        }

        #[test]
        fn never_panics(s in "[\\[\\]{}:,'\" a-z0-9\\\\]{0,32}") {
            let _ = parse_embedded(&s);
        }
    }
}
