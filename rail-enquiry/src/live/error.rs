//! Live status payload errors.

/// Errors from tokenising or parsing a live status payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiveParseError {
    /// No `{` or `[` anywhere in the payload
    #[error("payload contains no object or array")]
    NoValue,

    #[error("unexpected character {ch:?} at {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at {offset}")]
    InvalidEscape { offset: usize },

    #[error("unexpected {found} at {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of payload")]
    UnexpectedEnd,

    /// Objects and arrays nested past the parser's limit
    #[error("value nested too deeply at {offset}")]
    TooDeep { offset: usize },

    /// The parsed value holds no train record object
    #[error("payload holds no train record")]
    NoTrainRecord,
}
