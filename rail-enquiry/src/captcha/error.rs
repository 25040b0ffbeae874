//! Captcha error types.

use super::expr::ExprError;

/// Errors from decoding, reading or answering a captcha challenge.
#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    /// The captcha bytes are not an image we can decode
    #[error("captcha image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    /// Text recognition failed
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Recognised text is not an arithmetic challenge
    #[error("captcha text {text:?} is not an expression: {source}")]
    Expression {
        text: String,
        #[source]
        source: ExprError,
    },

    /// Every attempt allowed by the retry policy failed
    #[error("captcha unsolved after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<CaptchaError>,
    },
}
