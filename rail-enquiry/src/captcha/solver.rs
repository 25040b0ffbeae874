//! Turning a captcha image into its numeric answer.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::error::CaptchaError;
use super::expr::evaluate;
use super::recognizer::TextRecognizer;

/// How often, and how patiently, to retry an unreadable captcha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Factor applied to the delay after every attempt.
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            ..Self::default()
        }
    }

    /// Never wait between attempts (for tests).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.saturating_pow(exponent);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2,
            max_backoff: Duration::from_secs(8),
        }
    }
}

/// Replace glyphs OCR commonly confuses with arithmetic symbols and digits,
/// and keep only the part before `=`.
pub fn normalize_challenge(text: &str) -> String {
    let before_equals = text.split('=').next().unwrap_or_default();
    before_equals
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'x' | 'X' | '×' => '*',
            '÷' => '/',
            'O' | 'o' => '0',
            'l' | 'I' | '|' => '1',
            'S' => '5',
            other => other,
        })
        .collect()
}

/// Derive the numeric answer from recognised captcha text like `"7+5="`.
pub fn answer_from_text(text: &str) -> Result<i64, CaptchaError> {
    let challenge = normalize_challenge(text);
    evaluate(&challenge).map_err(|source| CaptchaError::Expression {
        text: text.trim().to_string(),
        source,
    })
}

/// Decodes captcha images and reads their answer.
#[derive(Clone)]
pub struct CaptchaSolver {
    recognizer: Arc<dyn TextRecognizer>,
}

impl CaptchaSolver {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Solve one captcha from its raw image bytes.
    pub fn solve(&self, bytes: &[u8]) -> Result<i64, CaptchaError> {
        let image = image::load_from_memory(bytes)?;
        let text = self.recognizer.recognize(&image)?;
        let answer = answer_from_text(&text)?;
        debug!(text = %text.trim(), answer, "solved captcha");
        Ok(answer)
    }
}

impl std::fmt::Debug for CaptchaSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptchaSolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _image: &DynamicImage) -> Result<String, CaptchaError> {
            Ok(self.0.to_string())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_luma8(8, 8)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn answer_is_derived_from_text_before_equals() {
        assert_eq!(answer_from_text("7+5=").unwrap(), 12);
        assert_eq!(answer_from_text("7 + 5 = ?\n").unwrap(), 12);
        assert_eq!(answer_from_text("9-4").unwrap(), 5);
    }

    #[test]
    fn ocr_confusions_are_normalised() {
        assert_eq!(normalize_challenge("3 x 4 ="), "3*4");
        assert_eq!(normalize_challenge("1O+S="), "10+5");
        assert_eq!(normalize_challenge("l2÷3"), "12/3");
        assert_eq!(answer_from_text("3 X 4 =").unwrap(), 12);
    }

    #[test]
    fn unreadable_text_is_expression_error() {
        let err = answer_from_text("&%$=").unwrap_err();
        assert!(matches!(err, CaptchaError::Expression { .. }));
        assert!(answer_from_text("").is_err());
    }

    #[test]
    fn solver_reads_answer_from_image() {
        let solver = CaptchaSolver::new(Arc::new(FixedText("7+5=")));
        assert_eq!(solver.solve(&png_bytes()).unwrap(), 12);
    }

    #[test]
    fn solver_rejects_non_image() {
        let solver = CaptchaSolver::new(Arc::new(FixedText("7+5=")));
        let err = solver.solve(b"<html>Service unavailable</html>").unwrap_err();
        assert!(matches!(err, CaptchaError::Image(_)));
    }

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2,
            max_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(500));
        assert_eq!(policy.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(2), Duration::ZERO);
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
    }
}
