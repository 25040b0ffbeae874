//! Captcha solving.
//!
//! The enquiry site gates queries behind an image showing a small sum such
//! as `7+5=`. We decode the image, read it with OCR, and evaluate the text
//! before the `=` with a tiny expression grammar.

mod error;
mod expr;
mod recognizer;
mod solver;

pub use error::CaptchaError;
pub use expr::{ExprError, evaluate};
pub use recognizer::{OarTextRecognizer, TesseractCli, TextRecognizer, load_character_dict};
pub use solver::{CaptchaSolver, RetryPolicy, answer_from_text, normalize_challenge};
