//! Enquiry client error types.

use crate::captcha::CaptchaError;
use crate::live::LiveParseError;
use crate::reference::ReferenceError;

/// Errors from the enquiry client.
#[derive(Debug, thiserror::Error)]
pub enum EnquiryError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Site returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body is not JSON
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response is JSON but carries neither a result nor an error message
    #[error("malformed {page} response: {reason}")]
    MalformedResponse { page: &'static str, reason: String },

    /// The site rejected the enquiry with a message of its own
    #[error("enquiry rejected: {message}")]
    Upstream { message: String },

    /// The session was still reported expired after renewing it
    #[error("session expired and could not be renewed")]
    SessionExpired,

    /// A query parameter was neither given nor configured as a default
    #[error("missing {0}: pass it explicitly or configure a default")]
    MissingParameter(&'static str),

    /// Train number is not in the train reference list
    #[error("unknown train {0}")]
    UnknownTrain(String),

    /// No station could be resolved (the station list is empty)
    #[error("unknown station {0:?}")]
    UnknownStation(String),

    /// Caller passed something we can't send
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Captcha(#[from] CaptchaError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("live status payload: {0}")]
    LiveStatus(#[from] LiveParseError),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {body})"),
        None => String::new(),
    }
}

impl EnquiryError {
    /// Build a JSON error keeping at most 500 characters of the body.
    pub(crate) fn json(err: &serde_json::Error, body: &str) -> Self {
        EnquiryError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }

    /// Build a JSON error for a record that parsed but has the wrong shape.
    pub(crate) fn shape(err: serde_json::Error) -> Self {
        EnquiryError::Json {
            message: err.to_string(),
            body: None,
        }
    }
}
