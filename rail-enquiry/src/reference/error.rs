//! Reference list error types.

/// Errors from downloading the station and train lists or from their
/// on-disk cache.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference list download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The list endpoint answered with a non-2xx status
    #[error("{endpoint} returned status {status}: {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// The body was not a JSON array of `"A - B"` entries
    #[error("{endpoint} did not return a list of entries: {message}")]
    Json {
        endpoint: &'static str,
        message: String,
    },

    #[error("reference list cache unusable: {message}")]
    Cache { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ReferenceError::Api {
            endpoint: "FetchAutoComplete",
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.to_string(), "FetchAutoComplete returned status 503: down");

        let err = ReferenceError::Json {
            endpoint: "FetchTrainData",
            message: "expected a sequence".into(),
        };
        assert_eq!(
            err.to_string(),
            "FetchTrainData did not return a list of entries: expected a sequence"
        );

        let err = ReferenceError::Cache {
            message: "failed to write trains.json".into(),
        };
        assert_eq!(
            err.to_string(),
            "reference list cache unusable: failed to write trains.json"
        );
    }
}
