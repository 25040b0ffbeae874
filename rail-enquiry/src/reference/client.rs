//! Reference list endpoints of the enquiry site.

use chrono::Utc;

use super::error::ReferenceError;
use super::list::ReferenceKind;

/// Client for the autocomplete and train list endpoints.
#[derive(Debug, Clone)]
pub struct ReferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReferenceClient {
    /// Create a client sharing an existing HTTP client.
    ///
    /// `base_url` is the enquiry base, e.g. `http://www.indianrail.gov.in/enquiry`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the raw `"A - B"` entries of a reference list.
    pub async fn fetch_entries(&self, kind: ReferenceKind) -> Result<Vec<String>, ReferenceError> {
        let url = format!("{}/{}", self.base_url, kind.endpoint());
        let timestamp = Utc::now().timestamp_millis();

        let response = self
            .http
            .get(&url)
            .query(&[("_", timestamp.to_string())])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReferenceError::Api {
                endpoint: kind.endpoint(),
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ReferenceError::Json {
            endpoint: kind.endpoint(),
            message: e.to_string(),
        })
    }
}
