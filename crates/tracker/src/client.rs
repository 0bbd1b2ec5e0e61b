use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use verdict_common::error::RelayError;

/// Source of review-status payloads.
///
/// Implementations perform exactly one request per call and never retry; the
/// poller owns the retry policy.
pub trait ReviewSource {
    fn fetch_review_status(
        &self,
        from_date: i64,
    ) -> impl Future<Output = Result<Value, RelayError>> + Send;
}

/// HTTP client for the homework review-status API.
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("failed to build API client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReviewSource for PracticumClient {
    async fn fetch_review_status(&self, from_date: i64) -> Result<Value, RelayError> {
        let request = format!("GET {}?from_date={}", self.endpoint, from_date);

        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    RelayError::Internal(format!("cannot build request {request}: {e}"))
                } else {
                    RelayError::transport(request.clone(), e)
                }
            })?;

        // The body of a failed response is not trusted, whatever it contains.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::Unreachable {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::transport(request, e))?;

        tracing::debug!(from_date, bytes = body.len(), "Received review status payload");

        Ok(serde_json::from_str(&body)?)
    }
}
