use async_trait::async_trait;

use crate::client::HttpClient;
use crate::error::HttpError;

/// The request transport the admin adapters are written against.
///
/// One call is one POST with a JSON body; the decoded response body comes
/// back as-is and every failure is an [`HttpError`]. Implementations must
/// not retry or rewrite the body.
#[async_trait]
pub trait RequestTransport: Send + Sync {
    /// POST `body` as JSON to `path` and return the decoded response body.
    ///
    /// An empty 2xx response decodes to `Value::Null`.
    ///
    /// # Errors
    /// Any transport, status or decoding failure.
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, HttpError>;
}

#[async_trait]
impl RequestTransport for HttpClient {
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let response = self.post(path).json(&body)?.send().await?;
        let status = response.status();
        let result = response.json_or_null().await;
        match &result {
            Ok(_) => tracing::debug!(path, %status, "request completed"),
            Err(e) => tracing::debug!(path, %status, error = %e, "request failed"),
        }
        result
    }
}
