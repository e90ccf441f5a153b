use std::sync::Arc;

use riskbird_http::{HttpError, RequestTransport};
use serde::Serialize;
use tracing::instrument;

use crate::MODIFY_USER_POINT_PATH;

/// Sends point changes to the backend.
///
/// The body is opaque: [`PointUpdateRequest`], [`PointAmountChange`] or any
/// other serializable value goes on the wire exactly as it serializes.
///
/// [`PointUpdateRequest`]: riskbird_user_sdk::PointUpdateRequest
/// [`PointAmountChange`]: riskbird_user_sdk::PointAmountChange
#[derive(Clone)]
pub struct PointUpdateClient {
    transport: Arc<dyn RequestTransport>,
}

impl PointUpdateClient {
    #[must_use]
    pub fn new(transport: Arc<dyn RequestTransport>) -> Self {
        Self { transport }
    }

    /// POST `request` to `/riskbird/user/modifyUserPoint`.
    ///
    /// # Errors
    /// `HttpError::Json` if `request` cannot be serialized; otherwise
    /// whatever the transport returns.
    #[instrument(skip_all, fields(path = MODIFY_USER_POINT_PATH))]
    pub async fn modify_user_point<B>(&self, request: B) -> Result<serde_json::Value, HttpError>
    where
        B: Serialize + Send,
    {
        let body = serde_json::to_value(&request)?;
        self.transport.post_json(MODIFY_USER_POINT_PATH, body).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use riskbird_user_sdk::{PointAmountChange, PointUpdateRequest};
    use serde_json::json;

    #[tokio::test]
    async fn sends_opaque_body_verbatim() {
        let transport = RecordingTransport::replying(json!({"code": 0}));
        let client = PointUpdateClient::new(transport.clone());

        let reply = client
            .modify_user_point(PointUpdateRequest::from(json!({"userId": 1, "points": 50})))
            .await
            .unwrap();

        assert_eq!(reply, json!({"code": 0}));
        assert_eq!(
            transport.calls(),
            vec![(
                MODIFY_USER_POINT_PATH.to_owned(),
                json!({"userId": 1, "points": 50})
            )]
        );
    }

    #[tokio::test]
    async fn sends_typed_point_change() {
        let transport = RecordingTransport::replying(json!(null));
        let client = PointUpdateClient::new(transport.clone());

        client
            .modify_user_point(PointAmountChange::new("13800000000", "x", 7))
            .await
            .unwrap();

        assert_eq!(
            transport.calls()[0].1,
            json!({"phone": "13800000000", "password": "x", "pointAmount": 7})
        );
    }

    #[tokio::test]
    async fn empty_body_is_forwarded() {
        let transport = RecordingTransport::replying(json!(null));
        let client = PointUpdateClient::new(transport.clone());

        client.modify_user_point(json!({})).await.unwrap();

        assert_eq!(
            transport.calls(),
            vec![(MODIFY_USER_POINT_PATH.to_owned(), json!({}))]
        );
    }

    #[tokio::test]
    async fn transport_error_is_returned_unchanged() {
        let transport = RecordingTransport::failing(|| HttpError::HttpStatus {
            status: riskbird_http::StatusCode::BAD_GATEWAY,
            body_preview: "down".to_owned(),
            content_type: None,
        });
        let client = PointUpdateClient::new(transport.clone());

        let err = client.modify_user_point(json!({})).await.unwrap_err();

        match err {
            HttpError::HttpStatus { body_preview, .. } => assert_eq!(body_preview, "down"),
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert_eq!(transport.calls().len(), 1);
    }
}
