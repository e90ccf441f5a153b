use std::sync::Arc;

use riskbird_http::{HttpError, RequestTransport};
use serde::Serialize;
use tracing::instrument;

use crate::MODIFY_USER_BALANCE_PATH;

/// Sends balance changes to the backend.
///
/// The documented body is [`BalanceUpdateRequest`], but any serializable
/// value is accepted and forwarded as-is.
///
/// [`BalanceUpdateRequest`]: riskbird_user_sdk::BalanceUpdateRequest
#[derive(Clone)]
pub struct BalanceUpdateClient {
    transport: Arc<dyn RequestTransport>,
}

impl BalanceUpdateClient {
    #[must_use]
    pub fn new(transport: Arc<dyn RequestTransport>) -> Self {
        Self { transport }
    }

    /// POST `request` to `/riskbird/user/modifyUserBalance`.
    ///
    /// # Errors
    /// `HttpError::Json` if `request` cannot be serialized; otherwise
    /// whatever the transport returns.
    #[instrument(skip_all, fields(path = MODIFY_USER_BALANCE_PATH))]
    pub async fn modify_user_balance<B>(&self, request: B) -> Result<serde_json::Value, HttpError>
    where
        B: Serialize + Send,
    {
        let body = serde_json::to_value(&request)?;
        self.transport
            .post_json(MODIFY_USER_BALANCE_PATH, body)
            .await
    }
}
