//! Public API trait for user-account updates.

use async_trait::async_trait;
use riskbird_http::HttpError;

use crate::models::{BalanceUpdateRequest, PointUpdateRequest};

/// Balance and point updates against the admin backend.
///
/// Each call is a single POST. Requests are forwarded without validation
/// and the response body is returned as decoded JSON; use
/// [`ApiEnvelope`](crate::ApiEnvelope) to interpret it. Transport failures
/// are returned exactly as the transport reported them.
///
/// ```ignore
/// let accounts: Arc<dyn UserAccountClientV1> = Arc::new(UserAccountClient::new(transport));
/// let reply = accounts.modify_user_point(request).await?;
/// ```
#[async_trait]
pub trait UserAccountClientV1: Send + Sync {
    /// Change a user's balance via `/riskbird/user/modifyUserBalance`.
    ///
    /// # Errors
    /// Whatever the transport reports.
    async fn modify_user_balance(
        &self,
        request: BalanceUpdateRequest,
    ) -> Result<serde_json::Value, HttpError>;

    /// Change a user's points via `/riskbird/user/modifyUserPoint`.
    ///
    /// # Errors
    /// Whatever the transport reports.
    async fn modify_user_point(
        &self,
        request: PointUpdateRequest,
    ) -> Result<serde_json::Value, HttpError>;
}
