//! [`UserAccountClientV1`] over the two adapters.

use std::sync::Arc;

use async_trait::async_trait;
use riskbird_http::{HttpError, RequestTransport};
use riskbird_user_sdk::{BalanceUpdateRequest, PointUpdateRequest, UserAccountClientV1};

use crate::balance::BalanceUpdateClient;
use crate::point::PointUpdateClient;

/// Both account operations on one shared transport.
///
/// ```ignore
/// let accounts: Arc<dyn UserAccountClientV1> =
///     Arc::new(UserAccountClient::new(Arc::new(http_client)));
/// ```
#[derive(Clone)]
pub struct UserAccountClient {
    balance: BalanceUpdateClient,
    point: PointUpdateClient,
}

impl UserAccountClient {
    #[must_use]
    pub fn new(transport: Arc<dyn RequestTransport>) -> Self {
        Self {
            balance: BalanceUpdateClient::new(Arc::clone(&transport)),
            point: PointUpdateClient::new(transport),
        }
    }

    #[must_use]
    pub fn balance(&self) -> &BalanceUpdateClient {
        &self.balance
    }

    #[must_use]
    pub fn point(&self) -> &PointUpdateClient {
        &self.point
    }
}

#[async_trait]
impl UserAccountClientV1 for UserAccountClient {
    async fn modify_user_balance(
        &self,
        request: BalanceUpdateRequest,
    ) -> Result<serde_json::Value, HttpError> {
        self.balance.modify_user_balance(request).await
    }

    async fn modify_user_point(
        &self,
        request: PointUpdateRequest,
    ) -> Result<serde_json::Value, HttpError> {
        self.point.modify_user_point(request).await
    }
}
