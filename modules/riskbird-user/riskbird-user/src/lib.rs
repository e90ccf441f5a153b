//! User-account adapters for the RiskBird admin backend
//!
//! - [`BalanceUpdateClient`] - `POST /riskbird/user/modifyUserBalance`
//! - [`PointUpdateClient`] - `POST /riskbird/user/modifyUserPoint`
//! - [`UserAccountClient`] - both, behind [`UserAccountClientV1`]
//!
//! The adapters only bind a payload to its endpoint. They send exactly
//! one request per call, never validate or rewrite the body, and return
//! the transport's result untouched.
//!
//! [`UserAccountClientV1`]: riskbird_user_sdk::UserAccountClientV1

mod balance;
mod local_client;
mod point;
#[cfg(test)]
mod test_support;

pub use balance::BalanceUpdateClient;
pub use local_client::UserAccountClient;
pub use point::PointUpdateClient;

/// Endpoint for balance changes.
pub const MODIFY_USER_BALANCE_PATH: &str = "/riskbird/user/modifyUserBalance";

/// Endpoint for point changes.
pub const MODIFY_USER_POINT_PATH: &str = "/riskbird/user/modifyUserPoint";
