//! RiskBird user-account SDK
//!
//! Public contract of the `riskbird-user` module:
//!
//! - [`UserAccountClientV1`] - API trait for balance and point updates
//! - [`BalanceUpdateRequest`], [`PointUpdateRequest`], [`PointAmountChange`] - request models
//! - [`ApiEnvelope`] - typed view of the backend's `{code, data, msg}` body
//! - [`ValidationError`] - optional caller-side checks
//!
//! ```ignore
//! use riskbird_user_sdk::{BalanceUpdateRequest, UserAccountClientV1};
//!
//! let request = BalanceUpdateRequest::new("13800000000", password, 100.into(), 10.into());
//! request.validate()?;
//! let reply = accounts.modify_user_balance(request).await?;
//! ```

pub mod api;
pub mod envelope;
pub mod error;
pub mod models;

pub use api::UserAccountClientV1;
pub use envelope::{ApiEnvelope, ERROR_CODE, SUCCESS_CODE};
pub use error::ValidationError;
pub use models::{BalanceUpdateRequest, PointAmountChange, PointUpdateRequest};
