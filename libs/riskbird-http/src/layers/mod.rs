//! Tower layers for the HTTP client middleware stack
//!
//! - [`SessionLayer`] - Injects `x-token` / `x-user-id` and absorbs refreshed tokens

mod session;

pub use session::{SessionLayer, SessionService};
