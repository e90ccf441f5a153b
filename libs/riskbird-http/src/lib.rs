#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Request transport for the RiskBird admin backend
//!
//! A hyper-based HTTP client with:
//! - TLS via rustls (HTTPS only unless plain HTTP is explicitly allowed)
//! - Base URL resolution, so callers pass backend paths
//! - Session headers (`x-token`, `x-user-id`) on every request, refreshed
//!   from `new-token` and cleared on 401
//! - Per-request timeout and a bounded request queue
//! - Transparent response decompression (gzip, brotli, deflate)
//!
//! Nothing is retried. A call is one request, and its failure is reported
//! as an [`HttpError`].
//!
//! ```ignore
//! use riskbird_http::{HttpClient, RequestTransport};
//!
//! let client = HttpClient::builder()
//!     .base_url("https://admin.example.com/api")?
//!     .build()?;
//! client.session().set_token(token);
//!
//! let reply = client
//!     .post_json("/riskbird/user/modifyUserPoint", body)
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod secret;
mod session;
mod tls;
mod transport;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, HttpClientConfig, SessionConfig, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{SessionLayer, SessionService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
pub use secret::{SecretString, serialize_exposed, serialize_redacted};
pub use session::{NEW_TOKEN_HEADER, Session, TOKEN_HEADER, USER_ID_HEADER};
pub use transport::RequestTransport;

pub use http::StatusCode;
