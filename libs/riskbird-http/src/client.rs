use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use crate::session::Session;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;

/// Future type of the boxed inner service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Buffered service handle shared by every clone of the client
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client for the admin backend
///
/// Wraps a tower stack of session headers, timeout and response
/// decompression over a pooled hyper client. Paths are
/// resolved against the configured base URL, so callers pass
/// `/riskbird/user/...` rather than full URLs.
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the connection
/// pool, the request queue and the [`Session`].
///
/// ```ignore
/// let client = HttpClient::builder()
///     .base_url("https://admin.example.com/api")?
///     .build()?;
///
/// let resp = client
///     .post("/riskbird/user/modifyUserPoint")
///     .json(&body)?
///     .send()
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
    pub(crate) default_headers: http::HeaderMap,
    pub(crate) base_url: Option<url::Url>,
    pub(crate) session: Session,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a POST request builder for `path`
    pub fn post(&self, path: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            http::Method::POST,
            self.resolve_url(path),
            self.default_headers.clone(),
            self.transport_security,
        )
    }

    /// The login session attached to every request from this client.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Configured base URL, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&url::Url> {
        self.base_url.as_ref()
    }

    /// Resolve `path` to an absolute URL.
    ///
    /// Absolute `http(s)://` URLs pass through. Anything else is appended
    /// to the base URL's path, so `https://host/api` + `/riskbird/x`
    /// becomes `https://host/api/riskbird/x`.
    pub(crate) fn resolve_url(&self, path: &str) -> Result<String, HttpError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_owned());
        }

        let Some(base) = &self.base_url else {
            return Err(HttpError::InvalidUri {
                url: path.to_owned(),
                kind: InvalidUriKind::MissingBaseUrl,
                reason: "relative path requires a configured base_url".to_owned(),
            });
        };

        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let mut url = base.clone();
        let joined = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(query);
        Ok(url.into())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_ref().map(url::Url::as_str))
            .field("max_body_size", &self.max_body_size)
            .field("transport_security", &self.transport_security)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Map a buffer error back to `HttpError`.
///
/// Errors from the inner service come through boxed; anything else means
/// the buffer worker is gone.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

/// Reserve a buffer slot without waiting.
///
/// A full queue yields `HttpError::Overloaded` right away.
pub async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let poll_result = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match poll_result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}
