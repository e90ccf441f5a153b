use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::{HttpError, InvalidUriKind};
use crate::layers::SessionLayer;
use crate::request::default_headers;
use crate::response::ResponseBody;
use crate::session::Session;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// Builder for an [`HttpClient`](crate::HttpClient).
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    base_url: Option<url::Url>,
    session: Option<Session>,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            base_url: None,
            session: None,
        }
    }

    /// Create a builder from a loaded configuration.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUri` if `config.base_url` does not parse.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, HttpError> {
        let base_url = config.base_url.as_deref().map(parse_base_url).transpose()?;
        let session = config.session.as_ref().map(Session::from_config);
        Ok(Self {
            config,
            base_url,
            session,
        })
    }

    /// Set the base URL relative paths are resolved against
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUri` if the URL does not parse or has no host.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, HttpError> {
        self.base_url = Some(parse_base_url(base_url)?);
        self.config.base_url = Some(base_url.to_owned());
        Ok(self)
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response body size
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set transport security mode
    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Allow plain `http://` URLs (for local mock servers)
    ///
    /// Only available in debug builds or with the `allow-insecure-http`
    /// feature.
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    #[must_use]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Use an existing session instead of a fresh one.
    ///
    /// Clients built with the same session share token refreshes.
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the request queue capacity (clamped to at least 1)
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Set the idle timeout for pooled connections (`None` keeps them forever)
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections kept per host
    #[must_use]
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set the TLS root certificate source
    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails or the User-Agent is not
    /// a valid header value.
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                "insecure HTTP enabled (TransportSecurity::AllowInsecureHttp); \
                 use only for testing with mock servers"
            );
        }

        let timeout = self.config.request_timeout;
        let https = tls::build_https_connector(self.config.tls_roots, self.config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a pool timer
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .http2_only(false);
        if let Some(idle_timeout) = self.config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle_timeout);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let default_headers = default_headers(&self.config.user_agent)?;
        let session = self.session.unwrap_or_default();

        // Request flow (outer to inner):
        //   Buffer -> Session -> ErrorMapping -> Timeout -> Decompression ->
        //   hyper_client
        //
        // Session sits outside the timeout so a 401 or `new-token` is seen
        // exactly once per call. There is no retry layer: every call is a
        // single attempt and send() resolves Ok for any HTTP status.
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(map_decompression_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

        let service = ServiceBuilder::new()
            .layer(SessionLayer::new(session.clone()))
            .service(service)
            .boxed_clone();

        let buffer_capacity = self.config.buffer_capacity.max(1);
        let buffered_service: crate::client::BufferedService =
            Buffer::new(service, buffer_capacity);

        Ok(crate::HttpClient {
            service: buffered_service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
            default_headers,
            base_url: self.base_url,
            session,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_base_url(raw: &str) -> Result<url::Url, HttpError> {
    let url = url::Url::parse(raw).map_err(|e| HttpError::InvalidUri {
        url: raw.to_owned(),
        kind: InvalidUriKind::ParseError,
        reason: e.to_string(),
    })?;

    if !url.has_host() {
        return Err(HttpError::InvalidUri {
            url: raw.to_owned(),
            kind: InvalidUriKind::MissingAuthority,
            reason: "base URL has no host".to_owned(),
        });
    }

    Ok(url)
}

/// Map tower errors to `HttpError`, keeping typed errors raised further in.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn map_decompression_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    let boxed_body: ResponseBody = body.map_err(Into::into).boxed();
    Response::from_parts(parts, boxed_body)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_USER_AGENT, SessionConfig};
    use httpmock::prelude::*;

    #[test]
    fn test_builder_default() {
        let builder = HttpClientBuilder::new();
        assert_eq!(builder.config.request_timeout, Duration::from_secs(30));
        assert_eq!(builder.config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(builder.config.transport, TransportSecurity::TlsOnly);
        assert!(builder.base_url.is_none());
    }

    #[test]
    fn test_builder_buffer_capacity_zero_clamped() {
        let builder = HttpClientBuilder::new().buffer_capacity(0);
        assert_eq!(builder.config.buffer_capacity, 1);
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = HttpClientBuilder::new().base_url("not a url").err().unwrap();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::ParseError,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_with_config_applies_session() {
        let config = HttpClientConfig {
            base_url: Some("https://admin.example.com".to_owned()),
            session: Some(SessionConfig {
                token: "from-config".into(),
                user_id: Some("7".to_owned()),
            }),
            ..HttpClientConfig::default()
        };

        let client = HttpClientBuilder::with_config(config)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(client.session().token().unwrap().expose(), "from-config");
        assert_eq!(client.session().user_id().as_deref(), Some("7"));
        assert_eq!(
            client.base_url().map(url::Url::as_str),
            Some("https://admin.example.com/")
        );
    }

    #[tokio::test]
    async fn test_builder_build_invalid_user_agent() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[tokio::test]
    async fn test_shared_session_between_clients() {
        let session = Session::new();
        let a = HttpClientBuilder::new()
            .session(session.clone())
            .build()
            .unwrap();
        let b = HttpClientBuilder::new().session(session).build().unwrap();

        a.session().set_token("shared");
        assert_eq!(b.session().token().unwrap().expose(), "shared");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::POST).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .base_url(&server.base_url())
            .unwrap()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = client.post("/slow").send().await.unwrap_err();
        assert!(
            matches!(err, HttpError::Timeout(d) if d == Duration::from_millis(50)),
            "got {err:?}"
        );
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_insecure_http_warning_emitted() {
        let _client = HttpClientBuilder::new()
            .allow_insecure_http()
            .build()
            .unwrap();
        assert!(logs_contain("insecure HTTP enabled"));
    }

    #[test]
    fn test_map_tower_error_preserves_http_error() {
        let boxed: tower::BoxError = Box::new(HttpError::Overloaded);
        let result = map_tower_error(boxed, Duration::from_secs(30));
        assert!(matches!(result, HttpError::Overloaded));
    }

    #[test]
    fn test_map_tower_error_wraps_unknown_as_transport() {
        let boxed: tower::BoxError = Box::new(std::io::Error::other("reset"));
        let result = map_tower_error(boxed, Duration::from_secs(30));
        assert!(matches!(result, HttpError::Transport(_)));
    }
}
