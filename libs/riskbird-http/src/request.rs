use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Request, Response};
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

/// A single request against the admin backend
///
/// Created by [`HttpClient::post`](crate::HttpClient::post). The URL has
/// already been resolved against the client's base URL at this point.
///
/// ```ignore
/// let resp = client
///     .post("/riskbird/user/modifyUserBalance")
///     .json(&request)?
///     .send()
///     .await?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: Result<String, HttpError>,
    default_headers: HeaderMap,
    json_body: Option<Bytes>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: Result<String, HttpError>,
        default_headers: HeaderMap,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            default_headers,
            json_body: None,
            transport_security,
        }
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// # Errors
    /// Returns `Err(HttpError::Json)` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.json_body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Check the resolved URL against the transport security mode.
    fn validate_url(url: &str, security: TransportSecurity) -> Result<http::Uri, HttpError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::ParseError,
                reason: e.to_string(),
            })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match uri.scheme_str() {
            Some("https") => Ok(uri),
            Some("http") => match security {
                TransportSecurity::AllowInsecureHttp => Ok(uri),
                TransportSecurity::TlsOnly => Err(HttpError::InvalidScheme {
                    scheme: "http".to_owned(),
                    reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
                }),
            },
            Some(scheme) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            None => Err(HttpError::InvalidUri {
                url: url.to_owned(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request and return the response
    ///
    /// Every request carries the client's default headers (User-Agent,
    /// `Accept: application/json`); a JSON body adds its `Content-Type`.
    /// Any HTTP status (including 4xx/5xx) resolves to `Ok`; the response's
    /// checked readers turn non-2xx into an error.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - the URL could not be resolved or its scheme is not allowed
    /// - the connection failed or the request timed out
    /// - the request queue is full (`Overloaded`)
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        let url = self.url?;
        let uri = Self::validate_url(&url, self.transport_security)?;

        tracing::debug!(method = %self.method, path = uri.path(), "sending request");

        let mut headers = self.default_headers;
        let body = match self.json_body {
            Some(json) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                json
            }
            None => Bytes::new(),
        };

        let mut request = Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(body))?;
        *request.headers_mut() = headers;

        try_acquire_buffer_slot(&mut self.service).await?;

        let inner: Response<ResponseBody> =
            self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

/// Headers stamped on every request from one client.
///
/// # Errors
/// Returns `HttpError::InvalidHeaderValue` if `user_agent` is not a valid
/// header value.
pub(crate) fn default_headers(user_agent: &str) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(http::header::USER_AGENT, HeaderValue::try_from(user_agent)?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}
