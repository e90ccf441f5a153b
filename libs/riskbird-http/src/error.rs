use std::time::Duration;
use thiserror::Error;

/// Why a request URL was refused before anything was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// Not a URL at all
    ParseError,
    /// No host to connect to
    MissingAuthority,
    /// Neither `http://` nor `https://`
    MissingScheme,
    /// Relative backend path, but the client has no `base_url`
    MissingBaseUrl,
}

/// Everything a call against the admin backend can fail with.
///
/// Adapters hand these back untouched; nothing here is retried.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("could not assemble request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Configured User-Agent or a session value is not a legal header value
    #[error("illegal header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    /// Connect, DNS or I/O failure; the cause is kept as `source()`
    #[error("backend unreachable: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response body exceeds {limit} bytes (read {actual})")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Backend answered outside 2xx. `body_preview` holds at most
    /// `ERROR_BODY_PREVIEW_LIMIT` bytes of what it said.
    #[error("backend returned {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    /// Request body could not be encoded, or the reply is not JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request queue is full")]
    Overloaded,

    #[error("request queue worker has stopped")]
    ServiceClosed,

    /// Match on `kind`; `reason` is free text for logs.
    #[error("cannot use URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("scheme '{scheme}' refused: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// Status code of a non-2xx response, if this error came from one.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            HttpError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unreachable_backend_keeps_io_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = HttpError::Transport(Box::new(io));

        let cause = err
            .source()
            .and_then(|s| s.downcast_ref::<std::io::Error>())
            .unwrap();
        assert_eq!(cause.kind(), std::io::ErrorKind::ConnectionRefused);
        assert!(err.to_string().starts_with("backend unreachable"));
    }

    #[test]
    fn test_status_only_for_http_status() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::BAD_GATEWAY,
            body_preview: String::new(),
            content_type: None,
        };
        assert_eq!(err.status(), Some(http::StatusCode::BAD_GATEWAY));
        assert_eq!(HttpError::Overloaded.status(), None);
        assert_eq!(HttpError::Timeout(Duration::from_secs(1)).status(), None);
    }

    #[test]
    fn test_missing_base_url_names_the_path() {
        let err = HttpError::InvalidUri {
            url: "/riskbird/user/modifyUserPoint".to_owned(),
            kind: InvalidUriKind::MissingBaseUrl,
            reason: "no base_url configured".to_owned(),
        };
        assert!(err.to_string().contains("/riskbird/user/modifyUserPoint"));
    }
}
