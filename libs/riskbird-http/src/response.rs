use crate::config::ERROR_BODY_PREVIEW_LIMIT;
use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;

/// Boxed response body, after transparent decompression.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Response from the admin backend
///
/// The status is available up front; the body is read once through
/// [`json_or_null`](Self::json_or_null), which enforces the client's
/// `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Decode the body as JSON; an empty body reads as `null`.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if the body exceeds the limit.
    /// Returns `HttpError::Json` if the body is not JSON.
    pub async fn json_or_null(self) -> Result<serde_json::Value, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_body_limited(response, max_body_size).await;
    }

    let content_type = content_type(response.headers());

    // An oversize error body must not hide the status itself.
    let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
    let body_preview = match read_body_limited(response, preview_limit).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
        Err(e) => return Err(e),
    };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

/// Collect the (decompressed) body, stopping once `limit` bytes are exceeded.
async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: StatusCode, body: &'static str) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| match never {})
            .boxed();
        HttpResponse {
            inner: Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
            max_body_size: 64,
        }
    }

    #[tokio::test]
    async fn test_json_or_null_on_empty_body() {
        let value = response(StatusCode::OK, "").json_or_null().await.unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_json_or_null_parses_body() {
        let value = response(StatusCode::OK, r#"{"code":0,"msg":"ok"}"#)
            .json_or_null()
            .await
            .unwrap();
        assert_eq!(value["code"], 0);
    }

    #[tokio::test]
    async fn test_non_2xx_keeps_preview_and_content_type() {
        let err = response(StatusCode::BAD_REQUEST, "bad input")
            .json_or_null()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body_preview, "bad input");
                assert_eq!(content_type.as_deref(), Some("application/json"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let big = "x".repeat(65).leak();
        let err = response(StatusCode::OK, big).json_or_null().await.unwrap_err();
        assert!(matches!(err, HttpError::BodyTooLarge { limit: 64, .. }));
    }

    #[tokio::test]
    async fn test_oversize_error_body_still_reports_status() {
        let big = "e".repeat(65).leak();
        let err = response(StatusCode::BAD_GATEWAY, big)
            .json_or_null()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                ..
            } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body_preview, "<body too large for preview>");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }
}
