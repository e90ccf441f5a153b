use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::secret::{SecretString, serialize_redacted};

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("riskbird-http/", env!("CARGO_PKG_VERSION"));

/// Maximum body preview size kept on `HttpError::HttpStatus` (8 KiB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// TLS root certificate configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Use Mozilla's root certificates (webpki-roots, no OS dependency)
    #[default]
    WebPki,
    /// Use OS native root certificate store
    Native,
}

/// Transport security configuration
///
/// Controls whether the client enforces TLS or allows insecure HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Require TLS for all connections (HTTPS only)
    #[default]
    TlsOnly,
    /// Allow plain HTTP (local mock servers, test backends)
    AllowInsecureHttp,
}

/// Login session injected into every request.
///
/// `token` goes out as `x-token`, `user_id` as `x-user-id`. Both accept
/// bare numbers (`user_id: 42`), since environment layers type `42` as an
/// integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(
        serialize_with = "serialize_redacted",
        deserialize_with = "scalar_string::secret"
    )]
    pub token: SecretString,

    #[serde(default, deserialize_with = "scalar_string::optional")]
    pub user_id: Option<String>,
}

/// Overall HTTP client configuration
///
/// Deserializable so it can sit directly in an application config file:
///
/// ```yaml
/// base_url: "https://admin.example.com/api"
/// request_timeout: "30s"
/// transport: tls_only
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpClientConfig {
    /// Base URL that relative request paths are resolved against.
    ///
    /// A path prefix on the base (`https://host/api`) is kept.
    pub base_url: Option<String>,

    /// Per-request timeout (default: 30 seconds)
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// TLS root certificate strategy (default: `WebPki`)
    pub tls_roots: TlsRootConfig,

    /// Capacity of the request queue in front of the connection pool
    /// (default: 256). Values below 1 are clamped to 1.
    pub buffer_capacity: usize,

    /// Idle connection timeout in the pool (default: 90 seconds)
    #[serde(with = "duration_serde::option")]
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum number of idle connections per host (default: 8)
    pub pool_max_idle_per_host: usize,

    /// Session injected as `x-token` / `x-user-id` headers
    pub session: Option<SessionConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024, // 10 MB
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
            session: None,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for testing against local mock servers (allows plain HTTP).
    ///
    /// Never use this against a real backend.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024, // 1 MB
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 2,
            ..Self::default()
        }
    }
}

/// Human-readable durations (`"30s"`, `"1m 30s"`) for config files.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de};
        use std::time::Duration;

        #[allow(clippy::ref_option)] // serde `with` hands us `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| humantime::parse_duration(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}

/// Header values read from config: strings, or scalars rendered as text.
mod scalar_string {
    use crate::secret::SecretString;
    use serde::{Deserializer, de};
    use std::fmt;

    struct ScalarVisitor;

    impl<'de> de::Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    struct OptionalScalarVisitor;

    impl<'de> de::Visitor<'de> for OptionalScalarVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, a number or nothing")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(ScalarVisitor).map(Some)
        }
    }

    pub fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
        d.deserialize_any(ScalarVisitor).map(SecretString::from)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        d.deserialize_option(OptionalScalarVisitor)
    }
}
