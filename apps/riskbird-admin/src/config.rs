//! Layered application configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use riskbird_http::{HttpClientConfig, SessionConfig};
use serde::{Deserialize, Serialize};

/// Environment prefix; `RISKBIRD__TRANSPORT__BASE_URL` sets `transport.base_url`.
const ENV_PREFIX: &str = "RISKBIRD__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub transport: HttpClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. `warn`,
    /// `riskbird_http=debug`).
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub verbose: u8,
}

impl AppConfig {
    /// Defaults, then the YAML file, then `RISKBIRD__*` environment variables.
    ///
    /// # Errors
    /// Fails if the file is missing or any layer does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(base_url) = cli.base_url {
            self.transport.base_url = Some(base_url);
        }
        if let Some(timeout) = cli.timeout {
            self.transport.request_timeout = timeout;
        }
        let user_id = cli.user_id;
        if let Some(token) = cli.token {
            let user_id =
                user_id.or_else(|| self.transport.session.take().and_then(|s| s.user_id));
            self.transport.session = Some(SessionConfig {
                token: token.into(),
                user_id,
            });
        } else if let (Some(user_id), Some(session)) = (user_id, self.transport.session.as_mut()) {
            session.user_id = Some(user_id);
        }

        let level = match cli.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            self.logging.level = level.to_owned();
        }
    }

    /// Effective configuration as YAML, session token redacted.
    ///
    /// # Errors
    /// Fails if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        figment::Jail::expect_with(|_| {
            let config = AppConfig::load(None).unwrap();
            assert!(config.transport.base_url.is_none());
            assert_eq!(config.transport.request_timeout, Duration::from_secs(30));
            assert_eq!(config.logging.format, LogFormat::Plain);
            Ok(())
        });
    }

    #[test]
    fn yaml_layer_overrides_defaults() {
        let file = write_yaml(
            "transport:\n  base_url: https://admin.example.com/api\n  request_timeout: 5s\n\
             logging:\n  format: json\n",
        );
        figment::Jail::expect_with(|_| {
            let config = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(
                config.transport.base_url.as_deref(),
                Some("https://admin.example.com/api")
            );
            assert_eq!(config.transport.request_timeout, Duration::from_secs(5));
            assert_eq!(config.logging.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn unknown_key_is_rejected() {
        let file = write_yaml("transport:\n  retries: 3\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/riskbird.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn env_layer_accepts_numeric_session_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RISKBIRD__TRANSPORT__SESSION__TOKEN", "123456");
            jail.set_env("RISKBIRD__TRANSPORT__SESSION__USER_ID", "42");

            let config = AppConfig::load(None).unwrap();
            let session = config.transport.session.unwrap();
            assert_eq!(session.token.expose(), "123456");
            assert_eq!(session.user_id.as_deref(), Some("42"));
            Ok(())
        });
    }

    #[test]
    fn env_layer_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "riskbird.yaml",
                "transport:\n  base_url: https://yaml.example.com\n  session:\n    token: from-yaml\n",
            )?;
            jail.set_env("RISKBIRD__TRANSPORT__BASE_URL", "https://env.example.com");
            jail.set_env("RISKBIRD__TRANSPORT__SESSION__USER_ID", "7");

            let config = AppConfig::load(Some(Path::new("riskbird.yaml"))).unwrap();
            assert_eq!(
                config.transport.base_url.as_deref(),
                Some("https://env.example.com")
            );
            let session = config.transport.session.unwrap();
            assert_eq!(session.token.expose(), "from-yaml");
            assert_eq!(session.user_id.as_deref(), Some("7"));
            Ok(())
        });
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(CliOverrides {
            base_url: Some("https://cli.example.com".to_owned()),
            timeout: Some(Duration::from_secs(3)),
            token: Some("t".to_owned()),
            user_id: Some("9".to_owned()),
            verbose: 2,
        });

        assert_eq!(
            config.transport.base_url.as_deref(),
            Some("https://cli.example.com")
        );
        assert_eq!(config.transport.request_timeout, Duration::from_secs(3));
        let session = config.transport.session.unwrap();
        assert_eq!(session.token.expose(), "t");
        assert_eq!(session.user_id.as_deref(), Some("9"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn yaml_dump_hides_token() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(CliOverrides {
            token: Some("super-secret".to_owned()),
            ..CliOverrides::default()
        });
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("super-secret"));
        assert!(yaml.contains("request_timeout"));
    }
}
