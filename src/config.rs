/*
 * Responsibility
 * - 環境変数や設定の読み込み (GATEKEEPER_URL, タイムアウト, usage キューなど)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::http::HttpSettings;
use crate::services::usage::UsageSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Base URL of the policy service; `/validate` and `/recordUsage` hang off it.
    pub gatekeeper_url: String,
    pub gatekeeper_timeout: Duration,

    pub usage: UsageSettings,
    pub http: HttpSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let gatekeeper_url = get("GATEKEEPER_URL").ok_or(ConfigError::Missing("GATEKEEPER_URL"))?;
        let gatekeeper_url = parse_base_url(&gatekeeper_url)?;

        let gatekeeper_timeout = Duration::from_secs(
            positive(&get, "GATEKEEPER_TIMEOUT_SECONDS")?.unwrap_or(5),
        );

        let defaults = UsageSettings::default();
        let usage = UsageSettings {
            queue_capacity: positive(&get, "USAGE_QUEUE_CAPACITY")?
                .map(|v| v as usize)
                .unwrap_or(defaults.queue_capacity),
            max_in_flight: positive(&get, "USAGE_MAX_IN_FLIGHT")?
                .map(|v| v as usize)
                .unwrap_or(defaults.max_in_flight),
            report_timeout: positive(&get, "USAGE_REPORT_TIMEOUT_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.report_timeout),
        };

        let http = HttpSettings {
            request_timeout: positive(&get, "REQUEST_TIMEOUT_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(HttpSettings::default().request_timeout),
            ..HttpSettings::default()
        };

        // Otherwise a hung gatekeeper surfaces as the outer 408 instead of a 500.
        if gatekeeper_timeout >= http.request_timeout {
            return Err(ConfigError::Invalid("GATEKEEPER_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            app_env,
            gatekeeper_url,
            gatekeeper_timeout,
            usage,
            http,
        })
    }
}

// Unset => None. Set but not a positive integer => startup error.
fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(Some(v)),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("GATEKEEPER_URL"))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid("GATEKEEPER_URL"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config = load(&[("GATEKEEPER_URL", "http://localhost:8082/gatekeeper")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.gatekeeper_url, "http://localhost:8082/gatekeeper");
        assert_eq!(config.gatekeeper_timeout, Duration::from_secs(5));
        assert_eq!(config.usage.queue_capacity, 1024);
        assert_eq!(config.usage.max_in_flight, 32);
        assert_eq!(config.usage.report_timeout, Duration::from_secs(10));
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn gatekeeper_url_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("GATEKEEPER_URL"))
        ));
    }

    #[test]
    fn gatekeeper_url_must_be_http() {
        for bad in ["localhost:8082", "ftp://example.com", "not a url", "http://"] {
            assert!(
                matches!(
                    load(&[("GATEKEEPER_URL", bad)]),
                    Err(ConfigError::Invalid("GATEKEEPER_URL"))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = load(&[("GATEKEEPER_URL", "https://gk.internal/api/")]).unwrap();
        assert_eq!(config.gatekeeper_url, "https://gk.internal/api");
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("GATEKEEPER_URL", "http://gk:8082"),
            ("PORT", "8000"),
            ("APP_ENV", "PROD"),
            ("GATEKEEPER_TIMEOUT_SECONDS", "2"),
            ("USAGE_QUEUE_CAPACITY", "16"),
            ("USAGE_MAX_IN_FLIGHT", "4"),
            ("USAGE_REPORT_TIMEOUT_SECONDS", "3"),
            ("REQUEST_TIMEOUT_SECONDS", "12"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 8000);
        assert!(config.app_env.is_production());
        assert_eq!(config.gatekeeper_timeout, Duration::from_secs(2));
        assert_eq!(config.usage.queue_capacity, 16);
        assert_eq!(config.usage.max_in_flight, 4);
        assert_eq!(config.usage.report_timeout, Duration::from_secs(3));
        assert_eq!(config.http.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn check_timeout_must_be_shorter_than_request_timeout() {
        for (check, request) in [("30", None), ("12", Some("12")), ("20", Some("10"))] {
            let mut pairs = vec![
                ("GATEKEEPER_URL", "http://gk"),
                ("GATEKEEPER_TIMEOUT_SECONDS", check),
            ];
            if let Some(request) = request {
                pairs.push(("REQUEST_TIMEOUT_SECONDS", request));
            }
            assert!(
                matches!(
                    load(&pairs),
                    Err(ConfigError::Invalid("GATEKEEPER_TIMEOUT_SECONDS"))
                ),
                "check {check}s, request {request:?}"
            );
        }

        let config = load(&[
            ("GATEKEEPER_URL", "http://gk"),
            ("GATEKEEPER_TIMEOUT_SECONDS", "9"),
            ("REQUEST_TIMEOUT_SECONDS", "10"),
        ])
        .unwrap();
        assert!(config.gatekeeper_timeout < config.http.request_timeout);
    }

    #[test]
    fn zero_or_garbage_numbers_fail_startup() {
        for (key, value) in [
            ("GATEKEEPER_TIMEOUT_SECONDS", "0"),
            ("USAGE_QUEUE_CAPACITY", "-1"),
            ("USAGE_MAX_IN_FLIGHT", "many"),
        ] {
            let err = load(&[("GATEKEEPER_URL", "http://gk"), (key, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(k) if k == key), "{key}");
        }
    }
}
