use crate::error::{CourierError, Result};
use std::time::Duration;
use url::Url;

/// Environment variable holding the API base url.
pub const ENV_API_BASE: &str = "COURIER_API_BASE";
/// Environment variable holding an optional request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "COURIER_TIMEOUT_SECS";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";

/// Client-wide settings shared by every request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| CourierError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CourierError::InvalidBaseUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: parsed,
            timeout: None,
        })
    }

    /// 从环境变量读取配置，缺省时回落到本地地址。
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(ENV_API_BASE).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut config = Self::new(&base)?;
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CourierError::Other(format!("{ENV_TIMEOUT_SECS} must be an integer, got {raw}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve a request path against the base url.
    ///
    /// Absolute `http(s)` urls pass through untouched (scheme in any case),
    /// `//host/...` borrows the base scheme, and anything else is appended to
    /// the base with exactly one `/` between them.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if is_absolute_http(path) {
            return Url::parse(path).map_err(|e| CourierError::InvalidUrl(format!("{path}: {e}")));
        }
        if path.starts_with("//") {
            return self
                .base_url
                .join(path)
                .map_err(|e| CourierError::InvalidUrl(format!("{path}: {e}")));
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        };
        Url::parse(&joined).map_err(|e| CourierError::InvalidUrl(format!("{joined}: {e}")))
    }
}

fn is_absolute_http(path: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_with_single_slash() {
        let config = ClientConfig::new("http://api.local/v1/").unwrap();
        assert_eq!(
            config.resolve("/items").unwrap().as_str(),
            "http://api.local/v1/items"
        );
        assert_eq!(
            config.resolve("items?page=2").unwrap().as_str(),
            "http://api.local/v1/items?page=2"
        );
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let config = ClientConfig::new("http://api.local").unwrap();
        assert_eq!(
            config.resolve("https://other.local/x").unwrap().as_str(),
            "https://other.local/x"
        );
        assert_eq!(
            config.resolve("HTTPS://other.local/x").unwrap().as_str(),
            "https://other.local/x"
        );
        assert_eq!(
            config.resolve("Http://other.local/y?z=1").unwrap().as_str(),
            "http://other.local/y?z=1"
        );
    }

    #[test]
    fn resolve_protocol_relative_uses_base_scheme() {
        let config = ClientConfig::new("https://api.local/v1").unwrap();
        assert_eq!(
            config.resolve("//other.local/x").unwrap().as_str(),
            "https://other.local/x"
        );
    }

    #[test]
    fn rejects_bad_base() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(CourierError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://files.local"),
            Err(CourierError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn from_env_reads_base_and_timeout() {
        std::env::set_var(ENV_API_BASE, "https://env.local/api");
        std::env::set_var(ENV_TIMEOUT_SECS, "7");
        let config = ClientConfig::from_env().unwrap();
        std::env::remove_var(ENV_API_BASE);
        std::env::remove_var(ENV_TIMEOUT_SECS);

        assert_eq!(config.base_url().as_str(), "https://env.local/api");
        assert_eq!(config.timeout(), Some(Duration::from_secs(7)));
    }
}
