use tracing::info;
use url::Url;

use crate::error::{BrainError, BrainResult};

/// Connection URL used when no environment variable names one.
pub const DEFAULT_URL: &str = "redis://localhost:6379";

/// Application prefix used when the URL carries no path.
pub const DEFAULT_APP_PREFIX: &str = "botbrain";

/// Sub-prefix for the application-data tree.
pub const DEFAULT_DATA_PREFIX: &str = "data";

/// Environment variables that may name the store URL, in priority order.
/// The first populated one wins.
pub const URL_ENV_VARS: [&str; 4] = [
    "REDISTOGO_URL",
    "REDISCLOUD_URL",
    "BOXEN_REDIS_URL",
    "REDIS_URL",
];

/// Environment variable overriding the data prefix.
pub const DATA_PREFIX_ENV_VAR: &str = "BOTBRAIN_REDIS_DATA_PREFIX";

/// Decomposed store connection URL.
///
/// The URL path names the application prefix (leading `/` stripped), and
/// an embedded credential's password part is used for authentication,
/// e.g. `redis://:hunter2@cache.example.com:6380/myapp`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreUrl {
    /// URL scheme, informational only.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Application prefix scoping every key of this instance.
    pub app_prefix: String,
    /// Password extracted from the URL credentials, if any.
    pub password: Option<String>,
}

impl StoreUrl {
    /// Parse a connection URL.
    pub fn parse(raw: &str) -> BrainResult<Self> {
        let url = Url::parse(raw)
            .map_err(|e| BrainError::Config(format!("invalid store url {raw:?}: {e}")))?;
        let host = url.host_str().unwrap_or("localhost").to_string();
        let port = url.port().unwrap_or(6379);
        let path = url.path().trim_start_matches('/');
        let app_prefix = if path.is_empty() {
            DEFAULT_APP_PREFIX.to_string()
        } else {
            path.to_string()
        };
        let password = url
            .password()
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port,
            app_prefix,
            password,
        })
    }

    /// `host:port`, the address the transport should dial.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for StoreUrl {
    fn default() -> Self {
        Self::parse(DEFAULT_URL).expect("default url is valid")
    }
}

/// Configuration for a [`Brain`](crate::Brain).
///
/// Built once by the host and passed in; the adapter itself never reads
/// the process environment.
#[derive(Clone, Debug)]
pub struct BrainConfig {
    pub url: StoreUrl,
    /// Sub-prefix for application data, distinct from the user directory.
    pub data_prefix: String,
    /// Compact (MessagePack) encoding when `true`, JSON text otherwise.
    pub compact: bool,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            url: StoreUrl::default(),
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            compact: true,
        }
    }
}

impl BrainConfig {
    /// Resolve configuration from environment-style variables.
    ///
    /// `lookup` is how the host injects its environment (typically
    /// `|var| std::env::var(var).ok()`); nothing here touches the process
    /// environment directly. Scans [`URL_ENV_VARS`] in order for the
    /// connection URL, falling back to [`DEFAULT_URL`], and honors
    /// [`DATA_PREFIX_ENV_VAR`] for the data prefix.
    pub fn from_env_lookup<F>(lookup: F) -> BrainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw_url = None;
        for var in URL_ENV_VARS {
            if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
                info!(var, "discovered store url from environment");
                raw_url = Some(value);
                break;
            }
        }
        let raw_url = raw_url.unwrap_or_else(|| {
            info!("using default store url {DEFAULT_URL}");
            DEFAULT_URL.to_string()
        });

        let data_prefix = lookup(DATA_PREFIX_ENV_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_PREFIX.to_string());

        Ok(Self {
            url: StoreUrl::parse(&raw_url)?,
            data_prefix,
            compact: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_url() {
        let url = StoreUrl::parse("redis://:hunter2@cache.example.com:6380/myapp").unwrap();
        assert_eq!(url.scheme, "redis");
        assert_eq!(url.host, "cache.example.com");
        assert_eq!(url.port, 6380);
        assert_eq!(url.app_prefix, "myapp");
        assert_eq!(url.password.as_deref(), Some("hunter2"));
        assert_eq!(url.addr(), "cache.example.com:6380");
    }

    #[test]
    fn parse_defaults() {
        let url = StoreUrl::parse("redis://localhost:6379").unwrap();
        assert_eq!(url.app_prefix, DEFAULT_APP_PREFIX);
        assert!(url.password.is_none());
    }

    #[test]
    fn missing_port_defaults() {
        let url = StoreUrl::parse("redis://somehost").unwrap();
        assert_eq!(url.port, 6379);
        assert_eq!(url.host, "somehost");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            StoreUrl::parse("not a url"),
            Err(BrainError::Config(_))
        ));
    }

    #[test]
    fn env_priority_order() {
        let lookup = |var: &str| match var {
            "REDISCLOUD_URL" => Some("redis://second:6379/cloud".to_string()),
            "REDIS_URL" => Some("redis://fourth:6379/plain".to_string()),
            _ => None,
        };
        let config = BrainConfig::from_env_lookup(lookup).unwrap();
        assert_eq!(config.url.host, "second");
        assert_eq!(config.url.app_prefix, "cloud");
    }

    #[test]
    fn env_fallback_to_default() {
        let config = BrainConfig::from_env_lookup(|_| None).unwrap();
        assert_eq!(config.url.host, "localhost");
        assert_eq!(config.url.port, 6379);
        assert_eq!(config.data_prefix, DEFAULT_DATA_PREFIX);
        assert!(config.compact);
    }

    #[test]
    fn env_data_prefix_override() {
        let lookup = |var: &str| {
            (var == DATA_PREFIX_ENV_VAR).then(|| "plugin-data".to_string())
        };
        let config = BrainConfig::from_env_lookup(lookup).unwrap();
        assert_eq!(config.data_prefix, "plugin-data");
    }

    #[test]
    fn empty_env_values_are_skipped() {
        let lookup = |var: &str| match var {
            "REDISTOGO_URL" => Some(String::new()),
            "REDIS_URL" => Some("redis://real:6379".to_string()),
            _ => None,
        };
        let config = BrainConfig::from_env_lookup(lookup).unwrap();
        assert_eq!(config.url.host, "real");
    }
}
