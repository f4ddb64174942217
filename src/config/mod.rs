use std::env;
use std::time::Duration;

use url::Url;

/// Startup configuration failures. Any of these aborts the process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("LEGACY_JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} has an invalid value '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub delegated_auth_endpoint: Url,
    pub delegated_timeout: Duration,
    pub legacy_secret: String,
    pub service_token: Option<String>,
}

// Secrets stay out of Debug output so a logged config never leaks them.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("delegated_auth_endpoint", &self.delegated_auth_endpoint.as_str())
            .field("delegated_timeout", &self.delegated_timeout)
            .field("legacy_secret", &"<redacted>")
            .field("service_token", &self.service_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub capacity: usize,
    pub window: Duration,
    pub whoami_limit: u32,
    pub media_delete_limit: u32,
    pub auth_failure_limit: u32,
}

/// Per-environment values that apply until an env var overrides them.
struct Preset {
    delegated_timeout_ms: u64,
    capacity: usize,
    window_ms: u64,
    whoami_limit: u32,
    media_delete_limit: u32,
    auth_failure_limit: u32,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    fn preset(self) -> Preset {
        match self {
            Environment::Development => Preset {
                delegated_timeout_ms: 5_000,
                capacity: 500,
                window_ms: 60_000,
                whoami_limit: 120,
                media_delete_limit: 60,
                auth_failure_limit: 30,
            },
            Environment::Staging => Preset {
                delegated_timeout_ms: 3_000,
                capacity: 5_000,
                window_ms: 60_000,
                whoami_limit: 60,
                media_delete_limit: 20,
                auth_failure_limit: 20,
            },
            Environment::Production => Preset {
                delegated_timeout_ms: 2_000,
                capacity: 10_000,
                window_ms: 60_000,
                whoami_limit: 60,
                media_delete_limit: 10,
                auth_failure_limit: 10,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = Environment::parse(var("APP_ENV").as_deref());
        let preset = environment.preset();

        let port = match var("CASTING_API_PORT").or_else(|| var("PORT")) {
            Some(v) => parse_number("PORT", &v)?,
            None => 3000,
        };

        let delegated_auth_endpoint = parse_url("DELEGATED_AUTH_URL", var("DELEGATED_AUTH_URL"))?;
        let legacy_secret = var("LEGACY_JWT_SECRET").ok_or(ConfigError::MissingSecret)?;
        let base_url = parse_url("DMAPI_URL", var("DMAPI_URL"))?;

        let delegated_timeout_ms = override_number(
            "DELEGATED_AUTH_TIMEOUT_MS",
            var("DELEGATED_AUTH_TIMEOUT_MS"),
            preset.delegated_timeout_ms,
        )?;
        let capacity = override_number("RATE_LIMIT_CAPACITY", var("RATE_LIMIT_CAPACITY"), preset.capacity)?;
        let window_ms = override_number("RATE_LIMIT_WINDOW_MS", var("RATE_LIMIT_WINDOW_MS"), preset.window_ms)?;
        let whoami_limit = override_number("RATE_LIMIT_WHOAMI", var("RATE_LIMIT_WHOAMI"), preset.whoami_limit)?;
        let media_delete_limit = override_number(
            "RATE_LIMIT_MEDIA_DELETE",
            var("RATE_LIMIT_MEDIA_DELETE"),
            preset.media_delete_limit,
        )?;
        let auth_failure_limit = override_number(
            "RATE_LIMIT_AUTH_FAILURE",
            var("RATE_LIMIT_AUTH_FAILURE"),
            preset.auth_failure_limit,
        )?;

        if delegated_timeout_ms == 0 {
            return Err(ConfigError::Zero("DELEGATED_AUTH_TIMEOUT_MS"));
        }
        if capacity == 0 {
            return Err(ConfigError::Zero("RATE_LIMIT_CAPACITY"));
        }
        if window_ms == 0 {
            return Err(ConfigError::Zero("RATE_LIMIT_WINDOW_MS"));
        }

        Ok(Self {
            environment,
            server: ServerConfig { port },
            auth: AuthConfig {
                delegated_auth_endpoint,
                delegated_timeout: Duration::from_millis(delegated_timeout_ms),
                legacy_secret,
                service_token: var("SERVICE_TOKEN"),
            },
            media: MediaConfig { base_url },
            rate_limit: RateLimitConfig {
                capacity,
                window: Duration::from_millis(window_ms),
                whoami_limit,
                media_delete_limit,
                auth_failure_limit,
            },
        })
    }
}

fn parse_url(name: &'static str, value: Option<String>) -> Result<Url, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

fn override_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => parse_number(name, &v),
        None => Ok(default),
    }
}
