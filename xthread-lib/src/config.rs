//! Process configuration, read once from the environment at startup.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;
use crate::oauth::OAuthKeys;

pub const API_KEY_VAR: &str = "TWITTER_API_KEY";
pub const API_SECRET_VAR: &str = "TWITTER_API_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET_VAR: &str = "TWITTER_ACCESS_TOKEN_SECRET";

pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";
pub const DEFAULT_STATUS_URL_BASE: &str = "https://twitter.com";
pub const DEFAULT_POST_DELAY_MS: u64 = 1000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;

/// Raw credential values as found in the environment. Empty values count as
/// unset.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("missing", &self.missing())
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Names of the variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Signing keys, or the first variable that is missing.
    pub fn require(&self) -> Result<OAuthKeys, ApiError> {
        let get = |value: &Option<String>, name: &'static str| {
            value.clone().ok_or(ApiError::MissingCredential(name))
        };

        Ok(OAuthKeys {
            consumer_key: get(&self.api_key, API_KEY_VAR)?,
            consumer_secret: get(&self.api_secret, API_SECRET_VAR)?,
            token: get(&self.access_token, ACCESS_TOKEN_VAR)?,
            token_secret: get(&self.access_token_secret, ACCESS_TOKEN_SECRET_VAR)?,
        })
    }

    fn fields(&self) -> [(&'static str, Option<&String>); 4] {
        [
            (API_KEY_VAR, self.api_key.as_ref()),
            (API_SECRET_VAR, self.api_secret.as_ref()),
            (ACCESS_TOKEN_VAR, self.access_token.as_ref()),
            (ACCESS_TOKEN_SECRET_VAR, self.access_token_secret.as_ref()),
        ]
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,

    /// Root of the posting API, without a trailing slash.
    pub api_base_url: String,
    /// Root used to build status links in the log.
    pub status_url_base: String,
    /// Pause after each created post. A crude throttle, not backpressure.
    pub post_delay: Duration,

    // HTTP server
    pub host: String,
    pub port: u16,
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            status_url_base: DEFAULT_STATUS_URL_BASE.to_string(),
            post_delay: Duration::from_millis(DEFAULT_POST_DELAY_MS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            credentials: Credentials {
                api_key: non_empty(API_KEY_VAR),
                api_secret: non_empty(API_SECRET_VAR),
                access_token: non_empty(ACCESS_TOKEN_VAR),
                access_token_secret: non_empty(ACCESS_TOKEN_SECRET_VAR),
            },

            api_base_url: non_empty("XTHREAD_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            status_url_base: non_empty("XTHREAD_STATUS_URL_BASE")
                .unwrap_or_else(|| DEFAULT_STATUS_URL_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            post_delay: Duration::from_millis(
                non_empty("XTHREAD_POST_DELAY_MS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_POST_DELAY_MS),
            ),

            host: non_empty("XTHREAD_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: non_empty("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            json_logs: non_empty("XTHREAD_LOG_FORMAT")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("json")),
        }
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
