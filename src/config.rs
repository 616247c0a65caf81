//! Configuration
//!
//! Static settings for the moderation client and the health monitor.
//! A `Config` is validated once when loaded and shared as `Arc<Config>`;
//! nothing mutates it afterwards.

use crate::defaults;
use crate::error::ModerationError;
use secrecy::SecretString;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Which wire format the moderation endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Thin backend proxy: `{"text": ..}` in, `{"flagged", "scores"}` out
    #[default]
    Proxy,
    /// Upstream moderation API called directly with a bearer key
    Direct,
}

impl FromStr for ApiMode {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(Self::Proxy),
            "direct" => Ok(Self::Direct),
            other => Err(ModerationError::ConfigurationError(format!(
                "unknown api mode '{other}' (expected 'proxy' or 'direct')"
            ))),
        }
    }
}

/// Moderation client configuration
#[derive(Debug)]
pub struct Config {
    /// Endpoint receiving analysis requests
    pub moderation_url: String,
    /// Liveness endpoint polled by the health monitor
    pub health_url: String,
    /// Maximum accepted input length, in characters, after trimming
    pub max_input_chars: usize,
    /// Cancellation deadline for an analysis request
    pub request_timeout: Duration,
    /// Cancellation deadline for a single liveness probe
    pub health_check_timeout: Duration,
    /// Poll cadence while the backend is online
    pub online_poll_interval: Duration,
    /// Poll cadence while the backend is waking up or offline
    pub offline_poll_interval: Duration,
    /// TCP connect timeout for the default transport
    pub connect_timeout: Duration,
    /// Wire format of the moderation endpoint
    pub api_mode: ApiMode,
    /// Model requested in direct mode
    pub model: String,
    /// Bearer key, sent when present
    pub api_key: Option<SecretString>,
    /// User agent of the default transport
    pub user_agent: String,
}

impl Config {
    /// Create a configuration with explicit endpoints and default limits.
    pub fn new(moderation_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self {
            moderation_url: moderation_url.into(),
            health_url: health_url.into(),
            max_input_chars: defaults::input::MAX_CHARS,
            request_timeout: defaults::http::REQUEST_TIMEOUT,
            health_check_timeout: defaults::health::CHECK_TIMEOUT,
            online_poll_interval: defaults::health::ONLINE_POLL_INTERVAL,
            offline_poll_interval: defaults::health::OFFLINE_POLL_INTERVAL,
            connect_timeout: defaults::http::CONNECT_TIMEOUT,
            api_mode: ApiMode::Proxy,
            model: defaults::endpoints::DIRECT_MODEL.to_string(),
            api_key: None,
            user_agent: defaults::http::USER_AGENT.to_string(),
        }
    }

    /// Derive both endpoints from a backend base URL (`<base>/moderate`, `<base>/health`).
    pub fn for_backend(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self::new(
            format!("{base}{}", defaults::endpoints::MODERATE_PATH),
            format!("{base}{}", defaults::endpoints::HEALTH_PATH),
        )
    }

    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_check_timeout(mut self, timeout: Duration) -> Self {
        self.health_check_timeout = timeout;
        self
    }

    pub fn with_poll_intervals(mut self, online: Duration, offline: Duration) -> Self {
        self.online_poll_interval = online;
        self.offline_poll_interval = offline;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_api_mode(mut self, mode: ApiMode) -> Self {
        self.api_mode = mode;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ModerationError> {
        validate_url("moderation URL", &self.moderation_url)?;
        validate_url("health URL", &self.health_url)?;

        if self.max_input_chars == 0 {
            return Err(ModerationError::ConfigurationError(
                "max input length must be greater than zero".to_string(),
            ));
        }

        let durations = [
            ("request timeout", self.request_timeout),
            ("health check timeout", self.health_check_timeout),
            ("online poll interval", self.online_poll_interval),
            ("offline poll interval", self.offline_poll_interval),
            ("connect timeout", self.connect_timeout),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ModerationError::ConfigurationError(format!(
                "{name} must be greater than zero"
            )));
        }

        if self.api_mode == ApiMode::Direct && self.model.trim().is_empty() {
            return Err(ModerationError::ConfigurationError(
                "direct mode requires a model".to_string(),
            ));
        }

        Ok(())
    }

    /// Load and validate a JSON configuration document.
    ///
    /// Durations are given in milliseconds (`requestTimeoutMs`, ...). Either
    /// `baseUrl` or both `moderationUrl` and `healthUrl` must be present.
    pub fn from_json_str(json: &str) -> Result<Self, ModerationError> {
        let file: ConfigFile = serde_json::from_str(json)
            .map_err(|e| ModerationError::ConfigurationError(format!("invalid config: {e}")))?;
        file.into_config()
    }

    /// Load and validate a configuration from `MODLENS_*` environment variables.
    pub fn from_env() -> Result<Self, ModerationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ModerationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ms = |key: &str| -> Result<Option<u64>, ModerationError> {
            lookup(key)
                .map(|v| {
                    v.trim().parse::<u64>().map_err(|_| {
                        ModerationError::ConfigurationError(format!(
                            "{key} must be a whole number of milliseconds"
                        ))
                    })
                })
                .transpose()
        };

        let max_input_chars = lookup("MODLENS_MAX_INPUT_CHARS")
            .map(|v| {
                v.trim().parse::<usize>().map_err(|_| {
                    ModerationError::ConfigurationError(
                        "MODLENS_MAX_INPUT_CHARS must be a whole number".to_string(),
                    )
                })
            })
            .transpose()?;

        let api_mode = lookup("MODLENS_API_MODE")
            .map(|v| v.parse::<ApiMode>())
            .transpose()?;

        let file = ConfigFile {
            base_url: lookup("MODLENS_BASE_URL"),
            moderation_url: lookup("MODLENS_MODERATION_URL"),
            health_url: lookup("MODLENS_HEALTH_URL"),
            max_input_chars,
            request_timeout_ms: ms("MODLENS_REQUEST_TIMEOUT_MS")?,
            health_check_timeout_ms: ms("MODLENS_HEALTH_CHECK_TIMEOUT_MS")?,
            online_poll_interval_ms: ms("MODLENS_ONLINE_POLL_INTERVAL_MS")?,
            offline_poll_interval_ms: ms("MODLENS_OFFLINE_POLL_INTERVAL_MS")?,
            connect_timeout_ms: ms("MODLENS_CONNECT_TIMEOUT_MS")?,
            api_mode,
            model: lookup("MODLENS_MODEL"),
            api_key: lookup("MODLENS_API_KEY"),
            user_agent: lookup("MODLENS_USER_AGENT"),
        };
        file.into_config()
    }
}

fn validate_url(name: &str, url: &str) -> Result<(), ModerationError> {
    if url.trim().is_empty() {
        return Err(ModerationError::ConfigurationError(format!(
            "{name} cannot be empty"
        )));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ModerationError::ConfigurationError(format!(
            "{name} must start with http:// or https:// (got '{url}')"
        )));
    }
    Ok(())
}

/// External configuration document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    moderation_url: Option<String>,
    health_url: Option<String>,
    max_input_chars: Option<usize>,
    request_timeout_ms: Option<u64>,
    health_check_timeout_ms: Option<u64>,
    online_poll_interval_ms: Option<u64>,
    offline_poll_interval_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    api_mode: Option<ApiMode>,
    model: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl ConfigFile {
    fn into_config(self) -> Result<Config, ModerationError> {
        let mut config = match (self.base_url, self.moderation_url, self.health_url) {
            (_, Some(moderation), Some(health)) => Config::new(moderation, health),
            (Some(base), moderation, health) => {
                let mut config = Config::for_backend(base);
                if let Some(moderation) = moderation {
                    config.moderation_url = moderation;
                }
                if let Some(health) = health {
                    config.health_url = health;
                }
                config
            }
            _ => {
                return Err(ModerationError::ConfigurationError(
                    "either a base URL or both moderation and health URLs are required"
                        .to_string(),
                ));
            }
        };

        if let Some(max) = self.max_input_chars {
            config.max_input_chars = max;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.health_check_timeout_ms {
            config.health_check_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.online_poll_interval_ms {
            config.online_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.offline_poll_interval_ms {
            config.offline_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(mode) = self.api_mode {
            config.api_mode = mode;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(key) = self.api_key.filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }

        config.validate()?;
        Ok(config)
    }
}
