//! Configuration file parsing and management.
//!
//! Settings come from TOML files, `HC_*` environment variables and the
//! command line. This module covers the first two; callers layer CLI flags
//! on top.

use crate::credentials::{ClientCredentials, Credentials, Secret};
use crate::error::HandleCheckError;
use crate::types::CheckConfig;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    pub defaults: Option<DefaultsConfig>,

    /// Per-platform credentials
    pub credentials: Option<CredentialsConfig>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Per-probe timeout (as string, e.g. "500ms", "5s", "2m")
    pub timeout: Option<String>,

    /// Maximum probes in flight for multi-platform checks
    pub concurrency: Option<usize>,
}

/// `[credentials]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub twitch: Option<ClientCredentialsConfig>,
    pub twitter: Option<BearerTokenConfig>,
}

#[derive(Clone, Deserialize, Default)]
pub struct ClientCredentialsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Deserialize, Default)]
pub struct BearerTokenConfig {
    pub bearer_token: Option<String>,
}

impl fmt::Debug for BearerTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenConfig")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FileConfig {
    /// Parsed default timeout. Already validated by [`ConfigManager::load_file`].
    pub fn timeout(&self) -> Option<Duration> {
        self.defaults
            .as_ref()
            .and_then(|d| d.timeout.as_deref())
            .and_then(parse_timeout_string)
    }

    pub fn concurrency(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.concurrency)
    }

    /// Overlay file defaults onto `config`.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(timeout) = self.timeout() {
            config = config.with_timeout(timeout);
        }
        if let Some(concurrency) = self.concurrency() {
            config = config.with_concurrency(concurrency);
        }
        config
    }

    /// Credentials declared in the file. Incomplete entries are skipped.
    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::new();
        let Some(section) = &self.credentials else {
            return credentials;
        };

        if let Some(ClientCredentialsConfig {
            client_id: Some(id),
            client_secret: Some(secret),
        }) = &section.twitch
        {
            credentials = credentials
                .with_client_credentials("twitch", ClientCredentials::new(id.as_str(), secret.as_str()));
        }
        if let Some(BearerTokenConfig {
            bearer_token: Some(token),
        }) = &section.twitter
        {
            credentials = credentials.with_bearer_token("twitter", token.as_str());
        }
        credentials
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Clone, Default)]
pub struct ConfigManager;

impl ConfigManager {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, HandleCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HandleCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            HandleCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            HandleCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, HandleCheckError> {
        let mut merged_config = FileConfig::default();

        // Lowest precedence first
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged_config = self.merge_configs(merged_config, config),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping config file"),
            }
        }

        Ok(merged_config)
    }

    /// Look for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./handle-check.toml", "./.handle-check.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Look for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".handle-check.toml");
        path.exists().then_some(path)
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("handle-check").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations. Values from `higher` win.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                    concurrency: higher_defaults.concurrency.or(lower_defaults.concurrency),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            credentials: match (lower.credentials, higher.credentials) {
                // Credentials are replaced per platform, never mixed field by field
                (Some(lower_creds), Some(higher_creds)) => Some(CredentialsConfig {
                    twitch: higher_creds.twitch.or(lower_creds.twitch),
                    twitter: higher_creds.twitter.or(lower_creds.twitter),
                }),
                (lower_creds, higher_creds) => higher_creds.or(lower_creds),
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), HandleCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(HandleCheckError::config(
                        "Concurrency must be between 1 and 100",
                    ));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(HandleCheckError::config(format!(
                        "Invalid timeout format '{}'. Use format like '500ms', '5s', '2m'",
                        timeout_str
                    )));
                }
            }
        }

        if let Some(credentials) = &config.credentials {
            if let Some(twitch) = &credentials.twitch {
                let has_id = twitch.client_id.as_deref().is_some_and(|s| !s.is_empty());
                let has_secret = twitch.client_secret.as_deref().is_some_and(|s| !s.is_empty());
                if !(has_id && has_secret) {
                    return Err(HandleCheckError::config(
                        "[credentials.twitch] needs both client_id and client_secret",
                    ));
                }
            }
            if let Some(twitter) = &credentials.twitter {
                if twitter.bearer_token.as_deref().map_or(true, str::is_empty) {
                    return Err(HandleCheckError::config(
                        "[credentials.twitter] bearer_token cannot be empty",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Settings read from `HC_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub timeout: Option<Duration>,
    pub concurrency: Option<usize>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<Secret>,
    pub twitter_bearer_token: Option<Secret>,
}

impl EnvConfig {
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        config
    }

    /// Credentials from the environment. Twitch needs both halves.
    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::new();
        match (&self.twitch_client_id, &self.twitch_client_secret) {
            (Some(id), Some(secret)) => {
                credentials = credentials.with_client_credentials(
                    "twitch",
                    ClientCredentials::new(id.as_str(), secret.expose()),
                );
            }
            (None, None) => {}
            _ => tracing::warn!(
                "HC_TWITCH_CLIENT_ID and HC_TWITCH_CLIENT_SECRET must be set together, ignoring"
            ),
        }
        if let Some(token) = &self.twitter_bearer_token {
            credentials = credentials.with_bearer_token("twitter", token.expose());
        }
        credentials
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with an injectable variable lookup.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(val) = non_empty("HC_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(timeout) => {
                tracing::debug!(value = %val, "using HC_TIMEOUT");
                env_config.timeout = Some(timeout);
            }
            None => tracing::warn!(value = %val, "invalid HC_TIMEOUT, use a format like '500ms', '5s', '2m'"),
        }
    }

    if let Some(val) = non_empty("HC_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=100).contains(&concurrency) => {
                tracing::debug!(concurrency, "using HC_CONCURRENCY");
                env_config.concurrency = Some(concurrency);
            }
            _ => tracing::warn!(value = %val, "invalid HC_CONCURRENCY, must be 1-100"),
        }
    }

    env_config.twitch_client_id = non_empty("HC_TWITCH_CLIENT_ID");
    env_config.twitch_client_secret = non_empty("HC_TWITCH_CLIENT_SECRET").map(Secret::new);
    env_config.twitter_bearer_token = non_empty("HC_TWITTER_BEARER_TOKEN").map(Secret::new);

    env_config
}

/// Parse a timeout string like "500ms", "5s" or "2m". Bare numbers are seconds.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }?;

    (!duration.is_zero()).then_some(duration)
}
