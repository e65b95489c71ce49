use std::env;
use std::time::Duration;

use career_core::model::UserId;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_AI_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_DB_URL: &str = "sqlite://career.sqlite3";
pub const DEFAULT_ROADMAP_LIMIT: u32 = 5;
pub const DEFAULT_DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the guidance backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiBackendConfig {
    pub base_url: Url,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl AiBackendConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| ConfigError::Invalid {
            key: "CAREER_AI_BASE_URL",
            reason: err.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "CAREER_AI_BASE_URL",
                reason: format!("unsupported scheme `{}`", base_url.scheme()),
            });
        }
        Ok(Self { base_url, timeout })
    }

    /// Join an endpoint path onto the base URL, keeping any base path prefix.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Everything the app needs to assemble its services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub ai: AiBackendConfig,
    pub db_url: String,
    /// How long a progress write waits on a locked database.
    pub db_busy_timeout: Duration,
    pub user_id: Option<UserId>,
    pub roadmap_limit: u32,
}

impl AppConfig {
    /// Read `CAREER_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = non_blank("CAREER_AI_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|err| ConfigError::Invalid {
                        key: "CAREER_AI_TIMEOUT_SECS",
                        reason: err.to_string(),
                    })
            })
            .transpose()?;
        let base_url =
            non_blank("CAREER_AI_BASE_URL").unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string());
        let ai = AiBackendConfig::new(&base_url, timeout)?;

        let roadmap_limit = non_blank("CAREER_ROADMAP_LIMIT")
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .map_err(|err| ConfigError::Invalid {
                        key: "CAREER_ROADMAP_LIMIT",
                        reason: err.to_string(),
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_ROADMAP_LIMIT);

        let db_busy_timeout = non_blank("CAREER_DB_BUSY_TIMEOUT_MS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|err| ConfigError::Invalid {
                        key: "CAREER_DB_BUSY_TIMEOUT_MS",
                        reason: err.to_string(),
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_DB_BUSY_TIMEOUT);

        Ok(Self {
            ai,
            db_url: non_blank("CAREER_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string()),
            db_busy_timeout,
            user_id: non_blank("CAREER_USER_ID").map(|id| UserId::new(id.trim())),
            roadmap_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ai.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.ai.timeout, None);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.db_busy_timeout, DEFAULT_DB_BUSY_TIMEOUT);
        assert_eq!(config.user_id, None);
        assert_eq!(config.roadmap_limit, DEFAULT_ROADMAP_LIMIT);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CAREER_AI_BASE_URL", "https://guide.example.com/api/"),
            ("CAREER_AI_TIMEOUT_SECS", "30"),
            ("CAREER_USER_ID", " user-7 "),
            ("CAREER_ROADMAP_LIMIT", "3"),
            ("CAREER_DB_URL", "sqlite::memory:"),
            ("CAREER_DB_BUSY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(
            config.ai.endpoint("/generate-roadmap"),
            "https://guide.example.com/api/generate-roadmap"
        );
        assert_eq!(config.ai.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.user_id, Some(UserId::new("user-7")));
        assert_eq!(config.roadmap_limit, 3);
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.db_busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(AppConfig::from_lookup(lookup(&[("CAREER_AI_BASE_URL", "ftp://x")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("CAREER_AI_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("CAREER_ROADMAP_LIMIT", "-1")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[("CAREER_DB_BUSY_TIMEOUT_MS", "5s")])).is_err()
        );
    }
}
