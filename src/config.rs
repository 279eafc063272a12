//! Configuration loading
//!
//! Settings come from a TOML file (`--config`, `$ORCA_CONFIG`, or
//! `<config dir>/orca/config.toml`) with a few environment overrides for
//! secrets. Every section is optional; missing keys fall back to defaults.

use chrono::NaiveTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::pricing::yahoo::DEFAULT_QUOTE_URL;
use crate::reports::{Currency, ReportSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub schedule: ScheduleConfig,
    pub quotes: QuotesConfig,
    pub currency: CurrencyConfig,
    pub mailgun: MailgunConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Time of day as HH:MM
    pub at: String,
    /// Interpret `at` in UTC instead of local time
    pub utc: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: "08:00".to_string(),
            utc: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotesConfig {
    pub url: String,
    pub foreign_suffix: String,
    pub timeout_secs: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QUOTE_URL.to_string(),
            foreign_suffix: ".BK".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrencyConfig {
    pub domestic: Currency,
    pub foreign: Currency,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        let defaults = ReportSettings::default();
        Self {
            domestic: defaults.domestic,
            foreign: defaults.foreign,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailgunConfig {
    pub base_url: String,
    pub domain: Option<String>,
    pub api_key: Option<String>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub subject: String,
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mailgun.net/v3".to_string(),
            domain: None,
            api_key: None,
            recipient: None,
            sender: None,
            subject: "ORCA Daily Update".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, `$ORCA_CONFIG`, or the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os("ORCA_CONFIG").map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Reading config from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            ConfigError::Invalid { message, .. } => ConfigError::Invalid {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::Invalid {
            path: "<inline>".to_string(),
            message: e.message().to_string(),
        })?;
        parse_time_of_day(&config.schedule.at)?;
        Ok(config)
    }

    /// Environment variables win over the file for deployment secrets
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = lookup("ORCA_MAILGUN_DOMAIN") {
            self.mailgun.domain = Some(v);
        }
        if let Some(v) = lookup("ORCA_MAILGUN_API_KEY") {
            self.mailgun.api_key = Some(v);
        }
        if let Some(v) = lookup("ORCA_MAILGUN_RECIPIENT") {
            self.mailgun.recipient = Some(v);
        }
        if let Some(v) = lookup("ORCA_QUOTE_URL") {
            self.quotes.url = v;
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            foreign_suffix: self.quotes.foreign_suffix.clone(),
            domestic: self.currency.domestic.clone(),
            foreign: self.currency.foreign.clone(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.quotes.timeout_secs)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orca").join("config.toml"))
}

/// Parse `HH:MM` (24-hour clock)
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| ConfigError::InvalidTime(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.schedule.at, "08:00");
        assert!(!config.schedule.utc);
        assert_eq!(config.quotes.url, DEFAULT_QUOTE_URL);
        assert_eq!(config.report_settings(), ReportSettings::default());
        assert_eq!(config.mailgun.subject, "ORCA Daily Update");
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [schedule]
            at = "17:30"
            utc = true

            [currency.foreign]
            code = "EUR"
            symbol = "€"

            [quotes]
            foreign_suffix = ".PA"

            [mailgun]
            domain = "mg.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.at, "17:30");
        assert!(config.schedule.utc);
        let settings = config.report_settings();
        assert_eq!(settings.foreign_suffix, ".PA");
        assert_eq!(settings.foreign, Currency::new("EUR", "€"));
        assert_eq!(settings.domestic, Currency::new("USD", "$"));
        assert_eq!(config.mailgun.domain.as_deref(), Some("mg.example.com"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_toml("[schedule]\nat = \"25:00\"\n"),
            Err(ConfigError::InvalidTime(_))
        ));
        assert!(matches!(
            Config::from_toml("[nope]\n"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ORCA_MAILGUN_API_KEY", "secret"),
            ("ORCA_QUOTE_URL", "http://localhost:9000/quote"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.mailgun.api_key.as_deref(), Some("secret"));
        assert_eq!(config.quotes.url, "http://localhost:9000/quote");
        assert_eq!(config.mailgun.domain, None);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(matches!(
            Config::load(Some(Path::new("/nonexistent/orca.toml"))),
            Err(ConfigError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("08:05").unwrap(),
            NaiveTime::from_hms_opt(8, 5, 0).unwrap()
        );
        assert!(parse_time_of_day("8am").is_err());
    }
}
