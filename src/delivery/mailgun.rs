use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::Delivery;
use crate::config::MailgunConfig;
use crate::error::{ConfigError, DeliveryError};

/// Sends the report as a plain-text email through the Mailgun HTTP API
pub struct MailgunDelivery {
    client: Client,
    messages_url: String,
    api_key: String,
    from: String,
    to: String,
    subject: String,
}

impl MailgunDelivery {
    pub fn new(config: &MailgunConfig, timeout: Duration) -> anyhow::Result<Self> {
        let domain = required(&config.domain, "mailgun.domain")?;
        let api_key = required(&config.api_key, "mailgun.api_key")?;
        let to = required(&config.recipient, "mailgun.recipient")?;

        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; OrcaBot/1.0)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            messages_url: format!(
                "{}/{}/messages",
                config.base_url.trim_end_matches('/'),
                domain
            ),
            api_key,
            from: config
                .sender
                .clone()
                .unwrap_or_else(|| format!("ORCA <mailgun@{}>", domain)),
            to,
            subject: config.subject.clone(),
        })
    }

    fn form<'a>(&'a self, body: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("subject", self.subject.as_str()),
            ("text", body),
        ]
    }
}

fn required(value: &Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingMailgun(key))
}

#[async_trait]
impl Delivery for MailgunDelivery {
    async fn deliver(&self, body: &str) -> Result<(), DeliveryError> {
        info!("Sending report to {} via Mailgun", self.to);

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth("api", Some(&self.api_key))
            .form(&self.form(body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Mailgun accepted message ({})", status);
        Ok(())
    }

    fn describe(&self) -> String {
        self.to.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailgunConfig {
        MailgunConfig {
            domain: Some("mg.example.com".to_string()),
            api_key: Some("key-123".to_string()),
            recipient: Some("me@example.com".to_string()),
            ..MailgunConfig::default()
        }
    }

    #[test]
    fn test_defaults_sender_and_url() {
        let delivery = MailgunDelivery::new(&config(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            delivery.messages_url,
            "https://api.mailgun.net/v3/mg.example.com/messages"
        );
        assert_eq!(delivery.from, "ORCA <mailgun@mg.example.com>");
        assert_eq!(delivery.describe(), "me@example.com");

        let form = delivery.form("hello");
        assert_eq!(form[2], ("subject", "ORCA Daily Update"));
        assert_eq!(form[3], ("text", "hello"));
    }

    #[test]
    fn test_missing_settings_are_config_errors() {
        let mut cfg = config();
        cfg.api_key = Some("  ".to_string());

        let err = MailgunDelivery::new(&cfg, Duration::from_secs(5))
            .err()
            .expect("blank api key should fail");
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::MissingMailgun(key)) => assert_eq!(*key, "mailgun.api_key"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
