//! Outbound mail channel.
//!
//! Delivery goes through an HTTP mail API; the wire protocol is opaque to
//! the rest of the system. Missing credentials or recipients put the
//! channel in a no-op state that is logged, never surfaced as an error.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::warn;

use crate::config::MailerConfig;

pub struct Mailer {
    config: Option<MailerConfig>,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

impl Mailer {
    pub fn new(config: Option<MailerConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Deliver one message. Returns `Ok(true)` when handed to the mail API,
    /// `Ok(false)` when skipped because the channel is unconfigured or no
    /// recipient could be resolved.
    pub async fn send(
        &self,
        recipients: Option<&[String]>,
        subject: &str,
        html: &str,
    ) -> Result<bool> {
        let Some(config) = &self.config else {
            warn!("mail credentials missing; message not sent");
            return Ok(false);
        };

        let to: Vec<String> = match recipients.filter(|r| !r.is_empty()) {
            Some(explicit) => explicit.to_vec(),
            None => match &config.default_to {
                Some(default) => vec![default.clone()],
                None => {
                    warn!("no recipient configured; set MAIL_TO or supply recipients");
                    return Ok(false);
                }
            },
        };

        let message = MailMessage {
            from: &config.from,
            to: &to,
            subject,
            html,
        };
        let resp = self
            .http
            .post(&config.api_url)
            .bearer_auth(&config.api_token)
            .json(&message)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("mail delivery failed ({status}): {text}");
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_mailer_skips_without_error() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_configured());
        let sent = mailer.send(None, "subject", "<p>body</p>").await.unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn missing_recipient_skips_without_error() {
        let mailer = Mailer::new(Some(MailerConfig {
            api_url: "http://mail.invalid/send".into(),
            api_token: "token".into(),
            from: "planner@example.com".into(),
            default_to: None,
        }));
        let sent = mailer.send(None, "subject", "<p>body</p>").await.unwrap();
        assert!(!sent);

        let sent = mailer
            .send(Some(&[]), "subject", "<p>body</p>")
            .await
            .unwrap();
        assert!(!sent);
    }
}
