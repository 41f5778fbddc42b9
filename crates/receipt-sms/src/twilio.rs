//! Twilio Messages API client.
//!
//! Sends replies with `POST /2010-04-01/Accounts/{sid}/Messages.json`
//! using HTTP basic auth and a form-encoded body.

use std::time::Duration;

use async_trait::async_trait;
use receipt_core::{ConfigError, MessageSender, MessagingError, OutboundMessage, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default Twilio REST API URL.
pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com";

/// Credentials and sender identity for the messaging provider.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from_number: String,
    pub base_url: String,
}

impl TwilioConfig {
    /// Assemble a config from optional settings.
    ///
    /// Returns `Ok(None)` when nothing is set (messaging disabled) and an
    /// error when only some of the settings are present.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        base_url: &str,
    ) -> Result<Option<Self>, ConfigError> {
        let account_sid = account_sid.filter(|s| !s.trim().is_empty());
        let auth_token = SecretString::from_optional(auth_token);
        let from_number = from_number.filter(|s| !s.trim().is_empty());

        match (account_sid, auth_token, from_number) {
            (None, None, None) => Ok(None),
            (Some(account_sid), Some(auth_token), Some(from_number)) => Ok(Some(Self {
                account_sid: account_sid.trim().to_string(),
                auth_token,
                from_number: from_number.trim().to_string(),
                base_url: base_url.trim_end_matches('/').to_string(),
            })),
            (sid, token, from) => {
                let missing: Vec<&str> = [
                    (sid.is_none(), "TWILIO_ACCOUNT_SID"),
                    (token.is_none(), "TWILIO_AUTH_TOKEN"),
                    (from.is_none(), "TWILIO_PHONE_NUMBER"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(ConfigError::IncompleteMessaging(missing.join(", ")))
            }
        }
    }
}

/// Messaging client implementing [`MessageSender`].
#[derive(Clone)]
pub struct TwilioClient {
    config: TwilioConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SendResponse {
    sid: Option<String>,
}

#[derive(Deserialize)]
struct TwilioErrorBody {
    message: String,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    pub fn from_number(&self) -> &str {
        &self.config.from_number
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url, self.config.account_sid
        )
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MessagingError> {
        let url = self.messages_url();
        debug!(to = %message.to, chars = message.body.len(), "Sending outbound message");

        let form = [
            ("To", message.to.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(self.config.auth_token.expose()))
            .form(&form)
            .send()
            .await
            .map_err(|e| MessagingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TwilioErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!(status_code = %status, "Outbound message rejected");
            return Err(MessagingError::Http {
                status: status.as_u16(),
                message,
            });
        }

        // The SID is only used for correlation in logs.
        let sid = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.sid)
            .unwrap_or_default();
        debug!(sid = %sid, "Outbound message accepted");

        Ok(())
    }
}
