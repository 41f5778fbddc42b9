//! Process-wide configuration from flags and environment variables.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use receipt_core::{
    AnalyzerConfig, ConfigError, ReceiptAnalyzer, SecretString, DEFAULT_MAX_IMAGE_BYTES,
};
use receipt_sms::{TwilioClient, TwilioConfig, DEFAULT_TWILIO_URL};
use receipt_vision::{OpenAiVisionClient, DEFAULT_MODEL, DEFAULT_OPENAI_URL};

#[derive(Args)]
pub struct ModelArgs {
    /// API key for the chat completions provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of the chat completions API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_URL)]
    pub openai_base_url: String,

    /// Vision-capable model to use
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Seconds to wait for the model before giving up
    #[arg(long, env = "RECEIPT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Largest inline image accepted, in decoded bytes
    #[arg(long, env = "RECEIPT_MAX_IMAGE_BYTES", default_value_t = DEFAULT_MAX_IMAGE_BYTES)]
    pub max_image_bytes: usize,
}

impl ModelArgs {
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least 1 second".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid("max image bytes must be positive".into()));
        }
        Ok(AnalyzerConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_image_bytes: self.max_image_bytes,
        })
    }

    /// Construct the model client once and wrap it in the request handler.
    ///
    /// A missing API key is not fatal here: the handler reports it per
    /// request as a server misconfiguration.
    pub fn build_analyzer(&self) -> Result<ReceiptAnalyzer, ConfigError> {
        let config = self.analyzer_config()?;
        let api_key = SecretString::from_optional(self.openai_api_key.clone());
        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; analysis requests will fail with 500");
        }

        let client = OpenAiVisionClient::new(&self.openai_base_url, &self.model, api_key);
        tracing::info!(
            model = client.model(),
            timeout_secs = self.timeout_secs,
            max_image_bytes = self.max_image_bytes,
            "Vision model configured"
        );
        Ok(ReceiptAnalyzer::new(Arc::new(client), config))
    }
}

#[derive(Args)]
pub struct MessagingArgs {
    /// Messaging provider account SID
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    /// Messaging provider auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub twilio_auth_token: Option<String>,

    /// Phone number replies are sent from
    #[arg(long, env = "TWILIO_PHONE_NUMBER")]
    pub twilio_phone_number: Option<String>,

    /// Base URL of the messaging provider API
    #[arg(long, env = "TWILIO_BASE_URL", default_value = DEFAULT_TWILIO_URL)]
    pub twilio_base_url: String,
}

impl MessagingArgs {
    /// `Ok(None)` when messaging is not configured at all.
    pub fn build_client(&self) -> Result<Option<TwilioClient>, ConfigError> {
        let config = TwilioConfig::from_parts(
            self.twilio_account_sid.clone(),
            self.twilio_auth_token.clone(),
            self.twilio_phone_number.clone(),
            &self.twilio_base_url,
        )?;
        Ok(config.map(TwilioClient::new))
    }
}
