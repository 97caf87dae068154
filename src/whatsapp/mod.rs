pub mod message;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::TwilioConfig;
use crate::models::MessageSid;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Explicit outcome of one send, so callers can count or escalate
/// failures instead of grepping log text.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Twilio API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed Twilio response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one text message to the configured destination.
    async fn notify(&self, body: &str) -> Result<MessageSid, SendError>;
}

/// Sends WhatsApp messages through the Twilio Messages REST endpoint.
pub struct TwilioNotifier {
    client: Client,
    config: TwilioConfig,
    api_base: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl TwilioNotifier {
    pub fn new(client: Client, config: TwilioConfig) -> Self {
        Self {
            client,
            config,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(
        client: Client,
        config: TwilioConfig,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config,
            api_base: api_base.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.config.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn notify(&self, body: &str) -> Result<MessageSid, SendError> {
        let form = [
            ("From", self.config.from_whatsapp.as_str()),
            ("To", self.config.to_whatsapp.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(SendError::Api {
                status: status.as_u16(),
                message: error.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| SendError::MalformedResponse(e.to_string()))?;

        info!("Message sent: {}", parsed.sid);
        Ok(MessageSid(parsed.sid))
    }
}
