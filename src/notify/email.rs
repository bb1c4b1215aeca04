use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::configuration::EmailConfig;
use crate::error_handling::types::NotifyError;

/// Body of the outbound email hook.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmailOutcome {
    /// Accepted by the provider, with whatever it answered.
    Sent(Value),
    /// No provider key configured; nothing left the process.
    Simulated,
}

/// Provider API request structure
#[derive(Serialize)]
struct ProviderRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

/// Sends transactional email through an HTTP provider API.
pub struct EmailDispatcher {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailDispatcher {
    pub fn new(config: EmailConfig) -> Self {
        if config.api_key.is_none() {
            warn!("No email API key configured, outbound email will be simulated");
        }
        Self { config, client: reqwest::Client::new() }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<EmailOutcome, NotifyError> {
        let to = message.to.trim();
        if to.is_empty() || !to.contains('@') {
            return Err(NotifyError::InvalidMessage("recipient address is missing".into()));
        }
        if message.subject.trim().is_empty() {
            return Err(NotifyError::InvalidMessage("subject is empty".into()));
        }

        let Some(ref key) = self.config.api_key else {
            info!("Email to {} simulated (provider not configured)", to);
            return Ok(EmailOutcome::Simulated);
        };

        let body = ProviderRequest {
            from: &self.config.sender,
            to: vec![to],
            subject: message.subject.trim(),
            html: format!("<p>{}</p>", escape_html(&message.message)),
        };
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Email provider request failed: {}", e);
                NotifyError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            error!("Email provider rejected message to {}: {} {}", to, status, payload);
            return Err(NotifyError::ProviderRejected(status.as_u16(), payload.to_string()));
        }
        info!("Email sent to {}", to);
        Ok(EmailOutcome::Sent(payload))
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
