//! WhatsApp and voicemail channel adapter (VAPI-shaped REST API).

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tablescout_core::{Channel, Lead, SendOutcome};

use crate::error::OutreachError;
use crate::message::OutreachMessage;

const VAPI_BASE: &str = "https://api.vapi.ai";

#[derive(Deserialize)]
struct CreatedResponse {
    id: String,
}

pub struct VapiClient {
    client: Client,
    api_key: String,
    phone_number_id: String,
    base_url: String,
}

impl VapiClient {
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        phone_number_id: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, OutreachError> {
        Self::with_base_url(api_key, phone_number_id, timeout_secs, user_agent, VAPI_BASE)
    }

    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        phone_number_id: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, OutreachError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            phone_number_id: phone_number_id.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub async fn send_whatsapp(&self, lead: &Lead, message: &OutreachMessage) -> SendOutcome {
        let Some(number) = customer_number(lead) else {
            return missing_phone(Channel::Whatsapp, lead);
        };
        let body = serde_json::json!({
            "phoneNumberId": self.phone_number_id,
            "channel": "whatsapp",
            "customer": { "number": number },
            "message": { "text": message.short_text },
        });
        self.post(Channel::Whatsapp, "/v1/messages", &body).await
    }

    /// Places an outbound call that reads the pitch as a voicemail drop.
    pub async fn send_voicemail(&self, lead: &Lead, message: &OutreachMessage) -> SendOutcome {
        let Some(number) = customer_number(lead) else {
            return missing_phone(Channel::Voicemail, lead);
        };
        let body = serde_json::json!({
            "phoneNumberId": self.phone_number_id,
            "customer": { "number": number },
            "assistant": {
                "firstMessage": message.short_text,
                "voicemailMessage": message.short_text,
            },
        });
        self.post(Channel::Voicemail, "/v1/calls", &body).await
    }

    async fn post(
        &self,
        channel: Channel,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> SendOutcome {
        let url = format!("{}{endpoint}", self.base_url);
        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return SendOutcome::failed(channel, format!("network_error: {e}")),
        };

        match response.status() {
            status if status.is_success() => {
                let id = response.json::<CreatedResponse>().await.ok().map(|r| r.id);
                SendOutcome::sent(channel, id)
            }
            StatusCode::TOO_MANY_REQUESTS => SendOutcome::rate_limited(channel),
            status => SendOutcome::failed(channel, format!("vapi_error: {status}")),
        }
    }
}

fn missing_phone(channel: Channel, lead: &Lead) -> SendOutcome {
    if lead.phone.is_none() {
        SendOutcome::failed(channel, "no_phone")
    } else {
        SendOutcome::failed(channel, "invalid_phone")
    }
}

fn customer_number(lead: &Lead) -> Option<String> {
    normalize_us_phone(lead.phone.as_deref()?)
}

/// Strip formatting and produce an E.164-ish US number. Bare 10-digit
/// numbers get the `1` country code; anything else of the wrong length is
/// rejected.
fn normalize_us_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(format!("+1{digits}")),
        11 if digits.starts_with('1') => Some(format!("+{digits}")),
        _ => None,
    }
}
