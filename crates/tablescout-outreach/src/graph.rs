//! Facebook Messenger and Instagram DM adapter (Graph API messages
//! endpoint). One client per channel since the tokens differ.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tablescout_core::{Channel, Lead, SendOutcome};

use crate::error::OutreachError;
use crate::message::OutreachMessage;

const GRAPH_BASE: &str = "https://graph.facebook.com/v21.0";

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message_id: Option<String>,
}

pub struct GraphClient {
    client: Client,
    access_token: String,
    /// The page to send as. When unset, sends as the token's own identity.
    sender_page_id: Option<String>,
    base_url: String,
}

impl GraphClient {
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        sender_page_id: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, OutreachError> {
        Self::with_base_url(access_token, sender_page_id, timeout_secs, user_agent, GRAPH_BASE)
    }

    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        access_token: &str,
        sender_page_id: Option<&str>,
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
            access_token: access_token.to_owned(),
            sender_page_id: sender_page_id.map(str::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Sends to the lead's page when known, otherwise to the scoped user id.
    pub async fn send_facebook(&self, lead: &Lead, message: &OutreachMessage) -> SendOutcome {
        let recipient = lead
            .facebook_page_id
            .as_deref()
            .or_else(|| lead.facebook_user_id.as_deref());
        let Some(recipient) = recipient else {
            return SendOutcome::failed(Channel::Facebook, "no_facebook_access");
        };
        self.send_dm(Channel::Facebook, recipient, &message.short_text)
            .await
    }

    pub async fn send_instagram(&self, lead: &Lead, message: &OutreachMessage) -> SendOutcome {
        let Some(recipient) = lead.instagram_id.as_deref() else {
            return SendOutcome::failed(Channel::Instagram, "no_instagram_access");
        };
        self.send_dm(Channel::Instagram, recipient, &message.short_text)
            .await
    }

    async fn send_dm(&self, channel: Channel, recipient_id: &str, text: &str) -> SendOutcome {
        let sender = self.sender_page_id.as_deref().unwrap_or("me");
        let url = format!("{}/{sender}/messages", self.base_url);
        let body = serde_json::json!({
            "recipient": { "id": recipient_id },
            "message": { "text": text },
        });
        let response = match self
            .client
            .post(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return SendOutcome::failed(channel, format!("network_error: {e}")),
        };

        match response.status() {
            status if status.is_success() => {
                let id = response
                    .json::<MessageResponse>()
                    .await
                    .ok()
                    .and_then(|r| r.message_id);
                SendOutcome::sent(channel, id)
            }
            StatusCode::TOO_MANY_REQUESTS => SendOutcome::rate_limited(channel),
            // Platform messaging policy: contacting users outside an open
            // conversation window gets a 403.
            StatusCode::FORBIDDEN => SendOutcome::failed(channel, restriction_reason(channel)),
            status => SendOutcome::failed(channel, format!("graph_error: {status}")),
        }
    }
}

fn restriction_reason(channel: Channel) -> &'static str {
    match channel {
        Channel::Instagram => "instagram_dm_restricted",
        _ => "facebook_messenger_restricted",
    }
}
