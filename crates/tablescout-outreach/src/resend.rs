//! Email channel adapter (Resend-shaped REST API).

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tablescout_core::{Channel, Lead, SendOutcome};

use crate::error::OutreachError;
use crate::message::OutreachMessage;

const RESEND_BASE: &str = "https://api.resend.com";

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

pub struct ResendEmailClient {
    client: Client,
    api_key: String,
    base_url: String,
    from_email: String,
    from_name: String,
}

impl ResendEmailClient {
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        from_email: &str,
        from_name: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, OutreachError> {
        Self::with_base_url(api_key, from_email, from_name, timeout_secs, user_agent, RESEND_BASE)
    }

    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        from_email: &str,
        from_name: &str,
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
            base_url: base_url.trim_end_matches('/').to_owned(),
            from_email: from_email.to_owned(),
            from_name: from_name.to_owned(),
        })
    }

    /// Try every email candidate in order. Invalid-address rejections advance
    /// to the next candidate; anything else ends the channel attempt.
    pub async fn send(&self, lead: &Lead, message: &OutreachMessage) -> SendOutcome {
        let candidates = lead.email_candidates();
        if candidates.is_empty() {
            return SendOutcome::failed(Channel::Email, "no_email");
        }

        let url = format!("{}/emails", self.base_url);
        let from = format!("{} <{}>", self.from_name, self.from_email);

        for candidate in candidates {
            let body = serde_json::json!({
                "from": from,
                "to": [candidate],
                "subject": message.subject,
                "text": message.text,
                "html": message.html,
            });
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    return SendOutcome::failed(Channel::Email, format!("network_error: {e}"));
                }
            };

            match response.status() {
                status if status.is_success() => {
                    let id = response.json::<SendResponse>().await.ok().map(|r| r.id);
                    let mut outcome = SendOutcome::sent(Channel::Email, id);
                    outcome.email = Some(candidate.to_owned());
                    return outcome;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return SendOutcome::rate_limited(Channel::Email);
                }
                // Validation rejections mean this address is bad, not the
                // channel; move to the next candidate.
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    tracing::debug!(candidate, "address rejected, trying next");
                }
                status => {
                    let detail = response
                        .json::<ErrorResponse>()
                        .await
                        .unwrap_or_default()
                        .message;
                    let reason = if detail.is_empty() {
                        format!("email_provider_error: {status}")
                    } else {
                        detail
                    };
                    return SendOutcome::failed(Channel::Email, reason);
                }
            }
        }

        SendOutcome::failed(Channel::Email, "all_emails_failed")
    }
}
