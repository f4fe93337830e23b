//! Configured channel adapters, one slot per provider. A `None` slot means
//! the provider's credentials were not set and the channel is unavailable.

use tablescout_core::{AppConfig, Channel, Lead, SendOutcome};

use crate::error::OutreachError;
use crate::graph::GraphClient;
use crate::message::OutreachMessage;
use crate::resend::ResendEmailClient;
use crate::vapi::VapiClient;

#[derive(Default)]
pub struct ChannelSenders {
    pub email: Option<ResendEmailClient>,
    pub vapi: Option<VapiClient>,
    pub facebook: Option<GraphClient>,
    pub instagram: Option<GraphClient>,
}

impl ChannelSenders {
    /// Builds adapters for every provider with configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`OutreachError::Http`] if a `reqwest::Client` cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, OutreachError> {
        let email = match &config.resend_api_key {
            Some(key) => Some(ResendEmailClient::new(
                key,
                &config.from_email,
                &config.from_name,
                config.request_timeout_secs,
                &config.user_agent,
            )?),
            None => None,
        };
        let vapi = match (&config.vapi_api_key, &config.vapi_phone_number_id) {
            (Some(key), Some(phone_number_id)) => Some(VapiClient::new(
                key,
                phone_number_id,
                config.request_timeout_secs,
                &config.user_agent,
            )?),
            _ => None,
        };
        let facebook = match &config.facebook_access_token {
            Some(token) => Some(GraphClient::new(
                token,
                config.facebook_page_id.as_deref(),
                config.request_timeout_secs,
                &config.user_agent,
            )?),
            None => None,
        };
        let instagram = match &config.instagram_access_token {
            Some(token) => Some(GraphClient::new(
                token,
                None,
                config.request_timeout_secs,
                &config.user_agent,
            )?),
            None => None,
        };
        Ok(Self {
            email,
            vapi,
            facebook,
            instagram,
        })
    }

    /// Whether the provider behind `channel` is configured at all.
    #[must_use]
    pub fn is_configured(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email.is_some(),
            Channel::Whatsapp | Channel::Voicemail => self.vapi.is_some(),
            Channel::Facebook => self.facebook.is_some(),
            Channel::Instagram => self.instagram.is_some(),
        }
    }

    /// Dispatch one attempt on `channel`.
    pub async fn send(
        &self,
        channel: Channel,
        lead: &Lead,
        message: &OutreachMessage,
    ) -> SendOutcome {
        match channel {
            Channel::Email => match &self.email {
                Some(client) => client.send(lead, message).await,
                None => SendOutcome::failed(channel, "channel_not_configured"),
            },
            Channel::Whatsapp => match &self.vapi {
                Some(client) => client.send_whatsapp(lead, message).await,
                None => SendOutcome::failed(channel, "channel_not_configured"),
            },
            Channel::Voicemail => match &self.vapi {
                Some(client) => client.send_voicemail(lead, message).await,
                None => SendOutcome::failed(channel, "channel_not_configured"),
            },
            Channel::Facebook => match &self.facebook {
                Some(client) => client.send_facebook(lead, message).await,
                None => SendOutcome::failed(channel, "channel_not_configured"),
            },
            Channel::Instagram => match &self.instagram {
                Some(client) => client.send_instagram(lead, message).await,
                None => SendOutcome::failed(channel, "channel_not_configured"),
            },
        }
    }
}
