use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outreach channel, in no particular order. The default try order is
/// defined by the outreach channel descriptor table, not by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Whatsapp,
    Facebook,
    Instagram,
    Voicemail,
}

impl Channel {
    /// All channels, for stats tables and CLI help text.
    pub const ALL: [Channel; 5] = [
        Channel::Email,
        Channel::Whatsapp,
        Channel::Facebook,
        Channel::Instagram,
        Channel::Voicemail,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
            Channel::Facebook => "facebook",
            Channel::Instagram => "instagram",
            Channel::Voicemail => "voicemail",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "whatsapp" => Ok(Channel::Whatsapp),
            "facebook" => Ok(Channel::Facebook),
            "instagram" => Ok(Channel::Instagram),
            "voicemail" => Ok(Channel::Voicemail),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}

/// Reasons a lead scored points during qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    TooManyReviews,
    NoWebsite,
    OutdatedWebsite,
    NoMenuPhotos,
    BrokenWebsite,
    NotOnDoordash,
    NoSocialMedia,
    LowSocialEngagement,
    OutdatedMenu,
    UnknownMenuAge,
    LowRating,
    NoProfessionalPhotos,
}

impl IssueTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueTag::TooManyReviews => "too_many_reviews",
            IssueTag::NoWebsite => "no_website",
            IssueTag::OutdatedWebsite => "outdated_website",
            IssueTag::NoMenuPhotos => "no_menu_photos",
            IssueTag::BrokenWebsite => "broken_website",
            IssueTag::NotOnDoordash => "not_on_doordash",
            IssueTag::NoSocialMedia => "no_social_media",
            IssueTag::LowSocialEngagement => "low_social_engagement",
            IssueTag::OutdatedMenu => "outdated_menu",
            IssueTag::UnknownMenuAge => "unknown_menu_age",
            IssueTag::LowRating => "low_rating",
            IssueTag::NoProfessionalPhotos => "no_professional_photos",
        }
    }
}

impl std::fmt::Display for IssueTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a lead. Leads are never deleted; outreach moves them
/// from `New` to `Contacted` (any channel) or `Emailed` (legacy email-only
/// runs). Both terminal states are skipped by the batch driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Emailed,
}

impl LeadStatus {
    /// True once the lead has been reached on some channel.
    #[must_use]
    pub fn is_contacted(self) -> bool {
        matches!(self, LeadStatus::Contacted | LeadStatus::Emailed)
    }
}

/// A candidate restaurant moving through scoring and outreach.
///
/// Created by a source adapter, enriched in place by email/social discovery
/// and the qualification scorer, and mutated by the batch driver to record
/// contact status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lead {
    // Identity
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yelp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Which source adapter produced this lead.
    pub source: String,

    // Contact surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Authoritative contact email, if discovery found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Ranked guesses tried in order by the email channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_followers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_user_id: Option<String>,

    // Reputation signals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default)]
    pub has_photos: bool,
    #[serde(default)]
    pub has_professional_photos: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_menu_update: Option<DateTime<Utc>>,

    // Derived by the scorer
    #[serde(default)]
    pub qualification_score: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IssueTag>,
    #[serde(default)]
    pub is_qualified: bool,

    // Lifecycle
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_channel: Option<Channel>,
}

impl Lead {
    /// Key used to de-duplicate leads merged from multiple sources.
    ///
    /// Prefers the provider-issued place ID; falls back to lowercased
    /// `name-address`.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.place_id.clone().unwrap_or_else(|| {
            format!("{}-{}", self.name, self.address).to_lowercase()
        })
    }

    /// Opaque identifier for tracking records. Mirrors [`Lead::dedup_key`]
    /// so attempt records line up with the persisted lead list.
    #[must_use]
    pub fn tracking_id(&self) -> String {
        self.dedup_key()
    }

    /// All email candidates in try order: the authoritative address first,
    /// then the ranked guesses.
    #[must_use]
    pub fn email_candidates(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(email) = self.email.as_deref() {
            out.push(email);
        }
        out.extend(self.potential_emails.iter().map(String::as_str));
        out
    }
}

/// Result of one channel try for one lead.
///
/// Expected-absence outcomes (`no_email`, `no_phone`, ...) are values, not
/// errors: the orchestrator treats them as ordinary control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub channel: Channel,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// True if the caller may attempt this channel again later (rate limit).
    #[serde(default)]
    pub retry: bool,
    /// For the email channel: the address that accepted the send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Provider-issued message/call identifier on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl SendOutcome {
    #[must_use]
    pub fn sent(channel: Channel, message_id: Option<String>) -> Self {
        Self {
            channel,
            success: true,
            reason: None,
            retry: false,
            email: None,
            message_id,
        }
    }

    #[must_use]
    pub fn failed(channel: Channel, reason: impl Into<String>) -> Self {
        Self {
            channel,
            success: false,
            reason: Some(reason.into()),
            retry: false,
            email: None,
            message_id: None,
        }
    }

    #[must_use]
    pub fn rate_limited(channel: Channel) -> Self {
        Self {
            channel,
            success: false,
            reason: Some("rate_limit".to_owned()),
            retry: true,
            email: None,
            message_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_prefers_place_id() {
        let lead = Lead {
            name: "Joe's Diner".to_owned(),
            address: "1 Main St".to_owned(),
            place_id: Some("ChIJabc123".to_owned()),
            ..Lead::default()
        };
        assert_eq!(lead.dedup_key(), "ChIJabc123");
    }

    #[test]
    fn dedup_key_falls_back_to_name_and_address() {
        let lead = Lead {
            name: "Joe's Diner".to_owned(),
            address: "1 Main St".to_owned(),
            ..Lead::default()
        };
        assert_eq!(lead.dedup_key(), "joe's diner-1 main st");
    }

    #[test]
    fn email_candidates_puts_authoritative_first() {
        let lead = Lead {
            email: Some("a@x.com".to_owned()),
            potential_emails: vec!["b@x.com".to_owned(), "c@x.com".to_owned()],
            ..Lead::default()
        };
        assert_eq!(lead.email_candidates(), vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[test]
    fn email_candidates_empty_without_contacts() {
        assert!(Lead::default().email_candidates().is_empty());
    }

    #[test]
    fn channel_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Channel::Whatsapp).unwrap(),
            "\"whatsapp\""
        );
    }

    #[test]
    fn channel_parses_case_insensitively() {
        assert_eq!("Email".parse::<Channel>().unwrap(), Channel::Email);
        assert!("smoke_signal".parse::<Channel>().is_err());
    }

    #[test]
    fn issue_tag_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&IssueTag::NotOnDoordash).unwrap(),
            "\"not_on_doordash\""
        );
    }

    #[test]
    fn status_default_is_new() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
        assert!(!LeadStatus::New.is_contacted());
        assert!(LeadStatus::Emailed.is_contacted());
    }
}
