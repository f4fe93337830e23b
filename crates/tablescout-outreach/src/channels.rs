//! The ordered channel descriptor table.
//!
//! Try order and per-channel data requirements live here as plain data, so
//! the orchestrator can filter and truncate without knowing anything about
//! the individual adapters.

use tablescout_core::{Channel, Lead};

/// One entry in the try-order table.
pub struct ChannelSpec {
    pub channel: Channel,
    /// Whether the lead carries the contact data this channel needs.
    pub has_required_data: fn(&Lead) -> bool,
}

fn has_email(lead: &Lead) -> bool {
    lead.email.is_some() || !lead.potential_emails.is_empty()
}

fn has_phone(lead: &Lead) -> bool {
    lead.phone.is_some()
}

fn has_facebook(lead: &Lead) -> bool {
    lead.facebook_page_id.is_some() || lead.facebook_user_id.is_some()
}

fn has_instagram(lead: &Lead) -> bool {
    lead.instagram_id.is_some()
}

/// Default try order: cheapest and least intrusive first.
pub const DEFAULT_CHANNEL_ORDER: [ChannelSpec; 5] = [
    ChannelSpec {
        channel: Channel::Email,
        has_required_data: has_email,
    },
    ChannelSpec {
        channel: Channel::Whatsapp,
        has_required_data: has_phone,
    },
    ChannelSpec {
        channel: Channel::Facebook,
        has_required_data: has_facebook,
    },
    ChannelSpec {
        channel: Channel::Instagram,
        has_required_data: has_instagram,
    },
    ChannelSpec {
        channel: Channel::Voicemail,
        has_required_data: has_phone,
    },
];

/// Whether `lead` carries the contact data `channel` needs.
#[must_use]
pub fn has_required_data(channel: Channel, lead: &Lead) -> bool {
    match channel {
        Channel::Email => has_email(lead),
        Channel::Whatsapp | Channel::Voicemail => has_phone(lead),
        Channel::Facebook => has_facebook(lead),
        Channel::Instagram => has_instagram(lead),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_channel_once() {
        for channel in Channel::ALL {
            assert_eq!(
                DEFAULT_CHANNEL_ORDER
                    .iter()
                    .filter(|s| s.channel == channel)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn email_requirement_accepts_guessed_addresses() {
        let mut lead = Lead::default();
        assert!(!has_required_data(Channel::Email, &lead));
        lead.potential_emails = vec!["info@x.example".to_owned()];
        assert!(has_required_data(Channel::Email, &lead));
    }

    #[test]
    fn facebook_accepts_either_page_or_user_id() {
        let mut lead = Lead::default();
        assert!(!has_required_data(Channel::Facebook, &lead));
        // Page discovery only ever fills the page id.
        lead.facebook_page_id = Some("page-1".to_owned());
        assert!(has_required_data(Channel::Facebook, &lead));
        let spec = DEFAULT_CHANNEL_ORDER
            .iter()
            .find(|s| s.channel == Channel::Facebook)
            .unwrap();
        assert!((spec.has_required_data)(&lead));

        let user_only = Lead {
            facebook_user_id: Some("user-1".to_owned()),
            ..Lead::default()
        };
        assert!(has_required_data(Channel::Facebook, &user_only));
    }

    #[test]
    fn phone_gates_both_whatsapp_and_voicemail() {
        let mut lead = Lead::default();
        assert!(!has_required_data(Channel::Whatsapp, &lead));
        assert!(!has_required_data(Channel::Voicemail, &lead));
        lead.phone = Some("555-867-5309".to_owned());
        assert!(has_required_data(Channel::Whatsapp, &lead));
        assert!(has_required_data(Channel::Voicemail, &lead));
    }
}
