//! Outreach copy, personalized from the lead's issue tags.

use tablescout_core::{IssueTag, Lead};

/// One message rendered for every channel shape: full email (subject, text,
/// html) plus a short form for DMs, WhatsApp, and voicemail TTS.
#[derive(Debug, Clone)]
pub struct OutreachMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
    pub short_text: String,
}

/// The opening line, picked by issue priority: delivery gap beats website
/// problems beats photo problems beats the generic pitch.
fn hook(lead: &Lead) -> String {
    let has = |tag: IssueTag| lead.issues.contains(&tag);

    if has(IssueTag::NotOnDoordash) {
        format!(
            "I noticed {} isn't on DoorDash yet - local spots usually see a 20-30% \
             order bump in the first month after going live.",
            lead.name
        )
    } else if has(IssueTag::NoWebsite) {
        format!(
            "I looked for {}'s website and couldn't find one - these days that's \
             where most new customers decide where to eat.",
            lead.name
        )
    } else if has(IssueTag::BrokenWebsite) || has(IssueTag::OutdatedWebsite) {
        format!(
            "I tried to pull up {}'s website and it could use some love - a quick \
             refresh usually pays for itself fast.",
            lead.name
        )
    } else if has(IssueTag::NoMenuPhotos) || has(IssueTag::NoProfessionalPhotos) {
        format!(
            "Your food at {} deserves better photos - great shots of real dishes \
             are the single cheapest way to win walk-ins from search.",
            lead.name
        )
    } else {
        format!(
            "I help independent restaurants like {} get found by more hungry \
             locals online.",
            lead.name
        )
    }
}

/// Render the message for `lead`, signed by `from_name`.
#[must_use]
pub fn build_message(lead: &Lead, from_name: &str) -> OutreachMessage {
    let opener = hook(lead);
    let subject = format!("Quick question about {}", lead.name);
    let text = format!(
        "Hi,\n\n{opener}\n\nI put together a few free, concrete ideas for {} - \
         no strings attached. Worth a five minute chat this week?\n\n{from_name}",
        lead.name
    );
    let html = format!(
        "<p>Hi,</p><p>{opener}</p><p>I put together a few free, concrete ideas \
         for {} - no strings attached. Worth a five minute chat this week?</p>\
         <p>{from_name}</p>",
        lead.name
    );
    let short_text = format!("Hi! {opener} Open to a quick chat? - {from_name}");

    OutreachMessage {
        subject,
        text,
        html,
        short_text,
    }
}
