use tablescout_core::{Channel, Lead};
use tablescout_store::MemoryTrackingStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::graph::GraphClient;
use crate::message::OutreachMessage;
use crate::orchestrator::{
    available_channels, send_multi_channel_outreach, OutreachOptions, ALL_CHANNELS_FAILED,
    NO_AVAILABLE_CHANNELS,
};
use crate::resend::ResendEmailClient;
use crate::senders::ChannelSenders;
use crate::vapi::VapiClient;

fn message() -> OutreachMessage {
    OutreachMessage {
        subject: "s".to_owned(),
        text: "t".to_owned(),
        html: "<p>t</p>".to_owned(),
        short_text: "st".to_owned(),
    }
}

fn email_client(base: &str) -> ResendEmailClient {
    ResendEmailClient::with_base_url("k", "hello@tablescout.app", "Sam", 5, "t", base).unwrap()
}

fn vapi_client(base: &str) -> VapiClient {
    VapiClient::with_base_url("k", "pn-1", 5, "t", base).unwrap()
}

fn graph_client(base: &str) -> GraphClient {
    GraphClient::with_base_url("k", None, 5, "t", base).unwrap()
}

/// A lead reachable on every channel.
fn full_lead() -> Lead {
    Lead {
        name: "Joe's Diner".to_owned(),
        address: "1 Main St".to_owned(),
        email: Some("a@x.com".to_owned()),
        phone: Some("559-555-0123".to_owned()),
        facebook_user_id: Some("fb-9".to_owned()),
        instagram_id: Some("ig-9".to_owned()),
        ..Lead::default()
    }
}

async fn server_returning(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn first_success_ends_the_run() {
    let ok = server_returning(200, serde_json::json!({"id": "m-1"})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&ok.uri())),
        vapi: Some(vapi_client(&ok.uri())),
        ..ChannelSenders::default()
    };
    let tracking = MemoryTrackingStore::new();

    let result = send_multi_channel_outreach(
        &full_lead(),
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(result.contacted);
    assert_eq!(result.channel, Some(Channel::Email));
    assert_eq!(result.attempts.len(), 1);
    let log = tracking.log().await;
    assert_eq!(log.outreach.len(), 1);
    assert!(log.outreach[0].success);
}

#[tokio::test]
async fn failure_advances_to_next_channel() {
    let broken = server_returning(500, serde_json::json!({})).await;
    let ok = server_returning(201, serde_json::json!({"id": "wa-1"})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&broken.uri())),
        vapi: Some(vapi_client(&ok.uri())),
        ..ChannelSenders::default()
    };
    let tracking = MemoryTrackingStore::new();

    let result = send_multi_channel_outreach(
        &full_lead(),
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(result.contacted);
    assert_eq!(result.channel, Some(Channel::Whatsapp));
    assert_eq!(result.attempts.len(), 2);
    assert!(!result.attempts[0].success);

    let log = tracking.log().await;
    assert_eq!(log.outreach.len(), 2);
    assert_eq!(log.stats.total, 2);
    assert_eq!(log.stats.successful, 1);
    assert_eq!(log.stats.failed, 1);
}

#[tokio::test]
async fn lead_without_contact_data_makes_zero_attempts() {
    let ok = server_returning(200, serde_json::json!({"id": "m-1"})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&ok.uri())),
        vapi: Some(vapi_client(&ok.uri())),
        ..ChannelSenders::default()
    };
    let tracking = MemoryTrackingStore::new();

    let bare = Lead {
        name: "Unknown Spot".to_owned(),
        ..Lead::default()
    };
    let result = send_multi_channel_outreach(
        &bare,
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(!result.contacted);
    assert!(result.attempts.is_empty());
    assert_eq!(result.reason.as_deref(), Some(NO_AVAILABLE_CHANNELS));
    assert!(tracking.log().await.outreach.is_empty());
}

#[tokio::test]
async fn attempts_are_capped_at_max_attempts() {
    let broken = server_returning(500, serde_json::json!({})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&broken.uri())),
        vapi: Some(vapi_client(&broken.uri())),
        facebook: Some(graph_client(&broken.uri())),
        instagram: Some(graph_client(&broken.uri())),
    };
    let tracking = MemoryTrackingStore::new();

    // All five channels are available; only three may be tried.
    let lead = full_lead();
    assert_eq!(
        available_channels(&lead, &senders, &OutreachOptions::default()).len(),
        3
    );

    let result = send_multi_channel_outreach(
        &lead,
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(!result.contacted);
    assert_eq!(result.attempts.len(), 3);
    assert_eq!(result.reason.as_deref(), Some(ALL_CHANNELS_FAILED));
    assert_eq!(tracking.log().await.stats.failed, 3);
}

#[tokio::test]
async fn skip_list_removes_channels() {
    let ok = server_returning(201, serde_json::json!({"id": "wa-1"})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&ok.uri())),
        vapi: Some(vapi_client(&ok.uri())),
        ..ChannelSenders::default()
    };
    let options = OutreachOptions {
        skip_channels: vec![Channel::Email],
        ..OutreachOptions::default()
    };

    let channels = available_channels(&full_lead(), &senders, &options);
    assert_eq!(channels.first(), Some(&Channel::Whatsapp));
    assert!(!channels.contains(&Channel::Email));
}

#[tokio::test]
async fn preferred_channels_override_default_order() {
    let ok = server_returning(200, serde_json::json!({"id": "m"})).await;
    let senders = ChannelSenders {
        email: Some(email_client(&ok.uri())),
        vapi: Some(vapi_client(&ok.uri())),
        facebook: Some(graph_client(&ok.uri())),
        instagram: Some(graph_client(&ok.uri())),
    };
    let options = OutreachOptions {
        preferred_channels: Some(vec![Channel::Voicemail, Channel::Email]),
        ..OutreachOptions::default()
    };

    let channels = available_channels(&full_lead(), &senders, &options);
    assert_eq!(channels, vec![Channel::Voicemail, Channel::Email]);
}

#[tokio::test]
async fn page_id_only_lead_is_reachable_on_facebook() {
    let ok = server_returning(200, serde_json::json!({"message_id": "m-3"})).await;
    let senders = ChannelSenders {
        facebook: Some(graph_client(&ok.uri())),
        ..ChannelSenders::default()
    };

    // What page discovery produces: a page id, never a scoped user id.
    let lead = Lead {
        name: "Joe's Diner".to_owned(),
        facebook_page_id: Some("page-7".to_owned()),
        ..Lead::default()
    };
    assert_eq!(
        available_channels(&lead, &senders, &OutreachOptions::default()),
        vec![Channel::Facebook]
    );

    let tracking = MemoryTrackingStore::new();
    let result = send_multi_channel_outreach(
        &lead,
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(result.contacted);
    assert_eq!(result.channel, Some(Channel::Facebook));
}

#[tokio::test]
async fn unconfigured_providers_are_filtered_out() {
    let senders = ChannelSenders::default();
    let channels = available_channels(&full_lead(), &senders, &OutreachOptions::default());
    assert!(channels.is_empty());
}

#[tokio::test]
async fn email_fallback_address_is_reported() {
    // First candidate rejected as invalid, second accepted.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(wiremock::matchers::body_partial_json(
            serde_json::json!({"to": ["a@x.com"]}),
        ))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(wiremock::matchers::body_partial_json(
            serde_json::json!({"to": ["b@x.com"]}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-2"})))
        .mount(&server)
        .await;

    let senders = ChannelSenders {
        email: Some(email_client(&server.uri())),
        ..ChannelSenders::default()
    };
    let mut lead = full_lead();
    lead.email = Some("a@x.com".to_owned());
    lead.potential_emails = vec!["b@x.com".to_owned()];

    let tracking = MemoryTrackingStore::new();
    let result = send_multi_channel_outreach(
        &lead,
        &message(),
        &senders,
        &OutreachOptions::default(),
        &tracking,
    )
    .await;

    assert!(result.contacted);
    assert_eq!(result.attempts[0].email.as_deref(), Some("b@x.com"));
}
