//! Multi-channel outreach: provider adapters for email, WhatsApp, Facebook
//! Messenger, Instagram DM, and voicemail; an orchestrator that tries
//! channels in order per lead; and a batch driver that runs leads in
//! concurrent batches with persistence at batch boundaries.
//!
//! Expected-absence outcomes (missing email, missing phone) are ordinary
//! `SendOutcome` values, not errors. The error type covers client
//! construction and storage only.

mod batch;
mod channels;
mod error;
mod graph;
mod message;
mod orchestrator;
mod resend;
mod senders;
mod vapi;

pub use batch::{batch_outreach, BatchOptions, BatchSummary};
pub use channels::{has_required_data, ChannelSpec, DEFAULT_CHANNEL_ORDER};
pub use error::OutreachError;
pub use graph::GraphClient;
pub use message::{build_message, OutreachMessage};
pub use orchestrator::{
    available_channels, send_multi_channel_outreach, OutreachOptions, OutreachRunResult,
    ALL_CHANNELS_FAILED, NO_AVAILABLE_CHANNELS,
};
pub use resend::ResendEmailClient;
pub use senders::ChannelSenders;
pub use vapi::VapiClient;
