//! Signals gathered by the async probes, consumed by the pure scorer.

/// Whether a signal reflects an actual observation or a probe that could not
/// complete. The scorer treats the two differently, so the distinction is
/// carried explicitly instead of being collapsed into a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Observed,
    ProbeFailed,
}

/// Outcome of probing the lead's website. Only present when the lead has a
/// website URL at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebsiteSignal {
    pub source: SignalSource,
    /// Legacy script stack without any modern-framework marker.
    pub outdated_tech: bool,
    /// At least one `<img>` that looks like a menu or food photo.
    pub has_menu_photos: bool,
}

impl WebsiteSignal {
    #[must_use]
    pub fn failed() -> Self {
        Self {
            source: SignalSource::ProbeFailed,
            outdated_tech: false,
            has_menu_photos: false,
        }
    }
}

/// Outcome of probing the delivery-platform storefront. A failed probe is
/// scored as not-listed, but stays distinguishable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySignal {
    pub source: SignalSource,
    pub listed: bool,
}

impl DeliverySignal {
    #[must_use]
    pub fn failed() -> Self {
        Self {
            source: SignalSource::ProbeFailed,
            listed: false,
        }
    }
}

/// Everything the probes learned about one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadSignals {
    /// `None` when the lead has no website; the scorer then charges
    /// `no_website` instead of any website sub-issue.
    pub website: Option<WebsiteSignal>,
    pub delivery: DeliverySignal,
}
