//! Lead qualification: async probes gather website and delivery signals,
//! then a pure deterministic scorer turns lead + signals into a score, an
//! issue list, and a qualified flag.

mod error;
mod pipeline;
mod probes;
mod scorer;
mod signals;

pub use error::QualifyError;
pub use pipeline::{qualify_lead, qualify_leads, select_qualified};
pub use probes::{gather_signals, DeliveryProber, Probers, WebsiteProber};
pub use scorer::{score_lead, Qualification, ScoreConfig};
pub use signals::{DeliverySignal, LeadSignals, SignalSource, WebsiteSignal};
