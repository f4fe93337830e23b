//! Glue between the probes and the scorer.

use chrono::{DateTime, Utc};
use tablescout_core::Lead;

use crate::probes::{gather_signals, Probers};
use crate::scorer::{score_lead, ScoreConfig};

/// Probe one lead and write the derived qualification fields back onto it.
pub async fn qualify_lead(
    lead: &mut Lead,
    probers: &Probers,
    now: DateTime<Utc>,
    config: &ScoreConfig,
) {
    let signals = gather_signals(lead, probers).await;
    let qualification = score_lead(lead, &signals, now, config);
    lead.qualification_score = qualification.score;
    lead.issues = qualification.issues;
    lead.is_qualified = qualification.is_qualified;
}

/// Qualify a batch in place.
pub async fn qualify_leads(leads: &mut [Lead], probers: &Probers, config: &ScoreConfig) {
    let now = Utc::now();
    for lead in leads.iter_mut() {
        qualify_lead(lead, probers, now, config).await;
        tracing::debug!(
            lead = %lead.name,
            score = lead.qualification_score,
            qualified = lead.is_qualified,
            "scored lead"
        );
    }
}

/// The qualified subset, best prospects first.
#[must_use]
pub fn select_qualified(leads: &[Lead]) -> Vec<Lead> {
    let mut qualified: Vec<Lead> = leads.iter().filter(|l| l.is_qualified).cloned().collect();
    qualified.sort_by(|a, b| b.qualification_score.cmp(&a.qualification_score));
    qualified
}
