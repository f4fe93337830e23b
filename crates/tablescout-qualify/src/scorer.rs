//! Pure qualification scoring.
//!
//! `score_lead` is deterministic over its inputs; all network observation
//! happens earlier, in the probes. Weights follow the marketing team's
//! qualification rubric.

use chrono::{DateTime, Duration, Utc};
use tablescout_core::{IssueTag, Lead};

use crate::signals::{LeadSignals, SignalSource};

const NO_WEBSITE: u32 = 30;
const BROKEN_WEBSITE: u32 = 20;
const OUTDATED_WEBSITE: u32 = 15;
const NO_MENU_PHOTOS: u32 = 15;
const NOT_ON_DOORDASH: u32 = 25;
const NO_SOCIAL_MEDIA: u32 = 20;
const LOW_SOCIAL_ENGAGEMENT: u32 = 10;
const OUTDATED_MENU: u32 = 15;
const UNKNOWN_MENU_AGE: u32 = 10;
const LOW_RATING: u32 = 10;
const NO_PROFESSIONAL_PHOTOS: u32 = 10;

const LOW_ENGAGEMENT_FOLLOWERS: u32 = 500;
const MENU_STALE_DAYS: i64 = 365;

/// Scoring knobs, a subset of the app config so the scorer stays usable
/// without the full environment.
#[derive(Debug, Clone, Copy)]
pub struct ScoreConfig {
    /// Leads with more ratings than this are disqualified outright.
    pub max_reviews: u32,
    pub qualification_threshold: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_reviews: 15,
            qualification_threshold: 40,
        }
    }
}

/// What the scorer decided for one lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualification {
    pub score: u32,
    pub issues: Vec<IssueTag>,
    pub is_qualified: bool,
}

/// Score one lead against its gathered signals.
///
/// Leads past the review cap are established businesses, not prospects: they
/// short-circuit to score 0 with `too_many_reviews` as the only issue,
/// regardless of anything else the probes saw.
#[must_use]
pub fn score_lead(
    lead: &Lead,
    signals: &LeadSignals,
    now: DateTime<Utc>,
    config: &ScoreConfig,
) -> Qualification {
    if lead.total_ratings > config.max_reviews {
        return Qualification {
            score: 0,
            issues: vec![IssueTag::TooManyReviews],
            is_qualified: false,
        };
    }

    let mut score = 0u32;
    let mut issues: Vec<IssueTag> = Vec::new();
    let mut charge = |points: u32, tag: IssueTag, score: &mut u32| {
        *score += points;
        issues.push(tag);
    };

    if lead.website.is_none() {
        charge(NO_WEBSITE, IssueTag::NoWebsite, &mut score);
    } else if let Some(site) = &signals.website {
        if site.source == SignalSource::ProbeFailed {
            charge(BROKEN_WEBSITE, IssueTag::BrokenWebsite, &mut score);
        } else {
            if site.outdated_tech {
                charge(OUTDATED_WEBSITE, IssueTag::OutdatedWebsite, &mut score);
            }
            if !site.has_menu_photos {
                charge(NO_MENU_PHOTOS, IssueTag::NoMenuPhotos, &mut score);
            }
        }
    }

    if !signals.delivery.listed {
        charge(NOT_ON_DOORDASH, IssueTag::NotOnDoordash, &mut score);
    }

    if lead.instagram_handle.is_none() && lead.facebook_page_id.is_none() {
        charge(NO_SOCIAL_MEDIA, IssueTag::NoSocialMedia, &mut score);
    } else if lead
        .instagram_followers
        .is_some_and(|f| f < LOW_ENGAGEMENT_FOLLOWERS)
    {
        charge(
            LOW_SOCIAL_ENGAGEMENT,
            IssueTag::LowSocialEngagement,
            &mut score,
        );
    }

    match lead.last_menu_update {
        Some(updated) if now - updated > Duration::days(MENU_STALE_DAYS) => {
            charge(OUTDATED_MENU, IssueTag::OutdatedMenu, &mut score);
        }
        Some(_) => {}
        None => charge(UNKNOWN_MENU_AGE, IssueTag::UnknownMenuAge, &mut score),
    }

    if lead.rating.is_some_and(|r| r > 2.5 && r < 3.5) {
        charge(LOW_RATING, IssueTag::LowRating, &mut score);
    }

    if !lead.has_professional_photos {
        charge(
            NO_PROFESSIONAL_PHOTOS,
            IssueTag::NoProfessionalPhotos,
            &mut score,
        );
    }

    Qualification {
        score,
        issues,
        is_qualified: score >= config.qualification_threshold,
    }
}

#[path = "scorer_test.rs"]
#[cfg(test)]
mod tests;
