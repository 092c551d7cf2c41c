//! Match score computation for freelancer results.
//!
//! All four sub-scores are on the 0-100 scale and the result is an integer
//! percentage:
//!
//! ```text
//! score = round(job_performance * 0.50
//!             + skills_experience * 0.20
//!             + responsiveness * 0.15
//!             + fairness_score * 0.15)
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::FreelancerRecord;

pub const JOB_PERFORMANCE_WEIGHT: f64 = 0.50;
pub const SKILLS_EXPERIENCE_WEIGHT: f64 = 0.20;
pub const RESPONSIVENESS_WEIGHT: f64 = 0.15;
pub const FAIRNESS_WEIGHT: f64 = 0.15;

/// The four weighted inputs of a match score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    #[serde(default)]
    pub job_performance: f64,
    #[serde(default)]
    pub skills_experience: f64,
    #[serde(default)]
    pub responsiveness: f64,
    #[serde(default)]
    pub fairness_score: f64,
}

impl SubScores {
    /// Missing sub-scores count as 0.
    pub fn from_record(record: &FreelancerRecord) -> Self {
        Self {
            job_performance: record.job_performance.unwrap_or(0.0),
            skills_experience: record.skills_experience.unwrap_or(0.0),
            responsiveness: record.responsiveness.unwrap_or(0.0),
            fairness_score: record.fairness_score.unwrap_or(0.0),
        }
    }

    /// Weighted score clamped to 0-100. Non-finite sub-scores count as 0.
    pub fn score(&self) -> u8 {
        let weighted = finite(self.job_performance) * JOB_PERFORMANCE_WEIGHT
            + finite(self.skills_experience) * SKILLS_EXPERIENCE_WEIGHT
            + finite(self.responsiveness) * RESPONSIVENESS_WEIGHT
            + finite(self.fairness_score) * FAIRNESS_WEIGHT;
        weighted.round().clamp(0.0, 100.0) as u8
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Compute the match score of a freelancer record.
pub fn compute_match_score(record: &FreelancerRecord) -> u8 {
    SubScores::from_record(record).score()
}

/// Fill in `match_score` for records that lack one, then order by score.
///
/// Scores already provided by the backend are kept. The sort is stable, so
/// equal scores keep the backend's order.
pub fn annotate_matches(records: &mut [FreelancerRecord]) {
    for record in records.iter_mut() {
        if record.match_score.is_none() {
            record.match_score = Some(compute_match_score(record));
        }
    }
    records.sort_by(|a, b| b.match_score.cmp(&a.match_score));
}
