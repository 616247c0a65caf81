//! Response normalization
//!
//! Folds the upstream fine-grained scores into the six display categories.
//! Pure apart from the timestamp taken by [`normalize`].

use crate::types::{AnalysisResult, CategoryScores, DisplayCategory, RawModerationResponse};
use chrono::{DateTime, Utc};

/// Normalize `raw` into an [`AnalysisResult`] stamped with the current time.
pub fn normalize(raw: &RawModerationResponse, original_text: &str) -> AnalysisResult {
    normalize_at(raw, original_text, Utc::now())
}

/// Deterministic variant of [`normalize`] with an explicit timestamp.
pub fn normalize_at(
    raw: &RawModerationResponse,
    original_text: &str,
    timestamp: DateTime<Utc>,
) -> AnalysisResult {
    let mut scores = CategoryScores::default();
    for category in DisplayCategory::ALL {
        let peak = category
            .sources()
            .iter()
            .map(|source| raw.score(*source))
            .fold(0.0_f64, f64::max);
        scores.set(category, to_percent(peak));
    }

    AnalysisResult {
        original_text: original_text.to_string(),
        overall_score: scores.max(),
        scores,
        flagged_by_upstream: raw.flagged,
        timestamp,
    }
}

/// `0.0..=1.0` to a rounded integer percentage, clamped to `0..=100`.
fn to_percent(score: f64) -> u8 {
    if !score.is_finite() {
        return 0;
    }
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FineCategory, RiskTier};
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn takes_maximum_of_constituents() {
        let raw = RawModerationResponse::new(false)
            .with_score(FineCategory::Hate, 0.42)
            .with_score(FineCategory::HateThreatening, 0.10);
        let result = normalize_at(&raw, "text", fixed_clock());
        assert_eq!(result.scores.hate, 42);

        let raw = RawModerationResponse::new(false)
            .with_score(FineCategory::SelfHarm, 0.05)
            .with_score(FineCategory::SelfHarmIntent, 0.2)
            .with_score(FineCategory::SelfHarmInstructions, 0.61);
        assert_eq!(normalize_at(&raw, "text", fixed_clock()).scores.self_harm, 61);
    }

    #[test]
    fn missing_constituent_counts_as_zero() {
        let raw = RawModerationResponse::new(false).with_score(FineCategory::Illicit, 0.5);
        let result = normalize_at(&raw, "text", fixed_clock());
        assert_eq!(result.scores.illicit, 50);
        assert_eq!(result.scores.violence, 0);
        assert_eq!(result.overall_score, 50);
    }

    #[test]
    fn rounds_to_nearest_percent() {
        let raw = RawModerationResponse::new(false)
            .with_score(FineCategory::Sexual, 0.296)
            .with_score(FineCategory::Violence, 0.0049)
            .with_score(FineCategory::Harassment, 0.99999);
        let scores = normalize_at(&raw, "t", fixed_clock()).scores;
        assert_eq!(scores.sexual, 30);
        assert_eq!(scores.violence, 0);
        assert_eq!(scores.harassment, 100);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let raw = RawModerationResponse::new(false)
            .with_score(FineCategory::Violence, 1.7)
            .with_score(FineCategory::Hate, -0.3)
            .with_score(FineCategory::Sexual, f64::NAN);
        let scores = normalize_at(&raw, "t", fixed_clock()).scores;
        assert_eq!(scores.violence, 100);
        assert_eq!(scores.hate, 0);
        assert_eq!(scores.sexual, 0);
    }

    #[test]
    fn overall_ignores_upstream_flag() {
        let raw = RawModerationResponse::new(true).with_score(FineCategory::Hate, 0.1);
        let result = normalize_at(&raw, "t", fixed_clock());
        assert!(result.flagged_by_upstream);
        assert_eq!(result.overall_score, 10);
        assert_eq!(result.tier(), RiskTier::Safe);
    }

    #[test]
    fn deterministic_with_fixed_clock() {
        let raw = RawModerationResponse::new(false)
            .with_score(FineCategory::ViolenceGraphic, 0.71)
            .with_score(FineCategory::SexualMinors, 0.3);
        let a = normalize_at(&raw, "same", fixed_clock());
        let b = normalize_at(&raw, "same", fixed_clock());
        assert_eq!(a, b);
        assert_eq!(a.overall_score, 71);
        assert_eq!(a.tier(), RiskTier::High);
        assert_eq!(a.original_text, "same");
    }

    #[test]
    fn empty_scores_are_safe() {
        let result = normalize(&RawModerationResponse::new(false), "hello");
        assert_eq!(result.scores, CategoryScores::default());
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.tier(), RiskTier::Safe);
    }
}
