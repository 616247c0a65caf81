//! Display model: six coarse categories, overall score and verdict tier.

use super::moderation::FineCategory;
use crate::defaults;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Coarse categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayCategory {
    Hate,
    Harassment,
    SelfHarm,
    Sexual,
    Violence,
    Illicit,
}

impl DisplayCategory {
    pub const ALL: [DisplayCategory; 6] = [
        Self::Hate,
        Self::Harassment,
        Self::SelfHarm,
        Self::Sexual,
        Self::Violence,
        Self::Illicit,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Hate => "hate",
            Self::Harassment => "harassment",
            Self::SelfHarm => "selfHarm",
            Self::Sexual => "sexual",
            Self::Violence => "violence",
            Self::Illicit => "illicit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hate => "Hate",
            Self::Harassment => "Harassment",
            Self::SelfHarm => "Self-harm",
            Self::Sexual => "Sexual",
            Self::Violence => "Violence",
            Self::Illicit => "Illicit",
        }
    }

    /// Upstream categories aggregated (by maximum) into this one.
    pub fn sources(&self) -> &'static [FineCategory] {
        use FineCategory::*;
        match self {
            Self::Hate => &[Hate, HateThreatening],
            Self::Harassment => &[Harassment, HarassmentThreatening],
            Self::SelfHarm => &[SelfHarm, SelfHarmIntent, SelfHarmInstructions],
            Self::Sexual => &[Sexual, SexualMinors],
            Self::Violence => &[Violence, ViolenceGraphic],
            Self::Illicit => &[Illicit, IllicitViolent],
        }
    }
}

/// Percentage in `[0, 100]` for every display category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub hate: u8,
    pub harassment: u8,
    pub self_harm: u8,
    pub sexual: u8,
    pub violence: u8,
    pub illicit: u8,
}

impl CategoryScores {
    pub fn get(&self, category: DisplayCategory) -> u8 {
        match category {
            DisplayCategory::Hate => self.hate,
            DisplayCategory::Harassment => self.harassment,
            DisplayCategory::SelfHarm => self.self_harm,
            DisplayCategory::Sexual => self.sexual,
            DisplayCategory::Violence => self.violence,
            DisplayCategory::Illicit => self.illicit,
        }
    }

    pub fn set(&mut self, category: DisplayCategory, percent: u8) {
        let slot = match category {
            DisplayCategory::Hate => &mut self.hate,
            DisplayCategory::Harassment => &mut self.harassment,
            DisplayCategory::SelfHarm => &mut self.self_harm,
            DisplayCategory::Sexual => &mut self.sexual,
            DisplayCategory::Violence => &mut self.violence,
            DisplayCategory::Illicit => &mut self.illicit,
        };
        *slot = percent.min(100);
    }

    pub fn iter(&self) -> impl Iterator<Item = (DisplayCategory, u8)> + '_ {
        DisplayCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Highest percentage across all categories.
    pub fn max(&self) -> u8 {
        self.iter().map(|(_, p)| p).max().unwrap_or(0)
    }
}

/// Verdict derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// score < 30
    Safe,
    /// 30 <= score <= 70
    Moderate,
    /// score > 70
    High,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        if score > defaults::verdict::HIGH_ABOVE {
            Self::High
        } else if score >= defaults::verdict::MODERATE_FROM {
            Self::Moderate
        } else {
            Self::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Safe => "Safe Content",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Safe => "No significant harmful content was detected.",
            Self::Moderate => "Some potentially harmful content was detected. Review recommended.",
            Self::High => "Harmful content was detected with high confidence.",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized outcome of one successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub original_text: String,
    pub scores: CategoryScores,
    /// Maximum over `scores`
    pub overall_score: u8,
    /// Upstream verdict, informational only
    pub flagged_by_upstream: bool,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn tier(&self) -> RiskTier {
        RiskTier::from_score(self.overall_score)
    }

    /// Plain-text summary suitable for copying or sharing.
    pub fn report(&self) -> String {
        let tier = self.tier();
        let mut out = String::new();
        let _ = writeln!(out, "Content moderation report");
        let _ = writeln!(out, "Verdict: {} ({}%)", tier.title(), self.overall_score);
        let _ = writeln!(
            out,
            "Flagged by moderation service: {}",
            if self.flagged_by_upstream { "yes" } else { "no" }
        );
        let _ = writeln!(out, "Categories:");
        for (category, percent) in self.scores.iter() {
            let _ = writeln!(out, "  {}: {}%", category.label(), percent);
        }
        let _ = writeln!(
            out,
            "Text length: {} characters",
            self.original_text.chars().count()
        );
        let _ = write!(out, "Analyzed at: {}", self.timestamp.to_rfc3339());
        out
    }
}
