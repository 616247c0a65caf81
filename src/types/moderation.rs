//! Upstream moderation payload types

use crate::error::ModerationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Fine-grained category keys reported by the upstream moderation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FineCategory {
    #[serde(rename = "hate")]
    Hate,
    #[serde(rename = "hate/threatening")]
    HateThreatening,
    #[serde(rename = "harassment")]
    Harassment,
    #[serde(rename = "harassment/threatening")]
    HarassmentThreatening,
    #[serde(rename = "self-harm")]
    SelfHarm,
    #[serde(rename = "self-harm/intent")]
    SelfHarmIntent,
    #[serde(rename = "self-harm/instructions")]
    SelfHarmInstructions,
    #[serde(rename = "sexual")]
    Sexual,
    #[serde(rename = "sexual/minors")]
    SexualMinors,
    #[serde(rename = "violence")]
    Violence,
    #[serde(rename = "violence/graphic")]
    ViolenceGraphic,
    #[serde(rename = "illicit")]
    Illicit,
    #[serde(rename = "illicit/violent")]
    IllicitViolent,
}

impl FineCategory {
    pub const ALL: [FineCategory; 13] = [
        Self::Hate,
        Self::HateThreatening,
        Self::Harassment,
        Self::HarassmentThreatening,
        Self::SelfHarm,
        Self::SelfHarmIntent,
        Self::SelfHarmInstructions,
        Self::Sexual,
        Self::SexualMinors,
        Self::Violence,
        Self::ViolenceGraphic,
        Self::Illicit,
        Self::IllicitViolent,
    ];

    /// Wire key, e.g. `self-harm/intent`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hate => "hate",
            Self::HateThreatening => "hate/threatening",
            Self::Harassment => "harassment",
            Self::HarassmentThreatening => "harassment/threatening",
            Self::SelfHarm => "self-harm",
            Self::SelfHarmIntent => "self-harm/intent",
            Self::SelfHarmInstructions => "self-harm/instructions",
            Self::Sexual => "sexual",
            Self::SexualMinors => "sexual/minors",
            Self::Violence => "violence",
            Self::ViolenceGraphic => "violence/graphic",
            Self::Illicit => "illicit",
            Self::IllicitViolent => "illicit/violent",
        }
    }
}

impl FromStr for FineCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown moderation category '{s}'"))
    }
}

impl std::fmt::Display for FineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded moderation response. Only lives until it is normalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawModerationResponse {
    /// Upstream verdict, reported verbatim
    pub flagged: bool,
    /// Recognized category scores in `[0.0, 1.0]`
    pub scores: BTreeMap<FineCategory, f64>,
}

impl RawModerationResponse {
    pub fn new(flagged: bool) -> Self {
        Self {
            flagged,
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, category: FineCategory, score: f64) -> Self {
        self.scores.insert(category, score);
        self
    }

    /// Score for `category`, `0.0` when the upstream did not report it.
    pub fn score(&self, category: FineCategory) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    /// Decode a success body.
    ///
    /// Accepts the proxy shape `{"flagged": bool, "scores": {..}}` and the
    /// upstream envelope `{"results": [{"flagged": bool, "category_scores": {..}}]}`.
    /// Unknown category keys and non-numeric scores are ignored.
    pub fn from_body(body: &[u8]) -> Result<Self, ModerationError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ModerationError::MalformedResponse(format!("invalid JSON: {e}")))?;

        let (record, scores_key) = match value.get("results").and_then(|r| r.as_array()) {
            Some(results) => (
                results.first().ok_or_else(|| {
                    ModerationError::MalformedResponse("empty results array".to_string())
                })?,
                "category_scores",
            ),
            None => (&value, "scores"),
        };

        let flagged = record
            .get("flagged")
            .and_then(|f| f.as_bool())
            .ok_or_else(|| {
                ModerationError::MalformedResponse("missing boolean 'flagged' field".to_string())
            })?;

        let raw_scores = record
            .get(scores_key)
            .and_then(|s| s.as_object())
            .ok_or_else(|| {
                ModerationError::MalformedResponse(format!("missing '{scores_key}' mapping"))
            })?;

        let scores = raw_scores
            .iter()
            .filter_map(|(key, score)| {
                let category = key.parse::<FineCategory>().ok()?;
                Some((category, score.as_f64()?))
            })
            .collect();

        Ok(Self { flagged, scores })
    }
}
