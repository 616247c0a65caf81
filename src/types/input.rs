//! Character counter for the input box.

use crate::defaults;
use serde::Serialize;

/// Snapshot of how much of the character limit a draft uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBudget {
    pub used: usize,
    pub limit: usize,
    pub remaining: usize,
    pub over_limit: bool,
    pub near_limit: bool,
}

impl CharacterBudget {
    /// Count characters of the trimmed draft against `limit`.
    pub fn measure(text: &str, limit: usize) -> Self {
        let used = text.trim().chars().count();
        let threshold = (limit as f64 * defaults::input::NEAR_LIMIT_RATIO).ceil() as usize;
        Self {
            used,
            limit,
            remaining: limit.saturating_sub(used),
            over_limit: used > limit,
            near_limit: used >= threshold && used <= limit,
        }
    }
}
