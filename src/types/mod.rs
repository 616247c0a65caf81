//! Core data types

pub mod availability;
pub mod input;
pub mod moderation;
pub mod scores;

pub use availability::{AvailabilityNotice, AvailabilityState, ProbeOutcome};
pub use input::CharacterBudget;
pub use moderation::{FineCategory, RawModerationResponse};
pub use scores::{AnalysisResult, CategoryScores, DisplayCategory, RiskTier};
