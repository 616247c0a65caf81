//! Default Configuration Values
//!
//! This module centralizes the default values used throughout modlens.
//! Having defaults in one place makes them easier to maintain, document, and adjust.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default timeout for a moderation request.
    ///
    /// Set to 40 seconds to cover a backend cold start on hosting platforms
    /// that idle instances between requests.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(40);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("modlens/", env!("CARGO_PKG_VERSION"));
}

/// Health polling defaults
pub mod health {
    use super::*;

    /// Upper bound for a single liveness probe
    pub const CHECK_TIMEOUT: Duration = Duration::from_secs(8);

    /// Poll cadence while the backend answers
    pub const ONLINE_POLL_INTERVAL: Duration = Duration::from_secs(30);

    /// Poll cadence while the backend is waking up or unreachable
    pub const OFFLINE_POLL_INTERVAL: Duration = Duration::from_secs(10);
}

/// Input limits
pub mod input {
    /// Maximum number of characters accepted for a single analysis
    pub const MAX_CHARS: usize = 5000;

    /// Fraction of the limit at which the character counter starts warning
    pub const NEAR_LIMIT_RATIO: f64 = 0.9;
}

/// Endpoint defaults
pub mod endpoints {
    /// Path of the moderation route relative to the backend base URL
    pub const MODERATE_PATH: &str = "/moderate";

    /// Path of the liveness route relative to the backend base URL
    pub const HEALTH_PATH: &str = "/health";

    /// Model requested when talking to the upstream moderation API directly
    pub const DIRECT_MODEL: &str = "omni-moderation-latest";
}

/// Verdict thresholds (percentages)
pub mod verdict {
    /// Scores at or above this value are at least moderate
    pub const MODERATE_FROM: u8 = 30;

    /// Scores above this value are high risk
    pub const HIGH_ABOVE: u8 = 70;
}
