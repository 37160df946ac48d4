use serde::{Deserialize, Serialize};

/// Tunable limits applied when validating events and photos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPolicy {
    /// How far in the past an event may start
    pub max_start_age_days: i64,
    /// How far in the future an event may end
    pub max_end_horizon_days: i64,
    /// The only content type accepted for photo uploads
    pub accepted_content_type: String,
}

impl EventPolicy {
    pub const DEFAULT_MAX_START_AGE_DAYS: i64 = 14;
    pub const DEFAULT_MAX_END_HORIZON_DAYS: i64 = 3652;
    pub const DEFAULT_CONTENT_TYPE: &'static str = "image/jpeg";
}

impl Default for EventPolicy {
    fn default() -> Self {
        Self {
            max_start_age_days: Self::DEFAULT_MAX_START_AGE_DAYS,
            max_end_horizon_days: Self::DEFAULT_MAX_END_HORIZON_DAYS,
            accepted_content_type: Self::DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}
