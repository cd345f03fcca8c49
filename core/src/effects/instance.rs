use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teast_types::{Direction, Subject};

/// One application of a named detrimental on a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    pub name: String,
    /// Display label (ability that applied it, or the effect name)
    pub action_name: String,
    /// 0 when unknown
    pub potency: i32,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// Timestamp exactly as logged
    pub applied_at_local: String,
    pub applied_at: DateTime<Utc>,
    /// None = no known duration, ends only on an explicit loss line
    pub expires_at: Option<DateTime<Utc>>,

    // ─── Actors ─────────────────────────────────────────────────────────────
    /// Empty when no preceding action explained the application
    pub source_name: String,
    pub target_name: String,

    // ─── Routing context ────────────────────────────────────────────────────
    pub chat_code: String,
    pub direction: Direction,
    pub subject: Subject,

    pub is_active: bool,
}

impl EffectInstance {
    /// Expiry reached at `now` (inclusive). Never true without a duration.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Same target and effect name, ignoring ASCII case.
    pub fn matches(&self, target_name: &str, effect_name: &str) -> bool {
        self.target_name.eq_ignore_ascii_case(target_name)
            && self.name.eq_ignore_ascii_case(effect_name)
    }

    /// Mark the instance resolved. Returns false if it already was.
    pub fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.is_active, false)
    }
}
