//! Tracker configuration model
//!
//! Loaded from a single TOML file:
//!
//! ```toml
//! [scheduler]
//! min_interval_ms = 1
//!
//! [[chat_code]]
//! code = "0AA9"
//! kind = "detrimental"
//! direction = "engaged"
//! subject = "you"
//!
//! [[detrimental]]
//! name = "Bio"
//! duration_secs = 30.0
//! ```

use serde::{Deserialize, Serialize};

use crate::{Direction, LineKind, Subject};

/// Smallest delay the expiry timer is ever armed with.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub scheduler: SchedulerConfig,

    /// Chat codes the dispatcher routes, with their channel context
    #[serde(rename = "chat_code")]
    pub chat_codes: Vec<ChatCodeConfig>,

    /// Known detrimentals (duration, potency) for the default effect factory
    #[serde(rename = "detrimental")]
    pub detrimentals: Vec<DetrimentalDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Floor for every timer arm, in milliseconds. Zero is treated as one.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

/// One routed chat code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCodeConfig {
    /// Chat code as it appears on the classified line (e.g. "0AA9")
    pub code: String,
    pub kind: LineKind,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub subject: Subject,
}

/// Metadata for a named detrimental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetrimentalDefinition {
    /// Effect name as logged (matched case-insensitively)
    pub name: String,

    /// Display label; defaults to the effect name
    #[serde(default)]
    pub action_name: Option<String>,

    #[serde(default)]
    pub potency: Option<i32>,

    /// Known duration in seconds (None = lasts until an explicit loss line)
    #[serde(default)]
    pub duration_secs: Option<f32>,
}
