//! Shared types for the detrimental tracker.
//!
//! Channel vocabulary (who logged a line, whose side it concerns) and the
//! serde configuration model loaded by `teast-core`.

mod channel;
mod config;

pub use channel::{Direction, LineKind, Side, Subject};
pub use config::{
    ChatCodeConfig, DEFAULT_MIN_INTERVAL_MS, DetrimentalDefinition, SchedulerConfig, TrackerConfig,
};
