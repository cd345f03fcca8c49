use chrono::NaiveDateTime;
use hashbrown::HashMap;
use teast_types::{Direction, Subject};

/// Format of `ChatLine::timestamp` when built from a parsed log time.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Well-known capture group names.
pub mod group {
    pub const TARGET: &str = "target";
    pub const STATUS: &str = "status";
    pub const SOURCE: &str = "source";
    pub const ACTION: &str = "action";
    pub const LOSES: &str = "loses";
}

/// Named capture groups of a matched line.
///
/// A group that did not participate in the match reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroups {
    groups: HashMap<String, String>,
}

impl MatchGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.groups.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> &str {
        self.groups.get(name).map(String::as_str).unwrap_or("")
    }

    /// A group used as a boolean: set when it matched anything at all.
    pub fn flag(&self, name: &str) -> bool {
        !self.get(name).trim().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MatchGroups
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (name, value) in iter {
            groups.insert(name, value);
        }
        groups
    }
}

/// One classified chat log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLine {
    /// Chat code (hex string as logged)
    pub code: String,
    /// Local display timestamp, carried through untouched
    pub timestamp: String,
    pub groups: MatchGroups,
}

impl ChatLine {
    pub fn new(code: impl Into<String>, timestamp: impl Into<String>, groups: MatchGroups) -> Self {
        Self {
            code: code.into(),
            timestamp: timestamp.into(),
            groups,
        }
    }

    /// Build a line from a parsed local log time.
    pub fn from_local_time(code: impl Into<String>, time: NaiveDateTime, groups: MatchGroups) -> Self {
        Self::new(code, time.format(LOCAL_TIMESTAMP_FORMAT).to_string(), groups)
    }
}

/// Perspective a line was logged from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelContext {
    pub direction: Direction,
    pub subject: Subject,
}

impl ChannelContext {
    pub fn new(direction: Direction, subject: Subject) -> Self {
        Self { direction, subject }
    }
}
