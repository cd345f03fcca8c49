use hashbrown::HashMap;
use teast_types::{ChatCodeConfig, LineKind};

use super::ChannelContext;

/// Where lines with a given chat code go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedCode {
    pub kind: LineKind,
    pub channel: ChannelContext,
}

/// Chat code → line kind and channel context.
///
/// Codes are compared case-insensitively ("0aa9" == "0AA9").
#[derive(Debug, Clone, Default)]
pub struct ChatCodeTable {
    codes: HashMap<String, RoutedCode>,
}

impl ChatCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration. A repeated code keeps its first entry.
    pub fn from_config(entries: &[ChatCodeConfig]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            let routed = RoutedCode {
                kind: entry.kind,
                channel: ChannelContext::new(entry.direction, entry.subject),
            };
            if !table.insert(&entry.code, routed) {
                tracing::warn!(code = %entry.code, "duplicate chat code in config, keeping first");
            }
        }
        table
    }

    /// Returns false (and keeps the existing route) if the code is already known.
    pub fn insert(&mut self, code: &str, routed: RoutedCode) -> bool {
        let key = code.trim().to_ascii_uppercase();
        if self.codes.contains_key(&key) {
            return false;
        }
        self.codes.insert(key, routed);
        true
    }

    pub fn route(&self, code: &str) -> Option<RoutedCode> {
        self.codes.get(&code.trim().to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
