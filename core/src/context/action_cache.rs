use hashbrown::HashMap;
use teast_types::Subject;

/// Last action seen on a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub source_name: String,
    pub action_name: String,
}

impl ActionContext {
    /// Both who acted and what they used are known.
    pub fn is_complete(&self) -> bool {
        !self.source_name.is_empty() && !self.action_name.is_empty()
    }
}

/// Rolling "last action per subject" cache.
///
/// Owned by the parsing session. Arrival order is trusted: the action that
/// caused a detrimental is assumed to be the latest one logged on the same
/// subject's channel. Entries are overwritten, never expired.
#[derive(Debug, Clone, Default)]
pub struct ActionContextCache {
    last: HashMap<Subject, ActionContext>,
}

impl ActionContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_action(
        &mut self,
        subject: Subject,
        source_name: impl Into<String>,
        action_name: impl Into<String>,
    ) {
        self.last.insert(
            subject,
            ActionContext {
                source_name: source_name.into(),
                action_name: action_name.into(),
            },
        );
    }

    /// Latest action for `subject`, if it names both a source and an action.
    pub fn lookup(&self, subject: Subject) -> Option<&ActionContext> {
        self.last.get(&subject).filter(|action| action.is_complete())
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}
