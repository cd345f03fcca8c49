use std::fmt;

use serde::{Deserialize, Serialize};

/// Friend/foe side of an actor, as seen from the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Friendly,
    Hostile,
}

/// Whose chat channel a line was logged from.
///
/// Keys the rolling "last action" cache: an action seen on the `Party`
/// channel only explains detrimentals later logged on the `Party` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    #[default]
    You,
    Party,
    Alliance,
    Other,
    Pet,
    Engaged,
    Unengaged,
}

impl Subject {
    pub const ALL: [Subject; 7] = [
        Subject::You,
        Subject::Party,
        Subject::Alliance,
        Subject::Other,
        Subject::Pet,
        Subject::Engaged,
        Subject::Unengaged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::You => "you",
            Self::Party => "party",
            Self::Alliance => "alliance",
            Self::Other => "other",
            Self::Pet => "pet",
            Self::Engaged => "engaged",
            Self::Unengaged => "unengaged",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side a line's effect lands on.
///
/// Used by actor directories to tell apart a party member and an enemy
/// that happen to share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    You,
    Party,
    Alliance,
    Other,
    Engaged,
    Unengaged,
}

impl Direction {
    pub fn side(self) -> Side {
        match self {
            Self::Engaged | Self::Unengaged => Side::Hostile,
            _ => Side::Friendly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::You => "you",
            Self::Party => "party",
            Self::Alliance => "alliance",
            Self::Other => "other",
            Self::Engaged => "engaged",
            Self::Unengaged => "unengaged",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a chat code: which handler its lines are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// "X uses Y" lines that feed the last-action cache
    Action,
    /// Detrimental applied / lost lines
    Detrimental,
}
