//! Classified chat lines
//!
//! Lines arrive here already matched by an upstream pattern table: the
//! chat code, the local timestamp as logged, and the named capture groups.
//! This module only models that record and the code → channel routing.

mod codes;
mod line;
mod name;

pub use codes::{ChatCodeTable, RoutedCode};
pub use line::{ChannelContext, ChatLine, LOCAL_TIMESTAMP_FORMAT, MatchGroups, group};
pub use name::clean_name;
