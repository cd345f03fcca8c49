pub mod actors;
pub mod chat_log;
pub mod clock;
pub mod context;
pub mod effects;
pub mod timer;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use actors::{Actor, ActorDirectory, ActorHandle, ActorRef, ActorRoster};
pub use chat_log::{ChannelContext, ChatLine, MatchGroups};
pub use clock::{Clock, ManualClock, SystemClock};
pub use effects::{Collaborators, DetrimentalTracker, EffectInstance, LineOutcome};
pub use teast_types::*;
pub use timer::{Timer, TimerError, TokioTimer};
