//! Detrimental tracking
//!
//! This module provides:
//! - **Instances**: one `EffectInstance` per application of a named detrimental
//! - **Correlation**: recovering an application's source from the last action
//!   logged on its channel
//! - **Registry**: the shared set of unresolved instances
//! - **Scheduler**: a single timer that sweeps expired instances
//!
//! # Architecture
//!
//! ```text
//!   "Alice casts Bio."                  "The goblin suffers the effect of Bio."
//!          │                                           │
//!          ▼                                           ▼
//!  ActionContextCache ──── last action (You) ───▶  Correlator ──▶ EffectFactory
//!                                                      │
//!                                                      ▼
//!                            ActiveEffectRegistry ◀── apply ──▶ target history + store
//!                                   ▲   │
//!                           sweep   │   │ earliest expiry
//!                                   │   ▼
//!                              ExpiryScheduler (one timer)
//! ```

mod correlator;
mod factory;
mod instance;
mod registry;
mod scheduler;
mod store;
pub mod tracker;


pub use correlator::{Application, Correlator, Loss};
pub use factory::{DefinitionFactory, EffectFactory, EffectRequest};
pub use instance::EffectInstance;
pub use registry::{ActiveEffectRegistry, SweepOutcome};
pub use scheduler::{ExpiryScheduler, SchedulerState};
pub use store::{EffectStore, MemoryStore, NoopStore};
pub use tracker::{Collaborators, DetrimentalTracker, LineOutcome};
