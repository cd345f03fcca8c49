//! Actor directory
//!
//! The tracker never owns actors. It asks a directory for a handle by name
//! and channel, then appends to the handle's detrimental history and tells
//! it when one of its detrimentals resolves.

use std::sync::{Arc, Mutex, MutexGuard};

use hashbrown::HashMap;
use teast_types::{Direction, Side, Subject};

use crate::effects::EffectInstance;

pub trait ActorHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Record a new application in the actor's own history (append-only).
    fn append_detrimental(&self, instance: &EffectInstance);

    /// A detrimental on this actor resolved. Called once per instance.
    fn notify_stat_update(&self, instance: &EffectInstance);
}

pub type ActorRef = Arc<dyn ActorHandle>;

pub trait ActorDirectory: Send + Sync {
    fn resolve(&self, name: &str, direction: Direction, subject: Subject) -> Option<ActorRef>;
}

/// In-memory actor with its detrimental history.
#[derive(Debug)]
pub struct Actor {
    name: String,
    side: Side,
    detrimentals: Mutex<Vec<EffectInstance>>,
    stat_updates: Mutex<Vec<EffectInstance>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Actor {
    pub fn new(name: impl Into<String>, side: Side) -> Self {
        Self {
            name: name.into(),
            side,
            detrimentals: Mutex::new(Vec::new()),
            stat_updates: Mutex::new(Vec::new()),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Every detrimental ever applied, in application order.
    pub fn detrimentals(&self) -> Vec<EffectInstance> {
        lock(&self.detrimentals).clone()
    }

    /// Resolved detrimentals, in resolution order.
    pub fn stat_updates(&self) -> Vec<EffectInstance> {
        lock(&self.stat_updates).clone()
    }

    pub fn stat_update_count(&self) -> usize {
        lock(&self.stat_updates).len()
    }
}

impl ActorHandle for Actor {
    fn name(&self) -> &str {
        &self.name
    }

    fn append_detrimental(&self, instance: &EffectInstance) {
        lock(&self.detrimentals).push(instance.clone());
    }

    fn notify_stat_update(&self, instance: &EffectInstance) {
        lock(&self.stat_updates).push(instance.clone());
    }
}

/// Directory that creates actors the first time they are named.
///
/// Actors are keyed by name and by the side the line's direction points at,
/// so a party member and an enemy sharing a name stay distinct.
#[derive(Debug, Default)]
pub struct ActorRoster {
    actors: Mutex<HashMap<(String, Side), Arc<Actor>>>,
}

impl ActorRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, side: Side) -> Option<Arc<Actor>> {
        lock(&self.actors).get(&(name.to_string(), side)).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.actors).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActorDirectory for ActorRoster {
    fn resolve(&self, name: &str, direction: Direction, _subject: Subject) -> Option<ActorRef> {
        if name.is_empty() {
            return None;
        }
        let side = direction.side();
        let actor: ActorRef = lock(&self.actors)
            .entry((name.to_string(), side))
            .or_insert_with(|| Arc::new(Actor::new(name, side)))
            .clone();
        Some(actor)
    }
}
