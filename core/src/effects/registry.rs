//! Active effect registry
//!
//! Authoritative list of every detrimental not yet resolved. Shared between
//! the parsing path (apply, loss) and the expiry timer (sweep); all three
//! serialize on one mutex. Actor callbacks and the store run outside it.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{EffectInstance, EffectStore};
use crate::actors::ActorRef;

struct RegistryEntry {
    target: Option<ActorRef>,
    instance: EffectInstance,
}

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    /// Instances resolved by this sweep, in registration order
    pub resolved: Vec<EffectInstance>,
    /// Earliest expiry still pending, if any
    pub next_wake: Option<DateTime<Utc>>,
}

pub struct ActiveEffectRegistry {
    entries: Mutex<Vec<RegistryEntry>>,
    store: Arc<dyn EffectStore>,
}

impl ActiveEffectRegistry {
    pub fn new(store: Arc<dyn EffectStore>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RegistryEntry>> {
        self.entries.lock().unwrap_or_else(|e| {
            tracing::warn!("effect registry lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Register a new application.
    ///
    /// The target's history and the store see the instance before any sweep
    /// can, so a resolution is never reported ahead of its application.
    /// Returns the instance's expiry for the scheduler.
    pub fn apply(&self, target: Option<ActorRef>, instance: EffectInstance) -> Option<DateTime<Utc>> {
        if let Some(target) = &target {
            target.append_detrimental(&instance);
        }
        self.store.store(&instance);

        tracing::debug!(
            effect = %instance.name,
            target = %instance.target_name,
            source = %instance.source_name,
            expires_at = ?instance.expires_at,
            "detrimental applied"
        );

        let expires_at = instance.expires_at;
        self.lock().push(RegistryEntry { target, instance });
        expires_at
    }

    /// Resolve an explicit loss of `effect_name` on `target_name`.
    ///
    /// Picks the first registered active match, even one already past its
    /// expiry but not yet swept, moves its expiry to `resolved_at` and leaves
    /// the actual deactivation to the next sweep. None if nothing matches.
    pub fn resolve_loss(
        &self,
        target_name: &str,
        effect_name: &str,
        resolved_at: DateTime<Utc>,
    ) -> Option<EffectInstance> {
        let mut entries = self.lock();
        let Some(entry) = entries.iter_mut().find(|entry| {
            entry.instance.is_active && entry.instance.matches(target_name, effect_name)
        }) else {
            tracing::debug!(effect = %effect_name, target = %target_name, "loss with nothing tracked");
            return None;
        };

        entry.instance.expires_at = Some(resolved_at);
        tracing::debug!(
            effect = %entry.instance.name,
            target = %entry.instance.target_name,
            source = %entry.instance.source_name,
            "detrimental lost"
        );
        Some(entry.instance.clone())
    }

    /// Resolve everything due at `now` (inclusive).
    ///
    /// Due entries are deactivated and removed under the lock, then their
    /// targets are notified, so each instance is reported exactly once.
    /// Entries without an expiry are left alone.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepOutcome {
        let mut next_wake: Option<DateTime<Utc>> = None;
        let mut expired = Vec::new();

        {
            let mut entries = self.lock();
            for mut entry in std::mem::take(&mut *entries) {
                if entry.instance.is_due(now) {
                    entry.instance.deactivate();
                    expired.push(entry);
                    continue;
                }
                if let Some(expires_at) = entry.instance.expires_at {
                    next_wake = Some(next_wake.map_or(expires_at, |wake| wake.min(expires_at)));
                }
                entries.push(entry);
            }
        }

        let resolved: Vec<EffectInstance> = expired
            .into_iter()
            .map(|entry| {
                if let Some(target) = &entry.target {
                    target.notify_stat_update(&entry.instance);
                }
                entry.instance
            })
            .collect();

        if !resolved.is_empty() {
            tracing::debug!(resolved = resolved.len(), next_wake = ?next_wake, "expiry sweep");
        }

        SweepOutcome { resolved, next_wake }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Earliest expiry among tracked entries.
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.lock().iter().filter_map(|entry| entry.instance.expires_at).min()
    }

    /// Tracked instances on one target.
    pub fn active_on(&self, target_name: &str) -> Vec<EffectInstance> {
        self.lock()
            .iter()
            .filter(|entry| entry.instance.target_name.eq_ignore_ascii_case(target_name))
            .map(|entry| entry.instance.clone())
            .collect()
    }
}

impl std::fmt::Debug for ActiveEffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveEffectRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
