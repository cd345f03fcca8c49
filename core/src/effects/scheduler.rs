//! Coalesced expiry scheduler
//!
//! One timer for the whole registry, always armed for the earliest known
//! expiry. When it fires the registry is swept and the timer re-armed for
//! whatever is due next; with nothing pending it stays idle.
//!
//! ```text
//!            note_candidate(t)            fire
//!   Idle ─────────────────────────▶ Armed(t) ─────▶ sweep ──▶ Armed(next)
//!    ▲                                 │ t' < t              │
//!    │                                 ▼                     │ no next
//!    │                             Armed(t')                 │
//!    └───────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Duration, Utc};

use super::ActiveEffectRegistry;
use crate::clock::Clock;
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed { wake_at: DateTime<Utc> },
}

#[derive(Debug)]
struct SchedulerInner {
    state: SchedulerState,
    /// Bumped on every arm; a callback from an older arm is stale.
    generation: u64,
}

pub struct ExpiryScheduler {
    registry: Arc<ActiveEffectRegistry>,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    min_interval: Duration,
    inner: Mutex<SchedulerInner>,
    this: Weak<ExpiryScheduler>,
}

impl ExpiryScheduler {
    /// `min_interval_ms` of zero is raised to one millisecond.
    pub fn new(
        registry: Arc<ActiveEffectRegistry>,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
        min_interval_ms: u64,
    ) -> Arc<Self> {
        let min_interval = Duration::milliseconds(min_interval_ms.clamp(1, u32::MAX as u64) as i64);
        Arc::new_cyclic(|this| Self {
            registry,
            clock,
            timer,
            min_interval,
            inner: Mutex::new(SchedulerInner {
                state: SchedulerState::Idle,
                generation: 0,
            }),
            this: this.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.inner.lock().unwrap_or_else(|e| {
            tracing::warn!("expiry scheduler lock poisoned, recovering");
            e.into_inner()
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state
    }

    /// Wake time of the armed timer, None when idle.
    pub fn armed_until(&self) -> Option<DateTime<Utc>> {
        match self.lock().state {
            SchedulerState::Armed { wake_at } => Some(wake_at),
            SchedulerState::Idle => None,
        }
    }

    /// A new expiry exists. Re-arms only if it beats the current wake time.
    ///
    /// Blocks while a fire is in progress, so it never races a re-arm.
    pub fn note_candidate(&self, expires_at: DateTime<Utc>) {
        let mut inner = self.lock();
        if let SchedulerState::Armed { wake_at } = inner.state
            && expires_at >= wake_at
        {
            return;
        }
        self.arm(&mut inner, expires_at);
    }

    /// Cancel the pending wait and go idle. Tracked entries are untouched.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = SchedulerState::Idle;
        self.timer.cancel();
    }

    fn arm(&self, inner: &mut SchedulerInner, wake_at: DateTime<Utc>) {
        let delay = (wake_at - self.clock.now()).max(self.min_interval);
        let delay = delay
            .to_std()
            .unwrap_or(std::time::Duration::from_millis(1));

        inner.generation += 1;
        inner.state = SchedulerState::Armed { wake_at };

        let generation = inner.generation;
        let this = self.this.clone();
        self.timer.arm(
            delay,
            Box::new(move || {
                if let Some(scheduler) = this.upgrade() {
                    scheduler.fire(generation);
                }
            }),
        );
    }

    /// Timer callback. Holds the scheduler lock for the whole sweep and
    /// re-arm, so fires never overlap each other or a `note_candidate`.
    fn fire(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::trace!(generation, current = inner.generation, "stale expiry timer ignored");
            return;
        }
        inner.state = SchedulerState::Idle;

        let outcome = self.registry.sweep(self.clock.now());
        if let Some(next_wake) = outcome.next_wake {
            self.arm(&mut inner, next_wake);
        }
    }
}

impl std::fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("state", &self.state())
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{Actor, ActorHandle, ActorRef};
    use crate::clock::ManualClock;
    use crate::effects::{EffectInstance, NoopStore};
    use crate::testing::ManualTimer;
    use teast_types::{Direction, Side, Subject};

    struct Fixture {
        clock: Arc<ManualClock>,
        timer: Arc<ManualTimer>,
        registry: Arc<ActiveEffectRegistry>,
        scheduler: Arc<ExpiryScheduler>,
        goblin: Arc<Actor>,
        t0: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let t0 = Utc::now();
        let clock = Arc::new(ManualClock::new(t0));
        let timer = Arc::new(ManualTimer::new());
        let registry = Arc::new(ActiveEffectRegistry::new(Arc::new(NoopStore)));
        let scheduler = ExpiryScheduler::new(registry.clone(), clock.clone(), timer.clone(), 1);
        Fixture {
            clock,
            timer,
            registry,
            scheduler,
            goblin: Arc::new(Actor::new("Goblin", Side::Hostile)),
            t0,
        }
    }

    impl Fixture {
        fn apply(&self, name: &str, expires_at: Option<DateTime<Utc>>) {
            let instance = EffectInstance {
                name: name.to_string(),
                action_name: name.to_string(),
                potency: 0,
                applied_at_local: String::new(),
                applied_at: self.clock.now(),
                expires_at,
                source_name: String::new(),
                target_name: "Goblin".to_string(),
                chat_code: "0AA9".to_string(),
                direction: Direction::Engaged,
                subject: Subject::You,
                is_active: true,
            };
            if let Some(expires_at) = self.registry.apply(Some(self.goblin.clone() as ActorRef), instance) {
                self.scheduler.note_candidate(expires_at);
            }
        }

        fn secs(&self, secs: i64) -> DateTime<Utc> {
            self.t0 + Duration::seconds(secs)
        }
    }

    #[test]
    fn starts_idle() {
        let f = fixture();
        assert_eq!(f.scheduler.state(), SchedulerState::Idle);
        assert_eq!(f.timer.arm_count(), 0);
    }

    #[test]
    fn arms_for_first_candidate() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));

        assert_eq!(f.scheduler.armed_until(), Some(f.secs(30)));
        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn earlier_candidate_rearms_later_does_not() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));
        f.apply("Dia", Some(f.secs(10)));
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(10)));
        assert_eq!(f.timer.arm_count(), 2);

        f.apply("Aero", Some(f.secs(20)));
        f.apply("Miasma", Some(f.secs(10)));
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(10)));
        assert_eq!(f.timer.arm_count(), 2);
    }

    #[test]
    fn fire_sweeps_and_rearms_for_next() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));
        f.apply("Dia", Some(f.secs(10)));

        f.clock.set(f.secs(10));
        assert!(f.timer.fire());

        assert_eq!(f.goblin.stat_update_count(), 1);
        assert_eq!(f.goblin.stat_updates()[0].name, "Dia");
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(30)));
        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_secs(20)));

        f.clock.set(f.secs(30));
        assert!(f.timer.fire());
        assert_eq!(f.goblin.stat_update_count(), 2);
        assert_eq!(f.scheduler.state(), SchedulerState::Idle);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn early_fire_rearms_without_resolving() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));

        f.clock.set(f.secs(29));
        assert!(f.timer.fire());

        assert_eq!(f.goblin.stat_update_count(), 0);
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(30)));
        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_secs(1)));
    }

    #[test]
    fn overdue_candidate_is_clamped_to_floor() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(-5)));

        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_millis(1)));
        assert!(f.timer.fire());
        assert_eq!(f.goblin.stat_update_count(), 1);
        assert_eq!(f.scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn zero_floor_is_raised_to_one_millisecond() {
        let f = fixture();
        let scheduler = ExpiryScheduler::new(f.registry.clone(), f.clock.clone(), f.timer.clone(), 0);

        scheduler.note_candidate(f.t0);

        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_millis(1)));
    }

    #[test]
    fn effects_without_duration_never_arm() {
        let f = fixture();
        f.apply("Poison", None);
        assert_eq!(f.scheduler.state(), SchedulerState::Idle);
        assert_eq!(f.timer.arm_count(), 0);
    }

    #[test]
    fn stale_callback_is_ignored() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));
        let stale = f.timer.take_callback().unwrap();
        f.apply("Dia", Some(f.secs(10)));

        f.clock.set(f.secs(40));
        stale();

        assert_eq!(f.goblin.stat_update_count(), 0);
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(10)));
    }

    #[test]
    fn armed_time_never_exceeds_minimum_pending_expiry() {
        let f = fixture();
        for (i, offset) in [40, 15, 25, 5, 60, 5, 12].into_iter().enumerate() {
            f.apply(&format!("Dot {i}"), Some(f.secs(offset)));
            assert!(f.scheduler.armed_until().unwrap() <= f.registry.next_expiry().unwrap());
        }

        for now in [5, 12, 15, 25] {
            f.clock.set(f.secs(now));
            f.timer.fire();
            if let Some(next) = f.registry.next_expiry() {
                assert!(f.scheduler.armed_until().unwrap() <= next);
            }
        }
        assert_eq!(f.goblin.stat_update_count(), 5);
    }

    /// Target that parks inside its notification until released twice.
    struct GatedActor {
        gate: std::sync::Barrier,
    }

    impl ActorHandle for GatedActor {
        fn name(&self) -> &str {
            "Gate"
        }

        fn append_detrimental(&self, _instance: &EffectInstance) {}

        fn notify_stat_update(&self, _instance: &EffectInstance) {
            self.gate.wait();
            self.gate.wait();
        }
    }

    #[test]
    fn candidate_during_fire_leaves_single_arm() {
        let f = fixture();
        let gated = Arc::new(GatedActor {
            gate: std::sync::Barrier::new(2),
        });

        let dot = EffectInstance {
            name: "Dot".to_string(),
            action_name: "Dot".to_string(),
            potency: 0,
            applied_at_local: String::new(),
            applied_at: f.t0,
            expires_at: Some(f.secs(10)),
            source_name: String::new(),
            target_name: "Gate".to_string(),
            chat_code: "0AA9".to_string(),
            direction: Direction::Engaged,
            subject: Subject::You,
            is_active: true,
        };
        f.registry.apply(Some(gated.clone() as ActorRef), dot);
        f.scheduler.note_candidate(f.secs(10));
        f.apply("Bio", Some(f.secs(30)));
        assert_eq!(f.timer.arm_count(), 1);

        f.clock.set(f.secs(10));
        std::thread::scope(|scope| {
            let firing = scope.spawn(|| f.timer.fire());

            // the fire now holds the scheduler lock
            gated.gate.wait();
            let candidate = scope.spawn(|| f.apply("Dia", Some(f.secs(20))));
            std::thread::sleep(std::time::Duration::from_millis(20));
            gated.gate.wait();

            assert!(firing.join().unwrap());
            candidate.join().unwrap();
        });

        // re-arm for Bio by the fire, then Dia's earlier candidate after it
        assert_eq!(f.timer.arm_count(), 3);
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(20)));
        assert_eq!(f.registry.next_expiry(), Some(f.secs(20)));
        assert_eq!(f.timer.armed_delay(), Some(std::time::Duration::from_secs(10)));

        f.clock.set(f.secs(20));
        assert!(f.timer.fire());
        assert_eq!(f.goblin.stat_update_count(), 1);
        assert_eq!(f.goblin.stat_updates()[0].name, "Dia");
        assert_eq!(f.scheduler.armed_until(), Some(f.secs(30)));
    }

    #[test]
    fn shutdown_cancels_and_idles() {
        let f = fixture();
        f.apply("Bio", Some(f.secs(30)));
        f.scheduler.shutdown();

        assert_eq!(f.scheduler.state(), SchedulerState::Idle);
        assert!(f.timer.armed_delay().is_none());
        assert_eq!(f.registry.len(), 1);
    }
}
