//! Detrimental tracker
//!
//! Entry point for classified chat lines. Action lines feed the per-subject
//! action cache; detrimental lines either register a new application or
//! resolve an explicit loss. Expiry runs on a single coalesced timer.

use std::sync::Arc;

use hashbrown::HashMap;
use teast_types::{LineKind, Subject, TrackerConfig};

use super::{
    ActiveEffectRegistry, Correlator, DefinitionFactory, EffectFactory, EffectInstance,
    EffectStore, ExpiryScheduler, NoopStore,
};
use crate::actors::ActorDirectory;
use crate::chat_log::{ChannelContext, ChatCodeTable, ChatLine, clean_name, group};
use crate::clock::{Clock, SystemClock};
use crate::context::ActionContextCache;
use crate::timer::Timer;

/// What handling a line did.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    ActionRecorded,
    Applied(EffectInstance),
    /// Loss matched a tracked instance; it resolves on the next sweep
    Lost(EffectInstance),
    /// Unrouted chat code, or a loss with nothing tracked
    Ignored,
}

type LineHandler = fn(&mut DetrimentalTracker, &ChatLine, ChannelContext) -> LineOutcome;

/// External collaborators the tracker is wired to.
pub struct Collaborators {
    pub timer: Arc<dyn Timer>,
    pub actors: Arc<dyn ActorDirectory>,
    pub clock: Arc<dyn Clock>,
    /// None = a `DefinitionFactory` built from the config's detrimentals
    pub factory: Option<Arc<dyn EffectFactory>>,
    pub store: Arc<dyn EffectStore>,
}

impl Collaborators {
    /// System clock, config-backed factory, no store.
    pub fn new(timer: Arc<dyn Timer>, actors: Arc<dyn ActorDirectory>) -> Self {
        Self {
            timer,
            actors,
            clock: Arc::new(SystemClock),
            factory: None,
            store: Arc::new(NoopStore),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn EffectFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn EffectStore>) -> Self {
        self.store = store;
        self
    }
}

pub struct DetrimentalTracker {
    actions: ActionContextCache,
    correlator: Correlator,
    registry: Arc<ActiveEffectRegistry>,
    scheduler: Arc<ExpiryScheduler>,
    chat_codes: ChatCodeTable,
    handlers: HashMap<LineKind, LineHandler>,
}

impl DetrimentalTracker {
    pub fn new(config: &TrackerConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            timer,
            actors,
            clock,
            factory,
            store,
        } = collaborators;

        let factory = factory.unwrap_or_else(|| {
            Arc::new(DefinitionFactory::from_definitions(&config.detrimentals)) as Arc<dyn EffectFactory>
        });
        let registry = Arc::new(ActiveEffectRegistry::new(store));
        let scheduler = ExpiryScheduler::new(
            Arc::clone(&registry),
            Arc::clone(&clock),
            timer,
            config.scheduler.min_interval_ms,
        );

        let mut handlers: HashMap<LineKind, LineHandler> = HashMap::new();
        handlers.insert(LineKind::Action, handle_action_line);
        handlers.insert(LineKind::Detrimental, handle_detrimental_line);

        Self {
            actions: ActionContextCache::new(),
            correlator: Correlator::new(actors, factory, clock),
            registry,
            scheduler,
            chat_codes: ChatCodeTable::from_config(&config.chat_codes),
            handlers,
        }
    }

    /// Route a line by its chat code. Unknown codes are ignored.
    pub fn process_line(&mut self, line: &ChatLine) -> LineOutcome {
        let Some(routed) = self.chat_codes.route(&line.code) else {
            tracing::trace!(code = %line.code, "unrouted chat code");
            return LineOutcome::Ignored;
        };
        match self.handlers.get(&routed.kind).copied() {
            Some(handler) => handler(self, line, routed.channel),
            None => LineOutcome::Ignored,
        }
    }

    /// Remember the latest action on `subject`'s channel.
    pub fn on_action_line(&mut self, subject: Subject, source: &str, action: &str) {
        self.actions
            .record_action(subject, clean_name(source), action.trim());
    }

    /// Apply a detrimental, or resolve it when the line carries the `loses` flag.
    pub fn on_detrimental_line(&mut self, line: &ChatLine, channel: ChannelContext) -> LineOutcome {
        if line.groups.flag(group::LOSES) {
            return self.lose(line);
        }

        let application = self
            .correlator
            .build_application(line, channel, &self.actions);
        let instance = application.instance.clone();

        if let Some(expires_at) = self.registry.apply(application.target, application.instance) {
            self.scheduler.note_candidate(expires_at);
        }
        LineOutcome::Applied(instance)
    }

    fn lose(&mut self, line: &ChatLine) -> LineOutcome {
        let loss = self.correlator.build_loss(line);
        match self
            .registry
            .resolve_loss(&loss.target_name, &loss.effect_name, loss.resolved_at)
        {
            Some(instance) => {
                // the sweep does the deactivation and notification
                self.scheduler.note_candidate(loss.resolved_at);
                LineOutcome::Lost(instance)
            }
            None => LineOutcome::Ignored,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn registry(&self) -> &Arc<ActiveEffectRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &Arc<ExpiryScheduler> {
        &self.scheduler
    }

    pub fn actions(&self) -> &ActionContextCache {
        &self.actions
    }

    /// Stop the expiry timer. Tracked entries stay where they are.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

impl Drop for DetrimentalTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn handle_action_line(
    tracker: &mut DetrimentalTracker,
    line: &ChatLine,
    channel: ChannelContext,
) -> LineOutcome {
    tracker.on_action_line(
        channel.subject,
        line.groups.get(group::SOURCE),
        line.groups.get(group::ACTION),
    );
    LineOutcome::ActionRecorded
}

fn handle_detrimental_line(
    tracker: &mut DetrimentalTracker,
    line: &ChatLine,
    channel: ChannelContext,
) -> LineOutcome {
    tracker.on_detrimental_line(line, channel)
}
