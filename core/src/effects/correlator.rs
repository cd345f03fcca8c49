//! Line → effect correlation
//!
//! An application line ("The goblin suffers the effect of Bio.") never names
//! who applied the effect. The source is recovered from the last action
//! logged on the same subject's channel ("Alice casts Bio.").

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{EffectFactory, EffectInstance, EffectRequest};
use crate::actors::{ActorDirectory, ActorRef};
use crate::chat_log::{ChannelContext, ChatLine, clean_name, group};
use crate::clock::Clock;
use crate::context::ActionContextCache;

/// A materialized application with its resolved actors.
pub struct Application {
    pub instance: EffectInstance,
    /// None when the source is unknown or the directory has no such actor
    pub source: Option<ActorRef>,
    pub target: Option<ActorRef>,
}

/// An explicit "loses the effect" line.
pub struct Loss {
    pub effect_name: String,
    pub target_name: String,
    pub resolved_at: DateTime<Utc>,
}

pub struct Correlator {
    actors: Arc<dyn ActorDirectory>,
    factory: Arc<dyn EffectFactory>,
    clock: Arc<dyn Clock>,
}

impl Correlator {
    pub fn new(
        actors: Arc<dyn ActorDirectory>,
        factory: Arc<dyn EffectFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actors,
            factory,
            clock,
        }
    }

    fn resolve_actor(&self, name: &str, channel: ChannelContext) -> Option<ActorRef> {
        if name.is_empty() {
            return None;
        }
        self.actors.resolve(name, channel.direction, channel.subject)
    }

    pub fn build_application(
        &self,
        line: &ChatLine,
        channel: ChannelContext,
        actions: &ActionContextCache,
    ) -> Application {
        let target_name = clean_name(line.groups.get(group::TARGET));
        let status = line.groups.get(group::STATUS).trim();

        let (source_name, action_name) = actions
            .lookup(channel.subject)
            .map(|action| (action.source_name.as_str(), action.action_name.as_str()))
            .unwrap_or(("", ""));

        let source = self.resolve_actor(source_name, channel);
        let target = self.resolve_actor(&target_name, channel);

        let instance = self.factory.build(EffectRequest {
            name: status,
            action_name,
            local_timestamp: &line.timestamp,
            applied_at: self.clock.now(),
            source_name,
            target_name: &target_name,
            chat_code: &line.code,
            direction: channel.direction,
            subject: channel.subject,
        });

        Application {
            instance,
            source,
            target,
        }
    }

    /// Losses only name a tracked instance; no actor is looked up.
    pub fn build_loss(&self, line: &ChatLine) -> Loss {
        Loss {
            effect_name: line.groups.get(group::STATUS).trim().to_string(),
            target_name: clean_name(line.groups.get(group::TARGET)),
            resolved_at: self.clock.now(),
        }
    }
}

impl std::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator").finish_non_exhaustive()
    }
}
