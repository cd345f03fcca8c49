//! Effect metadata factory
//!
//! Turns a correlated application into a populated `EffectInstance`. The
//! factory alone decides potency and whether the effect has a known expiry.

use chrono::{DateTime, Duration, Utc};
use hashbrown::HashMap;
use teast_types::{DetrimentalDefinition, Direction, Subject};

use super::EffectInstance;

/// Everything known about an application when it is materialized.
#[derive(Debug, Clone, Copy)]
pub struct EffectRequest<'a> {
    /// Effect name as logged
    pub name: &'a str,
    /// Action that most recently preceded the line on its channel (may be empty)
    pub action_name: &'a str,
    pub local_timestamp: &'a str,
    pub applied_at: DateTime<Utc>,
    pub source_name: &'a str,
    pub target_name: &'a str,
    pub chat_code: &'a str,
    pub direction: Direction,
    pub subject: Subject,
}

impl EffectRequest<'_> {
    /// Active instance carrying this request's context.
    pub fn into_instance(
        self,
        action_name: String,
        potency: i32,
        expires_at: Option<DateTime<Utc>>,
    ) -> EffectInstance {
        EffectInstance {
            name: self.name.to_string(),
            action_name,
            potency,
            applied_at_local: self.local_timestamp.to_string(),
            applied_at: self.applied_at,
            expires_at,
            source_name: self.source_name.to_string(),
            target_name: self.target_name.to_string(),
            chat_code: self.chat_code.to_string(),
            direction: self.direction,
            subject: self.subject,
            is_active: true,
        }
    }
}

pub trait EffectFactory: Send + Sync {
    fn build(&self, request: EffectRequest<'_>) -> EffectInstance;
}

/// Factory backed by a table of known detrimentals.
///
/// Unknown effects get potency 0, no expiry, and their triggering action
/// (or their own name) as label.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFactory {
    /// Lowercase effect name -> definition
    definitions: HashMap<String, DetrimentalDefinition>,
}

impl DefinitionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later definitions with the same name replace earlier ones.
    pub fn from_definitions(definitions: &[DetrimentalDefinition]) -> Self {
        let definitions = definitions
            .iter()
            .map(|def| (def.name.to_lowercase(), def.clone()))
            .collect();
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&DetrimentalDefinition> {
        self.definitions.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Non-finite or non-positive durations count as unknown.
fn duration_from_secs(secs: f32) -> Option<Duration> {
    (secs.is_finite() && secs > 0.0).then(|| Duration::milliseconds((secs * 1000.0).round() as i64))
}

impl EffectFactory for DefinitionFactory {
    fn build(&self, request: EffectRequest<'_>) -> EffectInstance {
        let definition = self.get(request.name);

        let action_name = definition
            .and_then(|def| def.action_name.clone())
            .or_else(|| (!request.action_name.is_empty()).then(|| request.action_name.to_string()))
            .unwrap_or_else(|| request.name.to_string());
        let potency = definition.and_then(|def| def.potency).unwrap_or(0);
        let expires_at = definition
            .and_then(|def| def.duration_secs)
            .and_then(duration_from_secs)
            .map(|duration| request.applied_at + duration);

        request.into_instance(action_name, potency, expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(name: &'a str, action_name: &'a str, applied_at: DateTime<Utc>) -> EffectRequest<'a> {
        EffectRequest {
            name,
            action_name,
            local_timestamp: "2024-03-09 21:04:05",
            applied_at,
            source_name: "Alice",
            target_name: "Goblin",
            chat_code: "0AA9",
            direction: Direction::Engaged,
            subject: Subject::You,
        }
    }

    fn definition(name: &str, duration_secs: Option<f32>) -> DetrimentalDefinition {
        DetrimentalDefinition {
            name: name.to_string(),
            action_name: None,
            potency: Some(40),
            duration_secs,
        }
    }

    #[test]
    fn unknown_effect_has_no_expiry() {
        let factory = DefinitionFactory::new();
        let now = Utc::now();

        let instance = factory.build(request("Poison", "", now));

        assert_eq!(instance.name, "Poison");
        assert_eq!(instance.action_name, "Poison");
        assert_eq!(instance.potency, 0);
        assert_eq!(instance.expires_at, None);
        assert_eq!(instance.applied_at, now);
        assert_eq!(instance.source_name, "Alice");
        assert_eq!(instance.chat_code, "0AA9");
        assert!(instance.is_active);
    }

    #[test]
    fn triggering_action_becomes_label() {
        let factory = DefinitionFactory::new();
        let instance = factory.build(request("Bio", "Bio II", Utc::now()));
        assert_eq!(instance.action_name, "Bio II");
    }

    #[test]
    fn known_effect_gets_duration_and_potency() {
        let factory = DefinitionFactory::from_definitions(&[definition("Bio", Some(30.0))]);
        let now = Utc::now();

        let instance = factory.build(request("bio", "", now));

        assert_eq!(instance.potency, 40);
        assert_eq!(instance.expires_at, Some(now + Duration::seconds(30)));
    }

    #[test]
    fn zero_duration_counts_as_unknown() {
        let factory = DefinitionFactory::from_definitions(&[definition("Bio", Some(0.0))]);
        let instance = factory.build(request("Bio", "", Utc::now()));
        assert_eq!(instance.expires_at, None);
    }

    #[test]
    fn definition_label_wins_over_action() {
        let mut def = definition("Bio", None);
        def.action_name = Some("Biolysis".to_string());
        let factory = DefinitionFactory::from_definitions(&[def]);

        let instance = factory.build(request("Bio", "Art of War", Utc::now()));
        assert_eq!(instance.action_name, "Biolysis");
    }
}
