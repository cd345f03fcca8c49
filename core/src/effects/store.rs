use std::sync::Mutex;

use super::EffectInstance;

/// Downstream sink told about every application, once, whatever its duration.
pub trait EffectStore: Send + Sync {
    fn store(&self, instance: &EffectInstance);
}

impl<F> EffectStore for F
where
    F: Fn(&EffectInstance) + Send + Sync,
{
    fn store(&self, instance: &EffectInstance) {
        self(instance)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl EffectStore for NoopStore {
    fn store(&self, _instance: &EffectInstance) {}
}

/// Keeps every stored application in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Mutex<Vec<EffectInstance>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<EffectInstance> {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EffectStore for MemoryStore {
    fn store(&self, instance: &EffectInstance) {
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(instance.clone());
    }
}
