use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Something that drops its engine-derived state when the owning engine shuts down.
pub trait TeardownHook: Send + Sync {
    /// Release everything derived from the engine. Must leave `self` usable.
    fn on_teardown(&self);
}

/// Bulk-clear contract for caches.
pub trait Clear {
    /// Drop every entry.
    fn clear(&mut self);
}

impl<T: Clear + Send> TeardownHook for Mutex<T> {
    fn on_teardown(&self) {
        self.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Registry of teardown observers.
///
/// Hooks are held weakly: a cache dropped by its owner simply disappears from the registry.
#[derive(Default)]
pub struct Teardown {
    hooks: Mutex<Vec<Weak<dyn TeardownHook>>>,
}

impl Teardown {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` to be fired on the next [`Teardown::fire`].
    pub fn register<H: TeardownHook + 'static>(&self, hook: &Arc<H>) {
        let weak = Arc::downgrade(hook);
        let weak: Weak<dyn TeardownHook> = weak;
        let mut hooks = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        hooks.retain(|h| h.strong_count() > 0);
        hooks.push(weak);
    }

    /// Number of registered hooks whose targets are still alive.
    pub fn live_hooks(&self) -> usize {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| h.strong_count() > 0)
            .count()
    }

    /// Fire and unregister every hook. Returns how many live hooks ran.
    pub fn fire(&self) -> usize {
        let hooks = std::mem::take(&mut *self.hooks.lock().unwrap_or_else(PoisonError::into_inner));
        let mut fired = 0usize;
        for hook in hooks {
            match hook.upgrade() {
                Some(h) => {
                    h.on_teardown();
                    fired += 1;
                }
                None => tracing::debug!("teardown hook target already dropped"),
            }
        }
        fired
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/context.rs"]
mod tests;
