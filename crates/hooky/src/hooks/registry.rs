//! Hook store: append-only buckets of hooks plus once-fired bookkeeping.
//!
//! Every owning object carries one store for its instance hooks, and every
//! owning type shares one store for its global hooks. Insertion order is
//! execution order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::definitions::{HookContext, HookKey, HookResult, Timing};
use crate::traits::ConstructionHook;

/// Trait for hook implementations.
#[async_trait]
pub trait HookHandler<T>: Send + Sync + std::fmt::Debug {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Declared parameter names, compared against the operation's parameters
    /// at registration time. `None` skips the comparison.
    fn parameters(&self) -> Option<&[String]> {
        None
    }

    /// Handles one intercepted call.
    async fn handle(&self, ctx: &HookContext<'_, T>) -> HookResult;
}

/// Shared handle to a registered hook.
pub type ArcHook<T> = Arc<dyn HookHandler<T>>;

/// Storage for one scope (one instance, or one owning type's global hooks).
pub struct HookStore<T> {
    /// Key → hooks in registration order.
    buckets: RwLock<HashMap<HookKey, Vec<ArcHook<T>>>>,
    /// Once-buckets that have already fired.
    fired: RwLock<HashSet<HookKey>>,
    /// Pending constructor hooks, consumed by the next construction.
    construction: RwLock<HashMap<Timing, Vec<Arc<ConstructionHook<T>>>>>,
}

impl<T: Send + Sync + 'static> HookStore<T> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            fired: RwLock::new(HashSet::new()),
            construction: RwLock::new(HashMap::new()),
        }
    }

    /// Appends a hook to the bucket for `key`.
    pub async fn register(&self, key: HookKey, hook: ArcHook<T>) {
        let name = hook.name().to_string();

        let mut buckets = self.buckets.write().await;
        let entries = buckets.entry(key.clone()).or_default();
        entries.push(hook);

        info!(
            key = %key,
            hook = %name,
            position = entries.len(),
            "Hook registered"
        );
    }

    /// Returns a snapshot of the hooks registered under `key`.
    ///
    /// Absent keys yield an empty list. Hooks registered after the snapshot
    /// is taken do not join it.
    pub async fn lookup(&self, key: &HookKey) -> Vec<ArcHook<T>> {
        let buckets = self.buckets.read().await;
        buckets.get(key).cloned().unwrap_or_default()
    }

    /// Marks a once-bucket as fired. Returns `true` if it was not already.
    pub async fn mark_fired(&self, key: &HookKey) -> bool {
        let mut fired = self.fired.write().await;
        fired.insert(key.clone())
    }

    /// Returns whether a once-bucket has fired.
    pub async fn has_fired(&self, key: &HookKey) -> bool {
        let fired = self.fired.read().await;
        fired.contains(key)
    }

    /// Atomically claims a once-bucket.
    ///
    /// Lock order is `fired` then `buckets`; `reset` follows the same order.
    ///
    /// Returns the bucket's hooks and marks it fired, unless it already fired
    /// or is empty. Empty buckets are left unmarked so hooks registered later
    /// still get their single run.
    pub async fn claim_once(&self, key: &HookKey) -> Option<Vec<ArcHook<T>>> {
        let mut fired = self.fired.write().await;
        if fired.contains(key) {
            return None;
        }

        let hooks = self.lookup(key).await;
        if hooks.is_empty() {
            return None;
        }

        fired.insert(key.clone());
        debug!(key = %key, hooks = hooks.len(), "Once bucket claimed");
        Some(hooks)
    }

    /// Forgets which once-buckets have fired, keeping the hooks.
    pub async fn reset_fired(&self) {
        self.fired.write().await.clear();
    }

    /// Clears every bucket and the fired state. Constructor hooks are kept;
    /// see [`HookStore::reset_construction`].
    pub async fn reset(&self) {
        let mut fired = self.fired.write().await;
        let mut buckets = self.buckets.write().await;

        buckets.clear();
        fired.clear();

        info!("Hook store reset");
    }

    /// Appends a constructor hook.
    pub async fn register_construction(&self, timing: Timing, hook: ConstructionHook<T>) {
        let name = hook.name().to_string();

        let mut construction = self.construction.write().await;
        construction.entry(timing).or_default().push(Arc::new(hook));

        info!(timing = ?timing, hook = %name, "Constructor hook registered");
    }

    /// Removes and returns the constructor hooks pending for `timing`.
    pub async fn take_construction(&self, timing: Timing) -> Vec<Arc<ConstructionHook<T>>> {
        let mut construction = self.construction.write().await;
        construction.remove(&timing).unwrap_or_default()
    }

    /// Puts taken constructor hooks back ahead of any registered since.
    pub async fn restore_construction(
        &self,
        timing: Timing,
        hooks: Vec<Arc<ConstructionHook<T>>>,
    ) {
        if hooks.is_empty() {
            return;
        }
        let mut construction = self.construction.write().await;
        let pending = construction.entry(timing).or_default();
        let newer = std::mem::replace(pending, hooks);
        pending.extend(newer);
        debug!(timing = ?timing, pending = pending.len(), "Constructor hooks restored");
    }

    /// Returns the number of constructor hooks pending for `timing`.
    pub async fn construction_count(&self, timing: Timing) -> usize {
        let construction = self.construction.read().await;
        construction.get(&timing).map(|hooks| hooks.len()).unwrap_or(0)
    }

    /// Clears pending constructor hooks only.
    pub async fn reset_construction(&self) {
        self.construction.write().await.clear();
        info!("Constructor hooks reset");
    }

    /// Returns the number of hooks registered under `key`.
    pub async fn hook_count(&self, key: &HookKey) -> usize {
        let buckets = self.buckets.read().await;
        buckets.get(key).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns the total number of hooks in every bucket.
    pub async fn total_count(&self) -> usize {
        let buckets = self.buckets.read().await;
        buckets.values().map(Vec::len).sum()
    }

    /// Returns all keys that hold at least one hook.
    pub async fn registered_keys(&self) -> Vec<HookKey> {
        let buckets = self.buckets.read().await;
        buckets
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<T: Send + Sync + 'static> Default for HookStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HookStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::{Frequency, HookOutcome, HookTarget};
    use crate::traits::ClosureHook;

    #[derive(Debug)]
    struct Widget;

    fn hook(name: &str) -> ArcHook<Widget> {
        Arc::new(ClosureHook::<Widget>::sync(name, |_ctx| Ok(HookOutcome::Continue)))
    }

    fn key(frequency: Frequency, target: HookTarget) -> HookKey {
        HookKey::new(Timing::Before, frequency, target)
    }

    #[tokio::test]
    async fn test_lookup_absent_key_is_empty() {
        let store = HookStore::<Widget>::new();
        let hooks = store.lookup(&key(Frequency::Always, HookTarget::All)).await;
        assert!(hooks.is_empty());
    }

    #[tokio::test]
    async fn test_register_appends_in_order() {
        let store = HookStore::<Widget>::new();
        let key = key(Frequency::Always, HookTarget::named("save"));

        store.register(key.clone(), hook("first")).await;
        store.register(key.clone(), hook("second")).await;
        store.register(key.clone(), hook("first")).await;

        let names: Vec<String> = store
            .lookup(&key)
            .await
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "first"]);
        assert_eq!(store.hook_count(&key).await, 3);
        assert_eq!(store.registered_keys().await, vec![key]);
    }

    #[tokio::test]
    async fn test_claim_once() {
        let store = HookStore::<Widget>::new();
        let key = key(Frequency::Once, HookTarget::All);

        // Empty buckets are not consumed.
        assert!(store.claim_once(&key).await.is_none());
        assert!(!store.has_fired(&key).await);

        store.register(key.clone(), hook("setup")).await;
        assert_eq!(store.claim_once(&key).await.map(|h| h.len()), Some(1));
        assert!(store.has_fired(&key).await);
        assert!(store.claim_once(&key).await.is_none());

        store.reset_fired().await;
        assert!(store.claim_once(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_mark_fired() {
        let store = HookStore::<Widget>::new();
        let key = key(Frequency::Once, HookTarget::named("fetch"));

        assert!(store.mark_fired(&key).await);
        assert!(!store.mark_fired(&key).await);
        assert!(store.has_fired(&key).await);
    }

    #[tokio::test]
    async fn test_construction_is_consumed() {
        let store = HookStore::<Widget>::new();
        store
            .register_construction(
                Timing::Before,
                ConstructionHook::sync("init", |_ctx| Ok(HookOutcome::Continue)),
            )
            .await;

        assert_eq!(store.construction_count(Timing::Before).await, 1);
        assert_eq!(store.take_construction(Timing::Before).await.len(), 1);
        assert!(store.take_construction(Timing::Before).await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_keeps_construction_hooks() {
        let store = HookStore::<Widget>::new();
        let key = key(Frequency::Once, HookTarget::All);
        store.register(key.clone(), hook("setup")).await;
        store.mark_fired(&key).await;
        store
            .register_construction(
                Timing::After,
                ConstructionHook::sync("init", |_ctx| Ok(HookOutcome::Continue)),
            )
            .await;

        store.reset().await;

        assert_eq!(store.total_count().await, 0);
        assert!(!store.has_fired(&key).await);
        assert_eq!(store.construction_count(Timing::After).await, 1);
    }

    #[tokio::test]
    async fn test_restore_construction_keeps_order() {
        let store = HookStore::<Widget>::new();
        for name in ["first", "second"] {
            store
                .register_construction(
                    Timing::Before,
                    ConstructionHook::sync(name, |_ctx| Ok(HookOutcome::Continue)),
                )
                .await;
        }

        let taken = store.take_construction(Timing::Before).await;
        store
            .register_construction(
                Timing::Before,
                ConstructionHook::sync("late", |_ctx| Ok(HookOutcome::Continue)),
            )
            .await;
        store.restore_construction(Timing::Before, taken).await;

        let names: Vec<String> = store
            .take_construction(Timing::Before)
            .await
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "late"]);
    }

    #[tokio::test]
    async fn test_reset_construction_keeps_hooks() {
        let store = HookStore::<Widget>::new();
        let key = key(Frequency::Always, HookTarget::All);
        store.register(key.clone(), hook("audit")).await;
        store
            .register_construction(
                Timing::Before,
                ConstructionHook::sync("init", |_ctx| Ok(HookOutcome::Continue)),
            )
            .await;

        store.reset_construction().await;

        assert_eq!(store.hook_count(&key).await, 1);
        assert_eq!(store.construction_count(Timing::Before).await, 0);
    }
}
