//! Process-wide hooks, one store per owning type.
//!
//! The first call to [`GlobalHooks::shared`] for a type creates its store;
//! later calls return the same handle. Stores are never dropped, only reset.

use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use hooky_core::config::policy::PolicyConfig;
use hooky_core::error::HookyError;
use hooky_core::result::HookyResult;

use crate::accessibility::{AccessPolicy, AccessibilityGuard, HookPolicy};
use crate::hooks::definitions::{
    ConstructionContext, Frequency, HookKey, HookOutcome, HookTarget, Scope, Timing,
};
use crate::hooks::registry::{ArcHook, HookHandler, HookStore};
use crate::manager::Registration;
use crate::signature::{SignatureDiagnostic, SignatureValidator};
use crate::traits::{ConstructionHook, Hookable};

/// Owning type → its `GlobalHooks<T>`.
static GLOBAL_HOOKS: LazyLock<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> =
    LazyLock::new(DashMap::new);

/// Global hooks and registration policy of one owning type.
pub struct GlobalHooks<T> {
    /// Hooks shared by every instance.
    store: HookStore<T>,
    /// Registration policy.
    policy: RwLock<HookPolicy>,
}

impl<T: Hookable> GlobalHooks<T> {
    fn new() -> Self {
        Self {
            store: HookStore::new(),
            policy: RwLock::new(HookPolicy::default()),
        }
    }

    /// Returns the process-wide handle for `T`, creating it on first use.
    pub fn shared() -> Arc<Self> {
        let entry = GLOBAL_HOOKS
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                info!(owner = T::type_name(), "Global hook store created");
                let hooks: Arc<dyn Any + Send + Sync> = Arc::new(Self::new());
                hooks
            })
            .value()
            .clone();

        entry.downcast::<Self>().unwrap_or_else(|_| {
            unreachable!("global hook entry for {} has a foreign type", T::type_name())
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &HookStore<T> {
        &self.store
    }

    // ── Configuration ──

    /// Returns a copy of the current policy.
    pub async fn policy(&self) -> HookPolicy {
        self.policy.read().await.clone()
    }

    /// Sets which visibility classes may be hooked.
    pub async fn set_accessibility_policy(&self, access: AccessPolicy) {
        self.policy.write().await.access = access;
        info!(owner = T::type_name(), access = ?access, "Accessibility policy updated");
    }

    /// Restricts hooking to an explicit list of operations.
    pub async fn set_hookable_operations<I, S>(&self, operations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operations: Vec<String> = operations.into_iter().map(Into::into).collect();
        info!(owner = T::type_name(), operations = ?operations, "Hookable operations updated");
        self.policy.write().await.hookable_operations = operations;
    }

    /// Removes the allow-list.
    pub async fn reset_hookable_operations(&self) {
        self.policy.write().await.hookable_operations.clear();
    }

    /// Enables or disables hook signature validation.
    pub async fn set_signature_validation_enabled(&self, enabled: bool) {
        self.policy.write().await.check_signatures = enabled;
    }

    /// Replaces the policy from its configuration section.
    pub async fn configure(&self, config: &PolicyConfig) -> HookyResult<()> {
        let policy = HookPolicy::from_config(config)?;
        info!(owner = T::type_name(), policy = ?policy, "Hook policy configured");
        *self.policy.write().await = policy;
        Ok(())
    }

    /// Restores the default policy.
    pub async fn reset_policy(&self) {
        *self.policy.write().await = HookPolicy::default();
    }

    // ── Registration ──

    /// Checks that a hook may be attached to `target` and validates its
    /// signature. Hooks on `All` are always admitted.
    pub(crate) async fn admit(
        &self,
        target: &HookTarget,
        hook: &dyn HookHandler<T>,
    ) -> HookyResult<Vec<SignatureDiagnostic>> {
        let HookTarget::Named(name) = target else {
            return Ok(Vec::new());
        };

        let operation = T::operation(name).ok_or_else(|| {
            HookyError::unknown_operation(format!(
                "'{name}' is not a declared operation of {}",
                T::type_name()
            ))
        })?;

        let policy = self.policy.read().await;
        AccessibilityGuard::new(&policy)
            .check(operation)
            .inspect_err(|e| {
                warn!(owner = T::type_name(), hook = hook.name(), error = %e, "Hook rejected");
            })?;

        if !policy.check_signatures {
            return Ok(Vec::new());
        }

        Ok(hook
            .parameters()
            .map(|params| SignatureValidator::validate(operation, hook.name(), params))
            .unwrap_or_default())
    }

    /// Registers a global hook.
    pub async fn register(
        &self,
        timing: Timing,
        frequency: Frequency,
        target: HookTarget,
        hook: ArcHook<T>,
    ) -> HookyResult<Registration> {
        let target = target.normalized();
        let diagnostics = self.admit(&target, hook.as_ref()).await?;
        let key = HookKey::new(timing, frequency, target);

        self.store.register(key.clone(), hook).await;

        Ok(Registration {
            scope: Scope::Global,
            key,
            diagnostics,
        })
    }

    /// Runs before every operation of every instance.
    pub async fn on_before_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(Timing::Before, Frequency::Always, HookTarget::All, Arc::new(hook))
            .await
    }

    /// Runs after every operation of every instance.
    pub async fn on_after_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(Timing::After, Frequency::Always, HookTarget::All, Arc::new(hook))
            .await
    }

    /// Runs before the first intercepted operation in the process.
    pub async fn once_before_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(Timing::Before, Frequency::Once, HookTarget::All, Arc::new(hook))
            .await
    }

    /// Runs after the first intercepted operation in the process.
    pub async fn once_after_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(Timing::After, Frequency::Once, HookTarget::All, Arc::new(hook))
            .await
    }

    /// Runs before `operation` on every instance.
    pub async fn on_before(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(
            Timing::Before,
            Frequency::Always,
            HookTarget::named(operation),
            Arc::new(hook),
        )
        .await
    }

    /// Runs after `operation` on every instance.
    pub async fn on_after(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(
            Timing::After,
            Frequency::Always,
            HookTarget::named(operation),
            Arc::new(hook),
        )
        .await
    }

    /// Runs before the first call of `operation` in the process.
    pub async fn once_before(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(
            Timing::Before,
            Frequency::Once,
            HookTarget::named(operation),
            Arc::new(hook),
        )
        .await
    }

    /// Runs after the first call of `operation` in the process.
    pub async fn once_after(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(
            Timing::After,
            Frequency::Once,
            HookTarget::named(operation),
            Arc::new(hook),
        )
        .await
    }

    // ── Construction ──

    /// Runs before the next construction of `T`.
    pub async fn on_before_construction(&self, hook: ConstructionHook<T>) {
        self.store.register_construction(Timing::Before, hook).await;
    }

    /// Runs after the next construction of `T`.
    pub async fn on_after_construction(&self, hook: ConstructionHook<T>) {
        self.store.register_construction(Timing::After, hook).await;
    }

    /// Builds an instance, firing pending constructor hooks around `build`.
    ///
    /// Each construction consumes every constructor hook pending at that
    /// moment; hooks registered afterwards wait for the next construction.
    /// When a hook fails, the error is returned and the pending hooks of that
    /// timing stay registered.
    pub async fn construct<F>(&self, arguments: &[Value], build: F) -> HookyResult<T>
    where
        F: FnOnce() -> T,
    {
        self.fire_construction(Timing::Before, arguments, None).await?;
        let instance = build();
        self.fire_construction(Timing::After, arguments, Some(&instance))
            .await?;
        Ok(instance)
    }

    async fn fire_construction(
        &self,
        timing: Timing,
        arguments: &[Value],
        instance: Option<&T>,
    ) -> HookyResult<usize> {
        let hooks = self.store.take_construction(timing).await;
        if hooks.is_empty() {
            return Ok(0);
        }

        let ctx = ConstructionContext {
            type_name: T::type_name(),
            arguments,
            instance,
            timing,
        };

        let mut executed = 0;
        for hook in &hooks {
            executed += 1;
            let outcome = match hook.call(&ctx).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        owner = T::type_name(),
                        hook = hook.name(),
                        error = %e,
                        "Constructor hook failed"
                    );
                    // A failed construction leaves the pending hooks in place.
                    self.store.restore_construction(timing, hooks.clone()).await;
                    return Err(e);
                }
            };
            if let HookOutcome::Cancel(signal) = outcome {
                info!(
                    owner = T::type_name(),
                    hook = hook.name(),
                    reason = signal.reason.as_deref().unwrap_or("none"),
                    "Constructor hook chain cancelled"
                );
                break;
            }
        }

        debug!(owner = T::type_name(), timing = ?timing, executed, "Constructor hooks fired");
        Ok(executed)
    }

    // ── Reset ──

    /// Clears every global hook and the global once-state.
    ///
    /// Pending constructor hooks survive; use
    /// [`GlobalHooks::reset_construction_hooks`] for those.
    pub async fn reset(&self) {
        self.store.reset().await;
    }

    /// Clears pending constructor hooks only.
    pub async fn reset_construction_hooks(&self) {
        self.store.reset_construction().await;
    }

    /// Forgets which global once-buckets fired.
    pub async fn reset_once_state(&self) {
        self.store.reset_fired().await;
    }
}

impl<T> std::fmt::Debug for GlobalHooks<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalHooks")
            .field("owner", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
