//! Hook manager: registration and dispatch for one hookable object.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use hooky_core::result::HookyResult;

use crate::global::GlobalHooks;
use crate::hooks::definitions::{ChainResult, Frequency, HookKey, HookTarget, Scope, Timing};
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::{ArcHook, HookHandler, HookStore};
use crate::signature::SignatureDiagnostic;
use crate::traits::Hookable;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    /// Store the hook was added to.
    pub scope: Scope,
    /// Bucket the hook was added to.
    pub key: HookKey,
    /// Signature mismatches found while registering. Never fatal.
    pub diagnostics: Vec<SignatureDiagnostic>,
}

impl Registration {
    /// Returns whether the hook's declared parameters matched the operation.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Instance-scoped hooks of one object plus a handle to its type's global hooks.
pub struct HookManager<T> {
    /// Hooks registered on this object only.
    local: HookStore<T>,
    /// Hooks shared by every instance of `T`.
    global: Arc<GlobalHooks<T>>,
}

impl<T: Hookable> HookManager<T> {
    /// Creates a manager bound to `T`'s process-wide global hooks.
    pub fn new() -> Self {
        Self {
            local: HookStore::new(),
            global: GlobalHooks::<T>::shared(),
        }
    }

    /// The type's global hooks.
    pub fn global(&self) -> &Arc<GlobalHooks<T>> {
        &self.global
    }

    /// This object's instance store.
    pub fn local(&self) -> &HookStore<T> {
        &self.local
    }

    /// Registers a hook in the given scope.
    ///
    /// Named targets must be declared operations of `T` and pass the type's
    /// accessibility policy; otherwise nothing is stored.
    pub async fn register(
        &self,
        scope: Scope,
        timing: Timing,
        frequency: Frequency,
        target: HookTarget,
        hook: ArcHook<T>,
    ) -> HookyResult<Registration> {
        match scope {
            Scope::Global => self.global.register(timing, frequency, target, hook).await,
            Scope::Instance => {
                let target = target.normalized();
                let diagnostics = self.global.admit(&target, hook.as_ref()).await?;
                let key = HookKey::new(timing, frequency, target);

                self.local.register(key.clone(), hook).await;

                Ok(Registration {
                    scope: Scope::Instance,
                    key,
                    diagnostics,
                })
            }
        }
    }

    async fn register_local(
        &self,
        timing: Timing,
        frequency: Frequency,
        target: HookTarget,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register(Scope::Instance, timing, frequency, target, Arc::new(hook))
            .await
    }

    // ── Instance helpers ──

    /// Runs before every operation of this object.
    pub async fn on_before_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register_local(Timing::Before, Frequency::Always, HookTarget::All, hook)
            .await
    }

    /// Runs after every operation of this object.
    pub async fn on_after_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register_local(Timing::After, Frequency::Always, HookTarget::All, hook)
            .await
    }

    /// Runs before this object's first intercepted operation.
    pub async fn once_before_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register_local(Timing::Before, Frequency::Once, HookTarget::All, hook)
            .await
    }

    /// Runs after this object's first intercepted operation.
    pub async fn once_after_all(
        &self,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        self.register_local(Timing::After, Frequency::Once, HookTarget::All, hook)
            .await
    }

    /// Runs before every call of `operation` on this object.
    pub async fn on_before(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        let target = HookTarget::named(operation);
        self.register_local(Timing::Before, Frequency::Always, target, hook)
            .await
    }

    /// Runs after every call of `operation` on this object.
    pub async fn on_after(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        let target = HookTarget::named(operation);
        self.register_local(Timing::After, Frequency::Always, target, hook)
            .await
    }

    /// Runs before the first call of `operation` on this object.
    pub async fn once_before(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        let target = HookTarget::named(operation);
        self.register_local(Timing::Before, Frequency::Once, target, hook)
            .await
    }

    /// Runs after the first call of `operation` on this object.
    pub async fn once_after(
        &self,
        operation: &str,
        hook: impl HookHandler<T> + 'static,
    ) -> HookyResult<Registration> {
        let target = HookTarget::named(operation);
        self.register_local(Timing::After, Frequency::Once, target, hook)
            .await
    }

    // ── Construction ──

    /// Builds an instance of `T`, firing the type's pending constructor
    /// hooks around `build`. See [`GlobalHooks::construct`].
    pub async fn construct<F>(arguments: &[Value], build: F) -> HookyResult<T>
    where
        F: FnOnce() -> T,
    {
        GlobalHooks::<T>::shared().construct(arguments, build).await
    }

    // ── Dispatch ──

    /// A dispatcher over this object's store and the type's global store.
    pub fn dispatcher(&self) -> HookDispatcher<'_, T> {
        HookDispatcher::new(&self.local, self.global.store())
    }

    /// Runs the before-chain for a call on `target`.
    pub async fn run_before(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
    ) -> HookyResult<ChainResult> {
        self.dispatcher()
            .run_before(target, operation, arguments)
            .await
    }

    /// Runs the after-chain for a call on `target` that produced `result`.
    pub async fn run_after(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
        result: &Value,
    ) -> HookyResult<ChainResult> {
        self.dispatcher()
            .run_after(target, operation, arguments, result)
            .await
    }

    /// Runs only the once-stage of the before-chain.
    pub async fn run_once_before(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
    ) -> HookyResult<ChainResult> {
        self.dispatcher()
            .run_once_before(target, operation, arguments)
            .await
    }

    /// Runs only the once-stage of the after-chain.
    pub async fn run_once_after(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
        result: &Value,
    ) -> HookyResult<ChainResult> {
        self.dispatcher()
            .run_once_after(target, operation, arguments, result)
            .await
    }

    /// Wraps one intercepted call: before-chain, body, after-chain.
    ///
    /// A before-chain short-circuit value is returned without running the
    /// body or the after-chain. Otherwise the after-chain's short-circuit
    /// value replaces the body's result.
    pub async fn invoke<F, Fut>(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
        body: F,
    ) -> HookyResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HookyResult<Value>>,
    {
        let before = self.run_before(target, operation, arguments).await?;
        if let Some(value) = before.into_value() {
            info!(owner = T::type_name(), operation, "Operation short-circuited by hook");
            return Ok(value);
        }

        let result = body().await?;

        let after = self.run_after(target, operation, arguments, &result).await?;
        match after.into_value() {
            Some(replacement) => {
                debug!(owner = T::type_name(), operation, "Result replaced by after hook");
                Ok(replacement)
            }
            None => Ok(result),
        }
    }

    // ── Introspection & reset ──

    /// Number of hooks in `scope` under `key`.
    pub async fn hook_count(&self, scope: Scope, key: &HookKey) -> usize {
        match scope {
            Scope::Instance => self.local.hook_count(key).await,
            Scope::Global => self.global.store().hook_count(key).await,
        }
    }

    /// Keys holding at least one hook in `scope`.
    pub async fn registered_keys(&self, scope: Scope) -> Vec<HookKey> {
        match scope {
            Scope::Instance => self.local.registered_keys().await,
            Scope::Global => self.global.store().registered_keys().await,
        }
    }

    /// Forgets which of this object's once-buckets fired.
    pub async fn reset_once_state(&self) {
        self.local.reset_fired().await;
    }

    /// Removes every instance hook.
    pub async fn clear(&self) {
        self.local.reset().await;
    }
}

impl<T: Hookable> Default for HookManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HookManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("local", &self.local)
            .field("global", &self.global)
            .finish()
    }
}
