//! Hook dispatcher: assembles and runs the hook chain for one call.
//!
//! A chain runs in three stages, instance hooks before global hooks in each:
//!
//! 1. `All` hooks with `Always` frequency.
//! 2. Hooks named after the operation with `Always` frequency.
//! 3. Once-buckets: `All` then named. Each bucket is claimed (marked fired)
//!    before its hooks run.
//!
//! Within the chain:
//! - `Return(value)` stops the chain and becomes the chain's value.
//! - `Cancel` stops the chain, including every later stage, with no value.
//! - Any error from a hook propagates to the caller unchanged.

use serde_json::Value;
use tracing::{debug, info, warn};

use hooky_core::result::HookyResult;

use super::definitions::{
    ChainResult, Frequency, HookContext, HookKey, HookOutcome, HookTarget, Timing,
    normalize_operation,
};
use super::registry::{ArcHook, HookStore};

/// Whether the chain should keep going after a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Runs hook chains against one instance store and its type's global store.
#[derive(Debug)]
pub struct HookDispatcher<'s, T> {
    /// Hooks bound to the intercepted instance.
    local: &'s HookStore<T>,
    /// Hooks shared by every instance of the type.
    global: &'s HookStore<T>,
}

impl<'s, T: Send + Sync + 'static> HookDispatcher<'s, T> {
    /// Creates a new dispatcher over the two stores.
    pub fn new(local: &'s HookStore<T>, global: &'s HookStore<T>) -> Self {
        Self { local, global }
    }

    /// Runs the full before-chain for a call.
    pub async fn run_before(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
    ) -> HookyResult<ChainResult> {
        let ctx = context(target, operation, arguments, None, Timing::Before);
        self.dispatch(&ctx, false).await
    }

    /// Runs the full after-chain for a call whose body produced `result`.
    pub async fn run_after(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
        result: &Value,
    ) -> HookyResult<ChainResult> {
        let ctx = context(target, operation, arguments, Some(result), Timing::After);
        self.dispatch(&ctx, false).await
    }

    /// Runs only the once-stage of the before-chain.
    pub async fn run_once_before(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
    ) -> HookyResult<ChainResult> {
        let ctx = context(target, operation, arguments, None, Timing::Before);
        self.dispatch(&ctx, true).await
    }

    /// Runs only the once-stage of the after-chain.
    pub async fn run_once_after(
        &self,
        target: &T,
        operation: &str,
        arguments: &[Value],
        result: &Value,
    ) -> HookyResult<ChainResult> {
        let ctx = context(target, operation, arguments, Some(result), Timing::After);
        self.dispatch(&ctx, true).await
    }

    async fn dispatch(
        &self,
        ctx: &HookContext<'_, T>,
        once_only: bool,
    ) -> HookyResult<ChainResult> {
        let mut chain = ChainResult::default();
        let targets = [HookTarget::All, HookTarget::named(ctx.operation)];

        if !once_only {
            for target in &targets {
                let key = HookKey::new(ctx.timing, Frequency::Always, target.clone());
                for store in [self.local, self.global] {
                    let hooks = store.lookup(&key).await;
                    if self.run_bucket(&key, &hooks, ctx, &mut chain).await? == Flow::Stop {
                        return Ok(chain);
                    }
                }
            }
        }

        for target in &targets {
            let key = HookKey::new(ctx.timing, Frequency::Once, target.clone());
            for store in [self.local, self.global] {
                let Some(hooks) = store.claim_once(&key).await else {
                    continue;
                };
                if self.run_bucket(&key, &hooks, ctx, &mut chain).await? == Flow::Stop {
                    return Ok(chain);
                }
            }
        }

        if chain.executed > 0 {
            debug!(
                operation = ctx.operation,
                timing = ?ctx.timing,
                executed = chain.executed,
                "Hook chain completed"
            );
        }

        Ok(chain)
    }

    async fn run_bucket(
        &self,
        key: &HookKey,
        hooks: &[ArcHook<T>],
        ctx: &HookContext<'_, T>,
        chain: &mut ChainResult,
    ) -> HookyResult<Flow> {
        for hook in hooks {
            debug!(key = %key, hook = hook.name(), operation = ctx.operation, "Running hook");

            let outcome = hook.handle(ctx).await.inspect_err(|e| {
                warn!(
                    key = %key,
                    hook = hook.name(),
                    operation = ctx.operation,
                    error = %e,
                    "Hook failed"
                );
            })?;
            chain.executed += 1;

            match outcome {
                HookOutcome::Continue => {}
                HookOutcome::Return(value) => {
                    info!(
                        key = %key,
                        hook = hook.name(),
                        operation = ctx.operation,
                        "Hook short-circuited the chain"
                    );
                    chain.value = Some(value);
                    return Ok(Flow::Stop);
                }
                HookOutcome::Cancel(signal) => {
                    info!(
                        key = %key,
                        hook = hook.name(),
                        operation = ctx.operation,
                        reason = signal.reason.as_deref().unwrap_or("none"),
                        "Hook cancelled the chain"
                    );
                    chain.cancelled = true;
                    return Ok(Flow::Stop);
                }
            }
        }

        Ok(Flow::Continue)
    }
}

fn context<'a, T>(
    target: &'a T,
    operation: &'a str,
    arguments: &'a [Value],
    result: Option<&'a Value>,
    timing: Timing,
) -> HookContext<'a, T> {
    HookContext {
        target,
        operation: normalize_operation(operation),
        arguments,
        result,
        timing,
    }
}
