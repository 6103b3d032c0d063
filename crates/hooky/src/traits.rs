//! Closure-backed hooks and the trait implemented by hookable types.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::hooks::definitions::{ConstructionContext, HookContext, HookResult};
use crate::hooks::registry::HookHandler;
use crate::manager::HookManager;
use crate::operation::{OperationDescriptor, find_operation};

/// A type whose operations can be intercepted.
///
/// Implementors declare their operations once and own a [`HookManager`]
/// for their instance-scoped hooks. Global hooks are shared per type.
pub trait Hookable: Send + Sync + Sized + 'static {
    /// Declared interceptable operations.
    fn operations() -> &'static [OperationDescriptor];

    /// The instance's hook manager.
    fn hooks(&self) -> &HookManager<Self>;

    /// Name used in logs.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Looks up a declared operation by bare name.
    fn operation(name: &str) -> Option<&'static OperationDescriptor> {
        find_operation(Self::operations(), name)
    }
}

type HookFn<T> = dyn for<'a, 'b> Fn(&'a HookContext<'b, T>) -> BoxFuture<'static, HookResult>
    + Send
    + Sync;

/// A closure-based hook for quick hook creation.
pub struct ClosureHook<T> {
    /// Hook name.
    name: String,
    /// Declared parameter names, if any.
    parameters: Option<Vec<String>>,
    /// Hook function.
    handler: Arc<HookFn<T>>,
}

impl<T> std::fmt::Debug for ClosureHook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHook")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl<T: Send + Sync + 'static> ClosureHook<T> {
    /// Creates a hook from an async closure.
    ///
    /// The returned future must not borrow the context; copy what it needs
    /// out of `ctx` first.
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(&HookContext<'_, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            parameters: None,
            handler: Arc::new(move |ctx: &HookContext<'_, T>| -> BoxFuture<'static, HookResult> {
                Box::pin(handler(ctx))
            }),
        }
    }

    /// Creates a hook from a synchronous closure.
    pub fn sync<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&HookContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            parameters: None,
            handler: Arc::new(move |ctx: &HookContext<'_, T>| -> BoxFuture<'static, HookResult> {
                let result = handler(ctx);
                Box::pin(async move { result })
            }),
        }
    }

    /// Declares the hook's parameter names for signature validation.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    /// Wraps the hook into a shared trait object.
    pub fn into_arc(self) -> Arc<dyn HookHandler<T>> {
        Arc::new(self)
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> HookHandler<T> for ClosureHook<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Option<&[String]> {
        self.parameters.as_deref()
    }

    async fn handle(&self, ctx: &HookContext<'_, T>) -> HookResult {
        (self.handler)(ctx).await
    }
}

type ConstructionFn<T> =
    dyn for<'a, 'b> Fn(&'a ConstructionContext<'b, T>) -> BoxFuture<'static, HookResult>
        + Send
        + Sync;

/// A hook fired around the next construction of its owning type.
///
/// Return values are ignored; [`HookOutcome::Cancel`] stops the remaining
/// constructor hooks.
///
/// [`HookOutcome::Cancel`]: crate::hooks::definitions::HookOutcome::Cancel
pub struct ConstructionHook<T> {
    name: String,
    handler: Arc<ConstructionFn<T>>,
}

impl<T> std::fmt::Debug for ConstructionHook<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructionHook")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> ConstructionHook<T> {
    /// Creates a constructor hook from an async closure.
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(&ConstructionContext<'_, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Arc::new(
                move |ctx: &ConstructionContext<'_, T>| -> BoxFuture<'static, HookResult> {
                    Box::pin(handler(ctx))
                },
            ),
        }
    }

    /// Creates a constructor hook from a synchronous closure.
    pub fn sync<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&ConstructionContext<'_, T>) -> HookResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Arc::new(
                move |ctx: &ConstructionContext<'_, T>| -> BoxFuture<'static, HookResult> {
                    let result = handler(ctx);
                    Box::pin(async move { result })
                },
            ),
        }
    }

    /// Hook name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the hook.
    pub async fn call(&self, ctx: &ConstructionContext<'_, T>) -> HookResult {
        (self.handler)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::{HookOutcome, Timing};
    use serde_json::json;

    #[derive(Debug)]
    struct Widget {
        id: u32,
    }

    #[tokio::test]
    async fn test_sync_closure_hook() {
        let hook = ClosureHook::<Widget>::sync("echo", |ctx| {
            Ok(HookOutcome::value(ctx.argument(0).cloned().unwrap_or_default()))
        });

        let widget = Widget { id: 7 };
        let args = vec![json!("hello")];
        let ctx = HookContext {
            target: &widget,
            operation: "echo",
            arguments: &args,
            result: None,
            timing: Timing::Before,
        };

        assert_eq!(hook.name(), "echo");
        assert_eq!(hook.handle(&ctx).await.unwrap(), HookOutcome::value("hello"));
    }

    #[tokio::test]
    async fn test_async_closure_hook() {
        let hook = ClosureHook::<Widget>::new("widget-id", |ctx| {
            let id = ctx.target.id;
            async move { Ok(HookOutcome::value(id)) }
        })
        .with_parameters(["uri"]);

        let widget = Widget { id: 42 };
        let ctx = HookContext {
            target: &widget,
            operation: "fetch",
            arguments: &[],
            result: None,
            timing: Timing::After,
        };

        assert_eq!(hook.parameters(), Some(&["uri".to_string()][..]));
        assert_eq!(hook.handle(&ctx).await.unwrap(), HookOutcome::value(42));
    }

    #[tokio::test]
    async fn test_construction_hook_sees_instance() {
        let hook = ConstructionHook::<Widget>::sync("after-new", |ctx| {
            let id = ctx.instance.map(|w| w.id).unwrap_or_default();
            Ok(HookOutcome::value(id))
        });

        let widget = Widget { id: 3 };
        let ctx = ConstructionContext {
            type_name: "Widget",
            arguments: &[],
            instance: Some(&widget),
            timing: Timing::After,
        };

        assert_eq!(hook.call(&ctx).await.unwrap(), HookOutcome::value(3));
    }
}
