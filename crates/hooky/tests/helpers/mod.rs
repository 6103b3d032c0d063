//! Shared test helpers for integration tests.
//!
//! Global hooks live for the whole test binary, so every test declares its
//! own service type with [`service!`] instead of sharing one.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hooky::prelude::*;

/// Operations every test service declares.
///
/// `fetch` and `process` are interface-declared so the default policy
/// admits them.
pub static OPERATIONS: [OperationDescriptor; 4] = [
    operation!(abstract public fetch(uri)),
    operation!(protected save(path)),
    operation!(abstract public process(input)),
    operation!(abstract protected render(template)),
];

/// Declares a hookable service type with `fetch`, `save`, `process` and
/// `render` operations wired through its hook manager.
macro_rules! service {
    ($name:ident) => {
        #[derive(Debug)]
        struct $name {
            hooks: ::hooky::HookManager<$name>,
        }

        impl ::hooky::Hookable for $name {
            fn operations() -> &'static [::hooky::OperationDescriptor] {
                &$crate::helpers::OPERATIONS
            }

            fn hooks(&self) -> &::hooky::HookManager<Self> {
                &self.hooks
            }

            fn type_name() -> &'static str {
                stringify!($name)
            }
        }

        #[allow(dead_code)]
        impl $name {
            fn new() -> Self {
                Self {
                    hooks: ::hooky::HookManager::new(),
                }
            }

            async fn construct(label: &str) -> ::hooky_core::HookyResult<Self> {
                let args = ::hooky::hook_args![label];
                ::hooky::HookManager::<Self>::construct(&args, Self::new).await
            }

            async fn fetch(&self, uri: &str) -> ::hooky_core::HookyResult<::serde_json::Value> {
                self.hooks
                    .invoke(self, "fetch", &::hooky::hook_args![uri], || async move {
                        Ok(::serde_json::json!(format!("content of {uri}")))
                    })
                    .await
            }

            async fn process(&self, input: i64) -> ::hooky_core::HookyResult<::serde_json::Value> {
                self.hooks
                    .invoke(self, "process", &::hooky::hook_args![input], || async move {
                        Ok(::serde_json::json!(input * 10))
                    })
                    .await
            }
        }
    };
}

pub(crate) use service;

/// Shared invocation counter.
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// Reads a counter.
pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// A hook that increments `counter` and lets the chain continue.
pub fn counting_hook<T: Send + Sync + 'static>(
    name: &str,
    counter: &Arc<AtomicUsize>,
) -> ClosureHook<T> {
    let counter = counter.clone();
    ClosureHook::sync(name, move |_ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(HookOutcome::Continue)
    })
}

/// A hook that does nothing.
pub fn noop_hook<T: Send + Sync + 'static>(name: &str) -> ClosureHook<T> {
    ClosureHook::sync(name, |_ctx| Ok(HookOutcome::Continue))
}
