//! # hooky
//!
//! Interception engine for before/after hooks on named operations. Provides:
//!
//! - Instance-scoped and per-type global hook stores
//! - Always/once frequencies, including once-per-process global buckets
//! - Chain dispatch with short-circuit values and cancellation
//! - Accessibility policy and allow-list enforcement at registration time
//! - Non-fatal signature checks between hooks and the operations they target
//! - Constructor hooks consumed by the next construction of a type

pub mod accessibility;
pub mod cancel;
pub mod global;
pub mod hooks;
pub mod macros;
pub mod manager;
pub mod operation;
pub mod prelude;
pub mod signature;
pub mod traits;

pub use accessibility::{AccessPolicy, AccessibilityGuard, HookPolicy};
pub use cancel::CancellationSignal;
pub use global::GlobalHooks;
pub use hooks::definitions::{ChainResult, HookOutcome, HookResult, HookTarget};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::{HookHandler, HookStore};
pub use manager::{HookManager, Registration};
pub use operation::{OperationDescriptor, Visibility};
pub use traits::{ClosureHook, ConstructionHook, Hookable};

#[doc(hidden)]
pub use serde_json;
