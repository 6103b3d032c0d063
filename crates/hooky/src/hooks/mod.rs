//! Hook system: keys and outcomes, per-scope stores and the chain dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{
    ChainResult, ConstructionContext, Frequency, HookContext, HookKey, HookOutcome, HookResult,
    HookTarget, Scope, Timing,
};
pub use dispatcher::HookDispatcher;
pub use registry::{ArcHook, HookHandler, HookStore};
