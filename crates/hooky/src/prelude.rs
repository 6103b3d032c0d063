//! Prelude for convenient imports.

pub use async_trait::async_trait;
pub use serde_json::{Value, json};

pub use hooky_core::error::{ErrorKind, HookyError};
pub use hooky_core::result::HookyResult;

pub use crate::accessibility::{AccessPolicy, HookPolicy};
pub use crate::cancel::CancellationSignal;
pub use crate::global::GlobalHooks;
pub use crate::hooks::definitions::{
    ChainResult, ConstructionContext, Frequency, HookContext, HookKey, HookOutcome, HookResult,
    HookTarget, Scope, Timing,
};
pub use crate::hooks::registry::HookHandler;
pub use crate::manager::{HookManager, Registration};
pub use crate::operation::{OperationDescriptor, Visibility};
pub use crate::signature::{DiagnosticKind, SignatureDiagnostic};
pub use crate::traits::{ClosureHook, ConstructionHook, Hookable};

pub use crate::{hook_args, operation};
