//! Hook keys, outcomes and per-call contexts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hooky_core::result::HookyResult;

use crate::cancel::CancellationSignal;

/// Where a hook is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Bound to one object.
    Instance,
    /// Process-wide, applies to every instance of the owning type.
    Global,
}

/// When a hook runs relative to the intercepted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Before the operation body.
    Before,
    /// After the operation body.
    After,
}

/// How often a hook bucket fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// On every qualifying call.
    Always,
    /// On the first qualifying call only, until the once-state is reset.
    Once,
}

/// Which operations a hook applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookTarget {
    /// Every interceptable operation.
    All,
    /// A single operation, by bare name.
    Named(String),
}

impl HookTarget {
    /// Creates a named target, stripping any `Type::` qualification.
    pub fn named(operation: &str) -> Self {
        Self::Named(normalize_operation(operation).to_string())
    }

    /// Strips any `Type::` qualification from a named target.
    pub fn normalized(self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Named(name) => Self::named(&name),
        }
    }

    /// Returns the operation name, if this target names one.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name),
        }
    }
}

/// Strips a `Type::` prefix from a qualified operation name.
pub fn normalize_operation(operation: &str) -> &str {
    match operation.rsplit_once("::") {
        Some((_, bare)) => bare,
        None => operation,
    }
}

/// Bucket key inside a single [`HookStore`](super::registry::HookStore).
///
/// The scope is not part of the key: instance and global hooks live in
/// separate stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookKey {
    /// Before or after.
    pub timing: Timing,
    /// Always or once.
    pub frequency: Frequency,
    /// All operations or one named operation.
    pub target: HookTarget,
}

impl HookKey {
    /// Creates a new key.
    pub fn new(timing: Timing, frequency: Frequency, target: HookTarget) -> Self {
        Self {
            timing,
            frequency,
            target,
        }
    }
}

impl fmt::Display for HookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match (self.frequency, self.timing) {
            (Frequency::Always, Timing::Before) => "before",
            (Frequency::Always, Timing::After) => "after",
            (Frequency::Once, Timing::Before) => "once_before",
            (Frequency::Once, Timing::After) => "once_after",
        };
        match &self.target {
            HookTarget::All => write!(f, "{prefix}:*"),
            HookTarget::Named(name) => write!(f, "{prefix}:{name}"),
        }
    }
}

/// What a hook tells the dispatcher to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HookOutcome {
    /// Run the next hook.
    Continue,
    /// Stop the chain; this value becomes the operation's effective result.
    ///
    /// `Return(Value::Null)` is an explicit null result and is distinct
    /// from [`HookOutcome::Continue`].
    Return(Value),
    /// Stop the chain without supplying a result.
    Cancel(CancellationSignal),
}

impl HookOutcome {
    /// Shorthand for [`HookOutcome::Continue`].
    pub fn continue_chain() -> Self {
        Self::Continue
    }

    /// Short-circuits with the given value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Return(value.into())
    }

    /// Short-circuits with an explicit null result.
    pub fn null() -> Self {
        Self::Return(Value::Null)
    }

    /// Cancels the rest of the chain.
    pub fn cancel() -> Self {
        Self::Cancel(CancellationSignal::new())
    }

    /// Cancels the rest of the chain, recording why.
    pub fn cancel_with(reason: impl Into<String>) -> Self {
        Self::Cancel(CancellationSignal::with_reason(reason))
    }
}

impl From<CancellationSignal> for HookOutcome {
    fn from(signal: CancellationSignal) -> Self {
        Self::Cancel(signal)
    }
}

/// Result type returned by hook bodies.
pub type HookResult = HookyResult<HookOutcome>;

/// Per-call data handed to each hook in a chain.
#[derive(Debug)]
pub struct HookContext<'a, T> {
    /// The object whose operation is being intercepted.
    pub target: &'a T,
    /// Bare operation name.
    pub operation: &'a str,
    /// Call arguments, in declaration order.
    pub arguments: &'a [Value],
    /// The operation's result. Only set for after-chains.
    pub result: Option<&'a Value>,
    /// Which chain is running.
    pub timing: Timing,
}

impl<'a, T> HookContext<'a, T> {
    /// Gets a call argument by position.
    pub fn argument(&self, index: usize) -> Option<&'a Value> {
        self.arguments.get(index)
    }

    /// Gets a string call argument by position.
    pub fn argument_str(&self, index: usize) -> Option<&'a str> {
        self.arguments.get(index).and_then(|v| v.as_str())
    }
}

/// Data handed to constructor hooks.
#[derive(Debug)]
pub struct ConstructionContext<'a, T> {
    /// Name of the type being constructed.
    pub type_name: &'static str,
    /// Constructor arguments.
    pub arguments: &'a [Value],
    /// The new instance. `None` while before-construction hooks run.
    pub instance: Option<&'a T>,
    /// Which chain is running.
    pub timing: Timing,
}

/// Aggregated outcome of running one chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainResult {
    /// Short-circuit value, if a hook supplied one.
    pub value: Option<Value>,
    /// Whether a hook cancelled the chain.
    pub cancelled: bool,
    /// Number of hooks that ran.
    pub executed: usize,
}

impl ChainResult {
    /// Returns whether a hook replaced the operation's result.
    pub fn is_short_circuit(&self) -> bool {
        self.value.is_some()
    }

    /// Consumes the result, returning the short-circuit value.
    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
