//! Accessibility policy and the registration-time guard.
//!
//! The policy is a small bitmask over visibility classes. The bit values
//! are spaced so that the abstract bit never overlaps a visibility bit.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};

use serde::{Deserialize, Serialize};
use tracing::debug;

use hooky_core::config::policy::PolicyConfig;
use hooky_core::error::HookyError;
use hooky_core::result::HookyResult;

use crate::operation::OperationDescriptor;

/// Bitmask of hookable visibility classes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPolicy(u32);

impl AccessPolicy {
    /// No visibility is hookable.
    pub const NONE: Self = Self(0);
    /// Interface- or abstract-declared operations.
    pub const ABSTRACT: Self = Self(8);
    /// Public operations.
    pub const PUBLIC: Self = Self(256);
    /// Protected operations.
    pub const PROTECTED: Self = Self(512);
    /// Private operations.
    pub const PRIVATE: Self = Self(1024);
    /// Public interface/abstract-declared operations.
    pub const DEFAULT: Self = Self(Self::PUBLIC.0 | Self::ABSTRACT.0);

    /// Builds a policy from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether any bit is shared with `other`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses visibility class names (`public`, `protected`, `private`,
    /// `abstract`) into a policy.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> HookyResult<Self> {
        names.iter().try_fold(Self::NONE, |policy, name| {
            let bit = match name.as_ref().trim().to_ascii_lowercase().as_str() {
                "public" => Self::PUBLIC,
                "protected" => Self::PROTECTED,
                "private" => Self::PRIVATE,
                "abstract" | "interface" => Self::ABSTRACT,
                other => {
                    return Err(HookyError::configuration(format!(
                        "Unknown accessibility class '{other}'"
                    )));
                }
            };
            Ok(policy | bit)
        })
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for AccessPolicy {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for AccessPolicy {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitXor for AccessPolicy {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::PUBLIC, "PUBLIC"),
            (Self::PROTECTED, "PROTECTED"),
            (Self::PRIVATE, "PRIVATE"),
            (Self::ABSTRACT, "ABSTRACT"),
        ]
        .into_iter()
        .filter(|(bit, _)| self.contains(*bit))
        .map(|(_, name)| name)
        .collect();

        write!(f, "AccessPolicy({})", names.join(" | "))
    }
}

/// Registration policy of one owning type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPolicy {
    /// Hookable visibility classes.
    pub access: AccessPolicy,
    /// Explicit allow-list. Empty means unrestricted.
    pub hookable_operations: Vec<String>,
    /// Whether hook signatures are compared with operation signatures.
    pub check_signatures: bool,
}

impl Default for HookPolicy {
    fn default() -> Self {
        Self {
            access: AccessPolicy::DEFAULT,
            hookable_operations: Vec::new(),
            check_signatures: true,
        }
    }
}

impl HookPolicy {
    /// Builds a policy from its configuration section.
    pub fn from_config(config: &PolicyConfig) -> HookyResult<Self> {
        Ok(Self {
            access: AccessPolicy::from_names(config.accessibility.as_slice())?,
            hookable_operations: config.hookable_operations.clone(),
            check_signatures: config.check_signatures,
        })
    }
}

/// Decides whether an operation may be hooked under a policy.
#[derive(Debug, Clone, Copy)]
pub struct AccessibilityGuard<'a> {
    policy: &'a HookPolicy,
}

impl<'a> AccessibilityGuard<'a> {
    /// Creates a guard for the given policy.
    pub fn new(policy: &'a HookPolicy) -> Self {
        Self { policy }
    }

    /// Returns `Ok(())` if the operation is hookable, or a restriction error.
    pub fn check(&self, operation: &OperationDescriptor) -> HookyResult<()> {
        let name = operation.name;

        if !self.policy.hookable_operations.is_empty()
            && !self.policy.hookable_operations.iter().any(|op| op == name)
        {
            return Err(HookyError::restriction(format!(
                "Operation '{name}' is not in the hookable operations list"
            )));
        }

        let declared = operation.access_bits();
        let allowed = self.policy.access;

        // Interface/abstract-declared operations are hookable whenever their
        // concrete visibility is allowed.
        if declared.intersects(AccessPolicy::ABSTRACT) {
            let concrete = declared ^ AccessPolicy::ABSTRACT;
            if !concrete.is_empty() && concrete.intersects(allowed) {
                debug!(operation = name, "Abstract-declared operation is hookable");
                return Ok(());
            }
        }

        if allowed.intersects(AccessPolicy::ABSTRACT) {
            return Err(HookyError::restriction(format!(
                "Operation '{name}' is restricted by the accessibility policy: \
                 it must be declared by an interface or abstract ancestor"
            )));
        }

        if declared.intersects(allowed) {
            return Ok(());
        }

        Err(HookyError::restriction(format!(
            "Operation '{name}' ({}) is restricted by the accessibility policy",
            operation.visibility
        )))
    }
}
