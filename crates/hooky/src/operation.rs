//! Declared metadata for interceptable operations.
//!
//! Owning types describe their operations up front (name, visibility,
//! parameter names) instead of being introspected at runtime. The
//! accessibility guard and the signature validator both read these
//! descriptors at registration time.

use std::fmt;

use serde::Serialize;

use crate::accessibility::AccessPolicy;

/// Declared visibility of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Returns the policy bit for this visibility.
    pub const fn bit(self) -> AccessPolicy {
        match self {
            Self::Public => AccessPolicy::PUBLIC,
            Self::Protected => AccessPolicy::PROTECTED,
            Self::Private => AccessPolicy::PRIVATE,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Static description of one interceptable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    /// Bare operation name.
    pub name: &'static str,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Whether the operation is declared by an interface (trait) or an
    /// abstract ancestor.
    pub abstract_declared: bool,
    /// Declared parameter names, in order.
    pub parameters: &'static [&'static str],
}

impl OperationDescriptor {
    /// Describes a public operation.
    pub const fn public(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self::new(name, Visibility::Public, parameters)
    }

    /// Describes a protected operation.
    pub const fn protected(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self::new(name, Visibility::Protected, parameters)
    }

    /// Describes a private operation.
    pub const fn private(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self::new(name, Visibility::Private, parameters)
    }

    const fn new(
        name: &'static str,
        visibility: Visibility,
        parameters: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            visibility,
            abstract_declared: false,
            parameters,
        }
    }

    /// Marks the operation as interface- or abstract-declared.
    pub const fn declared_abstract(mut self) -> Self {
        self.abstract_declared = true;
        self
    }

    /// Visibility bit, plus the abstract bit when abstract-declared.
    pub fn access_bits(&self) -> AccessPolicy {
        if self.abstract_declared {
            self.visibility.bit() | AccessPolicy::ABSTRACT
        } else {
            self.visibility.bit()
        }
    }
}

/// Looks up a descriptor by bare name.
pub fn find_operation<'a>(
    operations: &'a [OperationDescriptor],
    name: &str,
) -> Option<&'a OperationDescriptor> {
    operations.iter().find(|op| op.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATIONS: &[OperationDescriptor] = &[
        OperationDescriptor::public("fetch", &["uri"]),
        OperationDescriptor::protected("save", &["uri", "body"]).declared_abstract(),
    ];

    #[test]
    fn test_find_operation() {
        let save = find_operation(OPERATIONS, "save").expect("save is declared");
        assert_eq!(save.parameters, &["uri", "body"]);
        assert!(find_operation(OPERATIONS, "delete").is_none());
    }

    #[test]
    fn test_access_bits() {
        let fetch = find_operation(OPERATIONS, "fetch").expect("fetch is declared");
        assert_eq!(fetch.access_bits(), AccessPolicy::PUBLIC);

        let save = find_operation(OPERATIONS, "save").expect("save is declared");
        assert_eq!(
            save.access_bits(),
            AccessPolicy::PROTECTED | AccessPolicy::ABSTRACT
        );
    }
}
