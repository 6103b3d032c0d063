//! Hook signature validation.
//!
//! Compares the parameter names a hook declares with the parameter names of
//! the operation it is attached to. Mismatches are advisory: they are logged
//! as one combined warning and handed back to the caller, but never block a
//! registration.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::operation::OperationDescriptor;

/// Kind of parameter mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The hook declares a parameter the operation does not have.
    ExtraArgument,
    /// The operation has a parameter the hook omits.
    MissingArgument,
    /// Same position, different name.
    RenamedArgument,
}

/// One parameter mismatch between a hook and its operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureDiagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Operation the hook was registered for.
    pub operation: String,
    /// 1-based parameter position.
    pub position: usize,
    /// Parameter name declared by the operation, if any.
    pub expected: Option<String>,
    /// Parameter name declared by the hook, if any.
    pub found: Option<String>,
}

impl fmt::Display for SignatureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.position;
        let operation = &self.operation;
        let expected = self.expected.as_deref().unwrap_or_default();
        let found = self.found.as_deref().unwrap_or_default();

        match self.kind {
            DiagnosticKind::ExtraArgument => write!(
                f,
                "Hook argument {position} '{found}' does not exist in {operation}() \
                 as argument {position}"
            ),
            DiagnosticKind::MissingArgument => write!(
                f,
                "Hook argument {position} exists in {operation}() as '{expected}' \
                 but is omitted by the hook"
            ),
            DiagnosticKind::RenamedArgument => write!(
                f,
                "Hook argument {position} '{found}' is named '{expected}' in \
                 {operation}() as argument {position}"
            ),
        }
    }
}

/// Compares hook parameter lists against operation descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureValidator;

impl SignatureValidator {
    /// Computes the diagnostics for a hook declaring `hook_parameters`.
    ///
    /// Operations without parameters are never checked. A trailing hook
    /// parameter whose name contains `return` captures the operation's
    /// result and is exempt.
    pub fn compare<S: AsRef<str>>(
        operation: &OperationDescriptor,
        hook_parameters: &[S],
    ) -> Vec<SignatureDiagnostic> {
        if operation.parameters.is_empty() {
            return Vec::new();
        }

        let expected = operation.parameters;
        let last_hook_index = hook_parameters.len().checked_sub(1);
        let width = expected.len().max(hook_parameters.len());

        (0..width)
            .filter_map(|index| {
                let original = expected.get(index).copied();
                let declared = hook_parameters.get(index).map(|p| p.as_ref());

                let kind = match (original, declared) {
                    (Some(o), Some(d)) if o == d => return None,
                    (_, Some(d))
                        if Some(index) == last_hook_index
                            && d.to_ascii_lowercase().contains("return") =>
                    {
                        return None;
                    }
                    (None, Some(_)) => DiagnosticKind::ExtraArgument,
                    (Some(_), None) => DiagnosticKind::MissingArgument,
                    (Some(_), Some(_)) => DiagnosticKind::RenamedArgument,
                    (None, None) => return None,
                };

                Some(SignatureDiagnostic {
                    kind,
                    operation: operation.name.to_string(),
                    position: index + 1,
                    expected: original.map(str::to_string),
                    found: declared.map(str::to_string),
                })
            })
            .collect()
    }

    /// Computes the diagnostics and emits them as a single warning.
    pub fn validate<S: AsRef<str>>(
        operation: &OperationDescriptor,
        hook_name: &str,
        hook_parameters: &[S],
    ) -> Vec<SignatureDiagnostic> {
        let diagnostics = Self::compare(operation, hook_parameters);

        if !diagnostics.is_empty() {
            let message = diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");

            warn!(
                operation = operation.name,
                hook = hook_name,
                count = diagnostics.len(),
                "Hook signature mismatch:\n{}",
                message
            );
        }

        diagnostics
    }
}
