//! Hook policy configuration.

use serde::{Deserialize, Serialize};

/// Registration policy applied to an owning type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Visibility classes that may be hooked: any of `"public"`,
    /// `"protected"`, `"private"`, `"abstract"`.
    #[serde(default = "default_accessibility")]
    pub accessibility: Vec<String>,
    /// Explicit allow-list of hookable operation names. Empty means no
    /// allow-list is enforced.
    #[serde(default)]
    pub hookable_operations: Vec<String>,
    /// Whether hook parameter lists are compared against the operation's.
    #[serde(default = "default_true")]
    pub check_signatures: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            accessibility: default_accessibility(),
            hookable_operations: Vec::new(),
            check_signatures: true,
        }
    }
}

fn default_accessibility() -> Vec<String> {
    vec!["public".to_string(), "abstract".to_string()]
}

fn default_true() -> bool {
    true
}
