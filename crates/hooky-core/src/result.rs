//! Convenience result type alias for Hooky.

use crate::error::HookyError;

/// A specialized `Result` type for Hooky operations.
pub type HookyResult<T> = Result<T, HookyError>;
