//! # hooky-core
//!
//! Core crate for Hooky. Contains the unified error system and the
//! configuration schemas shared by the engine and the binaries that embed it.
//!
//! This crate has **no** internal dependencies on other Hooky crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::HookyError;
pub use result::HookyResult;
