//! Structural value comparison and method replacement for test doubles.
//!
//! [`deep_equal`] decides whether two runtime values are equal enough for
//! assertions and call matching. [`Registry`] swaps properties on live
//! objects for substitutes and restores the exact originals afterwards.

pub mod config;
pub mod date;
pub mod diagnostics;
pub mod equality;
pub mod error;
pub mod json;
pub mod naming;
pub mod object;
pub mod regexp;
pub mod registry;
pub mod types;

pub use equality::{ValueKind, deep_equal};
pub use error::InvalidTargetError;
pub use object::{Object, ObjectKind, PropertyDescriptor};
pub use registry::{Registry, ReplacementRecord};
pub use types::Value;
