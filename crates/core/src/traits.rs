//! Common traits shared across HAP controller crates.

use crate::Result;

/// Trait for values that carry their own structural validation rule,
/// e.g. the `NNN-NN-NNN` Pair-Setup PIN format.
pub trait Validate {
    /// Validate the value, returning [`crate::Error::InvalidInput`] on failure.
    fn validate(&self) -> Result<()>;
}
