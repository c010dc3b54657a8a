//! Error types for cache construction and structural validation.
//!
//! Missing keys are not errors: lookups return `Option`. The types here cover
//! the two places where something can actually be wrong:
//!
//! - [`ConfigError`]: a builder was asked for a policy with invalid parameters.
//! - [`InvariantError`]: a `check_invariants` call found the internal
//!   structures out of sync. This always indicates a bug in the engine.
//!
//! ## Example
//!
//! ```
//! use kcache::builder::{CacheBuilder, PolicyKind};
//! use kcache::error::ConfigError;
//!
//! let err = CacheBuilder::new(8)
//!     .try_build::<u64, u64>(PolicyKind::LruK { k: 0 })
//!     .err()
//!     .unwrap();
//! assert_eq!(err, ConfigError::InvalidK);
//! ```

use thiserror::Error;

/// Invalid configuration passed to [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("LRU-K requires k >= 1")]
    InvalidK,
    #[error("aging ceiling must be at least 2 (got {0})")]
    AgingCeilingTooSmall(u64),
}

/// Describes a broken internal invariant found by `check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cache invariant violated: {message}")]
pub struct InvariantError {
    message: String,
}

impl InvariantError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Returns `Err(InvariantError)` with the formatted message when `cond` is false.
macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::InvariantError::new(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_invariant;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_error_display_includes_message() {
        let err = InvariantError::new("index has 3 keys, list has 2 nodes");
        assert_eq!(err.message(), "index has 3 keys, list has 2 nodes");
        assert_eq!(
            err.to_string(),
            "cache invariant violated: index has 3 keys, list has 2 nodes"
        );
    }

    #[test]
    fn config_error_display() {
        assert_eq!(ConfigError::InvalidK.to_string(), "LRU-K requires k >= 1");
        assert_eq!(
            ConfigError::AgingCeilingTooSmall(1).to_string(),
            "aging ceiling must be at least 2 (got 1)"
        );
    }

    #[test]
    fn ensure_invariant_short_circuits() {
        fn check(n: usize) -> Result<(), InvariantError> {
            ensure_invariant!(n < 3, "n = {} is too large", n);
            Ok(())
        }
        assert!(check(2).is_ok());
        assert_eq!(check(5).unwrap_err().message(), "n = 5 is too large");
    }
}
