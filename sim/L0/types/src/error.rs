//! Error types for plant operations.

use thiserror::Error;

/// Lifecycle phase in which an operation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Only while the plant is being assembled.
    PreFinalize,
    /// Only after `finalize()`.
    PostFinalize,
}

/// Errors raised by the multibody plant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlantError {
    /// An operation was called in the wrong lifecycle phase.
    #[error("{}", lifecycle_message(operation, *allowed))]
    LifecycleViolation {
        /// Name of the offending operation.
        operation: String,
        /// The only phase in which the operation is legal.
        allowed: Phase,
    },

    /// A caller-supplied argument was malformed or inconsistent.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// The operation is not available for the active scalar type.
    #[error("'{operation}()' is not supported for scalar type {scalar}")]
    UnsupportedOperation {
        /// Name of the operation.
        operation: String,
        /// Name of the scalar type.
        scalar: &'static str,
    },

    /// A structural precondition of the model does not hold.
    #[error("precondition not met: {reason}")]
    PreconditionNotMet {
        /// Description of the failed precondition.
        reason: String,
    },

    /// Derivatives were discarded while some of them were non-zero.
    #[error(
        "refusing to discard gradient: max |derivative| = {max_abs} exceeds tolerance {tolerance}"
    )]
    NonZeroGradient {
        /// Largest derivative magnitude found.
        max_abs: f64,
        /// Tolerance that was exceeded.
        tolerance: f64,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

fn lifecycle_message(operation: &str, allowed: Phase) -> String {
    match allowed {
        Phase::PreFinalize => format!(
            "Post-finalize calls to '{operation}()' are not allowed; \
             calls to this method must happen before Finalize()."
        ),
        Phase::PostFinalize => format!(
            "Pre-finalize calls to '{operation}()' are not allowed; \
             you must call Finalize() first."
        ),
    }
}

impl PlantError {
    /// A pre-finalize-only operation was called after finalize.
    #[must_use]
    pub fn post_finalize_call(operation: impl Into<String>) -> Self {
        Self::LifecycleViolation {
            operation: operation.into(),
            allowed: Phase::PreFinalize,
        }
    }

    /// A post-finalize-only operation was called before finalize.
    #[must_use]
    pub fn pre_finalize_call(operation: impl Into<String>) -> Self {
        Self::LifecycleViolation {
            operation: operation.into(),
            allowed: Phase::PostFinalize,
        }
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create an unsupported operation error for scalar type `scalar`.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>, scalar: &'static str) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            scalar,
        }
    }

    /// Create a precondition error.
    #[must_use]
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a lifecycle violation.
    #[must_use]
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(self, Self::LifecycleViolation { .. })
    }

    /// Check if this is an invalid argument error.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this is an unsupported operation error.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Check if this is a precondition error.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionNotMet { .. })
    }

    /// Check if this is a non-zero gradient error.
    #[must_use]
    pub fn is_non_zero_gradient(&self) -> bool {
        matches!(self, Self::NonZeroGradient { .. })
    }

    /// Name of the offending operation, for lifecycle and unsupported-operation errors.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::LifecycleViolation { operation, .. }
            | Self::UnsupportedOperation { operation, .. } => Some(operation),
            _ => None,
        }
    }
}
