use thiserror::Error;

/// Errors raised by the correlation and enrichment kernels.
///
/// A NaN correlation is a regular output value and never shows up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    /// Shapes or options supplied by the caller are inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Hypergeometric parameters for a cell fall outside the distribution's domain.
    #[error("domain error at ({row}, {col}): {reason}")]
    Domain {
        row: usize,
        col: usize,
        reason: String,
    },
}

impl KernelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        KernelError::InvalidArgument(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, KernelError::InvalidArgument(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, KernelError::Domain { .. })
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
