//! Pairwise correlation of profiles with missing values.
//!
//! Genetic interaction profiles are rarely complete, so each pair of profiles is
//! correlated only over the positions both of them have measured.
//!
//! ## Available Functions
//!
//! - [`pairwise_correlation_into`]: correlate all rows into a caller-provided buffer
//! - [`pairwise_correlation`]: allocate the result and correlate rows or columns
//! - [`pearson_pair`]: correlate two profiles

mod pearson;

pub use pearson::{MIN_DENOMINATOR, MIN_VALID_COLUMNS, pairwise_correlation_into, pearson_pair};

use crate::error::Result;
use ndarray::{Array2, ArrayView2};
use single_utilities::traits::FloatOpsTS;

/// Which profiles of a matrix get correlated with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationAxis {
    /// One profile per row
    #[default]
    Rows,
    /// One profile per column
    Columns,
}

/// Correlate all row (or column) profiles of `data`.
///
/// The result is zero-initialized before the kernel runs, so its diagonal is 0.0.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sga_kernels::correlation::{pairwise_correlation, CorrelationAxis};
///
/// let data = array![[1.0, 2.0, 3.0, 4.0], [2.0, 4.0, 6.0, 8.0]];
/// let corr = pairwise_correlation(data.view(), CorrelationAxis::Rows).unwrap();
/// assert!((corr[[0, 1]] - 1.0).abs() < 1e-12);
/// assert_eq!(corr[[0, 0]], 0.0);
/// ```
pub fn pairwise_correlation<T>(data: ArrayView2<'_, T>, axis: CorrelationAxis) -> Result<Array2<f64>>
where
    T: FloatOpsTS,
{
    let profiles = match axis {
        CorrelationAxis::Rows => data,
        CorrelationAxis::Columns => data.reversed_axes(),
    };

    let n = profiles.nrows();
    let mut result = Array2::<f64>::zeros((n, n));
    pairwise_correlation_into(profiles, result.view_mut())?;
    Ok(result)
}
