//! NaN-masked Pearson correlation between matrix rows.
//!
//! Every pair of rows is correlated over the columns where both rows carry a value,
//! so missing measurements only shrink the sample of the pairs they touch.

use crate::error::{KernelError, Result};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2, Axis};
use num_traits::ToPrimitive;
use rayon::prelude::*;
use single_utilities::traits::{FloatOps, FloatOpsTS};

/// Minimum number of jointly observed columns for a pair to get a coefficient.
pub const MIN_VALID_COLUMNS: usize = 3;

/// Denominators below this are treated as zero variance.
pub const MIN_DENOMINATOR: f64 = 1e-5;

/// Running sums over the jointly observed columns of two rows.
#[derive(Debug, Clone, Copy, Default)]
struct PairSums {
    n: usize,
    sum_x: f64,
    sum_y: f64,
    sum_xy: f64,
    sum_x2: f64,
    sum_y2: f64,
}

impl PairSums {
    fn accumulate<T>(x: ArrayView1<'_, T>, y: ArrayView1<'_, T>) -> Self
    where
        T: FloatOps,
    {
        let mut sums = PairSums::default();

        for (&a, &b) in x.iter().zip(y.iter()) {
            // values that don't fit an f64 are masked like NaN
            let (a, b) = match (ToPrimitive::to_f64(&a), ToPrimitive::to_f64(&b)) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            if a.is_nan() || b.is_nan() {
                continue;
            }

            sums.n += 1;
            sums.sum_x += a;
            sums.sum_y += b;
            sums.sum_xy += a * b;
            sums.sum_x2 += a * a;
            sums.sum_y2 += b * b;
        }

        sums
    }

    fn coefficient(&self) -> f64 {
        if self.n < MIN_VALID_COLUMNS {
            return f64::NAN;
        }

        let n = self.n as f64;
        let den = (n * self.sum_x2 - self.sum_x * self.sum_x).sqrt()
            * (n * self.sum_y2 - self.sum_y * self.sum_y).sqrt();

        // NaN denominators fail this too
        if !(den >= MIN_DENOMINATOR) {
            return f64::NAN;
        }

        (n * self.sum_xy - self.sum_x * self.sum_y) / den
    }
}

/// Pearson correlation of two equally long rows, skipping columns where either is NaN.
///
/// Returns NaN when fewer than [`MIN_VALID_COLUMNS`] columns are jointly observed or
/// when either row has (near) zero variance over those columns.
pub fn pearson_pair<T>(x: ArrayView1<'_, T>, y: ArrayView1<'_, T>) -> Result<f64>
where
    T: FloatOps,
{
    if x.len() != y.len() {
        return Err(KernelError::invalid(format!(
            "rows must have equal length, got {} and {}",
            x.len(),
            y.len()
        )));
    }

    Ok(PairSums::accumulate(x, y).coefficient())
}

/// Correlate every pair of rows of `data` and write the coefficients into `output`.
///
/// # Arguments
///
/// * `data` - Matrix (rows × columns), NaN marks a missing value
/// * `output` - Square buffer with one row and column per row of `data`
///
/// Each unordered pair is computed once and stored at `[i, j]` and `[j, i]`. The
/// diagonal is left as the caller seeded it. A wrongly shaped `output` is rejected
/// before anything is written.
pub fn pairwise_correlation_into<T>(
    data: ArrayView2<'_, T>,
    mut output: ArrayViewMut2<'_, f64>,
) -> Result<()>
where
    T: FloatOpsTS,
{
    let (n_rows, n_cols) = data.dim();

    if output.dim() != (n_rows, n_rows) {
        let (out_rows, out_cols) = output.dim();
        return Err(KernelError::invalid(format!(
            "output expected ({}, {}) but got ({}, {})",
            n_rows, n_rows, out_rows, out_cols
        )));
    }

    log::debug!(
        "pairwise correlation over {} rows x {} columns",
        n_rows,
        n_cols
    );

    if n_rows < 2 {
        return Ok(());
    }

    // row i owns the upper segment [i, i+1..]
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut out_row)| {
            let row_i = data.row(i);
            for j in i + 1..n_rows {
                out_row[j] = PairSums::accumulate(row_i, data.row(j)).coefficient();
            }
        });

    for i in 0..n_rows - 1 {
        for j in i + 1..n_rows {
            output[[j, i]] = output[[i, j]];
        }
    }

    Ok(())
}
