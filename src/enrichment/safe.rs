//! Hypergeometric SAFE scoring.
//!
//! A neighborhood of `U` nodes drawn from a network of `N` nodes, `F` of which carry an
//! attribute, is expected to contain `U * F / N` carriers. The score of an observed count
//! `x` is `-log10 P(X >= x)` under `Hypergeometric(N, F, U)`, capped at [`MAX_LOG_P`] and
//! divided by it.

use crate::enrichment::counts::NeighborhoodCounts;
use crate::enrichment::{SafeOptions, ZeroCountPolicy};
use crate::error::{KernelError, Result};
use nalgebra_sparse::CsrMatrix;
use ndarray::{Array2, ArrayView1, ArrayViewMut2, Axis};
use rayon::prelude::*;
use statrs::distribution::{DiscreteCDF, Hypergeometric};

/// Largest `-log10(p)` that is resolved; smaller p-values all map to a score of 1.0.
pub const MAX_LOG_P: f64 = 16.0;

/// Map an upper-tail p-value onto the normalized [0, 1] enrichment scale.
pub fn normalized_score(p_value: f64) -> f64 {
    let score = -p_value.log10();
    let score = if score.is_infinite() { MAX_LOG_P } else { score };
    (score.min(MAX_LOG_P) / MAX_LOG_P).max(0.0)
}

/// Score a dense count matrix into `output`.
///
/// # Arguments
///
/// * `counts` - Attribute counts and sizes of every neighborhood
/// * `column_totals` - Number of carriers of each attribute in the whole network
/// * `output` - Buffer of the same shape as the count matrix
/// * `options` - Zero-count handling and optional significance filter
///
/// Shapes and hypergeometric parameters are checked for every cell before the first
/// score is written, so a failed call leaves `output` as it was.
pub fn safe_enrichment_into(
    counts: &NeighborhoodCounts,
    column_totals: ArrayView1<'_, u64>,
    mut output: ArrayViewMut2<'_, f64>,
    options: &SafeOptions,
) -> Result<()> {
    let (n_rows, n_cols) = counts.dim();
    check_shapes(n_rows, n_cols, column_totals.len(), output.dim())?;
    let threshold = options.score_threshold(n_cols)?;
    let population = counts.population();
    let draw_sizes = counts.draw_sizes();

    for (row, cells) in counts.counts().outer_iter().enumerate() {
        for (col, &observed) in cells.iter().enumerate() {
            check_cell(
                row,
                col,
                observed,
                draw_sizes[row],
                column_totals[col],
                population,
            )?;
        }
    }

    log::debug!(
        "SAFE enrichment over {} neighborhoods x {} attributes, population {}",
        n_rows,
        n_cols,
        population
    );

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(counts.counts().axis_iter(Axis(0)).into_par_iter())
        .enumerate()
        .try_for_each(|(row, (mut scores, cells))| -> Result<()> {
            let draws = draw_sizes[row];
            for (col, (&observed, slot)) in cells.iter().zip(scores.iter_mut()).enumerate() {
                if observed == 0 {
                    if options.zero_counts == ZeroCountPolicy::Fill {
                        *slot = 0.0;
                    }
                    continue;
                }
                *slot = score_cell(
                    row,
                    col,
                    observed,
                    draws,
                    column_totals[col],
                    population,
                    threshold,
                )?;
            }
            Ok(())
        })
}

/// Allocating variant of [`safe_enrichment_into`]; zero-count cells come out as 0.0.
pub fn safe_enrichment(
    counts: &NeighborhoodCounts,
    column_totals: ArrayView1<'_, u64>,
    options: &SafeOptions,
) -> Result<Array2<f64>> {
    let mut result = Array2::<f64>::zeros(counts.dim());
    safe_enrichment_into(counts, column_totals, result.view_mut(), options)?;
    Ok(result)
}

/// Score a sparse count matrix into `output`, touching only the stored entries.
///
/// Semantics match [`safe_enrichment_into`]; stored zeros behave like missing entries.
pub fn safe_enrichment_csr(
    counts: &CsrMatrix<u64>,
    draw_sizes: ArrayView1<'_, u64>,
    column_totals: ArrayView1<'_, u64>,
    mut output: ArrayViewMut2<'_, f64>,
    options: &SafeOptions,
) -> Result<()> {
    let (n_rows, n_cols) = (counts.nrows(), counts.ncols());
    if draw_sizes.len() != n_rows {
        return Err(KernelError::invalid(format!(
            "expected {} draw sizes but got {}",
            n_rows,
            draw_sizes.len()
        )));
    }
    check_shapes(n_rows, n_cols, column_totals.len(), output.dim())?;
    let threshold = options.score_threshold(n_cols)?;
    let population = n_rows as u64;

    for (row, entries) in counts.row_iter().enumerate() {
        for (&col, &observed) in entries.col_indices().iter().zip(entries.values()) {
            check_cell(
                row,
                col,
                observed,
                draw_sizes[row],
                column_totals[col],
                population,
            )?;
        }
    }

    log::debug!(
        "sparse SAFE enrichment over {} neighborhoods x {} attributes, {} stored counts",
        n_rows,
        n_cols,
        counts.nnz()
    );

    if options.zero_counts == ZeroCountPolicy::Fill {
        output.fill(0.0);
    }

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(row, mut scores)| -> Result<()> {
            let entries = counts.row(row);
            for (&col, &observed) in entries.col_indices().iter().zip(entries.values()) {
                if observed == 0 {
                    continue;
                }
                scores[col] = score_cell(
                    row,
                    col,
                    observed,
                    draw_sizes[row],
                    column_totals[col],
                    population,
                    threshold,
                )?;
            }
            Ok(())
        })
}

fn check_shapes(
    n_rows: usize,
    n_cols: usize,
    n_totals: usize,
    output_dim: (usize, usize),
) -> Result<()> {
    if n_totals != n_cols {
        return Err(KernelError::invalid(format!(
            "expected {} column totals but got {}",
            n_cols, n_totals
        )));
    }
    if output_dim != (n_rows, n_cols) {
        return Err(KernelError::invalid(format!(
            "output expected ({}, {}) but got ({}, {})",
            n_rows, n_cols, output_dim.0, output_dim.1
        )));
    }
    Ok(())
}

/// Reject parameters for which `P(X >= observed)` is undefined.
fn check_cell(
    row: usize,
    col: usize,
    observed: u64,
    draws: u64,
    successes: u64,
    population: u64,
) -> Result<()> {
    if observed == 0 {
        return Ok(());
    }

    let reason = if successes > population {
        format!(
            "attribute total {} exceeds population {}",
            successes, population
        )
    } else if draws > population {
        format!(
            "neighborhood size {} exceeds population {}",
            draws, population
        )
    } else if draws == 0 {
        format!("observed count {} exceeds neighborhood size 0", observed)
    } else {
        return Ok(());
    };

    Err(KernelError::Domain { row, col, reason })
}

fn score_cell(
    row: usize,
    col: usize,
    observed: u64,
    draws: u64,
    successes: u64,
    population: u64,
    threshold: Option<f64>,
) -> Result<f64> {
    let hypergeometric = Hypergeometric::new(population, successes, draws).map_err(|e| {
        KernelError::Domain {
            row,
            col,
            reason: e.to_string(),
        }
    })?;

    // P(X >= x) == P(X > x - 1); counts past min(F, U) have an empty upper tail
    let p_value = if observed > successes.min(draws) {
        0.0
    } else {
        hypergeometric.sf(observed - 1)
    };
    let score = normalized_score(p_value);

    log::trace!(
        "cell ({}, {}): x={} U={} F={} p={:e} score={}",
        row,
        col,
        observed,
        draws,
        successes,
        p_value,
        score
    );

    Ok(match threshold {
        Some(min_score) if score < min_score => 0.0,
        _ => score,
    })
}
