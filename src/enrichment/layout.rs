//! Neighborhoods from a 2D (or higher) network layout.
//!
//! Two nodes are neighbors when their Euclidean distance is within a percentile of all
//! pairwise node distances. Every node is part of its own neighborhood.

use crate::error::{KernelError, Result};
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Percentile of sorted values with linear interpolation between closest ranks.
fn interpolated_percentile(sorted: &[f64], percentile: f64) -> f64 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Distance cutoff at `percentile` (0 to 100) of all pairwise node distances.
///
/// Layouts with fewer than two nodes have no pairs and get a cutoff of 0.
pub fn distance_threshold(coords: ArrayView2<'_, f64>, percentile: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(KernelError::invalid(format!(
            "percentile must be within [0, 100], got {}",
            percentile
        )));
    }
    if let Some(bad) = coords.iter().find(|v| !v.is_finite()) {
        return Err(KernelError::invalid(format!(
            "layout coordinates must be finite, got {}",
            bad
        )));
    }

    let n_nodes = coords.nrows();
    if n_nodes < 2 {
        return Ok(0.0);
    }

    let mut distances: Vec<f64> = (0..n_nodes - 1)
        .into_par_iter()
        .flat_map_iter(|i| {
            let row_i = coords.row(i);
            (i + 1..n_nodes).map(move |j| euclidean(row_i, coords.row(j)))
        })
        .collect();
    distances.par_sort_unstable_by(f64::total_cmp);

    Ok(interpolated_percentile(&distances, percentile))
}

/// Neighborhood of every node: all nodes within the `percentile` distance cutoff.
///
/// # Arguments
///
/// * `coords` - Nodes × dimensions layout coordinates
/// * `percentile` - Cutoff percentile of the pairwise distances, within [0, 100]
pub fn neighborhoods_by_distance(
    coords: ArrayView2<'_, f64>,
    percentile: f64,
) -> Result<Vec<Vec<usize>>> {
    let threshold = distance_threshold(coords, percentile)?;
    let n_nodes = coords.nrows();

    log::debug!(
        "layout neighborhoods for {} nodes, cutoff {} at percentile {}",
        n_nodes,
        threshold,
        percentile
    );

    Ok((0..n_nodes)
        .into_par_iter()
        .map(|i| {
            let row_i = coords.row(i);
            (0..n_nodes)
                .filter(|&j| j == i || euclidean(row_i, coords.row(j)) <= threshold)
                .collect()
        })
        .collect())
}
