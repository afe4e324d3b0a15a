//! SAFE neighborhood enrichment for network attributes.
//!
//! For every node neighborhood and every attribute, the number of neighbors carrying the
//! attribute is compared against a hypergeometric null model over the whole network. The
//! upper-tail p-value is turned into a score on a bounded `-log10` scale.
//!
//! ## Available Methods
//!
//! - [`safe_enrichment_into`]: score a dense count matrix into a caller-provided buffer
//! - [`safe_enrichment`]: same, allocating a zero-filled result
//! - [`safe_enrichment_csr`]: score a sparse count matrix, visiting stored entries only
//! - [`NeighborhoodCounts`]: per-node attribute counts plus neighborhood sizes
//! - [`neighborhoods_by_distance`]: neighborhoods from layout coordinates and a distance percentile
//!
//! ## Quick Example
//!
//! ```rust
//! use ndarray::array;
//! use sga_kernels::enrichment::{column_totals, safe_enrichment, NeighborhoodCounts, SafeOptions};
//!
//! // four nodes, one attribute carried by nodes 0 and 1
//! let attributes = array![[1u64], [1], [0], [0]];
//! let neighborhoods = vec![vec![0, 1], vec![0, 1], vec![2, 3], vec![2, 3]];
//!
//! let counts = NeighborhoodCounts::from_neighborhoods(&neighborhoods, attributes.view()).unwrap();
//! let totals = column_totals(attributes.view());
//! let scores = safe_enrichment(&counts, totals.view(), &SafeOptions::default()).unwrap();
//!
//! assert!(scores[[0, 0]] > 0.0);
//! assert_eq!(scores[[2, 0]], 0.0);
//! ```

mod counts;
mod layout;
mod safe;
pub(crate) mod utils;

pub use counts::{NeighborhoodCounts, column_totals};
pub use layout::{distance_threshold, neighborhoods_by_distance};
pub use safe::{MAX_LOG_P, normalized_score, safe_enrichment, safe_enrichment_csr, safe_enrichment_into};

use crate::error::{KernelError, Result};

/// What happens to cells whose observed count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroCountPolicy {
    /// Write 0.0 into the cell
    #[default]
    Fill,
    /// Leave whatever the caller seeded the buffer with
    Preserve,
}

/// Settings for a SAFE enrichment run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafeOptions {
    /// Handling of cells without any observed count
    pub zero_counts: ZeroCountPolicy,
    /// Family-wise significance level; scores of non-significant cells are set to 0.0
    pub significance: Option<f64>,
}

impl SafeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_counts(mut self, policy: ZeroCountPolicy) -> Self {
        self.zero_counts = policy;
        self
    }

    /// Zero out scores that are not significant at `alpha` after a Bonferroni
    /// correction over all attributes.
    pub fn with_significance(mut self, alpha: f64) -> Self {
        self.significance = Some(alpha);
        self
    }

    /// Smallest normalized score that survives the significance filter, if any.
    pub(crate) fn score_threshold(&self, n_attributes: usize) -> Result<Option<f64>> {
        let Some(alpha) = self.significance else {
            return Ok(None);
        };

        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(KernelError::invalid(format!(
                "significance level must be in (0, 1], got {}",
                alpha
            )));
        }

        if n_attributes == 0 {
            return Ok(None);
        }

        let corrected = alpha / n_attributes as f64;
        Ok(Some(-corrected.log10() / MAX_LOG_P))
    }
}
