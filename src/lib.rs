//! # sga-kernels
//!
//! Numeric kernels for genetic interaction screens, part of the single-rust ecosystem.
//!
//! This crate provides the two computational building blocks used when analysing
//! interaction profiles and functional maps: profile similarity with missing data, and
//! spatial enrichment of node attributes in a network layout.
//!
//! ## Core Features
//!
//! - **Pairwise Correlation**: Pearson correlation between all rows (or columns) of a matrix,
//!   masking missing values per pair
//! - **SAFE Enrichment**: Hypergeometric neighborhood enrichment scores on a normalized
//!   `-log10(p)` scale
//! - **Layout Neighborhoods**: Node neighborhoods from a distance percentile over layout
//!   coordinates
//! - **Sparse Support**: Enrichment directly on `CsrMatrix` counts from nalgebra-sparse
//! - **Parallel Execution**: Independent pairs and neighborhoods are processed with rayon
//!
//! ## Module Organization
//!
//! - **[`correlation`]**: NaN-masked Pearson correlation
//! - **[`enrichment`]**: Neighborhood counting and SAFE scoring
//! - **[`error`]**: Error type shared by both kernels

pub mod correlation;
pub mod enrichment;
pub mod error;

pub use error::{KernelError, Result};
