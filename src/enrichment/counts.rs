use crate::enrichment::layout::neighborhoods_by_distance;
use crate::enrichment::utils::{neighborhood, unique_members};
use crate::error::{KernelError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use rayon::prelude::*;

/// Attribute counts per node neighborhood together with the neighborhood sizes.
///
/// Row `i` of `counts` holds, for every attribute, how many members of node `i`'s
/// neighborhood carry it; `draw_sizes[i]` is the size of that neighborhood. The number of
/// rows doubles as the population size of the hypergeometric model.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodCounts {
    counts: Array2<u64>,
    draw_sizes: Array1<u64>,
}

impl NeighborhoodCounts {
    pub fn new(counts: Array2<u64>, draw_sizes: Array1<u64>) -> Result<Self> {
        if counts.nrows() != draw_sizes.len() {
            return Err(KernelError::invalid(format!(
                "expected {} draw sizes but got {}",
                counts.nrows(),
                draw_sizes.len()
            )));
        }
        Ok(NeighborhoodCounts { counts, draw_sizes })
    }

    /// Split a packed matrix whose last column holds each row's neighborhood size.
    pub fn from_packed(packed: ArrayView2<'_, u64>) -> Result<Self> {
        let n_cols = packed.ncols();
        if n_cols == 0 {
            return Err(KernelError::invalid(
                "packed counts need a trailing neighborhood size column",
            ));
        }

        let last = n_cols - 1;
        let counts = packed.slice(s![.., ..last]).to_owned();
        let draw_sizes = packed.column(last).to_owned();
        Self::new(counts, draw_sizes)
    }

    /// Count attribute carriers within each node's neighborhood.
    ///
    /// # Arguments
    ///
    /// * `neighborhoods` - Member node indices for every node, duplicates are counted once
    /// * `attributes` - Nodes × attributes matrix (usually 0/1 membership)
    pub fn from_neighborhoods(
        neighborhoods: &[Vec<usize>],
        attributes: ArrayView2<'_, u64>,
    ) -> Result<Self> {
        let (n_nodes, n_attributes) = attributes.dim();
        if neighborhoods.len() != n_nodes {
            return Err(KernelError::invalid(format!(
                "expected {} neighborhoods but got {}",
                n_nodes,
                neighborhoods.len()
            )));
        }

        let rows: Vec<(Array1<u64>, u64)> = neighborhoods
            .par_iter()
            .enumerate()
            .map(|(node, members)| count_members(node, members, attributes))
            .collect::<Result<_>>()?;

        let mut counts = Array2::<u64>::zeros((n_nodes, n_attributes));
        let mut draw_sizes = Array1::<u64>::zeros(n_nodes);
        for (node, (row, size)) in rows.into_iter().enumerate() {
            counts.row_mut(node).assign(&row);
            draw_sizes[node] = size;
        }

        log::debug!(
            "counted {} attributes over {} neighborhoods",
            n_attributes,
            n_nodes
        );

        Self::new(counts, draw_sizes)
    }

    /// Same as [`NeighborhoodCounts::from_neighborhoods`] with neighborhoods given as one
    /// flat `connectivity` array, where node `i` owns `offsets[i]` entries from `starts[i]`.
    pub fn from_connectivity(
        connectivity: &[usize],
        starts: &[usize],
        offsets: &[usize],
        attributes: ArrayView2<'_, u64>,
    ) -> Result<Self> {
        if starts.len() != offsets.len() {
            return Err(KernelError::invalid(
                "starts and offsets must have the same length",
            ));
        }

        let neighborhoods = (0..starts.len())
            .map(|node| {
                neighborhood(connectivity, starts, offsets, node)
                    .map(<[usize]>::to_vec)
                    .ok_or_else(|| {
                        KernelError::invalid(format!(
                            "neighborhood of node {} lies outside the connectivity array",
                            node
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_neighborhoods(&neighborhoods, attributes)
    }

    /// Count attribute carriers within distance neighborhoods of a network layout.
    ///
    /// Node `i`'s neighborhood holds every node whose Euclidean distance to it is at
    /// most the `percentile` (0 to 100) of all pairwise distances.
    pub fn from_layout(
        coords: ArrayView2<'_, f64>,
        percentile: f64,
        attributes: ArrayView2<'_, u64>,
    ) -> Result<Self> {
        if coords.nrows() != attributes.nrows() {
            return Err(KernelError::invalid(format!(
                "layout has {} nodes but attributes have {}",
                coords.nrows(),
                attributes.nrows()
            )));
        }

        let neighborhoods = neighborhoods_by_distance(coords, percentile)?;
        Self::from_neighborhoods(&neighborhoods, attributes)
    }

    pub fn counts(&self) -> ArrayView2<'_, u64> {
        self.counts.view()
    }

    pub fn draw_sizes(&self) -> ArrayView1<'_, u64> {
        self.draw_sizes.view()
    }

    pub fn nrows(&self) -> usize {
        self.counts.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.counts.ncols()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.counts.dim()
    }

    /// Population size of the null model, i.e. the number of nodes.
    pub fn population(&self) -> u64 {
        self.counts.nrows() as u64
    }
}

fn count_members(
    node: usize,
    members: &[usize],
    attributes: ArrayView2<'_, u64>,
) -> Result<(Array1<u64>, u64)> {
    let unique = unique_members(members);
    let mut row = Array1::<u64>::zeros(attributes.ncols());

    for &member in &unique {
        if member >= attributes.nrows() {
            return Err(KernelError::invalid(format!(
                "neighborhood of node {} references node {} but only {} nodes exist",
                node,
                member,
                attributes.nrows()
            )));
        }
        row += &attributes.row(member);
    }

    Ok((row, unique.len() as u64))
}

/// Number of nodes carrying each attribute.
pub fn column_totals(attributes: ArrayView2<'_, u64>) -> Array1<u64> {
    attributes.sum_axis(Axis(0))
}
