// End-to-end checks that run the kernels the way a screen analysis chains them:
// profiles are correlated, and node neighborhoods of a layout are scored for enrichment.

#[cfg(test)]
mod integration_tests {
    use approx::assert_relative_eq;
    use nalgebra_sparse::{CooMatrix, CsrMatrix};
    use ndarray::{Array2, array};
    use sga_kernels::correlation::{CorrelationAxis, pairwise_correlation};
    use sga_kernels::enrichment::{
        NeighborhoodCounts, SafeOptions, ZeroCountPolicy, column_totals, safe_enrichment,
        safe_enrichment_csr, safe_enrichment_into,
    };

    /// Two well separated clusters of five nodes; attribute 0 marks the first cluster,
    /// attribute 1 is scattered over both.
    fn clustered_network() -> (Vec<Vec<usize>>, Array2<u64>) {
        let neighborhoods = (0..10)
            .map(|node| {
                let base = if node < 5 { 0 } else { 5 };
                (base..base + 5).collect()
            })
            .collect();
        let mut attributes = Array2::<u64>::zeros((10, 2));
        for node in 0..5 {
            attributes[[node, 0]] = 1;
        }
        for node in [1, 6] {
            attributes[[node, 1]] = 1;
        }
        (neighborhoods, attributes)
    }

    #[test]
    fn test_cluster_enrichment_end_to_end() {
        let (neighborhoods, attributes) = clustered_network();
        let counts = NeighborhoodCounts::from_neighborhoods(&neighborhoods, attributes.view()).unwrap();
        let totals = column_totals(attributes.view());
        assert_eq!(totals, array![5u64, 2]);

        let scores = safe_enrichment(&counts, totals.view(), &SafeOptions::default()).unwrap();
        assert_eq!(scores.dim(), (10, 2));

        // first cluster holds every carrier of attribute 0: p = 1 / C(10, 5)
        let expected = (252.0f64).log10() / 16.0;
        for node in 0..5 {
            assert_relative_eq!(scores[[node, 0]], expected, epsilon = 1e-10);
            assert_eq!(scores[[node + 5, 0]], 0.0);
        }

        // the scattered attribute is far weaker than the clustered one
        for node in 0..10 {
            assert!(scores[[node, 1]] < scores[[0, 0]]);
        }

        let significant = safe_enrichment(
            &counts,
            totals.view(),
            &SafeOptions::new().with_significance(0.05),
        )
        .unwrap();
        for node in 0..10 {
            assert_eq!(significant[[node, 1]], 0.0);
        }
    }

    #[test]
    fn test_layout_neighborhoods_match_clusters() {
        let (neighborhoods, attributes) = clustered_network();
        let square = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.5]];
        let mut coords = Array2::<f64>::zeros((10, 2));
        for node in 0..10 {
            let shift = if node < 5 { 0.0 } else { 100.0 };
            coords[[node, 0]] = square[node % 5][0] + shift;
            coords[[node, 1]] = square[node % 5][1];
        }

        // 20 within-cluster pairs sort below the 25 cross-cluster pairs; rank 19.36 lands
        // between the two groups
        let from_layout =
            NeighborhoodCounts::from_layout(coords.view(), 44.0, attributes.view()).unwrap();
        let explicit =
            NeighborhoodCounts::from_neighborhoods(&neighborhoods, attributes.view()).unwrap();
        assert_eq!(from_layout, explicit);
    }

    #[test]
    fn test_packed_layout_matches_explicit_counts() {
        let packed = array![[2u64, 0, 3], [1, 1, 2], [0, 2, 3], [0, 0, 1]];
        let totals = array![2u64, 2];

        let from_packed = NeighborhoodCounts::from_packed(packed.view()).unwrap();
        let explicit = NeighborhoodCounts::new(
            array![[2u64, 0], [1, 1], [0, 2], [0, 0]],
            array![3u64, 2, 3, 1],
        )
        .unwrap();

        let a = safe_enrichment(&from_packed, totals.view(), &SafeOptions::default()).unwrap();
        let b = safe_enrichment(&explicit, totals.view(), &SafeOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preseeded_buffer_with_sparse_counts() {
        let (neighborhoods, attributes) = clustered_network();
        let counts = NeighborhoodCounts::from_neighborhoods(&neighborhoods, attributes.view()).unwrap();
        let totals = column_totals(attributes.view());
        let options = SafeOptions::new().with_zero_counts(ZeroCountPolicy::Preserve);

        let mut dense_out = Array2::<f64>::from_elem((10, 2), f64::NAN);
        safe_enrichment_into(&counts, totals.view(), dense_out.view_mut(), &options).unwrap();

        let mut coo = CooMatrix::new(10, 2);
        for ((r, c), &v) in counts.counts().indexed_iter() {
            if v > 0 {
                coo.push(r, c, v);
            }
        }
        let csr = CsrMatrix::from(&coo);
        let mut sparse_out = Array2::<f64>::from_elem((10, 2), f64::NAN);
        safe_enrichment_csr(
            &csr,
            counts.draw_sizes(),
            totals.view(),
            sparse_out.view_mut(),
            &options,
        )
        .unwrap();

        for (a, b) in dense_out.iter().zip(sparse_out.iter()) {
            assert!(a.to_bits() == b.to_bits() || (a - b).abs() < 1e-12);
        }
        // untouched cells keep their seed
        assert!(dense_out[[5, 0]].is_nan());
        assert!(sparse_out[[5, 0]].is_nan());
    }

    #[test]
    fn test_profile_similarity_by_columns() {
        // columns are query profiles; query 0 and 2 share a pattern
        let scores = array![
            [0.5, -0.1, 0.45],
            [-0.3, 0.2, -0.25],
            [f64::NAN, 0.0, 0.1],
            [0.8, 0.3, 0.7],
            [-0.6, f64::NAN, -0.5]
        ];
        let corr = pairwise_correlation(scores.view(), CorrelationAxis::Columns).unwrap();
        assert_eq!(corr.dim(), (3, 3));
        assert!(corr[[0, 2]] > 0.95);
        assert_eq!(corr[[0, 2]], corr[[2, 0]]);
        assert_eq!(corr[[1, 1]], 0.0);
    }
}
