use super::{classify, filter, filter_with_config};
use crate::config::{FilterConfig, FilterParams};
use crate::density::DensityConfig;
use crate::error::FilterError;
use crate::notice::FilterNotice;

struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn around(&mut self, center: f64, spread: f64) -> f64 {
        let sum = self.next_f64() + self.next_f64() + self.next_f64();
        center + (sum - 1.5) * spread
    }
}

/// Four blobs plus uniform background noise.
fn noisy_cloud(seed: u64) -> Vec<[f64; 3]> {
    let mut rng = Lcg(seed);
    let centers = [
        [0.0, 0.0, 0.0],
        [4.0, 1.0, -2.0],
        [-3.0, 5.0, 2.0],
        [2.0, -4.0, 4.0],
    ];
    let mut points = Vec::new();
    for center in centers {
        for _ in 0..800 {
            points.push([
                rng.around(center[0], 1.0),
                rng.around(center[1], 1.0),
                rng.around(center[2], 1.0),
            ]);
        }
    }
    for _ in 0..200 {
        points.push([
            rng.next_f64() * 20.0 - 10.0,
            rng.next_f64() * 20.0 - 10.0,
            rng.next_f64() * 20.0 - 10.0,
        ]);
    }
    points
}

/// 1000 points within 0.1 of the origin and five far-away loners.
fn cluster_with_loners() -> (Vec<[f64; 3]>, Vec<[f64; 3]>) {
    let mut cluster = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            for k in 0..10 {
                cluster.push([i as f64 * 0.01, j as f64 * 0.01, k as f64 * 0.01]);
            }
        }
    }
    let loners = vec![
        [-5.0, -5.0, -5.0],
        [5.0, -5.0, -5.0],
        [-5.0, 5.0, -5.0],
        [-5.0, -5.0, 5.0],
        [5.0, 5.0, 5.0],
    ];
    (cluster, loners)
}

fn is_subsequence(sub: &[[f64; 3]], full: &[[f64; 3]]) -> bool {
    let mut remaining = full.iter();
    sub.iter().all(|point| remaining.any(|candidate| candidate == point))
}

#[test]
fn output_is_ordered_subsequence_of_input() {
    let points = noisy_cloud(7);
    let kept = filter(&points, &FilterParams::new(0.3, 3, 2)).expect("filter");
    assert!(kept.len() < points.len());
    assert!(!kept.is_empty());
    assert!(is_subsequence(&kept, &points));
}

#[test]
fn repeated_runs_are_identical() {
    let points = noisy_cloud(11);
    let params = FilterParams::new(0.25, 4, 3);
    let first = filter(&points, &params).expect("first");
    let second = filter(&points, &params).expect("second");
    assert_eq!(first, second);
}

#[test]
fn isolated_points_are_dropped() {
    let (cluster, loners) = cluster_with_loners();
    let mut points = cluster.clone();
    points.insert(250, loners[0]);
    points.insert(600, loners[1]);
    points.extend_from_slice(&loners[2..]);

    for density in [DensityConfig::default(), DensityConfig::reference()] {
        let config = FilterConfig {
            density,
            ..FilterConfig::default()
        };
        let output =
            filter_with_config(&points, &FilterParams::new(0.1, 5, 5), &config).expect("filter");
        assert_eq!(output.points, cluster);
        assert_eq!(output.report.removed_len(), loners.len());
        assert_eq!(output.report.depth.depth, 5);
    }
}

#[test]
fn dense_cells_survive_any_neighbor_threshold() {
    let mut points = vec![[0.0, 0.0, 0.0]; 50];
    points.extend(noisy_cloud(3).into_iter().take(100));
    let kept = filter(&points, &FilterParams::new(0.5, 10, i64::MAX)).expect("filter");
    assert!(kept.len() >= 50);
    assert_eq!(kept.iter().filter(|p| **p == [0.0, 0.0, 0.0]).count(), 50);
}

#[test]
fn raising_thresholds_never_keeps_more() {
    let points = noisy_cloud(5);
    let config = FilterConfig::default();
    let kept = |own: i64, neighbor: i64| {
        let (mask, _) =
            classify(&points, &FilterParams::new(0.3, own, neighbor), &config).expect("classify");
        mask.iter().filter(|keep| **keep).count()
    };

    let mut previous = usize::MAX;
    for own in 0..12 {
        let count = kept(own, 4);
        assert!(count <= previous);
        previous = count;
    }

    previous = usize::MAX;
    for neighbor in 0..30 {
        let count = kept(3, neighbor);
        assert!(count <= previous);
        previous = count;
    }
}

#[test]
fn empty_input_is_an_error() {
    let points: Vec<[f64; 3]> = Vec::new();
    assert_eq!(
        filter(&points, &FilterParams::new(1.0, 5, 5)),
        Err(FilterError::EmptyInput)
    );
}

#[test]
fn coincident_points_are_an_error() {
    let points = vec![[1.0, 2.0, 3.0]; 10];
    assert_eq!(
        filter(&points, &FilterParams::new(1.0, 5, 5)),
        Err(FilterError::DegenerateExtent)
    );
}

#[test]
fn non_positive_cube_size_is_an_error() {
    let points = noisy_cloud(1);
    assert!(matches!(
        filter(&points, &FilterParams::new(0.0, 5, 5)),
        Err(FilterError::InvalidParameter { name: "cube_size", .. })
    ));
}

#[test]
fn clamped_depth_is_checked_against_budget() {
    let points = vec![[0.0, 0.0, 0.0], [10.5f64.exp(), 0.0, 0.0]];
    let config = FilterConfig {
        memory_budget_bytes: 1 << 20,
        ..FilterConfig::default()
    };
    let result = filter_with_config(&points, &FilterParams::new(1.0, 5, 5), &config);
    assert!(matches!(
        result,
        Err(FilterError::ResourceLimit { depth: 10, .. })
    ));
}

#[test]
fn report_lists_notices_in_pipeline_order() {
    let (cluster, _) = cluster_with_loners();
    let (mask, report) = classify(
        &cluster,
        &FilterParams::new(1.0, 5, 5).with_verbose(true),
        &FilterConfig::default(),
    )
    .expect("classify");

    assert!(mask.iter().all(|keep| *keep));
    assert_eq!(report.depth.depth, 1);
    assert_eq!(
        report.notices,
        vec![
            FilterNotice::DepthRaised {
                requested: -2,
                depth: 1,
            },
            FilterNotice::DepthSelected { depth: 1 },
            FilterNotice::OccupiedCells {
                count: report.occupied_cells,
            },
            FilterNotice::Filtered {
                input: 1000,
                kept: 1000,
            },
        ]
    );
}

#[test]
fn element_type_is_preserved() {
    let points = noisy_cloud(9);
    let narrow: Vec<[f32; 3]> = points
        .iter()
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();
    let kept: Vec<[f32; 3]> = filter(&narrow, &FilterParams::new(0.3, 3, 2)).expect("filter");
    assert!(!kept.is_empty());
    assert!(kept.len() < narrow.len());
}
