//! Octree-style radius outlier filter.
//!
//! The cloud is bucketed into a uniform `2^d` grid per axis whose cells are
//! about `cube_size` wide. A point survives when its own cell holds more than
//! `own_threshold` points, or when the weighted occupancy of the 26
//! surrounding cells exceeds `neighbor_threshold`.

use serde::Serialize;

use crate::cell_code::CellCoder;
use crate::cell_stats::CellGrid;
use crate::config::{FilterConfig, FilterParams};
use crate::decision::{keep_mask, select_points};
use crate::density::estimate_density;
use crate::depth::{select_depth, validate_cube_size, DepthSelection};
use crate::error::FilterError;
use crate::extent::Extent;
use crate::notice::{FilterNotice, NoticeLog};
use crate::point::CloudPoint;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub input_len: usize,
    pub kept_len: usize,
    pub depth: DepthSelection,
    pub occupied_cells: usize,
    pub notices: Vec<FilterNotice>,
}

impl FilterReport {
    pub fn removed_len(&self) -> usize {
        self.input_len - self.kept_len
    }
}

#[derive(Debug, Clone)]
pub struct FilterOutput<P> {
    pub points: Vec<P>,
    pub report: FilterReport,
}

/// Removes outliers with the default [`FilterConfig`].
///
/// Points must be finite. The result is the kept subsequence of `points`.
pub fn filter<P: CloudPoint>(points: &[P], params: &FilterParams) -> Result<Vec<P>, FilterError> {
    filter_with_config(points, params, &FilterConfig::default()).map(|output| output.points)
}

pub fn filter_with_config<P: CloudPoint>(
    points: &[P],
    params: &FilterParams,
    config: &FilterConfig,
) -> Result<FilterOutput<P>, FilterError> {
    let (mask, report) = classify(points, params, config)?;
    Ok(FilterOutput {
        points: select_points(points, &mask),
        report,
    })
}

/// Computes the keep flag of every point without copying any of them.
pub fn classify<P: CloudPoint>(
    points: &[P],
    params: &FilterParams,
    config: &FilterConfig,
) -> Result<(Vec<bool>, FilterReport), FilterError> {
    let extent = Extent::from_points(points)?;
    validate_cube_size(params.cube_size)?;
    config.validate()?;
    let selection = select_depth(&extent, params.cube_size)?;

    let mut log = NoticeLog::new(params.verbose);
    if let Some(recommended_cube_size) = selection.recommended_cube_size {
        log.push(FilterNotice::DepthClamped {
            requested: selection.requested,
            depth: selection.depth,
            recommended_cube_size,
        });
    } else if selection.is_raised() {
        log.push(FilterNotice::DepthRaised {
            requested: selection.requested,
            depth: selection.depth,
        });
    }
    log.push(FilterNotice::DepthSelected {
        depth: selection.depth,
    });

    let mut grid = CellGrid::allocate(selection.depth, config.memory_budget_bytes)?;
    let codes = CellCoder::new(&extent, selection.depth).encode_all(points);
    grid.record_counts(&codes);
    let occupied_cells = grid.occupied().len();
    log.push(FilterNotice::OccupiedCells {
        count: occupied_cells,
    });

    estimate_density(&mut grid, &config.density);
    let mask = keep_mask(&codes, &grid, params.thresholds());
    drop(grid);

    let kept_len = mask.iter().filter(|keep| **keep).count();
    log.push(FilterNotice::Filtered {
        input: points.len(),
        kept: kept_len,
    });

    let report = FilterReport {
        input_len: points.len(),
        kept_len,
        depth: selection,
        occupied_cells,
        notices: log.into_notices(),
    };
    Ok((mask, report))
}
