use serde::Serialize;

use crate::error::FilterError;
use crate::extent::Extent;

/// Deepest grid resolution; `2^(3 * MAX_DEPTH)` addressable cells.
pub const MAX_DEPTH: u32 = 10;
pub const MIN_DEPTH: u32 = 1;

/// Grid resolution chosen for one filter call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthSelection {
    /// Effective depth, always within `MIN_DEPTH..=MAX_DEPTH`.
    pub depth: u32,
    /// Depth the extent-to-cube ratio asked for before clamping.
    pub requested: i64,
    /// Smallest cube size that would not have needed clamping. Only set when
    /// `requested > MAX_DEPTH`.
    pub recommended_cube_size: Option<f64>,
}

impl DepthSelection {
    pub fn is_clamped(&self) -> bool {
        self.requested > MAX_DEPTH as i64
    }

    pub fn is_raised(&self) -> bool {
        self.requested < MIN_DEPTH as i64
    }
}

pub fn validate_cube_size(cube_size: f64) -> Result<(), FilterError> {
    if cube_size.is_finite() && cube_size > 0.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidParameter {
            name: "cube_size",
            value: cube_size,
        })
    }
}

/// `floor(ln(max_extent / cube_size)) + 1`, unclamped.
pub fn requested_depth(max_extent: f64, cube_size: f64) -> i64 {
    ((max_extent / cube_size).ln().floor() as i64).saturating_add(1)
}

/// Picks the grid depth for `extent` so a cell is roughly `cube_size` wide.
///
/// Depths above [`MAX_DEPTH`] are clamped; the selection then carries the
/// cube size that would have fit, `2^(requested - 9) * cube_size`. Filtering
/// still proceeds at the coarser resolution.
pub fn select_depth(extent: &Extent, cube_size: f64) -> Result<DepthSelection, FilterError> {
    validate_cube_size(cube_size)?;
    let max_extent = extent.max_size();
    if max_extent <= 0.0 {
        return Err(FilterError::DegenerateExtent);
    }

    let requested = requested_depth(max_extent, cube_size);
    let depth = requested.clamp(MIN_DEPTH as i64, MAX_DEPTH as i64) as u32;
    let recommended_cube_size = (requested > MAX_DEPTH as i64).then(|| {
        let excess = (requested - (MAX_DEPTH as i64 - 1)).min(i32::MAX as i64) as i32;
        2f64.powi(excess) * cube_size
    });
    Ok(DepthSelection {
        depth,
        requested,
        recommended_cube_size,
    })
}

#[inline]
pub fn cells_per_axis(depth: u32) -> u32 {
    1 << depth
}

/// Number of addressable cells, `2^(3 * depth)`.
#[inline]
pub fn cell_count(depth: u32) -> usize {
    1usize << (3 * depth)
}
