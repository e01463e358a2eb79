use serde::{Deserialize, Serialize};

use crate::cell_code::CellCode;
use crate::cell_stats::{CellGrid, CellRecord};

/// Keep/drop thresholds, compared with strict `>`.
///
/// Recommended ranges are 1..=20 for `own` and 0..=1000 for `neighbor`; values
/// outside them are accepted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub own: i64,
    pub neighbor: i64,
}

impl Thresholds {
    #[inline]
    pub fn keeps(&self, record: &CellRecord) -> bool {
        record.own_count as i64 > self.own || record.neighbor_score as f64 > self.neighbor as f64
    }
}

/// Keep flag for every point, in input order.
pub fn keep_mask(codes: &[CellCode], grid: &CellGrid, thresholds: Thresholds) -> Vec<bool> {
    codes
        .iter()
        .map(|&code| thresholds.keeps(grid.record(code)))
        .collect()
}

/// The points whose flag is set, order preserved.
pub fn select_points<P: Copy>(points: &[P], mask: &[bool]) -> Vec<P> {
    points
        .iter()
        .zip(mask)
        .filter_map(|(point, keep)| keep.then_some(*point))
        .collect()
}
