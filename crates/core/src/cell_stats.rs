use serde::Serialize;

use crate::cell_code::CellCode;
use crate::depth::cell_count;
use crate::error::FilterError;

/// Occupancy and neighbor density of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellRecord {
    pub own_count: u32,
    pub neighbor_score: f32,
}

/// Bytes the dense record array needs at `depth`.
pub fn required_bytes(depth: u32) -> u64 {
    (cell_count(depth) as u64).saturating_mul(std::mem::size_of::<CellRecord>() as u64)
}

/// Dense per-cell records for one filter call, indexed by [`CellCode`].
///
/// Allocated up front against an explicit budget and dropped when the call
/// returns.
#[derive(Debug, Clone)]
pub struct CellGrid {
    depth: u32,
    records: Vec<CellRecord>,
    occupied: Vec<CellCode>,
}

impl CellGrid {
    /// Allocates `2^(3 * depth)` zeroed records, failing before allocation if
    /// they would exceed `budget_bytes`.
    pub fn allocate(depth: u32, budget_bytes: u64) -> Result<Self, FilterError> {
        let required = required_bytes(depth);
        let limit = || FilterError::ResourceLimit {
            depth,
            required_bytes: required,
            budget_bytes,
        };
        if required > budget_bytes {
            return Err(limit());
        }

        let len = cell_count(depth);
        let mut records = Vec::new();
        records.try_reserve_exact(len).map_err(|_| limit())?;
        records.resize(len, CellRecord::default());
        Ok(Self {
            depth,
            records,
            occupied: Vec::new(),
        })
    }

    /// Builds the occupancy histogram from per-point codes.
    ///
    /// Afterwards `occupied()` lists each distinct code once, ascending.
    pub fn record_counts(&mut self, codes: &[CellCode]) {
        for &code in codes {
            let record = &mut self.records[code as usize];
            if record.own_count == 0 {
                self.occupied.push(code);
            }
            record.own_count = record.own_count.saturating_add(1);
        }
        self.occupied.sort_unstable();
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn occupied(&self) -> &[CellCode] {
        &self.occupied
    }

    pub fn records(&self) -> &[CellRecord] {
        &self.records
    }

    #[inline]
    pub fn record(&self, code: CellCode) -> &CellRecord {
        &self.records[code as usize]
    }

    #[inline]
    pub fn own_count(&self, code: CellCode) -> u32 {
        self.records[code as usize].own_count
    }

    /// Writes `scores[i]` into the record of `occupied()[i]`.
    pub(crate) fn apply_neighbor_scores(&mut self, scores: &[f32]) {
        for (&code, &score) in self.occupied.iter().zip(scores) {
            self.records[code as usize].neighbor_score = score;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::FilterError;

    use super::{required_bytes, CellGrid, CellRecord};

    #[test]
    fn counts_sum_to_point_count() {
        let mut grid = CellGrid::allocate(2, u64::MAX).expect("grid");
        let codes = [5, 9, 5, 63, 5, 0];
        grid.record_counts(&codes);

        let total: u32 = grid.records().iter().map(|r| r.own_count).sum();
        assert_eq!(total as usize, codes.len());
        assert_eq!(grid.own_count(5), 3);
        assert_eq!(grid.own_count(1), 0);
        assert_eq!(grid.occupied(), &[0, 5, 9, 63]);
    }

    #[test]
    fn unoccupied_cells_stay_zero() {
        let mut grid = CellGrid::allocate(1, u64::MAX).expect("grid");
        grid.record_counts(&[7]);
        assert_eq!(grid.len(), 8);
        assert_eq!(*grid.record(3), CellRecord::default());
    }

    #[test]
    fn budget_is_checked_before_allocation() {
        let budget = required_bytes(3) - 1;
        assert_eq!(
            CellGrid::allocate(3, budget).map(|grid| grid.len()),
            Err(FilterError::ResourceLimit {
                depth: 3,
                required_bytes: 4096,
                budget_bytes: 4095,
            })
        );
        assert!(CellGrid::allocate(3, budget + 1).is_ok());
    }
}
