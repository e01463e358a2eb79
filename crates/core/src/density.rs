//! Neighbor density over the 26 cells around each occupied cell.
//!
//! Face neighbors contribute `own_count / face_divisor`, edge and corner
//! neighbors `own_count / edge_divisor`. Scores are computed per occupied
//! cell into a scratch buffer while `own_count` is frozen, then written back,
//! so every cell's sum has a fixed order and the pass can fan out freely.

use serde::{Deserialize, Serialize};

use crate::cell_code::{compose_code, decompose_code, CellCode};
use crate::cell_stats::CellGrid;
use crate::error::FilterError;
use crate::parallel;

pub const FACE_DIVISOR: f32 = 6.0;
/// Shared by edge and corner neighbors.
pub const EDGE_DIVISOR: f32 = 18.0;

pub const FACE_OFFSETS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

pub const EDGE_OFFSETS: [[i64; 3]; 12] = [
    [1, 1, 0],
    [1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [-1, 1, 0],
    [-1, -1, 0],
    [-1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
    [0, -1, 1],
    [0, -1, -1],
];

pub const CORNER_OFFSETS: [[i64; 3]; 8] = [
    [1, 1, 1],
    [1, 1, -1],
    [1, -1, 1],
    [1, -1, -1],
    [-1, 1, 1],
    [-1, 1, -1],
    [-1, -1, 1],
    [-1, -1, -1],
];

/// Corner list of the published filter: `(1, 1, -1)` twice, no `(1, -1, -1)`.
pub const REFERENCE_CORNER_OFFSETS: [[i64; 3]; 8] = [
    [1, 1, 1],
    [1, -1, 1],
    [1, 1, -1],
    [1, 1, -1],
    [-1, 1, 1],
    [-1, -1, 1],
    [-1, 1, -1],
    [-1, -1, -1],
];

/// How a shifted neighbor index is validated before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisBounds {
    /// Every axis index must stay inside `[0, 2^depth)`.
    #[default]
    PerAxis,
    /// Only the combined code must fall inside `[0, 2^(3 * depth))`. An axis
    /// stepping off the grid spills into the next field and reads an
    /// unrelated cell, as the published filter does.
    CodeRange,
}

/// Which offsets make up the 26-neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborStencil {
    /// 6 face, 12 edge and 8 distinct corner offsets.
    #[default]
    Canonical,
    /// Offset list of the published filter: only the 8 edges that move
    /// along x, and [`REFERENCE_CORNER_OFFSETS`].
    Reference,
}

impl NeighborStencil {
    pub fn edge_offsets(self) -> &'static [[i64; 3]] {
        match self {
            NeighborStencil::Canonical => &EDGE_OFFSETS,
            NeighborStencil::Reference => &EDGE_OFFSETS[..8],
        }
    }

    pub fn corner_offsets(self) -> &'static [[i64; 3]] {
        match self {
            NeighborStencil::Canonical => &CORNER_OFFSETS,
            NeighborStencil::Reference => &REFERENCE_CORNER_OFFSETS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    pub face_divisor: f32,
    pub edge_divisor: f32,
    pub bounds: AxisBounds,
    pub stencil: NeighborStencil,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            face_divisor: FACE_DIVISOR,
            edge_divisor: EDGE_DIVISOR,
            bounds: AxisBounds::default(),
            stencil: NeighborStencil::default(),
        }
    }
}

impl DensityConfig {
    /// Bit-for-bit neighborhood of the published filter, artifacts included.
    pub fn reference() -> Self {
        Self {
            bounds: AxisBounds::CodeRange,
            stencil: NeighborStencil::Reference,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for (name, value) in [
            ("face_divisor", self.face_divisor),
            ("edge_divisor", self.edge_divisor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FilterError::InvalidParameter {
                    name,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }
}

/// Code of the cell at `cell + delta`, or `None` when `bounds` rejects it.
pub fn neighbor_code(
    cell: [u32; 3],
    delta: [i64; 3],
    depth: u32,
    bounds: AxisBounds,
) -> Option<CellCode> {
    let side = 1i64 << depth;
    let [x, y, z] = [
        cell[0] as i64 + delta[0],
        cell[1] as i64 + delta[1],
        cell[2] as i64 + delta[2],
    ];
    if bounds == AxisBounds::PerAxis && [x, y, z].iter().any(|v| !(0..side).contains(v)) {
        return None;
    }
    let code = compose_code(x, y, z, depth);
    (0..side * side * side)
        .contains(&code)
        .then_some(code as CellCode)
}

/// Weighted occupancy of the neighbors of `code`.
pub fn neighbor_score(grid: &CellGrid, code: CellCode, config: &DensityConfig) -> f32 {
    let depth = grid.depth();
    let cell = decompose_code(code, depth);
    let weighted = |offsets: &[[i64; 3]], divisor: f32, score: &mut f32| {
        for &delta in offsets {
            if let Some(neighbor) = neighbor_code(cell, delta, depth, config.bounds) {
                *score += grid.own_count(neighbor) as f32 / divisor;
            }
        }
    };

    let mut score = 0.0f32;
    weighted(&FACE_OFFSETS[..], config.face_divisor, &mut score);
    weighted(config.stencil.edge_offsets(), config.edge_divisor, &mut score);
    weighted(config.stencil.corner_offsets(), config.edge_divisor, &mut score);
    score
}

/// Fills `neighbor_score` for every occupied cell of `grid`.
pub fn estimate_density(grid: &mut CellGrid, config: &DensityConfig) {
    let mut scores = vec![0.0f32; grid.occupied().len()];
    {
        let grid = &*grid;
        let occupied = grid.occupied();
        parallel::fill_indexed(&mut scores, |idx| {
            neighbor_score(grid, occupied[idx], config)
        });
    }
    grid.apply_neighbor_scores(&scores);
}
