use crate::depth::cells_per_axis;
use crate::extent::Extent;
use crate::parallel;
use crate::point::CloudPoint;

/// Raster index of a voxel: `x * 2^(2d) + y * 2^d + z`.
///
/// This is a mixed-radix index with `d`-bit fields, not a Morton code.
pub type CellCode = u32;

/// Combines signed per-axis indices with the raster formula.
///
/// Indices outside `[0, 2^depth)` are allowed and spill into the neighboring
/// field, which is what the unguarded neighbor lookup relies on.
#[inline]
pub fn compose_code(x: i64, y: i64, z: i64, depth: u32) -> i64 {
    let side = 1i64 << depth;
    (x * side + y) * side + z
}

/// Splits a code back into `[x, y, z]` bucket indices.
#[inline]
pub fn decompose_code(code: CellCode, depth: u32) -> [u32; 3] {
    let mask = cells_per_axis(depth) - 1;
    [
        (code >> (2 * depth)) & mask,
        (code >> depth) & mask,
        code & mask,
    ]
}

/// Maps points to cell codes at a fixed depth.
#[derive(Debug, Clone)]
pub struct CellCoder {
    depth: u32,
    boundaries: [Vec<f64>; 3],
}

impl CellCoder {
    pub fn new(extent: &Extent, depth: u32) -> Self {
        let count = cells_per_axis(depth) as usize;
        let boundaries = std::array::from_fn(|axis| {
            evenly_spaced(extent.min[axis], extent.max[axis], count)
        });
        Self { depth, boundaries }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The `2^depth` lower bucket boundaries of `axis`, min and max included.
    pub fn boundaries(&self, axis: usize) -> &[f64] {
        &self.boundaries[axis]
    }

    /// Index of the last boundary `<= value`.
    #[inline]
    pub fn bucket(&self, axis: usize, value: f64) -> u32 {
        let bounds = &self.boundaries[axis];
        bounds.partition_point(|b| *b <= value).saturating_sub(1) as u32
    }

    #[inline]
    pub fn encode<P: CloudPoint>(&self, point: &P) -> CellCode {
        let [x, y, z] = point.coords();
        let d = self.depth;
        (self.bucket(0, x) << (2 * d)) | (self.bucket(1, y) << d) | self.bucket(2, z)
    }

    /// Codes for the whole cloud, in input order.
    pub fn encode_all<P: CloudPoint>(&self, points: &[P]) -> Vec<CellCode> {
        let mut codes = vec![0; points.len()];
        parallel::fill_indexed(&mut codes, |idx| self.encode(&points[idx]));
        codes
    }
}

fn evenly_spaced(min: f64, max: f64, count: usize) -> Vec<f64> {
    let step = (max - min) / (count - 1) as f64;
    let mut values: Vec<f64> = (0..count).map(|i| min + i as f64 * step).collect();
    if let Some(last) = values.last_mut() {
        *last = max;
    }
    values
}
