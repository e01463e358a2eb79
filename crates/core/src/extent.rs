use glam::DVec3;

use crate::error::FilterError;
use crate::point::CloudPoint;

/// Per-axis bounds of a point cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: DVec3,
    pub max: DVec3,
}

impl Extent {
    /// Scans the cloud once for per-axis min/max.
    pub fn from_points<P: CloudPoint>(points: &[P]) -> Result<Self, FilterError> {
        let Some(first) = points.first() else {
            return Err(FilterError::EmptyInput);
        };
        let mut min = first.to_dvec3();
        let mut max = min;
        for point in points.iter().skip(1) {
            let p = point.to_dvec3();
            min = min.min(p);
            max = max.max(p);
        }
        Ok(Self { min, max })
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Largest of the three axis extents.
    pub fn max_size(&self) -> f64 {
        self.size().max_element()
    }
}
