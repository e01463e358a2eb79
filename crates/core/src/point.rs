use glam::{DVec3, Vec3};

/// A 3D point the filter can read coordinates from.
///
/// The filter is generic over this trait so its output keeps the caller's
/// element type.
pub trait CloudPoint: Copy + Send + Sync {
    fn coords(&self) -> [f64; 3];

    fn to_dvec3(&self) -> DVec3 {
        DVec3::from_array(self.coords())
    }
}

impl CloudPoint for [f64; 3] {
    #[inline]
    fn coords(&self) -> [f64; 3] {
        *self
    }
}

impl CloudPoint for [f32; 3] {
    #[inline]
    fn coords(&self) -> [f64; 3] {
        [self[0] as f64, self[1] as f64, self[2] as f64]
    }
}

impl CloudPoint for (f64, f64, f64) {
    #[inline]
    fn coords(&self) -> [f64; 3] {
        [self.0, self.1, self.2]
    }
}

impl CloudPoint for DVec3 {
    #[inline]
    fn coords(&self) -> [f64; 3] {
        self.to_array()
    }

    #[inline]
    fn to_dvec3(&self) -> DVec3 {
        *self
    }
}

impl CloudPoint for Vec3 {
    #[inline]
    fn coords(&self) -> [f64; 3] {
        self.as_dvec3().to_array()
    }
}

#[cfg(test)]
mod tests {
    use glam::{DVec3, Vec3};

    use super::CloudPoint;

    #[test]
    fn all_point_types_report_the_same_coords() {
        let expected = [1.0, -2.5, 4.0];
        assert_eq!([1.0f64, -2.5, 4.0].coords(), expected);
        assert_eq!([1.0f32, -2.5, 4.0].coords(), expected);
        assert_eq!((1.0, -2.5, 4.0).coords(), expected);
        assert_eq!(DVec3::new(1.0, -2.5, 4.0).coords(), expected);
        assert_eq!(Vec3::new(1.0, -2.5, 4.0).coords(), expected);
    }
}
