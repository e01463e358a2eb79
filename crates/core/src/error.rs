use std::fmt;

/// Precondition failures of the outlier filter.
///
/// There is no partial-success mode: any of these aborts the call before a
/// filtered cloud is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The point cloud has no points, so no extent can be computed.
    EmptyInput,
    /// Every point coincides; the largest axis extent is zero.
    DegenerateExtent,
    /// A numeric parameter is outside its valid range.
    InvalidParameter { name: &'static str, value: f64 },
    /// The dense cell array for `depth` would not fit in the memory budget.
    ResourceLimit {
        depth: u32,
        required_bytes: u64,
        budget_bytes: u64,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::EmptyInput => write!(f, "point cloud is empty"),
            FilterError::DegenerateExtent => {
                write!(f, "point cloud has zero extent (all points coincide)")
            }
            FilterError::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {name}: {value}")
            }
            FilterError::ResourceLimit {
                depth,
                required_bytes,
                budget_bytes,
            } => write!(
                f,
                "cell array for depth {depth} needs {required_bytes} bytes, budget is {budget_bytes} bytes"
            ),
        }
    }
}

impl std::error::Error for FilterError {}
