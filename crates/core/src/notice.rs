use std::fmt;

use serde::Serialize;

/// Informational events of a filter call, returned in the report and
/// mirrored to `tracing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterNotice {
    DepthSelected {
        depth: u32,
    },
    /// Quality loss: the cube size asked for more than the deepest grid.
    DepthClamped {
        requested: i64,
        depth: u32,
        recommended_cube_size: f64,
    },
    /// The cube size exceeds the cloud; the coarsest grid is used.
    DepthRaised {
        requested: i64,
        depth: u32,
    },
    OccupiedCells {
        count: usize,
    },
    Filtered {
        input: usize,
        kept: usize,
    },
}

impl FilterNotice {
    pub fn is_warning(&self) -> bool {
        matches!(self, FilterNotice::DepthClamped { .. })
    }
}

impl fmt::Display for FilterNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNotice::DepthSelected { depth } => write!(f, "grid depth {depth}"),
            FilterNotice::DepthClamped {
                requested,
                depth,
                recommended_cube_size,
            } => write!(
                f,
                "cube size too small: depth {requested} clamped to {depth}, use a cube size of at least {recommended_cube_size}"
            ),
            FilterNotice::DepthRaised { requested, depth } => {
                write!(f, "cube size exceeds the cloud: depth {requested} raised to {depth}")
            }
            FilterNotice::OccupiedCells { count } => write!(f, "{count} occupied cells"),
            FilterNotice::Filtered { input, kept } => {
                write!(f, "kept {kept} of {input} points")
            }
        }
    }
}

/// Collects notices for the report while logging them.
pub(crate) struct NoticeLog {
    verbose: bool,
    notices: Vec<FilterNotice>,
}

impl NoticeLog {
    pub(crate) fn new(verbose: bool) -> Self {
        Self {
            verbose,
            notices: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, notice: FilterNotice) {
        match &notice {
            FilterNotice::DepthClamped {
                requested,
                depth,
                recommended_cube_size,
            } => tracing::warn!(
                requested_depth = requested,
                depth,
                recommended_cube_size,
                "{notice}"
            ),
            _ if self.verbose => tracing::info!("{notice}"),
            _ => tracing::debug!("{notice}"),
        }
        self.notices.push(notice);
    }

    pub(crate) fn into_notices(self) -> Vec<FilterNotice> {
        self.notices
    }
}
