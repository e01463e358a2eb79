mod cell_code;
mod cell_stats;
mod cloud_io;
mod config;
mod decision;
mod density;
mod depth;
mod error;
mod extent;
mod filter;
mod notice;
mod parallel;
mod ply;
mod point;
mod xyz;

pub use cell_code::{compose_code, decompose_code, CellCode, CellCoder};
pub use cell_stats::{required_bytes, CellGrid, CellRecord};
pub use cloud_io::{CloudFormat, PointCloudFile};
pub use config::{FilterConfig, FilterParams, DEFAULT_MEMORY_BUDGET};
pub use decision::{keep_mask, select_points, Thresholds};
pub use density::{
    estimate_density, neighbor_code, neighbor_score, AxisBounds, DensityConfig, NeighborStencil,
    CORNER_OFFSETS, EDGE_DIVISOR, EDGE_OFFSETS, FACE_DIVISOR, FACE_OFFSETS,
    REFERENCE_CORNER_OFFSETS,
};
pub use depth::{
    cell_count, cells_per_axis, requested_depth, select_depth, validate_cube_size,
    DepthSelection, MAX_DEPTH, MIN_DEPTH,
};
pub use error::FilterError;
pub use extent::Extent;
pub use filter::{classify, filter, filter_with_config, FilterOutput, FilterReport};
pub use notice::FilterNotice;
pub use ply::{parse_ply_bytes, PlyCloud, PlyEncoding};
pub use point::CloudPoint;
pub use xyz::{parse_xyz_str, XyzCloud};
