use std::path::Path;

use crate::ply::{parse_ply_bytes, PlyCloud, PlyEncoding};
use crate::xyz::{parse_xyz_str, XyzCloud};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudFormat {
    Ply,
    Xyz,
}

impl CloudFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "ply" => Ok(CloudFormat::Ply),
            "xyz" | "txt" | "csv" | "pts" => Ok(CloudFormat::Xyz),
            _ => Err(format!(
                "Unsupported point cloud extension for {}",
                path.display()
            )),
        }
    }
}

/// A loaded point cloud together with its per-point attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum PointCloudFile {
    Ply(PlyCloud),
    Xyz(XyzCloud),
}

impl PointCloudFile {
    pub fn parse(format: CloudFormat, data: &[u8]) -> Result<Self, String> {
        match format {
            CloudFormat::Ply => parse_ply_bytes(data).map(PointCloudFile::Ply),
            CloudFormat::Xyz => {
                let text = std::str::from_utf8(data)
                    .map_err(|_| "Point list is not UTF-8 text".to_string())?;
                parse_xyz_str(text).map(PointCloudFile::Xyz)
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &Path) -> Result<Self, String> {
        let format = CloudFormat::from_path(path)?;
        let data = std::fs::read(path).map_err(|err| err.to_string())?;
        Self::parse(format, &data)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load(_path: &Path) -> Result<Self, String> {
        Err("Reading point clouds is not supported in web builds".to_string())
    }

    pub fn len(&self) -> usize {
        match self {
            PointCloudFile::Ply(cloud) => cloud.len(),
            PointCloudFile::Xyz(cloud) => cloud.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        match self {
            PointCloudFile::Ply(cloud) => cloud.positions(),
            PointCloudFile::Xyz(cloud) => cloud.positions().to_vec(),
        }
    }

    pub fn retain(&mut self, mask: &[bool]) {
        match self {
            PointCloudFile::Ply(cloud) => cloud.retain(mask),
            PointCloudFile::Xyz(cloud) => cloud.retain(mask),
        }
    }

    /// Encodes as `format`. Attributes survive only when the format matches
    /// the source; converting keeps positions alone.
    pub fn to_bytes(&self, format: CloudFormat, ply_encoding: Option<PlyEncoding>) -> Vec<u8> {
        match (self, format) {
            (PointCloudFile::Ply(cloud), CloudFormat::Ply) => {
                cloud.to_bytes(ply_encoding.unwrap_or(cloud.encoding))
            }
            (PointCloudFile::Xyz(cloud), CloudFormat::Xyz) => cloud.to_text().into_bytes(),
            (PointCloudFile::Xyz(cloud), CloudFormat::Ply) => PlyCloud::from_positions(cloud.positions())
                .to_bytes(ply_encoding.unwrap_or(PlyEncoding::BinaryLittleEndian)),
            (PointCloudFile::Ply(cloud), CloudFormat::Xyz) => {
                XyzCloud::from_positions(&cloud.positions()).to_text().into_bytes()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &Path, ply_encoding: Option<PlyEncoding>) -> Result<(), String> {
        let format = CloudFormat::from_path(path)?;
        std::fs::write(path, self.to_bytes(format, ply_encoding)).map_err(|err| err.to_string())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self, _path: &Path, _ply_encoding: Option<PlyEncoding>) -> Result<(), String> {
        Err("Writing point clouds is not supported in web builds".to_string())
    }
}
