use serde::{Deserialize, Serialize};

use crate::decision::Thresholds;
use crate::density::DensityConfig;
use crate::error::FilterError;

/// Admits the deepest grid: `2^30` cells of 8 bytes.
pub const DEFAULT_MEMORY_BUDGET: u64 = 8 << 30;

/// Per-call knobs of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Target cell width, comparable to the radius of a radius outlier filter.
    pub cube_size: f64,
    pub own_threshold: i64,
    pub neighbor_threshold: i64,
    #[serde(default)]
    pub verbose: bool,
}

impl FilterParams {
    pub fn new(cube_size: f64, own_threshold: i64, neighbor_threshold: i64) -> Self {
        Self {
            cube_size,
            own_threshold,
            neighbor_threshold,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            own: self.own_threshold,
            neighbor: self.neighbor_threshold,
        }
    }
}

/// Engine settings that rarely change between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub memory_budget_bytes: u64,
    pub density: DensityConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET,
            density: DensityConfig::default(),
        }
    }
}

impl FilterConfig {
    pub fn from_json_str(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|err| format!("invalid filter config: {err}"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        self.density.validate()
    }
}
