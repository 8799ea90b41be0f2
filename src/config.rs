use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::lrs::ResolverConfig;
use crate::models::{GeometryMode, MeasureUnit};
use crate::network::ProjectionKind;
use crate::sources::arcgis::DEFAULT_PAGE_SIZE;
use crate::sources::RecordColumns;
use crate::LrsError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub reference: ReferenceConfig,
    pub input: InputConfig,
    pub resolve: ResolveConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// GeoJSON file with the route centerlines
    pub path: Option<PathBuf>,
    /// ArcGIS FeatureServer layer URL, used when no path is given
    pub url: Option<String>,
    /// Overrides route column detection
    pub route_column: Option<String>,
    pub projection: ProjectionKind,
    pub page_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            route_column: None,
            projection: ProjectionKind::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Path or http(s) URL of the reference extent CSV
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub columns: RecordColumns,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ResolveConfig {
    pub mode: GeometryMode,
    pub unit: MeasureUnit,
    /// Overrides the factor implied by `unit`
    pub unit_factor: Option<f64>,
    pub parallel: bool,
}

impl ResolveConfig {
    pub fn unit_factor(&self) -> f64 {
        self.unit_factor.unwrap_or_else(|| self.unit.factor())
    }

    /// Resolver settings, rejecting unusable unit factors
    pub fn resolver_config(&self) -> std::result::Result<ResolverConfig, LrsError> {
        let factor = self.unit_factor();
        if !factor.is_finite() || factor <= 0.0 {
            return Err(LrsError::Config(format!(
                "unit factor must be a positive number, got {}",
                factor
            )));
        }
        Ok(ResolverConfig::default()
            .with_mode(self.mode)
            .with_unit_factor(factor))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            name: "LRS_Results".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
