use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Everything a pipeline run needs to know; each stage receives the parts it uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub boundary_path: PathBuf,
    pub election_path: PathBuf,
    pub facility_path: PathBuf,
    pub output_dir: PathBuf,

    /// Election shares are given as percentages (45.0) rather than fractions (0.45).
    pub share_is_percent: bool,

    pub boundary: BoundaryColumns,
    pub election: ElectionColumns,
    pub facility: FacilityColumns,

    pub regions: RegionFilter,
    pub crs: CrsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data = PathBuf::from("data");
        Self {
            boundary_path: data.join("boundaries").join("landkreise.shp"),
            election_path: data.join("elections").join("btw2021_kreise.csv"),
            facility_path: data.join("coal mines").join("gem_coal_mines.csv"),
            output_dir: PathBuf::from("outputs"),
            share_is_percent: true,
            boundary: BoundaryColumns::default(),
            election: ElectionColumns::default(),
            facility: FacilityColumns::default(),
            regions: RegionFilter::default(),
            crs: CrsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file; missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("[config] Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("[config] Failed to serialize config")
    }
}

/// Attribute names in the boundary dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryColumns {
    pub id: String,
    pub name: String,
    pub region: String,
}

impl Default for BoundaryColumns {
    fn default() -> Self {
        Self { id: "id".into(), name: "name".into(), region: "bundesland".into() }
    }
}

/// Column names in the election results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionColumns {
    pub id: String,
    pub share: String,
}

impl Default for ElectionColumns {
    fn default() -> Self {
        Self { id: "id".into(), share: "afd_share".into() }
    }
}

/// Column names in the facility table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityColumns {
    pub lon: String,
    pub lat: String,
    pub status: String,
    pub kind: String,
}

impl Default for FacilityColumns {
    fn default() -> Self {
        Self {
            lon: "longitude".into(),
            lat: "latitude".into(),
            status: "status".into(),
            kind: "coal_type".into(),
        }
    }
}

/// How region labels are compared against the allow list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Trimmed, mojibake-repaired, case- and diacritic-folded equality.
    Folded,
}

/// Allow list of parent regions kept by the boundary loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionFilter {
    pub allow: Vec<String>,
    pub matching: RegionMatch,
}

impl Default for RegionFilter {
    /// East German states, Berlin excluded.
    ///
    /// Labels are compared against the text the boundary reader produces, which is decoded UTF-8
    /// (`Thüringen`). Data decoded with the wrong encoding needs `matching = "folded"` or labels
    /// spelled the same way.
    fn default() -> Self {
        Self {
            allow: ["Brandenburg", "Sachsen", "Sachsen-Anhalt", "Thüringen", "Mecklenburg-Vorpommern"]
                .into_iter()
                .map(String::from)
                .collect(),
            matching: RegionMatch::Exact,
        }
    }
}

/// EPSG codes used by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrsConfig {
    /// Coordinates of the facility table (lon/lat degrees).
    pub geographic: u32,
    /// Planar CRS in metres used for centroids and distances.
    pub distance: u32,
    /// CRS used for the facility overlay figure.
    pub display: u32,
}

impl Default for CrsConfig {
    fn default() -> Self {
        Self { geographic: 4326, distance: 3035, display: 3857 }
    }
}
