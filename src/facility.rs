//! Point facilities (coal mines) read from a coordinate table.

use anyhow::{Context, Result};
use geo::Point;
use polars::frame::DataFrame;
use tracing::{info, warn};

use crate::{
    PipelineConfig, common,
    config::FacilityColumns,
    io::csv::{coerce_f64, read_csv_as_text, text_column},
};

/// One facility location with its descriptive attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// Row index in the source table, counting dropped rows.
    pub row: usize,
    pub status: Option<String>,
    pub kind: Option<String>,
    /// Longitude/latitude in degrees.
    pub location: Point<f64>,
}

/// All facilities with valid coordinates. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct FacilityLayer {
    facilities: Vec<Facility>,
    epsg: u32,
    dropped: usize,
}

impl FacilityLayer {
    pub fn new(facilities: Vec<Facility>, epsg: u32) -> Self {
        Self { facilities, epsg, dropped: 0 }
    }

    /// Load the facility table named in the configuration.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        common::require_file_exists(&config.facility_path, "Coal mines file")?;
        let df = read_csv_as_text(&config.facility_path)?;
        Self::from_dataframe(&df, &config.facility, config.crs.geographic)
            .with_context(|| format!("[facility] in {}", config.facility_path.display()))
    }

    /// Build points from a text table. Rows whose longitude or latitude is missing, non-numeric
    /// or outside the lon/lat range are dropped and counted. Coincident points are all kept.
    pub fn from_dataframe(df: &DataFrame, columns: &FacilityColumns, epsg: u32) -> Result<Self> {
        let lons = text_column(df, "facilities", &columns.lon)?;
        let lats = text_column(df, "facilities", &columns.lat)?;
        let statuses = optional_text_column(df, &columns.status)?;
        let kinds = optional_text_column(df, &columns.kind)?;

        let mut facilities = Vec::with_capacity(df.height());
        for (row, (lon, lat)) in lons.iter().zip(&lats).enumerate() {
            let (Some(x), Some(y)) = (coerce_f64(*lon), coerce_f64(*lat)) else { continue };
            if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) { continue }

            facilities.push(Facility {
                row,
                status: statuses.get(row).cloned().flatten(),
                kind: kinds.get(row).cloned().flatten(),
                location: Point::new(x, y),
            });
        }

        let dropped = df.height() - facilities.len();
        info!("[facility] loaded {} facilities", facilities.len());
        if dropped > 0 {
            warn!("[facility] dropped {dropped} rows with missing or invalid coordinates");
        }

        Ok(Self { facilities, epsg, dropped })
    }

    #[inline] pub fn len(&self) -> usize { self.facilities.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.facilities.is_empty() }

    #[inline] pub fn facilities(&self) -> &[Facility] { &self.facilities }

    /// EPSG code of the facility coordinates.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Number of source rows rejected for invalid coordinates.
    #[inline] pub fn dropped(&self) -> usize { self.dropped }

    pub fn points(&self) -> Vec<Point<f64>> {
        self.facilities.iter().map(|f| f.location).collect()
    }
}

/// Attribute columns are optional; an absent column yields all-missing values.
fn optional_text_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    if df.column(column).is_err() { return Ok(vec![None; df.height()]) }
    Ok(text_column(df, "facilities", column)?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from))
        .collect())
}
