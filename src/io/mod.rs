//! Format-specific reading and writing.
//!
//! - `csv` - tabular election and facility data, flat analysis output
//! - `shp` - ESRI Shapefile boundary polygons
//! - `geojson` - GeoJSON boundary polygons and analysis output
//! - `svg` - map figures

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod shp;
pub(crate) mod svg;

use ahash::AHashMap;
use geo::MultiPolygon;

/// Polygon features as read from disk: one shape and one attribute record per feature.
#[derive(Debug, Clone, Default)]
pub(crate) struct PolygonFeatures {
    pub(crate) shapes: Vec<MultiPolygon<f64>>,
    /// Attribute values rendered as text, keyed by trimmed attribute name. Nulls are absent.
    pub(crate) records: Vec<AHashMap<String, String>>,
    /// EPSG code declared by the file, if any.
    pub(crate) epsg: Option<u32>,
}

impl PolygonFeatures {
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }
}
