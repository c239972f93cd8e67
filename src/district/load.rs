use std::path::Path;

use ahash::AHashSet;
use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::{
    Error, PipelineConfig, common,
    config::{BoundaryColumns, RegionFilter},
    district::{District, DistrictLayer},
    geom::{Crs, Geometries},
    io::{PolygonFeatures, geojson, shp},
};

/// Read polygon features from a Shapefile or GeoJSON file, chosen by extension.
fn read_features(path: &Path) -> Result<PolygonFeatures> {
    common::require_file_exists(path, "Boundaries file")?;
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("shp") => shp::read_polygon_shapefile(path),
        Some("geojson" | "json") => geojson::read_polygon_geojson(path),
        other => bail!("[district::load] unsupported boundary format {other:?} for {}", path.display()),
    }
}

impl DistrictLayer {
    /// Load the boundary dataset and keep only districts in the configured regions.
    ///
    /// The file's declared CRS must be one [`Crs::from_epsg`] knows; only an undeclared CRS falls
    /// back to `crs.geographic`.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let features = read_features(&config.boundary_path)?;
        let epsg = features.epsg.unwrap_or(config.crs.geographic);
        Crs::from_epsg(epsg)
            .with_context(|| format!("[district::load] boundary CRS of {}", config.boundary_path.display()))?;
        Self::from_features(features, epsg, &config.boundary, &config.regions)
            .with_context(|| format!("[district::load] in {}", config.boundary_path.display()))
    }

    pub(crate) fn from_features(features: PolygonFeatures, epsg: u32, columns: &BoundaryColumns, regions: &RegionFilter) -> Result<Self> {
        for column in [&columns.id, &columns.region] {
            if !features.records.is_empty() && !features.records.iter().any(|r| r.contains_key(column.as_str())) {
                return Err(Error::MissingColumn { source_name: "boundaries", column: column.clone() }.into());
            }
        }

        let allowed = regions.allow.iter()
            .map(|label| common::region_key(label, regions.matching).into_owned())
            .collect::<AHashSet<_>>();

        let total = features.len();
        let mut districts = Vec::new();
        let mut kept = Vec::new();
        for (i, record) in features.records.iter().enumerate() {
            let Some(region) = record.get(&columns.region) else { continue };
            if !allowed.contains(&*common::region_key(region, regions.matching)) { continue }

            let Some(id) = record.get(&columns.id) else {
                bail!("[district::load] feature {i} in region {region:?} has no {:?}", columns.id)
            };
            districts.push(District::new(id.clone(), record.get(&columns.name).cloned(), region.clone()));
            kept.push(i);
        }

        info!("[district::load] kept {} of {} districts in {} allowed regions", districts.len(), total, regions.allow.len());
        debug!("[district::load] boundary CRS is EPSG:{epsg}");

        let geoms = Geometries::new(features.shapes, epsg).select(&kept);
        Self::new(districts, geoms)
    }
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;
    use geo::{MultiPolygon, polygon};

    use super::*;
    use crate::config::RegionMatch;

    fn features(rows: &[(&str, &str)]) -> PolygonFeatures {
        PolygonFeatures {
            shapes: rows.iter().enumerate()
                .map(|(i, _)| {
                    let x = i as f64;
                    MultiPolygon(vec![polygon![(x: x, y: 50.0), (x: x + 0.5, y: 50.0), (x: x + 0.5, y: 50.5), (x: x, y: 50.5)]])
                })
                .collect(),
            records: rows.iter()
                .map(|(id, region)| AHashMap::from_iter([
                    ("id".to_string(), id.to_string()),
                    ("name".to_string(), format!("Kreis {id}")),
                    ("bundesland".to_string(), region.to_string()),
                ]))
                .collect(),
            epsg: Some(4326),
        }
    }

    fn rows() -> Vec<(&'static str, &'static str)> {
        vec![
            ("12054", "Brandenburg"),
            ("11000", "Berlin"),
            ("16051", "ThÃ¼ringen"),
            ("14612", "Sachsen"),
            ("09162", "Bayern"),
        ]
    }

    #[test]
    fn exact_match_keeps_only_allowed_regions() {
        let regions = RegionFilter::default();
        let layer = DistrictLayer::from_features(features(&rows()), 4326, &BoundaryColumns::default(), &regions).unwrap();

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.geoms().len(), 2);
        for district in layer.districts() {
            assert!(regions.allow.contains(&district.region), "{} leaked", district.region);
        }
        assert_eq!(layer.districts()[1].id, "14612");
        assert_eq!(layer.districts()[1].name.as_deref(), Some("Kreis 14612"));
        // Geometry follows its district through the filter.
        assert_eq!(layer.geoms().shapes()[1].0[0].exterior().0[0].x, 3.0);
    }

    #[test]
    fn folded_match_recovers_mis_encoded_label() {
        let regions = RegionFilter { matching: RegionMatch::Folded, ..Default::default() };
        let layer = DistrictLayer::from_features(features(&rows()), 4326, &BoundaryColumns::default(), &regions).unwrap();

        assert_eq!(layer.len(), 3);
        assert!(layer.get("16051").is_some());
        assert!(layer.get("11000").is_none());
    }

    #[test]
    fn missing_region_column_is_reported() {
        let columns = BoundaryColumns { region: "land".into(), ..Default::default() };
        let err = DistrictLayer::from_features(features(&rows()), 4326, &columns, &RegionFilter::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingColumn { .. })));
    }

    const GAUSS_KRUGER_PRJ: &str = r#"PROJCS["DHDN_3_Degree_Gauss_Kruger_Zone_4",GEOGCS["GCS_Deutsches_Hauptdreiecksnetz",DATUM["D_Deutsches_Hauptdreiecksnetz",SPHEROID["Bessel_1841",6377397.155,299.1528128]]],PROJECTION["Gauss_Kruger"],PARAMETER["False_Easting",4500000.0],UNIT["Meter",1.0]]"#;

    #[test]
    fn unrecognised_prj_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("kreise.shp");
        std::fs::write(&shp, b"").unwrap();
        std::fs::write(dir.path().join("kreise.prj"), GAUSS_KRUGER_PRJ).unwrap();

        let config = PipelineConfig { boundary_path: shp, ..Default::default() };
        let err = DistrictLayer::load(&config).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnrecognizedCrs { .. })));
        assert!(err.to_string().contains("kreise.prj"));
    }

    #[test]
    fn declared_but_unsupported_epsg_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kreise.geojson");
        std::fs::write(&path, r#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::31468"}},"features":[]}"#).unwrap();

        let config = PipelineConfig { boundary_path: path, ..Default::default() };
        let err = DistrictLayer::load(&config).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownCrs(31468))));
    }

    #[test]
    fn missing_boundary_file_is_typed_error() {
        let config = PipelineConfig { boundary_path: "does/not/exist.shp".into(), ..Default::default() };
        let err = DistrictLayer::load(&config).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingFile { label: "Boundaries file", .. })));
    }
}
