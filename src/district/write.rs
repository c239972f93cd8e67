use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame};
use serde_json::{Map, Value, json};

use crate::{district::DistrictLayer, geom::Reprojector, io};

impl DistrictLayer {
    /// Attributes of every district as a DataFrame, without geometry.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let districts = self.districts();
        DataFrame::new(vec![
            Column::new("id".into(), districts.iter().map(|d| d.id.as_str()).collect::<Vec<_>>()),
            Column::new("name".into(), districts.iter().map(|d| d.name.as_deref()).collect::<Vec<_>>()),
            Column::new("region".into(), districts.iter().map(|d| d.region.as_str()).collect::<Vec<_>>()),
            Column::new("vote_share".into(), districts.iter().map(|d| d.vote_share).collect::<Vec<_>>()),
            Column::new("dist_to_mine_km".into(), districts.iter().map(|d| d.dist_to_mine_km).collect::<Vec<_>>()),
            Column::new("centroid_x".into(), districts.iter().map(|d| d.centroid.map(|c| c.x())).collect::<Vec<_>>()),
            Column::new("centroid_y".into(), districts.iter().map(|d| d.centroid.map(|c| c.y())).collect::<Vec<_>>()),
            Column::new("nearest_facility".into(), districts.iter().map(|d| d.nearest_facility.map(|i| i as u64)).collect::<Vec<_>>()),
            Column::new("nearest_status".into(), districts.iter().map(|d| d.nearest_status.as_deref()).collect::<Vec<_>>()),
            Column::new("nearest_kind".into(), districts.iter().map(|d| d.nearest_kind.as_deref()).collect::<Vec<_>>()),
        ]).context("[district::write] Failed to build attribute table")
    }

    /// Write the attribute table to CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        io::csv::write_csv(&mut self.to_dataframe()?, path)
    }

    /// Write polygons and attributes as a GeoJSON FeatureCollection in EPSG:`epsg`.
    ///
    /// GeoJSON readers assume lon/lat, so polygons are reprojected when the layer is stored in
    /// another CRS.
    pub fn write_geojson(&self, path: &Path, epsg: u32) -> Result<()> {
        let shapes = if self.epsg() == epsg {
            self.geoms().clone()
        } else {
            self.geoms().reproject(&Reprojector::from_epsg(self.epsg(), epsg)?)?
        };

        let properties = self.districts().iter()
            .map(|d| {
                let mut props = Map::new();
                props.insert("id".into(), json!(d.id));
                props.insert("name".into(), json!(d.name));
                props.insert("region".into(), json!(d.region));
                props.insert("vote_share".into(), json!(d.vote_share));
                props.insert("dist_to_mine_km".into(), json!(d.dist_to_mine_km));
                props.insert("nearest_facility".into(), json!(d.nearest_facility));
                props.insert("nearest_status".into(), json!(d.nearest_status));
                props.insert("nearest_kind".into(), json!(d.nearest_kind));
                props
            })
            .collect::<Vec<Map<String, Value>>>();

        io::geojson::write_feature_collection(path, shapes.shapes(), properties)
    }
}
