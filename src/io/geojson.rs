//! GeoJSON reading and writing.

use std::{fs, path::Path};

use ahash::AHashMap;
use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value, json};

use crate::{Error, io::PolygonFeatures};

/// Read a FeatureCollection of Polygon / MultiPolygon features.
///
/// Features without geometry get an empty MultiPolygon. The CRS defaults to EPSG:4326 unless the
/// legacy `crs` member names an EPSG code; a `crs` member that names none is
/// [`Error::UnrecognizedCrs`].
pub(crate) fn read_polygon_geojson(path: &Path) -> Result<PolygonFeatures> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("[io::geojson] Failed to parse {}", path.display()))?;

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] {} is not a FeatureCollection", path.display()))?;

    // RFC 7946 GeoJSON is lon/lat; a legacy `crs` member must be one we can read.
    let epsg = match &value["crs"] {
        Value::Null => 4326,
        crs => epsg_from_crs_member(crs)
            .ok_or_else(|| Error::UnrecognizedCrs { path: path.to_path_buf() })?,
    };
    let mut out = PolygonFeatures { epsg: Some(epsg), ..Default::default() };

    for (i, feature) in features.iter().enumerate() {
        out.shapes.push(match &feature["geometry"] {
            Value::Null => MultiPolygon(vec![]),
            geometry => parse_polygonal(geometry)
                .with_context(|| format!("[io::geojson] feature {i} in {}", path.display()))?,
        });

        out.records.push(feature["properties"].as_object()
            .map(|props| props.iter()
                .filter_map(|(k, v)| property_to_string(v).map(|v| (k.trim().to_string(), v)))
                .collect())
            .unwrap_or_else(AHashMap::new));
    }

    Ok(out)
}

/// Render a JSON property as text; null, arrays and objects are dropped.
fn property_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse `{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3035"}}` style members.
fn epsg_from_crs_member(crs: &Value) -> Option<u32> {
    let name = crs["properties"]["name"].as_str()?;
    if name.ends_with("CRS84") { return Some(4326) }
    name.rsplit(':').next()?.parse().ok()
}

fn parse_polygonal(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates"))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => Ok(MultiPolygon(coords.iter()
            .map(|p| parse_polygon(p.as_array().ok_or_else(|| anyhow!("invalid polygon"))?))
            .collect::<Result<_>>()?)),
        other => bail!("unsupported geometry type {other:?}"),
    }
}

fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(parse_ring);
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("polygon without exterior ring"))??;
    Ok(Polygon::new(exterior, rings.collect::<Result<_>>()?))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    ring.as_array()
        .ok_or_else(|| anyhow!("ring is not an array"))?
        .iter()
        .map(|pos| match (pos[0].as_f64(), pos[1].as_f64()) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(anyhow!("invalid position {pos}")),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString)
}

/// Convert a MultiPolygon to a GeoJSON geometry object.
pub(crate) fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    fn ring(ls: &LineString<f64>) -> Vec<[f64; 2]> {
        ls.coords().map(|c| [c.x, c.y]).collect()
    }

    let polygons = mp.0.iter()
        .map(|polygon| std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(ring)
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();

    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

/// Write a FeatureCollection from shapes and per-feature property maps.
pub(crate) fn write_feature_collection(path: &Path, shapes: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>) -> Result<()> {
    anyhow::ensure!(shapes.len() == properties.len(),
        "[io::geojson] {} shapes but {} property records", shapes.len(), properties.len());

    let features = shapes.iter().zip(properties)
        .map(|(shape, props)| {
            let geometry = if shape.0.is_empty() { Value::Null } else { multipolygon_to_geojson(shape) };
            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": props,
            })
        })
        .collect::<Vec<_>>();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let bytes = serde_json::to_vec(&collection).context("[io::geojson] Failed to serialize GeoJSON")?;
    fs::write(path, bytes)
        .with_context(|| format!("[io::geojson] Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn writes_then_reads_polygons_and_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");

        let shape = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)]]);
        let mut props = Map::new();
        props.insert("id".into(), json!("01001"));
        props.insert("dist_to_mine_km".into(), json!(12.5));
        props.insert("afd_share".into(), Value::Null);

        write_feature_collection(&path, &[shape.clone()], vec![props]).unwrap();
        let features = read_polygon_geojson(&path).unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features.epsg, Some(4326));
        assert_eq!(features.shapes[0], shape);
        assert_eq!(features.records[0].get("id").map(String::as_str), Some("01001"));
        assert_eq!(features.records[0].get("dist_to_mine_km").map(String::as_str), Some("12.5"));
        assert!(!features.records[0].contains_key("afd_share"));
    }

    #[test]
    fn unreadable_crs_member_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gk.geojson");
        fs::write(&path, r#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"DHDN / Gauss-Kruger"}},"features":[]}"#).unwrap();

        let err = read_polygon_geojson(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnrecognizedCrs { .. })));
    }

    #[test]
    fn reads_plain_polygon_and_named_crs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.geojson");
        fs::write(&path, r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3035"}},
            "features": [
                {"type": "Feature", "properties": {"id": 7},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
                {"type": "Feature", "properties": {"id": 8}, "geometry": null}
            ]
        }"#).unwrap();

        let features = read_polygon_geojson(&path).unwrap();
        assert_eq!(features.epsg, Some(3035));
        assert_eq!(features.shapes[0].0.len(), 1);
        assert!(features.shapes[1].0.is_empty());
        assert_eq!(features.records[0]["id"], "7");
    }
}
