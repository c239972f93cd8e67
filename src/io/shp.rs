//! Shapefile reading operations.

use std::{fs, path::Path};

use ahash::AHashMap;
use anyhow::{Context, Result, bail};
use shapefile::{Reader, Shape, dbase::FieldValue};

use crate::{Error, common, io::PolygonFeatures};

/// Read every polygon and its attribute record from a `.shp` file (with its `.dbf`).
/// The EPSG code is taken from the sibling `.prj` file; a `.prj` that cannot be recognised is
/// [`Error::UnrecognizedCrs`], only a missing one leaves the CRS to the caller.
pub(crate) fn read_polygon_shapefile(path: &Path) -> Result<PolygonFeatures> {
    let epsg = epsg_from_prj(path)?;
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut features = PolygonFeatures { epsg, ..Default::default() };

    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp] Error reading shape+record {i} in {}", path.display()))?;

        features.shapes.push(match shape {
            Shape::Polygon(polygon) => common::shp_to_multipolygon(&polygon),
            Shape::NullShape => geo::MultiPolygon(vec![]),
            other => bail!("[io::shp] found non-Polygon shape {:?} at record {i}", other.shapetype()),
        });

        features.records.push(record.into_iter()
            .filter_map(|(name, value)| field_to_string(value).map(|v| (name.trim().to_string(), v)))
            .collect::<AHashMap<_, _>>());
    }

    Ok(features)
}

/// Render a dBase field as text; nulls and unsupported types become `None`.
fn field_to_string(value: FieldValue) -> Option<String> {
    fn number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
    }

    match value {
        FieldValue::Character(s) => s.map(|s| s.trim().to_string()),
        FieldValue::Numeric(n) => n.map(number),
        FieldValue::Float(n) => n.map(|n| number(n as f64)),
        FieldValue::Double(n) | FieldValue::Currency(n) => Some(number(n)),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        FieldValue::Memo(s) => Some(s),
        _ => None,
    }
}

/// Recognise the CRS described by a `.prj` file next to `path`; `None` when there is no `.prj`.
fn epsg_from_prj(path: &Path) -> Result<Option<u32>> {
    let prj = path.with_extension("prj");
    if !prj.is_file() { return Ok(None) }
    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("[io::shp] Failed to read {}", prj.display()))?;
    match epsg_from_wkt(&wkt) {
        Some(epsg) => Ok(Some(epsg)),
        None => Err(Error::UnrecognizedCrs { path: prj }.into()),
    }
}

/// Best-effort EPSG detection from ESRI WKT, which usually carries names but no authority codes.
pub(crate) fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    // An explicit authority on the outermost definition wins.
    if let Some(pos) = wkt.rfind("AUTHORITY[\"EPSG\",\"") {
        let rest = &wkt[pos + 18..];
        if let Some(end) = rest.find('"') {
            if let Ok(code) = rest[..end].parse() { return Some(code) }
        }
    }

    let upper = wkt.to_ascii_uppercase();
    let is_etrs = upper.contains("ETRS") || upper.contains("ETRF");
    if upper.starts_with("PROJCS") {
        if upper.contains("LAMBERT_AZIMUTHAL_EQUAL_AREA") && is_etrs { return Some(3035) }
        if upper.contains("WEB_MERCATOR") || upper.contains("PSEUDO-MERCATOR") { return Some(3857) }
        if let Some(pos) = upper.find("UTM_ZONE_") {
            let zone = upper[pos + 9..].chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
                .parse::<u32>().ok()?;
            let north = upper[pos + 9..].trim_start_matches(|c: char| c.is_ascii_digit()).starts_with('N');
            return Some(match (is_etrs, north) {
                (true, _) => 25800 + zone,
                (false, true) => 32600 + zone,
                (false, false) => 32700 + zone,
            });
        }
        return None;
    }
    if upper.starts_with("GEOGCS") {
        if is_etrs { return Some(4258) }
        if upper.contains("WGS_1984") || upper.contains("WGS 84") { return Some(4326) }
        if upper.contains("NORTH_AMERICAN_1983") { return Some(4269) }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_esri_definitions() {
        let wgs84 = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        let utm32 = r#"PROJCS["ETRS_1989_UTM_Zone_32N",GEOGCS["GCS_ETRS_1989",DATUM["D_ETRS_1989",SPHEROID["GRS_1980",6378137.0,298.257222101]]],PROJECTION["Transverse_Mercator"]]"#;
        let laea = r#"PROJCS["ETRS_1989_LAEA",GEOGCS["GCS_ETRS_1989"],PROJECTION["Lambert_Azimuthal_Equal_Area"]]"#;
        let tagged = r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#;

        assert_eq!(epsg_from_wkt(wgs84), Some(4326));
        assert_eq!(epsg_from_wkt(utm32), Some(25832));
        assert_eq!(epsg_from_wkt(laea), Some(3035));
        assert_eq!(epsg_from_wkt(tagged), Some(4326));
        assert_eq!(epsg_from_wkt("LOCAL_CS[\"x\"]"), None);
    }

    #[test]
    fn unrecognised_prj_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("kreise.shp");
        fs::write(&shp, b"").unwrap();
        fs::write(dir.path().join("kreise.prj"),
            r#"PROJCS["DHDN_3_Degree_Gauss_Kruger_Zone_4",GEOGCS["GCS_Deutsches_Hauptdreiecksnetz",DATUM["D_Deutsches_Hauptdreiecksnetz",SPHEROID["Bessel_1841",6377397.155,299.1528128]]],PROJECTION["Gauss_Kruger"],PARAMETER["False_Easting",4500000.0]]"#).unwrap();

        let err = read_polygon_shapefile(&shp).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::UnrecognizedCrs { path }) => assert_eq!(path, &dir.path().join("kreise.prj")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_prj_leaves_crs_open() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(epsg_from_prj(&dir.path().join("kreise.shp")).unwrap(), None);
    }

    #[test]
    fn dbase_numbers_render_without_trailing_zero() {
        assert_eq!(field_to_string(FieldValue::Numeric(Some(12054.0))), Some("12054".to_string()));
        assert_eq!(field_to_string(FieldValue::Numeric(Some(0.5))), Some("0.5".to_string()));
        assert_eq!(field_to_string(FieldValue::Numeric(None)), None);
        assert_eq!(field_to_string(FieldValue::Character(Some(" Sachsen ".into()))), Some("Sachsen".to_string()));
    }
}
