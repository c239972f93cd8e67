use std::{fs, path::Path};

use geo::{MultiPolygon, Point, Rect};
use minedist::{
    Error, PipelineConfig,
    geom::{Geometries, Reprojector},
};
use serde_json::{Value, json};

fn square(lon: f64, lat: f64, half: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![Rect::new((lon - half, lat - half), (lon + half, lat + half)).to_polygon()])
}

fn write_boundaries(path: &Path, rows: &[(&str, &str, &MultiPolygon<f64>)]) {
    let features = rows.iter()
        .map(|(id, region, shape)| {
            let ring = shape.0[0].exterior().coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>();
            json!({
                "type": "Feature",
                "properties": { "id": id, "name": format!("Kreis {id}"), "bundesland": region },
                "geometry": { "type": "Polygon", "coordinates": [ring] },
            })
        })
        .collect::<Vec<_>>();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    fs::write(path, serde_json::to_vec(&collection).unwrap()).unwrap();
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        boundary_path: dir.join("kreise.geojson"),
        election_path: dir.join("elections.csv"),
        facility_path: dir.join("mines.csv"),
        output_dir: dir.join("out"),
        ..Default::default()
    }
}

/// Four districts in allowed regions plus one outside them.
fn shapes() -> Vec<MultiPolygon<f64>> {
    vec![
        square(13.0, 51.0, 0.05),
        square(13.6, 51.3, 0.05),
        square(12.4, 52.0, 0.05),
        square(14.2, 51.6, 0.05),
        square(11.5, 48.5, 0.05),
    ]
}

fn write_inputs(dir: &Path, mines_csv: &str) {
    let shapes = shapes();
    write_boundaries(&dir.join("kreise.geojson"), &[
        ("1", "Sachsen", &shapes[0]),
        ("2", "Sachsen", &shapes[1]),
        ("3", "Brandenburg", &shapes[2]),
        ("4", "Sachsen", &shapes[3]),
        ("5", "Bayern", &shapes[4]),
    ]);
    fs::write(dir.join("elections.csv"), "id,afd_share\n1,30.0\n2,25.5\n3,20.0\n4,35.0\n5,10.0\n").unwrap();
    fs::write(dir.join("mines.csv"), mines_csv).unwrap();
}

/// A lon/lat location exactly 10 km east of the first district's planar centroid.
fn facility_ten_km_east() -> Point<f64> {
    let to_planar = Reprojector::from_epsg(4326, 3035).unwrap();
    let centroid = Geometries::new(vec![shapes()[0].clone()], 4326)
        .reproject(&to_planar).unwrap()
        .centroids()[0].unwrap();
    to_planar.inverse().unwrap()
        .point(Point::new(centroid.x() + 10_000.0, centroid.y())).unwrap()
}

#[test]
fn end_to_end_writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let mine = facility_ten_km_east();
    write_inputs(dir.path(), &format!(
        "longitude,latitude,status,coal_type\n{:.12},{:.12},operating,lignite\nnot a number,51.0,proposed,lignite\n",
        mine.x(), mine.y(),
    ));

    let output = minedist::run(&config(dir.path())).unwrap();

    // Allow list drops Bayern; merge keeps the district count.
    assert_eq!(output.layer.len(), 4);
    assert!(output.layer.districts().iter().all(|d| d.region != "Bayern"));
    assert_eq!(output.merge.matched, 4);
    assert_eq!(output.facilities_dropped, 1);

    let first = output.layer.get("1").unwrap();
    assert!((first.vote_share.unwrap() - 0.30).abs() < 1e-12);
    let km = first.dist_to_mine_km.unwrap();
    assert!((km - 10.0).abs() < 1e-3, "km = {km}");
    assert_eq!(first.nearest_kind.as_deref(), Some("lignite"));
    assert!(output.layer.distances_km().iter().all(|d| d.is_some_and(|km| km >= 0.0)));

    assert_eq!(output.report.n, 4);
    assert_eq!(output.report.dropped, 0);

    let out = dir.path().join("out");
    for name in ["east_boundaries.svg", "vote_share.svg", "mines_overlay.svg", "dist_to_mine.svg",
                 "analysis.geojson", "analysis.csv", "regression.txt"] {
        assert!(out.join(name).is_file(), "{name} missing");
    }

    let geojson: Value = serde_json::from_slice(&fs::read(out.join("analysis.geojson")).unwrap()).unwrap();
    let features = geojson["features"].as_array().unwrap();
    assert_eq!(features.len(), 4);
    assert_eq!(features[0]["properties"]["id"], "1");
    // Geometry is written back in lon/lat.
    let x = features[0]["geometry"]["coordinates"][0][0][0][0].as_f64().unwrap();
    assert!((12.9..=13.1).contains(&x));

    let csv = fs::read_to_string(out.join("analysis.csv")).unwrap();
    assert!(csv.lines().next().unwrap().contains("dist_to_mine_km"));
    assert_eq!(csv.lines().count(), 5);

    let report = fs::read_to_string(out.join("regression.txt")).unwrap();
    assert!(report.contains("dist_to_mine_km"));
    assert!(report.contains("HC1"));
}

#[test]
fn empty_facility_set_stops_before_regression() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "longitude,latitude,status,coal_type\n,,operating,lignite\nabc,51.0,closed,hard coal\n");

    let err = minedist::run(&config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyReferenceSet)));
    assert!(!dir.path().join("out").join("regression.txt").exists());
}

#[test]
fn unfittable_model_still_writes_the_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "longitude,latitude,status,coal_type\n13.0,51.0,operating,lignite\n");
    fs::write(dir.path().join("elections.csv"), "id,afd_share\n1,30.0\n2,25.5\n8,20.0\n9,n/a\n").unwrap();

    let err = minedist::run(&config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Model(_))));

    let out = dir.path().join("out");
    assert!(out.join("analysis.geojson").is_file());
    let csv = fs::read_to_string(out.join("analysis.csv")).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(!out.join("regression.txt").exists());
}

#[test]
fn missing_boundaries_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = minedist::run(&config(dir.path())).unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::MissingFile { label, path }) => {
            assert_eq!(*label, "Boundaries file");
            assert_eq!(path, &dir.path().join("kreise.geojson"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("kreise.geojson"));
}

#[test]
fn duplicate_election_rows_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "longitude,latitude,status,coal_type\n13.0,51.0,operating,lignite\n");
    fs::write(dir.path().join("elections.csv"), "id,afd_share\n1,30.0\n1,31.0\n2,25.0\n").unwrap();

    let err = minedist::run(&config(dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Cardinality { .. })));
}
