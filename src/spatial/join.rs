use anyhow::{Result, bail};
use geo::Point;
use tracing::{info, warn};

use crate::{
    Error,
    district::{District, DistrictLayer},
    facility::FacilityLayer,
    geom::{Crs, Reprojector},
    spatial::{NearestIndex, RTreeIndex},
};

/// Query `index` with every centroid; missing centroids give missing results.
pub fn nearest_distances(centroids: &[Option<Point<f64>>], index: &impl NearestIndex) -> Vec<Option<(f64, usize)>> {
    centroids.iter()
        .map(|centroid| centroid.and_then(|c| index.nearest([c.x(), c.y()])))
        .collect()
}

/// Attach the distance from each district centroid to the nearest facility.
///
/// Polygons and points are reprojected into the planar CRS `distance_epsg`, centroids are taken
/// there, and the nearest facility is found by Euclidean distance in metres. The result is a new
/// layer whose polygons are the untouched originals; each district gains `dist_to_mine_km`, its
/// planar centroid and the nearest facility's row, status and kind. Districts whose polygon has
/// no centroid keep a missing distance.
pub fn add_distance_to_nearest_facility(districts: &DistrictLayer, facilities: &FacilityLayer, distance_epsg: u32) -> Result<DistrictLayer> {
    if facilities.is_empty() {
        return Err(Error::EmptyReferenceSet.into());
    }

    let planar = Crs::from_epsg(distance_epsg)?;
    if planar.is_geographic() {
        bail!("[spatial::join] EPSG:{distance_epsg} is geographic; distances need a planar CRS in metres");
    }

    let polygons_to_planar = Reprojector::new(&Crs::from_epsg(districts.epsg())?, &planar)?;
    let points_to_planar = Reprojector::new(&Crs::from_epsg(facilities.epsg())?, &planar)?;

    let centroids = districts.geoms().reproject(&polygons_to_planar)?.centroids();
    let points = facilities.facilities().iter()
        .map(|f| points_to_planar.point(f.location).map(|p| [p.x(), p.y()]))
        .collect::<Result<Vec<_>>>()?;

    let index = RTreeIndex::new(&points);
    let nearest = nearest_distances(&centroids, &index);

    let missing = nearest.iter().filter(|n| n.is_none()).count();
    info!("[spatial::join] matched {} districts to {} facilities in EPSG:{}",
        districts.len() - missing, facilities.len(), distance_epsg);
    if missing > 0 {
        warn!("[spatial::join] {missing} districts have no centroid; distance left missing");
    }

    Ok(districts.map_districts(|i, district| {
        let matched = nearest[i].map(|(metres, j)| (metres / 1000.0, &facilities.facilities()[j]));
        District {
            dist_to_mine_km: matched.map(|(km, _)| km),
            centroid: centroids[i],
            nearest_facility: matched.map(|(_, f)| f.row),
            nearest_status: matched.and_then(|(_, f)| f.status.clone()),
            nearest_kind: matched.and_then(|(_, f)| f.kind.clone()),
            ..district.clone()
        }
    }))
}
