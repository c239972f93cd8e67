use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile as shp;

/// Close a ring in place if its first and last coordinates differ.
fn close_ring(coords: &mut Vec<Coord<f64>>) {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last { coords.push(first) }
    }
}

/// Shoelace area; negative for clockwise rings.
fn signed_area(coords: &[Coord<f64>]) -> f64 {
    coords.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>() / 2.0
}

/// Convert a shapefile polygon into a `MultiPolygon`.
///
/// Shapefiles store each outer ring clockwise followed by its counter-clockwise holes, so rings
/// are grouped in file order. Holes appearing before any outer ring are discarded.
pub(crate) fn shp_to_multipolygon(polygon: &shp::Polygon) -> MultiPolygon<f64> {
    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in polygon.rings() {
        let mut coords = ring.points().iter()
            .map(|pt| Coord { x: pt.x, y: pt.y })
            .collect::<Vec<_>>();
        close_ring(&mut coords);
        if coords.len() < 4 { continue }

        let is_outer = signed_area(&coords) < 0.0;
        let ring = LineString(coords);
        if is_outer {
            if let Some(outer) = exterior.replace(ring) {
                polygons.push(Polygon::new(outer, std::mem::take(&mut holes)));
            }
        } else if exterior.is_some() {
            holes.push(ring);
        }
    }
    if let Some(outer) = exterior {
        polygons.push(Polygon::new(outer, holes));
    }

    MultiPolygon(polygons)
}
