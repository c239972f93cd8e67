use anyhow::Result;
use geo::{BoundingRect, Centroid, Coord, MultiPolygon, Point, Rect};

use crate::geom::Reprojector;

/// A collection of MultiPolygons sharing one coordinate reference system.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    epsg: u32,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons in CRS `epsg`.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, epsg: u32) -> Self {
        Self { shapes, epsg }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// EPSG code of the coordinates.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Keep only the shapes at the given indices, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            shapes: indices.iter().map(|&i| self.shapes[i].clone()).collect(),
            epsg: self.epsg,
        }
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// Area-weighted centroid of each MultiPolygon; `None` for empty or degenerate shapes.
    ///
    /// Only meaningful in a planar CRS: centroids taken in lon/lat degrees are skewed.
    pub fn centroids(&self) -> Vec<Option<Point<f64>>> {
        self.shapes.iter()
            .map(|polygon| polygon.centroid()
                .filter(|c| c.x().is_finite() && c.y().is_finite()))
            .collect()
    }

    /// Reproject every shape, returning a new collection tagged with the target EPSG code.
    pub fn reproject(&self, reprojector: &Reprojector) -> Result<Self> {
        anyhow::ensure!(reprojector.source().epsg() == self.epsg,
            "[geom::reproject] geometries are in EPSG:{}, reprojector expects EPSG:{}",
            self.epsg, reprojector.source().epsg());

        Ok(Self {
            shapes: self.shapes.iter()
                .map(|shape| reprojector.multipolygon(shape))
                .collect::<Result<_>>()?,
            epsg: reprojector.target().epsg(),
        })
    }
}
