use anyhow::{Context, Result, anyhow};
use geo::{Coord, MapCoords, MultiPolygon, Point};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::Error;

/// A coordinate reference system known to the pipeline, identified by EPSG code.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    epsg: u32,
    proj4: String,
    geographic: bool,
}

impl Crs {
    /// Look up the PROJ.4 definition of an EPSG code.
    ///
    /// Covers the lon/lat systems used for input data, the European LAEA grid used for distances,
    /// Web Mercator for display, and the WGS84 / ETRS89 UTM zones.
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        const ETRS89: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0";

        let (proj4, geographic) = match epsg {
            4326 => ("+proj=longlat +datum=WGS84 +no_defs".to_string(), true),
            4258 => (format!("+proj=longlat {ETRS89} +no_defs"), true),
            4269 => ("+proj=longlat +datum=NAD83 +no_defs".to_string(), true),
            3035 => (format!("+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 {ETRS89} +units=m +no_defs"), false),
            3857 => ("+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs".to_string(), false),
            25828..=25838 => (format!("+proj=utm +zone={} {ETRS89} +units=m +no_defs", epsg - 25800), false),
            32601..=32660 => (format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", epsg - 32600), false),
            32701..=32760 => (format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs", epsg - 32700), false),
            _ => return Err(Error::UnknownCrs(epsg).into()),
        };

        Ok(Self { epsg, proj4, geographic })
    }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// True for lon/lat systems measured in degrees.
    #[inline] pub fn is_geographic(&self) -> bool { self.geographic }

    #[inline] pub fn proj4(&self) -> &str { &self.proj4 }

    fn build(&self) -> Result<Proj4> {
        Proj4::from_proj_string(&self.proj4)
            .with_context(|| anyhow!("[geom::crs] failed to build PROJ.4 for EPSG:{}: {}", self.epsg, self.proj4))
    }
}

/// A compiled transformation between two CRSs.
///
/// Degrees are converted to radians on the way into proj4rs and back on the way out, so callers
/// always see degrees for geographic systems and metres for projected ones.
pub struct Reprojector {
    source: Crs,
    target: Crs,
    from: Proj4,
    to: Proj4,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reprojector(EPSG:{} -> EPSG:{})", self.source.epsg, self.target.epsg)
    }
}

impl Reprojector {
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        Ok(Self {
            from: source.build()?,
            to: target.build()?,
            source: source.clone(),
            target: target.clone(),
        })
    }

    pub fn from_epsg(source: u32, target: u32) -> Result<Self> {
        Self::new(&Crs::from_epsg(source)?, &Crs::from_epsg(target)?)
    }

    /// The transformation in the opposite direction.
    pub fn inverse(&self) -> Result<Self> {
        Self::new(&self.target, &self.source)
    }

    #[inline] pub fn source(&self) -> &Crs { &self.source }

    #[inline] pub fn target(&self) -> &Crs { &self.target }

    pub fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        if self.source.epsg == self.target.epsg { return Ok(coord) }

        let mut point = if self.source.geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.from, &self.to, &mut point)
            .with_context(|| anyhow!(
                "[geom::crs] transform EPSG:{} -> EPSG:{} failed at ({}, {})",
                self.source.epsg, self.target.epsg, coord.x, coord.y,
            ))?;
        ensure_finite(if self.target.geographic {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        }, coord)
    }

    #[inline]
    pub fn point(&self, point: Point<f64>) -> Result<Point<f64>> {
        self.coord(point.0).map(Point)
    }

    pub fn multipolygon(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.coord(coord))
    }
}

fn ensure_finite(out: Coord<f64>, input: Coord<f64>) -> Result<Coord<f64>> {
    anyhow::ensure!(out.x.is_finite() && out.y.is_finite(),
        "[geom::crs] transform produced a non-finite coordinate for ({}, {})", input.x, input.y);
    Ok(out)
}
