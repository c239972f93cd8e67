mod crs;
mod geom;

pub use crs::{Crs, Reprojector};
pub use geom::Geometries;
