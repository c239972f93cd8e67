//! Planar nearest-neighbor join between district centroids and facility points.

mod index;
mod join;

pub use index::{NearestIndex, RTreeIndex};
pub use join::{add_distance_to_nearest_facility, nearest_distances};
