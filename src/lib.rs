#![doc = "minedist public API"]
mod common;
mod io;

pub mod config;
pub mod district;
pub mod facility;
pub mod geom;
pub mod model;
pub mod pipeline;
pub mod spatial;

mod error;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use config::{PipelineConfig, RegionMatch};

#[doc(inline)]
pub use district::{District, DistrictLayer, MergeSummary};

#[doc(inline)]
pub use facility::{Facility, FacilityLayer};

#[doc(inline)]
pub use model::{RegressionReport, fit_distance_model};

#[doc(inline)]
pub use pipeline::{PipelineOutput, run};

#[doc(inline)]
pub use spatial::{NearestIndex, RTreeIndex, add_distance_to_nearest_facility};
