//! Administrative districts: loading, attribute merging and output.

mod district;
mod load;
mod merge;
mod svg;
mod write;

pub use district::{District, DistrictLayer};
pub use merge::{MergeSummary, read_election_results};
