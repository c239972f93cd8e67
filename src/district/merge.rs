use std::path::Path;

use ahash::AHashMap;
use anyhow::Result;
use polars::frame::DataFrame;
use tracing::{info, warn};

use crate::{
    Error, common,
    config::ElectionColumns,
    district::{District, DistrictLayer},
    io::csv::{coerce_f64, read_csv_as_text, text_column},
};

/// Counts of the data-quality issues absorbed by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Districts with an election row.
    pub matched: usize,
    /// Districts with no election row; their share stays missing.
    pub unmatched: usize,
    /// Matched rows whose share could not be read as a number.
    pub unparsable: usize,
}

/// Read the election results table, every column as text.
pub fn read_election_results(path: &Path) -> Result<DataFrame> {
    common::require_file_exists(path, "Elections file")?;
    read_csv_as_text(path)
}

/// Fail with [`Error::Cardinality`] on the first key (in input order) that occurs more than once.
fn ensure_unique<'a>(keys: impl IntoIterator<Item = &'a str>, source_name: &'static str) -> Result<()> {
    let keys = keys.into_iter().collect::<Vec<_>>();
    let mut counts = AHashMap::<&str, usize>::with_capacity(keys.len());
    for &key in &keys {
        *counts.entry(key).or_default() += 1;
    }
    match keys.iter().find(|key| counts[*key] > 1) {
        Some(key) => Err(Error::Cardinality { source_name, key: key.to_string(), count: counts[key] }.into()),
        None => Ok(()),
    }
}

impl DistrictLayer {
    /// Left-join election shares onto the districts, enforcing a 1:1 key relationship.
    ///
    /// Unmatched districts and unparsable shares are kept with a missing share. When
    /// `share_is_percent` is set, parsed values are divided by 100.
    pub fn merge_votes(&self, votes: &DataFrame, columns: &ElectionColumns, share_is_percent: bool) -> Result<(Self, MergeSummary)> {
        let ids = text_column(votes, "election results", &columns.id)?;
        let shares = text_column(votes, "election results", &columns.share)?;

        ensure_unique(self.districts().iter().map(|d| d.id.as_str()), "boundaries")?;
        ensure_unique(ids.iter().flatten().map(|id| id.trim()), "election results")?;

        let lookup = ids.iter().zip(&shares)
            .filter_map(|(id, share)| id.map(|id| (id.trim(), *share)))
            .collect::<AHashMap<_, _>>();

        let scale = if share_is_percent { 0.01 } else { 1.0 };
        let mut summary = MergeSummary::default();

        let merged = self.map_districts(|_, district| {
            let vote_share = match lookup.get(district.id.trim()) {
                None => {
                    summary.unmatched += 1;
                    None
                }
                Some(raw) => {
                    summary.matched += 1;
                    let value = coerce_f64(*raw);
                    if value.is_none() { summary.unparsable += 1 }
                    value.map(|v| v * scale)
                }
            };
            District { vote_share, ..district.clone() }
        });

        info!("[district::merge] {} districts matched, {} unmatched, {} unparsable shares",
            summary.matched, summary.unmatched, summary.unparsable);
        if summary.unmatched > 0 {
            warn!("[district::merge] {} districts have no election row", summary.unmatched);
        }

        Ok((merged, summary))
    }
}
