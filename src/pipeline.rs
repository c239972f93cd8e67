//! The full batch run: load, merge, join, fit, write.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    PipelineConfig, common,
    district::{DistrictLayer, MergeSummary, read_election_results},
    facility::FacilityLayer,
    model::{RegressionReport, fit_distance_model},
    spatial::add_distance_to_nearest_facility,
};

/// Everything a run produced, for callers that want more than the files.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub layer: DistrictLayer,
    pub merge: MergeSummary,
    /// Facility rows dropped for invalid coordinates.
    pub facilities_dropped: usize,
    pub report: RegressionReport,
    pub files: Vec<PathBuf>,
}

/// Run every stage in order and write the outputs into `config.output_dir`.
///
/// Structural failures abort the run; files already written stay on disk. The dataset is written
/// before the model is fitted, so a model that cannot be fitted only leaves out `regression.txt`.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let out = &config.output_dir;
    common::ensure_dir_exists(out)?;
    let mut files = Vec::new();

    let boundaries = DistrictLayer::load(config)?;
    let path = out.join("east_boundaries.svg");
    boundaries.write_boundaries_svg(&path, "Districts in selected regions")?;
    files.push(path);

    let votes = read_election_results(&config.election_path)?;
    let (merged, merge) = boundaries.merge_votes(&votes, &config.election, config.share_is_percent)
        .with_context(|| format!("[pipeline] merging {}", config.election_path.display()))?;
    let path = out.join("vote_share.svg");
    merged.write_choropleth_svg(&path, "Vote share", "vote share", &merged.vote_shares())?;
    files.push(path);

    let facilities = FacilityLayer::load(config)?;
    let path = out.join("mines_overlay.svg");
    merged.write_overlay_svg(&path, "Coal mines", &facilities.points(), facilities.epsg(), config.crs.display)?;
    files.push(path);

    let layer = add_distance_to_nearest_facility(&merged, &facilities, config.crs.distance)?;
    let path = out.join("dist_to_mine.svg");
    layer.write_choropleth_svg(&path, "Distance to nearest coal mine", "km", &layer.distances_km())?;
    files.push(path);

    let path = out.join("analysis.geojson");
    layer.write_geojson(&path, config.crs.geographic)?;
    files.push(path);

    let path = out.join("analysis.csv");
    layer.write_csv(&path)?;
    files.push(path);

    let report = fit_distance_model(&layer)?;

    let path = out.join("regression.txt");
    fs::write(&path, format!("{report}\n"))
        .with_context(|| format!("[pipeline] Failed to write {}", path.display()))?;
    files.push(path);

    info!("[pipeline] wrote {} files to {}", files.len(), out.display());

    Ok(PipelineOutput {
        layer,
        merge,
        facilities_dropped: facilities.dropped(),
        report,
        files,
    })
}
