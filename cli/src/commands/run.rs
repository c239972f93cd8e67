use anyhow::Result;
use minedist::PipelineConfig;
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(path) = &args.output { config.output_dir = path.clone() }
    if let Some(path) = &args.boundaries { config.boundary_path = path.clone() }
    if let Some(path) = &args.elections { config.election_path = path.clone() }
    if let Some(path) = &args.mines { config.facility_path = path.clone() }

    info!("[run] writing outputs to {}", config.output_dir.display());
    let output = minedist::run(&config)?;

    info!("[run] {} districts, {} unmatched, {} facility rows dropped",
        output.layer.len(), output.merge.unmatched, output.facilities_dropped);
    println!("{}", output.report);

    Ok(())
}
