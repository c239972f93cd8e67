use std::fs;

use anyhow::{Context, Result};
use minedist::PipelineConfig;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InitConfigArgs) -> Result<()> {
    let text = PipelineConfig::default().to_toml_string()?;
    match &args.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("[init-config] Failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}
