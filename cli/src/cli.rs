use std::path::PathBuf;

/// Distance-to-coal-mine analysis CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "minedist", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and write figures, tables and the regression report
    Run(RunArgs),

    /// Print the default configuration as TOML
    InitConfig(InitConfigArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output directory, overrides the configuration
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Boundary dataset (Shapefile or GeoJSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub boundaries: Option<PathBuf>,

    /// Election results CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub elections: Option<PathBuf>,

    /// Coal mine locations CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub mines: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct InitConfigArgs {
    /// Write to this file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
