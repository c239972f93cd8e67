use std::path::PathBuf;

/// Structural failures that abort a pipeline run.
///
/// Library functions return `anyhow::Result`; these variants travel inside it and can be
/// recovered with `err.downcast_ref::<Error>()`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{label} not found at: {path}\nUpdate the path in the configuration or place the file there.")]
    MissingFile { label: &'static str, path: PathBuf },

    #[error("{source_name} key {key:?} appears {count} times; a 1:1 merge requires unique keys")]
    Cardinality { source_name: &'static str, key: String, count: usize },

    #[error("no facility points available for nearest-neighbor search")]
    EmptyReferenceSet,

    #[error("no projection definition for EPSG:{0}")]
    UnknownCrs(u32),

    #[error("unrecognised CRS definition in {path}; reproject the data to a supported EPSG code")]
    UnrecognizedCrs { path: PathBuf },

    #[error("{source_name} is missing column {column:?}")]
    MissingColumn { source_name: &'static str, column: String },

    #[error("cannot fit model: {0}")]
    Model(String),
}
