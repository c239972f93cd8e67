mod fs;
mod polygon;
mod text;

pub(crate) use fs::*;
pub(crate) use polygon::*;
pub(crate) use text::*;
