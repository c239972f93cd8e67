//! SVG writing for map figures.

mod color;
mod geometry;
mod writer;

pub(crate) use color::*;
pub(crate) use geometry::*;
pub(crate) use writer::*;
