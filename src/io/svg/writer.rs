//! SVG document writing.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

pub(crate) struct SvgWriter {
    writer: BufWriter<File>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Write the XML declaration, opening <svg> tag, background, styles and title.
    pub(crate) fn write_header(&mut self, width: f64, height: f64, title: &str) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"##)?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        writeln!(self, r##"<defs>
<style>
    .unit {{ fill: #ffffff; stroke: #000000; stroke-width: 0.6; fill-rule: evenodd; }}
    .site {{ fill: #d62728; fill-opacity: 0.8; stroke: #ffffff; stroke-width: 0.4; }}
    .title {{ font: bold 18px sans-serif; }}
    .label {{ font: 12px sans-serif; }}
</style>
</defs>"##)?;
        writeln!(self, r##"<text class="title" x="{:.1}" y="24" text-anchor="middle">{}</text>"##, width / 2.0, escape(title))?;
        Ok(())
    }

    /// Write the closing </svg> tag and flush.
    pub(crate) fn finish(mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        self.flush().context("[io::svg] Failed to flush SVG")
    }
}

/// Escape text content for XML.
pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
