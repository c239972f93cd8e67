//! Geometry drawing helpers for SVG figures.

use std::io::Write;

use anyhow::Result;
use geo::{Coord, CoordsIter, LineString, MultiPolygon, Point, Rect};

use crate::io::svg::{escape, sequential_color};

/// Projection function: data coordinates -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Fit `bounds` into a `width`-wide canvas with `margin` on every side, Y pointing down.
/// Returns the canvas height and the projection.
pub(crate) fn fit_canvas(bounds: Rect<f64>, width: f64, margin: f64, top: f64) -> (f64, Box<Projection>) {
    let span_x = bounds.width().max(f64::EPSILON);
    let span_y = bounds.height().max(f64::EPSILON);
    let scale = (width - 2.0 * margin) / span_x;
    let height = span_y * scale + 2.0 * margin + top;

    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = margin + (coord.x - bounds.min().x) * scale;
        let y = top + margin + (bounds.max().y - coord.y) * scale; // invert vertically
        (x, y)
    };
    (height, Box::new(project))
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }

    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &LineString<f64>, project: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.2},{y:.2}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.2},{y:.2}"));
        }
        out.push('Z');
    }
}

/// Draw polygons, optionally with one fill color per polygon.
pub(crate) fn draw_polygons(writer: &mut impl Write, polygons: &[MultiPolygon<f64>], fills: Option<&[String]>, project: &Projection) -> Result<()> {
    if let Some(fills) = fills {
        anyhow::ensure!(fills.len() == polygons.len(),
            "[io::svg] length mismatch: {} colors for {} geometries", fills.len(), polygons.len());
    }

    for (i, polygon) in polygons.iter().enumerate() {
        if polygon.0.is_empty() { continue }
        let path = multipolygon_to_path(polygon, project);
        match fills {
            Some(fills) => writeln!(writer, r#"<path class="unit" d="{path}" style="fill:{}"/>"#, fills[i])?,
            None => writeln!(writer, r#"<path class="unit" d="{path}"/>"#)?,
        }
    }
    Ok(())
}

/// Draw points as small circles.
pub(crate) fn draw_points(writer: &mut impl Write, points: &[Point<f64>], radius: f64, project: &Projection) -> Result<()> {
    for point in points {
        let (x, y) = project(&point.0);
        writeln!(writer, r#"<circle class="site" cx="{x:.2}" cy="{y:.2}" r="{radius}"/>"#)?;
    }
    Ok(())
}

/// Draw a horizontal color-bar legend for the sequential ramp spanning `range`.
pub(crate) fn draw_legend(writer: &mut impl Write, x: f64, y: f64, width: f64, label: &str, range: (f64, f64)) -> Result<()> {
    const STEPS: usize = 32;
    let step = width / STEPS as f64;
    for i in 0..STEPS {
        let color = sequential_color(i as f64 / (STEPS - 1) as f64);
        writeln!(writer, r#"<rect x="{:.2}" y="{y:.2}" width="{:.2}" height="12" fill="{color}"/>"#, x + i as f64 * step, step + 0.5)?;
    }
    writeln!(writer, r#"<text class="label" x="{x:.2}" y="{:.2}">{:.3}</text>"#, y + 26.0, range.0)?;
    writeln!(writer, r#"<text class="label" x="{:.2}" y="{:.2}" text-anchor="end">{:.3}</text>"#, x + width, y + 26.0, range.1)?;
    writeln!(writer, r#"<text class="label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#, x + width / 2.0, y + 26.0, escape(label))?;
    Ok(())
}
