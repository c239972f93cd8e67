use std::path::Path;

use anyhow::{Result, anyhow};
use geo::{BoundingRect, Point, Rect};
use tracing::warn;

use crate::{
    district::DistrictLayer,
    geom::{Geometries, Reprojector},
    io::svg::{SvgWriter, choropleth_colors, draw_legend, draw_points, draw_polygons, fit_canvas},
};

const WIDTH: f64 = 1000.0;
const MARGIN: f64 = 16.0;
const TITLE_SPACE: f64 = 36.0;
const LEGEND_SPACE: f64 = 48.0;
/// Latitude bound of the square Web Mercator world.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_78;

fn merge_bounds(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
        (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
    )
}

fn write_figure(path: &Path, title: &str, geoms: &Geometries, fills: Option<&[String]>, points: &[Point<f64>], legend: Option<(&str, (f64, f64))>) -> Result<()> {
    let mut bounds = geoms.bounds()
        .ok_or_else(|| anyhow!("[district::svg] Could not determine bounds; nothing to draw."))?;
    if let Some(extent) = geo::MultiPoint::from(points.to_vec()).bounding_rect() {
        bounds = merge_bounds(bounds, extent);
    }

    let (height, project) = fit_canvas(bounds, WIDTH, MARGIN, TITLE_SPACE);
    let total_height = if legend.is_some() { height + LEGEND_SPACE } else { height };

    let mut writer = SvgWriter::new(path)?;
    writer.write_header(WIDTH, total_height, title)?;
    draw_polygons(&mut writer, geoms.shapes(), fills, &*project)?;
    draw_points(&mut writer, points, 3.0, &*project)?;
    if let Some((label, range)) = legend {
        draw_legend(&mut writer, WIDTH / 4.0, height + 4.0, WIDTH / 2.0, label, range)?;
    }
    writer.finish()
}

impl DistrictLayer {
    /// Plain outline map of the districts.
    pub fn write_boundaries_svg(&self, path: &Path, title: &str) -> Result<()> {
        write_figure(path, title, self.geoms(), None, &[], None)
    }

    /// Choropleth of one optional value per district; missing values are drawn grey.
    pub fn write_choropleth_svg(&self, path: &Path, title: &str, label: &str, values: &[Option<f64>]) -> Result<()> {
        anyhow::ensure!(values.len() == self.len(),
            "[district::svg] {} values for {} districts", values.len(), self.len());
        let (fills, range) = choropleth_colors(values);
        write_figure(path, title, self.geoms(), Some(&fills), &[], range.map(|r| (label, r)))
    }

    /// District outlines with facility locations on top, both drawn in EPSG:`display_epsg`.
    /// `points` are lon/lat in EPSG:`points_epsg`. Points the display CRS cannot represent (the
    /// poles in Web Mercator) are left off the figure.
    pub fn write_overlay_svg(&self, path: &Path, title: &str, points: &[Point<f64>], points_epsg: u32, display_epsg: u32) -> Result<()> {
        let geoms = self.geoms().reproject(&Reprojector::from_epsg(self.epsg(), display_epsg)?)?;
        let to_display = Reprojector::from_epsg(points_epsg, display_epsg)?;
        let polar = |p: &Point<f64>| display_epsg == 3857
            && to_display.source().is_geographic()
            && p.y().abs() > WEB_MERCATOR_MAX_LAT;
        let drawable = points.iter()
            .filter(|p| !polar(p))
            .filter_map(|&p| to_display.point(p).ok())
            .collect::<Vec<_>>();
        if drawable.len() < points.len() {
            warn!("[district::svg] {} points cannot be shown in EPSG:{display_epsg}", points.len() - drawable.len());
        }
        write_figure(path, title, &geoms, None, &drawable, None)
    }
}
