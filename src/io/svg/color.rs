//! Color mapping utilities for SVG figures.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill used for districts with a missing value.
pub(crate) const MISSING_COLOR: Rgb = Rgb { r: 200, g: 200, b: 200 };

/// Viridis stops, sampled evenly over [0, 1].
const VIRIDIS: [Rgb; 5] = [
    Rgb { r:  68, g:   1, b:  84 },
    Rgb { r:  59, g:  82, b: 139 },
    Rgb { r:  33, g: 145, b: 140 },
    Rgb { r:  94, g: 201, b:  98 },
    Rgb { r: 253, g: 231, b:  37 },
];

/// Sequential color ramp for t in [0.0, 1.0]; non-finite input gets the missing color.
pub(crate) fn sequential_color(t: f64) -> Rgb {
    if !t.is_finite() { return MISSING_COLOR }

    let x = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let i = (x.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = x - i as f64;

    let lerp = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * frac).round().clamp(0.0, 255.0) as u8
    };
    let (lo, hi) = (VIRIDIS[i], VIRIDIS[i + 1]);
    Rgb { r: lerp(lo.r, hi.r), g: lerp(lo.g, hi.g), b: lerp(lo.b, hi.b) }
}

/// Map optional values onto the sequential ramp, scaled to their own min/max.
/// Returns one CSS color per value plus the (min, max) range used, if any value was present.
pub(crate) fn choropleth_colors(values: &[Option<f64>]) -> (Vec<String>, Option<(f64, f64)>) {
    let range = values.iter().flatten().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    let colors = values.iter()
        .map(|value| match (value, range) {
            (Some(v), Some((lo, hi))) => {
                let span = if hi > lo { hi - lo } else { 1.0 };
                sequential_color((v - lo) / span)
            }
            _ => MISSING_COLOR,
        })
        .map(|color| color.to_string())
        .collect();

    (colors, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_and_missing() {
        assert_eq!(sequential_color(0.0), VIRIDIS[0]);
        assert_eq!(sequential_color(1.0), VIRIDIS[4]);
        assert_eq!(sequential_color(2.0), VIRIDIS[4]);
        assert_eq!(sequential_color(f64::NAN), MISSING_COLOR);
        assert_eq!(VIRIDIS[0].to_string(), "#440154");
    }

    #[test]
    fn choropleth_scales_to_observed_range() {
        let (colors, range) = choropleth_colors(&[Some(10.0), None, Some(30.0)]);
        assert_eq!(range, Some((10.0, 30.0)));
        assert_eq!(colors[0], VIRIDIS[0].to_string());
        assert_eq!(colors[1], MISSING_COLOR.to_string());
        assert_eq!(colors[2], VIRIDIS[4].to_string());
    }
}
