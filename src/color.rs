use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

/// Fill for the Price Per Unit histogram.
pub const PURPLE: Color32 = Color32::from_rgb(128, 0, 128);
/// Fill for the Total Spent histogram.
pub const GREEN: Color32 = Color32::from_rgb(0, 128, 0);
/// Default single-series fill.
pub const BLUE: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps each distinct label (payment method, location, …) to a palette colour.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Colours are assigned in the order the labels are given.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ordered: Vec<&str> = Vec::new();
        for label in labels {
            if !ordered.contains(&label) {
                ordered.push(label);
            }
        }
        let mapping = ordered
            .iter()
            .zip(generate_palette(ordered.len()))
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

/// Sequential colour scales, interpolated in linear RGB between fixed stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Sunsetdark,
    Blues,
    Plasma,
}

const SUNSETDARK: &[[u8; 3]] = &[
    [252, 222, 156],
    [250, 164, 118],
    [240, 116, 110],
    [227, 79, 111],
    [220, 57, 119],
    [185, 37, 122],
    [124, 29, 111],
];

const BLUES: &[[u8; 3]] = &[
    [247, 251, 255],
    [222, 235, 247],
    [198, 219, 239],
    [158, 202, 225],
    [107, 174, 214],
    [66, 146, 198],
    [33, 113, 181],
    [8, 81, 156],
    [8, 48, 107],
];

const PLASMA: &[[u8; 3]] = &[
    [13, 8, 135],
    [70, 3, 159],
    [114, 1, 168],
    [156, 23, 158],
    [189, 55, 134],
    [216, 87, 107],
    [237, 121, 83],
    [251, 159, 58],
    [253, 202, 38],
    [240, 249, 33],
];

impl ColorScale {
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            ColorScale::Sunsetdark => SUNSETDARK,
            ColorScale::Blues => BLUES,
            ColorScale::Plasma => PLASMA,
        }
    }

    /// Colour at `t` in `[0, 1]`; out-of-range input is clamped, NaN maps to grey.
    pub fn sample(self, t: f64) -> Color32 {
        if t.is_nan() {
            return Color32::GRAY;
        }
        let stops = self.stops();
        let scaled = t.clamp(0.0, 1.0) as f32 * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f32;

        let a = linear(stops[i]);
        let b = linear(stops[i + 1]);
        let mixed: Srgb<u8> = Srgb::from_linear(a.mix(b, frac));
        Color32::from_rgb(mixed.red, mixed.green, mixed.blue)
    }

    /// Colour for `value` relative to `[min, max]`.
    pub fn sample_range(self, value: f64, min: f64, max: f64) -> Color32 {
        if max > min {
            self.sample((value - min) / (max - min))
        } else {
            self.sample(1.0)
        }
    }
}

fn linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
