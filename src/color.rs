use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use playstore_dash::dispatch::{ChartSpec, ColorScheme};

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
            hsl_to_color32(hue, 0.75, 0.55)
        })
        .collect()
}

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color scale: chart value → Color32
// ---------------------------------------------------------------------------

/// (hue, saturation, lightness) at the low and high end of a sequential scheme.
type Ramp = ((f32, f32, f32), (f32, f32, f32));

fn ramp(scheme: ColorScheme) -> Option<Ramp> {
    match scheme {
        ColorScheme::LightMulti => Some(((55.0, 0.85, 0.80), (210.0, 0.55, 0.45))),
        ColorScheme::Teals => Some(((170.0, 0.45, 0.85), (188.0, 0.80, 0.28))),
        ColorScheme::LightTealBlue => Some(((140.0, 0.50, 0.82), (215.0, 0.60, 0.40))),
        ColorScheme::LightGreyTeal => Some(((90.0, 0.10, 0.82), (185.0, 0.55, 0.35))),
        ColorScheme::RedYellowGreen => Some(((0.0, 0.75, 0.45), (120.0, 0.60, 0.40))),
        ColorScheme::Category10 => None,
    }
}

/// Maps the entries of one chart to colours.
///
/// Sequential schemes interpolate by value between the chart's smallest and
/// largest entry; categorical schemes give each entry its own hue.
#[derive(Debug, Clone)]
pub struct ColorScale {
    ramp: Option<Ramp>,
    palette: Vec<Color32>,
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn for_chart(chart: &ChartSpec) -> Self {
        let values = chart.entries.iter().map(|e| e.value);
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        let ramp = ramp(chart.scheme);
        let palette = if ramp.is_none() {
            generate_palette(chart.entries.len())
        } else {
            Vec::new()
        };
        ColorScale {
            ramp,
            palette,
            min,
            max,
        }
    }

    /// Colour for the entry at `index` holding `value`.
    pub fn color_for(&self, index: usize, value: f64) -> Color32 {
        let Some(((h0, s0, l0), (h1, s1, l1))) = self.ramp else {
            return self.palette.get(index).copied().unwrap_or(Color32::GRAY);
        };
        let range = self.max - self.min;
        let t = if range.is_finite() && range > f64::EPSILON {
            ((value - self.min) / range).clamp(0.0, 1.0) as f32
        } else {
            0.5
        };
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        hsl_to_color32(lerp(h0, h1), lerp(s0, s1), lerp(l0, l1))
    }
}
