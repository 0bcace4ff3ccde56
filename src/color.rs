use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{named, Hsl, IntoColor, Srgb};
use plotters::style::{Color, RGBAColor, RGBColor};

/// Opacity of every plotted series, so overlaid histograms stay readable.
pub const SERIES_ALPHA: f32 = 0.6;

// ---------------------------------------------------------------------------
// SeriesColor – one colour, convertible to both drawing backends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesColor {
    pub rgb: Srgb<u8>,
    pub alpha: f32,
}

impl SeriesColor {
    /// A named colour at the standard series opacity.
    pub const fn translucent(rgb: Srgb<u8>) -> Self {
        Self {
            rgb,
            alpha: SERIES_ALPHA,
        }
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgba_unmultiplied(
            self.rgb.red,
            self.rgb.green,
            self.rgb.blue,
            (self.alpha * 255.0).round() as u8,
        )
    }

    pub fn to_rgba(self) -> RGBAColor {
        RGBColor(self.rgb.red, self.rgb.green, self.rgb.blue).mix(self.alpha as f64)
    }
}

pub const DODGER_BLUE: SeriesColor = SeriesColor::translucent(named::DODGERBLUE);
pub const DEEP_PINK: SeriesColor = SeriesColor::translucent(named::DEEPPINK);
pub const CRIMSON: SeriesColor = SeriesColor::translucent(named::CRIMSON);
pub const LAWN_GREEN: SeriesColor = SeriesColor::translucent(named::LAWNGREEN);
pub const ORANGE: SeriesColor = SeriesColor::translucent(named::ORANGE);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<SeriesColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            SeriesColor::translucent(rgb.into_format())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category → SeriesColor
// ---------------------------------------------------------------------------

/// Fixed colours for known categories; anything else is coloured from the
/// generated palette in order of first appearance.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, SeriesColor>,
}

impl ColorMap {
    pub fn new(entries: &[(&str, SeriesColor)]) -> Self {
        let mapping = entries
            .iter()
            .map(|(category, color)| (category.to_string(), *color))
            .collect();
        ColorMap { mapping }
    }

    /// Colour for each category of `categories`, in the same order.
    pub fn resolve<'a>(&self, categories: impl IntoIterator<Item = &'a str>) -> Vec<SeriesColor> {
        let categories: Vec<&str> = categories.into_iter().collect();
        let mut unseen: Vec<&str> = Vec::new();
        for category in &categories {
            if !self.mapping.contains_key(*category) && !unseen.contains(category) {
                unseen.push(category);
            }
        }
        let fallback = generate_palette(unseen.len());

        categories
            .iter()
            .map(|category| match self.mapping.get(*category) {
                Some(color) => *color,
                None => {
                    let slot = unseen.iter().position(|u| u == category).unwrap_or(0);
                    fallback[slot]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_keep_their_colour() {
        let map = ColorMap::new(&[("Male", DODGER_BLUE), ("Female", DEEP_PINK)]);
        assert_eq!(map.resolve(["Female", "Male"]), vec![DEEP_PINK, DODGER_BLUE]);
    }

    #[test]
    fn unseen_categories_get_distinct_palette_colours() {
        let map = ColorMap::new(&[("Male", DODGER_BLUE)]);
        let colors = map.resolve(["Male", "Unknown", "Other"]);
        assert_eq!(colors[0], DODGER_BLUE);
        assert_ne!(colors[1], colors[2]);
        assert_eq!(colors[1].alpha, SERIES_ALPHA);
    }

    #[test]
    fn alpha_is_carried_to_both_backends() {
        assert_eq!(DODGER_BLUE.to_color32().a(), 153);
        assert_eq!(DODGER_BLUE.to_rgba().3, 0.6f32 as f64);
    }
}
