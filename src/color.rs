use std::collections::BTreeMap;

use eframe::egui::Color32;
use nomi_piacenza::data::model::GroupKey;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` distinct pastel colours using evenly spaced hues.
pub fn pastel_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.55, 0.78);
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
// Color mapping: group value → Color32
// ---------------------------------------------------------------------------

/// Maps the group values of an aggregation to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<GroupKey, Color32>,
}

impl ColorMap {
    /// Assign colours in the order the keys are given.
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a GroupKey>) -> Self {
        let keys: Vec<&GroupKey> = keys.into_iter().collect();
        let mapping = keys
            .iter()
            .zip(pastel_palette(keys.len()))
            .map(|(k, c)| ((*k).clone(), c))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a group value.
    pub fn color_for(&self, key: &GroupKey) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(Color32::GRAY)
    }
}
