use std::collections::BTreeMap;
use std::fmt;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SeriesColor – framework-free RGBA
// ---------------------------------------------------------------------------

/// 8-bit RGBA colour used in chart specs and configuration.
///
/// Deserializes from `"#rrggbb"` or `"#rrggbbaa"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct SeriesColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SeriesColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Dodger blue at half opacity, the area chart fill.
    pub const AREA_FILL: SeriesColor = SeriesColor::rgba(30, 144, 255, 128);
    pub const DARK_GREEN: SeriesColor = SeriesColor::rgb(0, 100, 0);
    pub const GRAY: SeriesColor = SeriesColor::rgb(160, 160, 160);

    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl TryFrom<String> for SeriesColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SeriesColor::from_hex(&value)
            .ok_or_else(|| format!("invalid colour '{value}', expected #rrggbb or #rrggbbaa"))
    }
}

impl fmt::Display for SeriesColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<SeriesColor> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            SeriesColor::rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category → SeriesColor
// ---------------------------------------------------------------------------

/// Maps the categories of a dataset to line colours.
///
/// Pinned categories keep their configured colour; the rest share an
/// evenly spaced palette in category order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    mapping: BTreeMap<String, SeriesColor>,
    default_color: SeriesColor,
}

impl ColorMap {
    pub fn new(categories: &[String], pinned: &BTreeMap<String, SeriesColor>) -> Self {
        let free: Vec<&String> = categories
            .iter()
            .filter(|c| !pinned.contains_key(*c))
            .collect();
        let palette = generate_palette(free.len());

        let mut mapping: BTreeMap<String, SeriesColor> = free
            .into_iter()
            .zip(palette)
            .map(|(c, color)| (c.clone(), color))
            .collect();
        for category in categories {
            if let Some(color) = pinned.get(category) {
                mapping.insert(category.clone(), *color);
            }
        }

        ColorMap {
            mapping,
            default_color: SeriesColor::GRAY,
        }
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, category: &str) -> SeriesColor {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(SeriesColor::from_hex("#006400"), Some(SeriesColor::DARK_GREEN));
        assert_eq!(
            SeriesColor::from_hex("#1e90ff80"),
            Some(SeriesColor::AREA_FILL)
        );
        assert_eq!(SeriesColor::from_hex("006400"), None);
        assert_eq!(SeriesColor::from_hex("#12345"), None);
        assert_eq!(SeriesColor::from_hex("#gg0000"), None);
        assert_eq!(SeriesColor::AREA_FILL.to_string(), "#1e90ff80");
    }

    #[test]
    fn deserializes_from_hex_string() {
        let c: SeriesColor = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(c, SeriesColor::rgb(255, 0, 0));
        assert!(serde_json::from_str::<SeriesColor>("\"red\"").is_err());
    }

    #[test]
    fn palette_is_distinct() {
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn pinned_categories_keep_their_colour() {
        let categories = vec![
            "Assistente CSF".to_string(),
            "Assistente CSF CM".to_string(),
        ];
        let pinned = BTreeMap::from([("Assistente CSF".to_string(), SeriesColor::DARK_GREEN)]);
        let map = ColorMap::new(&categories, &pinned);

        assert_eq!(map.color_for("Assistente CSF"), SeriesColor::DARK_GREEN);
        assert_eq!(map.color_for("Assistente CSF CM"), generate_palette(1)[0]);
        assert_eq!(map.color_for("Outro"), SeriesColor::GRAY);
    }
}
