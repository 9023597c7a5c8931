/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK:         Self = Self { r: 0.000, g: 0.000, b: 0.000, a: 1.0 }; // #000000
    pub const WHITE:         Self = Self { r: 1.000, g: 1.000, b: 1.000, a: 1.0 }; // #FFFFFF
    pub const GRAY:          Self = Self { r: 0.502, g: 0.502, b: 0.502, a: 1.0 }; // #808080
    pub const DEEP_SKY_BLUE: Self = Self { r: 0.000, g: 0.749, b: 1.000, a: 1.0 }; // #00BFFF
    pub const TOMATO:        Self = Self { r: 1.000, g: 0.388, b: 0.278, a: 1.0 }; // #FF6347
    pub const LIME:          Self = Self { r: 0.000, g: 1.000, b: 0.000, a: 1.0 }; // #00FF00
    pub const GOLD:          Self = Self { r: 1.000, g: 0.843, b: 0.000, a: 1.0 }; // #FFD700
    pub const YELLOW:        Self = Self { r: 1.000, g: 1.000, b: 0.000, a: 1.0 }; // #FFFF00

    /// Parse a CSS-style hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<f32> { u8::from_str_radix(s, 16).ok().map(|b| b as f32 / 255.0) };

        match hex.len() {
            6 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: 1.0,
            }),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Convert to an [`iced::Color`] for the window background and status text.
    #[inline]
    pub fn to_iced(self) -> iced::Color {
        iced::Color::from_rgba(self.r, self.g, self.b, self.a)
    }

    /// Convert to a plotters colour for rasterised plots.
    #[inline]
    pub fn to_plotters(self) -> plotters::style::RGBAColor {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        plotters::style::RGBAColor(channel(self.r), channel(self.g), channel(self.b), self.a as f64)
    }

    /// Return a copy with the alpha channel set to `alpha`.
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_hex_forms() {
        let c = Color::from_hex("#00BFFF").unwrap();
        assert_eq!(c.to_plotters(), Color::DEEP_SKY_BLUE.to_plotters());
        let c = Color::from_hex("FF634780").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex("#ééé"), None);
    }

    #[test]
    fn plotters_channels_round_trip() {
        let plotters::style::RGBAColor(r, g, b, a) = Color::TOMATO.to_plotters();
        assert_eq!((r, g, b), (0xFF, 0x63, 0x47));
        assert_eq!(a, 1.0);
    }
}
