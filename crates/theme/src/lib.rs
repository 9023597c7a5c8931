pub mod colors;

pub use colors::Color;

use temhumi_config::ThemeConfig;
use temhumi_core::SeriesKind;

/// Plot palette derived from [`ThemeConfig`].
///
/// All colors are pre-parsed from hex strings into normalised `[0, 1]` RGBA.
/// Calling [`Theme::from_config`] is infallible: invalid color strings fall
/// back to the built-in dark palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background:  Color,
    pub foreground:  Color,
    pub grid:        Color,
    pub humidity:    Color,
    pub temperature: Color,
    /// START marker.
    pub start:       Color,
    /// Six-hour milestones. NOW uses the series colour.
    pub milestone:   Color,
    /// Secondary daily date labels.
    pub date_label:  Color,
}

impl Theme {
    /// Build a [`Theme`] from the config file's `[theme]` section.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        let parse = |hex: &str, fallback: Color| Color::from_hex(hex).unwrap_or(fallback);
        Self {
            background:  parse(&cfg.background, Color::BLACK),
            foreground:  parse(&cfg.foreground, Color::WHITE),
            grid:        parse(&cfg.grid, Color::GRAY),
            humidity:    parse(&cfg.humidity, Color::DEEP_SKY_BLUE),
            temperature: parse(&cfg.temperature, Color::TOMATO),
            start:       parse(&cfg.start, Color::LIME),
            milestone:   parse(&cfg.milestone, Color::GOLD),
            date_label:  parse(&cfg.date_label, Color::YELLOW),
        }
    }

    /// Curve colour of one quantity.
    pub fn series(&self, kind: SeriesKind) -> Color {
        match kind {
            SeriesKind::Humidity    => self.humidity,
            SeriesKind::Temperature => self.temperature,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_palette() {
        let theme = Theme::default();
        let rgb = |c: Color| c.to_plotters();
        assert_eq!(rgb(theme.series(SeriesKind::Humidity)), rgb(Color::DEEP_SKY_BLUE));
        assert_eq!(rgb(theme.series(SeriesKind::Temperature)), rgb(Color::TOMATO));
        assert_eq!(rgb(theme.start), rgb(Color::LIME));
    }

    #[test]
    fn invalid_hex_falls_back() {
        let cfg = ThemeConfig {
            humidity: "not a colour".into(),
            ..ThemeConfig::default()
        };
        assert_eq!(Theme::from_config(&cfg).humidity, Color::DEEP_SKY_BLUE);
        assert_eq!(Theme::from_config(&cfg).temperature.to_plotters(), Color::TOMATO.to_plotters());
    }
}
