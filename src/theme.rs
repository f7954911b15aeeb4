//! Theme system for the dashboard.

use crate::error::{MonitorError, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color gradient with 2-3 stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    /// Gradient color stops.
    pub stops: Vec<String>,
}

impl Gradient {
    /// Creates a two-color gradient.
    #[must_use]
    pub fn two(start: &str, end: &str) -> Self {
        Self { stops: vec![start.to_string(), end.to_string()] }
    }

    /// Creates a three-color gradient.
    #[must_use]
    pub fn three(start: &str, mid: &str, end: &str) -> Self {
        Self { stops: vec![start.to_string(), mid.to_string(), end.to_string()] }
    }

    /// Samples the gradient at position t (0.0 - 1.0).
    #[must_use]
    pub fn sample(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);

        match self.stops.as_slice() {
            [] => Color::White,
            [only] => parse_color(only),
            stops => {
                let segment_count = stops.len() - 1;
                let segment_size = 1.0 / segment_count as f64;
                let segment = ((t / segment_size) as usize).min(segment_count - 1);
                let local_t = (t - segment as f64 * segment_size) / segment_size;

                interpolate_color(
                    parse_color(&stops[segment]),
                    parse_color(&stops[segment + 1]),
                    local_t,
                )
            }
        }
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::three("#9ece6a", "#e0af68", "#f7768e")
    }
}

/// Colors used by the renderer. Values are `#rrggbb` or `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Memory summary lines.
    pub header: String,
    /// Table column header.
    pub column_header: String,
    /// Footer lines.
    pub footer: String,
    /// Termination modal border.
    pub modal_border: String,
    /// Failure text and the stale marker.
    pub error: String,
    /// Memory usage coloring, sampled by used fraction.
    pub memory: Gradient,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            header: "#c0caf5".to_string(),
            column_header: "#7aa2f7".to_string(),
            footer: "#565f89".to_string(),
            modal_border: "#e0af68".to_string(),
            error: "#f7768e".to_string(),
            memory: Gradient::default(),
        }
    }
}

impl Theme {
    /// Creates a new default theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminal default colors everywhere.
    #[must_use]
    pub fn mono() -> Self {
        let reset = "reset";
        Self {
            name: "mono".to_string(),
            header: reset.to_string(),
            column_header: reset.to_string(),
            footer: reset.to_string(),
            modal_border: reset.to_string(),
            error: reset.to_string(),
            memory: Gradient { stops: vec![reset.to_string()] },
        }
    }

    /// Looks up a built-in theme.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default()),
            "mono" => Ok(Self::mono()),
            other => Err(MonitorError::ThemeError(format!("unknown theme '{other}'"))),
        }
    }

    /// Memory summary color.
    #[must_use]
    pub fn header_color(&self) -> Color {
        parse_color(&self.header)
    }

    /// Column header color.
    #[must_use]
    pub fn column_header_color(&self) -> Color {
        parse_color(&self.column_header)
    }

    /// Footer color.
    #[must_use]
    pub fn footer_color(&self) -> Color {
        parse_color(&self.footer)
    }

    /// Modal border color.
    #[must_use]
    pub fn modal_border_color(&self) -> Color {
        parse_color(&self.modal_border)
    }

    /// Failure color.
    #[must_use]
    pub fn error_color(&self) -> Color {
        parse_color(&self.error)
    }
}

/// Parses a hex color string to a ratatui Color.
///
/// `reset` maps to the terminal default; anything unparseable is white.
pub fn parse_color(hex: &str) -> Color {
    if hex.eq_ignore_ascii_case("reset") {
        return Color::Reset;
    }

    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    Color::Rgb(r, g, b)
}

/// Interpolates between two colors. Non-RGB endpoints return `start`.
fn interpolate_color(start: Color, end: Color, t: f64) -> Color {
    let (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) = (start, end) else {
        return start;
    };

    let lerp = |a: u8, b: u8| ((1.0 - t) * f64::from(a) + t * f64::from(b)) as u8;

    Color::Rgb(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2))
}
