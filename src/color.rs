//! Color channel model and conversions
//!
//! Colors are kept in an absolute channel model: red, green and blue in
//! `0..=255`, alpha in `0..=1`. Hue based forms convert through HSL/HWB.
//!
//! Supported inputs:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Named: `red`, `rebeccapurple`, ... (see [`crate::named_colors`])
//! - Constructor calls: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()` given as
//!   numeric channel arguments

use crate::named_colors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Call names that construct a color from numeric channels.
pub const COLOR_CONSTRUCTORS: &[&str] = &["rgb", "rgba", "hsl", "hsla", "hwb"];

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// Not a CSS color keyword
    #[error("unknown color name '{0}'")]
    UnknownName(String),
    /// Not one of rgb/rgba/hsl/hsla/hwb
    #[error("'{0}' is not a color constructor")]
    NotAConstructor(String),
    /// Constructor called with something other than 3 or 4 channels
    #[error("expected 3 or 4 color channels, got {0}")]
    ChannelCount(usize),
    /// Channel carries a unit the channel does not accept
    #[error("unsupported unit '{0}' for color channel")]
    UnsupportedUnit(String),
    /// Channel value outside its range after scaling
    #[error("color channel value {0} out of range")]
    OutOfRange(f64),
}

/// Absolute RGBA color: channels in `0..=255`, alpha in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

/// Hue in degrees, saturation and lightness in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub alpha: f64,
}

/// Hue in degrees, whiteness and blackness in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hwba {
    pub hue: f64,
    pub whiteness: f64,
    pub blackness: f64,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Build from `0..=1` channels, the editor color model.
    pub fn from_unit(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { red: red * 255.0, green: green * 255.0, blue: blue * 255.0, alpha }
    }

    /// Channels scaled to `0..=1`.
    pub fn to_unit(&self) -> (f64, f64, f64, f64) {
        (self.red / 255.0, self.green / 255.0, self.blue / 255.0, self.alpha)
    }
}

/// Parse a hex color string (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
pub fn parse_hex_color(s: &str) -> Result<Rgba, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    let mut digits = Vec::with_capacity(hex.len());
    for c in hex.chars() {
        digits.push(parse_hex_digit(c)?);
    }

    let [r, g, b, a] = match digits.as_slice() {
        // #RGB / #RGBA -> doubled digits
        [r, g, b] => [r * 17, g * 17, b * 17, 255],
        [r, g, b, a] => [r * 17, g * 17, b * 17, a * 17],
        [r1, r2, g1, g2, b1, b2] => [r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255],
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            [r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]
        }
        _ => return Err(ColorError::InvalidLength(digits.len())),
    };

    Ok(Rgba::new(r as f64, g as f64, b as f64, a as f64 / 255.0))
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Color of a CSS keyword.
pub fn from_name(name: &str) -> Result<Rgba, ColorError> {
    let hex = named_colors::lookup(name).ok_or_else(|| ColorError::UnknownName(name.to_string()))?;
    parse_hex_color(hex)
}

pub fn is_color_constructor(name: &str) -> bool {
    COLOR_CONSTRUCTORS.contains(&name)
}

/// Scale a channel to `0..=1`.
///
/// A `%` suffix divides by 100, a bare number divides by `factor`. Any other
/// unit, and any result outside `0..=1`, is an error.
pub fn numeric_value(value: f64, suffix: Option<&str>, factor: f64) -> Result<f64, ColorError> {
    let scaled = match suffix {
        None | Some("") => value / factor,
        Some("%") => value / 100.0,
        Some(other) => return Err(ColorError::UnsupportedUnit(other.to_string())),
    };
    if (0.0..=1.0).contains(&scaled) {
        Ok(scaled)
    } else {
        Err(ColorError::OutOfRange(value))
    }
}

/// Hue in degrees, from a bare number or a `deg`/`rad`/`grad`/`turn` angle.
pub fn angle(value: f64, suffix: Option<&str>) -> Result<f64, ColorError> {
    let degrees = match suffix {
        None | Some("") | Some("deg") => value,
        Some("rad") => value.to_degrees(),
        Some("grad") => value * 0.9,
        Some("turn") => value * 360.0,
        Some(other) => return Err(ColorError::UnsupportedUnit(other.to_string())),
    };
    Ok(degrees % 360.0)
}

/// HSL to absolute RGB. `hue` in degrees, `sat`/`light` in `0..=1`.
pub fn from_hsl(hue: f64, sat: f64, light: f64, alpha: f64) -> Rgba {
    if sat == 0.0 {
        return Rgba::from_unit(light, light, light, alpha);
    }

    let hue = hue / 60.0;
    let t2 = if light <= 0.5 { light * (sat + 1.0) } else { light + sat - light * sat };
    let t1 = light * 2.0 - t2;

    Rgba::from_unit(
        hue_to_rgb(t1, t2, hue + 2.0),
        hue_to_rgb(t1, t2, hue),
        hue_to_rgb(t1, t2, hue - 2.0),
        alpha,
    )
}

fn hue_to_rgb(t1: f64, t2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(6.0);
    if hue < 1.0 {
        (t2 - t1) * hue + t1
    } else if hue < 3.0 {
        t2
    } else if hue < 4.0 {
        (t2 - t1) * (4.0 - hue) + t1
    } else {
        t1
    }
}

/// HWB to absolute RGB. `white`/`black` in `0..=1`.
pub fn from_hwb(hue: f64, white: f64, black: f64, alpha: f64) -> Rgba {
    if white + black >= 1.0 {
        let gray = white / (white + black);
        return Rgba::from_unit(gray, gray, gray, alpha);
    }

    let (r, g, b, _) = from_hsl(hue, 1.0, 0.5, alpha).to_unit();
    let scale = 1.0 - white - black;
    Rgba::from_unit(r * scale + white, g * scale + white, b * scale + white, alpha)
}

/// RGB to HSL, hue rounded to whole degrees.
pub fn to_hsl(color: &Rgba) -> Hsla {
    let (r, g, b, alpha) = color.to_unit();
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (min + max) / 2.0;
    let chroma = max - min;

    let mut hue = 0.0;
    let mut saturation = 0.0;
    if chroma > 0.0 {
        saturation = if lightness <= 0.5 {
            chroma / (2.0 * lightness)
        } else {
            chroma / (2.0 - 2.0 * lightness)
        }
        .min(1.0);

        hue = if max == r {
            (g - b) / chroma + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / chroma + 2.0
        } else {
            (r - g) / chroma + 4.0
        };
        hue = (hue * 60.0).round();
    }

    Hsla { hue, saturation, lightness, alpha }
}

/// RGB to HWB, hue shared with [`to_hsl`].
pub fn to_hwb(color: &Rgba) -> Hwba {
    let hsl = to_hsl(color);
    let (r, g, b, alpha) = color.to_unit();
    Hwba {
        hue: hsl.hue,
        whiteness: r.min(g).min(b),
        blackness: 1.0 - r.max(g).max(b),
        alpha,
    }
}

/// Evaluate a color constructor from its numeric channel arguments.
///
/// `units` are `(value, suffix)` pairs; with three channels alpha is 1.
pub fn color_from_call(name: &str, units: &[(f64, Option<&str>)]) -> Result<Rgba, ColorError> {
    let (channels, alpha) = match units {
        [a, b, c] => ([*a, *b, *c], 1.0),
        [a, b, c, (alpha, suffix)] => ([*a, *b, *c], numeric_value(*alpha, *suffix, 1.0)?),
        _ => return Err(ColorError::ChannelCount(units.len())),
    };
    let [(v0, s0), (v1, s1), (v2, s2)] = channels;

    match name {
        "rgb" | "rgba" => {
            let red = numeric_value(v0, s0, 255.0)? * 255.0;
            let green = numeric_value(v1, s1, 255.0)? * 255.0;
            let blue = numeric_value(v2, s2, 255.0)? * 255.0;
            Ok(Rgba::new(red, green, blue, alpha))
        }
        "hsl" | "hsla" => {
            let hue = angle(v0, s0)?;
            let sat = numeric_value(v1, s1, 100.0)?;
            let light = numeric_value(v2, s2, 100.0)?;
            Ok(from_hsl(hue, sat, light, alpha))
        }
        "hwb" => {
            let hue = angle(v0, s0)?;
            let white = numeric_value(v1, s1, 100.0)?;
            let black = numeric_value(v2, s2, 100.0)?;
            Ok(from_hwb(hue, white, black, alpha))
        }
        other => Err(ColorError::NotAConstructor(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Rgba, expected: (f64, f64, f64, f64)) {
        let tolerance = 0.5;
        assert!(
            (actual.red - expected.0).abs() < tolerance
                && (actual.green - expected.1).abs() < tolerance
                && (actual.blue - expected.2).abs() < tolerance
                && (actual.alpha - expected.3).abs() < 0.01,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_hex_short_and_long() {
        assert_eq!(parse_hex_color("#F00").unwrap(), Rgba::new(255.0, 0.0, 0.0, 1.0));
        assert_eq!(parse_hex_color("#00ff00").unwrap(), Rgba::new(0.0, 255.0, 0.0, 1.0));
        assert_close(parse_hex_color("#0000ff80").unwrap(), (0.0, 0.0, 255.0, 0.502));
        assert_close(parse_hex_color("#fff8").unwrap(), (255.0, 255.0, 255.0, 0.533));
    }

    #[test]
    fn test_hex_errors() {
        assert_eq!(parse_hex_color(""), Err(ColorError::Empty));
        assert_eq!(parse_hex_color("fff"), Err(ColorError::MissingHash));
        assert_eq!(parse_hex_color("#ff"), Err(ColorError::InvalidLength(2)));
        assert_eq!(parse_hex_color("#ggg"), Err(ColorError::InvalidHex('g')));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(from_name("red").unwrap(), Rgba::new(255.0, 0.0, 0.0, 1.0));
        assert_eq!(from_name("nope"), Err(ColorError::UnknownName("nope".to_string())));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value(50.0, Some("%"), 255.0), Ok(0.5));
        assert_eq!(numeric_value(51.0, None, 255.0), Ok(0.2));
        assert_eq!(numeric_value(0.5, None, 1.0), Ok(0.5));
        assert_eq!(numeric_value(300.0, None, 255.0), Err(ColorError::OutOfRange(300.0)));
        assert_eq!(
            numeric_value(10.0, Some("px"), 255.0),
            Err(ColorError::UnsupportedUnit("px".to_string()))
        );
    }

    #[test]
    fn test_angle_units() {
        assert_eq!(angle(120.0, None), Ok(120.0));
        assert_eq!(angle(450.0, Some("deg")), Ok(90.0));
        assert_eq!(angle(0.5, Some("turn")), Ok(180.0));
        assert_eq!(angle(100.0, Some("grad")), Ok(90.0));
        assert!((angle(std::f64::consts::PI, Some("rad")).unwrap() - 180.0).abs() < 1e-9);
        assert!(angle(1.0, Some("px")).is_err());
    }

    #[test]
    fn test_hsl_primaries() {
        assert_close(from_hsl(0.0, 1.0, 0.5, 1.0), (255.0, 0.0, 0.0, 1.0));
        assert_close(from_hsl(120.0, 1.0, 0.5, 1.0), (0.0, 255.0, 0.0, 1.0));
        assert_close(from_hsl(240.0, 1.0, 0.25, 0.5), (0.0, 0.0, 127.5, 0.5));
        assert_close(from_hsl(-120.0, 1.0, 0.5, 1.0), (0.0, 0.0, 255.0, 1.0));
        assert_close(from_hsl(0.0, 0.0, 0.5, 1.0), (127.5, 127.5, 127.5, 1.0));
    }

    #[test]
    fn test_hwb() {
        assert_close(from_hwb(0.0, 0.0, 0.0, 1.0), (255.0, 0.0, 0.0, 1.0));
        assert_close(from_hwb(0.0, 0.6, 0.6, 1.0), (127.5, 127.5, 127.5, 1.0));
        assert_close(from_hwb(120.0, 0.2, 0.2, 1.0), (51.0, 204.0, 51.0, 1.0));
    }

    #[test]
    fn test_to_hsl_and_hwb() {
        let hsl = to_hsl(&Rgba::new(0.0, 0.0, 255.0, 1.0));
        assert_eq!(hsl.hue, 240.0);
        assert_eq!(hsl.saturation, 1.0);
        assert_eq!(hsl.lightness, 0.5);

        let hwb = to_hwb(&Rgba::new(255.0, 255.0, 255.0, 0.3));
        assert_eq!(hwb.whiteness, 1.0);
        assert_eq!(hwb.blackness, 0.0);
        assert_eq!(hwb.alpha, 0.3);
    }

    #[test]
    fn test_color_from_call() {
        let color =
            color_from_call("rgba", &[(10.0, None), (20.0, None), (30.0, None), (0.5, None)])
                .unwrap();
        assert_close(color, (10.0, 20.0, 30.0, 0.5));

        let color =
            color_from_call("rgb", &[(100.0, Some("%")), (0.0, None), (0.0, Some("%"))]).unwrap();
        assert_close(color, (255.0, 0.0, 0.0, 1.0));

        let color =
            color_from_call("hsl", &[(120.0, Some("deg")), (100.0, Some("%")), (50.0, Some("%"))])
                .unwrap();
        assert_close(color, (0.0, 255.0, 0.0, 1.0));

        let color = color_from_call(
            "hwb",
            &[(0.0, None), (0.0, Some("%")), (0.0, Some("%")), (50.0, Some("%"))],
        )
        .unwrap();
        assert_close(color, (255.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_color_from_call_errors() {
        assert_eq!(
            color_from_call("rgb", &[(1.0, None), (2.0, None)]),
            Err(ColorError::ChannelCount(2))
        );
        assert_eq!(
            color_from_call("lab", &[(1.0, None), (2.0, None), (3.0, None)]),
            Err(ColorError::NotAConstructor("lab".to_string()))
        );
        assert!(color_from_call("rgb", &[(256.0, None), (0.0, None), (0.0, None)]).is_err());
    }

    #[test]
    fn test_unit_round_trip() {
        let color = Rgba::from_unit(1.0, 0.5, 0.0, 0.25);
        assert_eq!(color.red, 255.0);
        assert_eq!(color.to_unit(), (1.0, 0.5, 0.0, 0.25));
    }
}
