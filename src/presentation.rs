//! Color presentations: render a picked color back to Stylus source.
//!
//! Every rendered form is accepted by the color extractor, so a presentation
//! inserted into a document reads back as (nearly) the same color.

use crate::color::{to_hsl, to_hwb, Rgba};

/// Alpha at or above this threshold renders as opaque.
const OPAQUE: f64 = 0.999;

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Alpha with at most two decimals and no trailing zeros.
fn format_alpha(alpha: f64) -> String {
    let fixed = format!("{:.2}", alpha.clamp(0.0, 1.0));
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Convert to `rgb()` or `rgba()` string
pub fn rgb_string(color: &Rgba) -> String {
    let (r, g, b) = (channel(color.red), channel(color.green), channel(color.blue));

    if color.alpha >= OPAQUE {
        format!("rgb({}, {}, {})", r, g, b)
    } else {
        format!("rgba({}, {}, {}, {})", r, g, b, format_alpha(color.alpha))
    }
}

/// Convert to `#rrggbb` or `#rrggbbaa` string
pub fn hex_string(color: &Rgba) -> String {
    let (r, g, b) = (channel(color.red), channel(color.green), channel(color.blue));

    if color.alpha >= OPAQUE {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        let a = channel(color.alpha * 255.0);
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

/// Convert to `hsl()` or `hsla()` string
pub fn hsl_string(color: &Rgba) -> String {
    let hsl = to_hsl(color);
    let (s, l) = (percent(hsl.saturation), percent(hsl.lightness));

    if hsl.alpha >= OPAQUE {
        format!("hsl({}, {}%, {}%)", hsl.hue, s, l)
    } else {
        format!("hsla({}, {}%, {}%, {})", hsl.hue, s, l, format_alpha(hsl.alpha))
    }
}

/// Convert to space separated `hwb()` string, alpha after a slash
pub fn hwb_string(color: &Rgba) -> String {
    let hwb = to_hwb(color);
    let (w, b) = (percent(hwb.whiteness), percent(hwb.blackness));

    if hwb.alpha >= OPAQUE {
        format!("hwb({} {}% {}%)", hwb.hue, w, b)
    } else {
        format!("hwb({} {}% {}% / {})", hwb.hue, w, b, format_alpha(hwb.alpha))
    }
}

/// All presentations in picker order: rgb, hex, hsl, hwb.
pub fn color_presentations(color: &Rgba) -> Vec<String> {
    vec![rgb_string(color), hex_string(color), hsl_string(color), hwb_string(color)]
}
