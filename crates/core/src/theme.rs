//! Accent color theme variables derived from an account's theme preference.
//!
//! The presentation layer applies these as CSS custom properties; this module
//! only computes them.

use std::collections::BTreeMap;

/// Default accent color (violet) used when no valid preference is set.
pub const DEFAULT_ACCENT: &str = "#a855f7";

const DEFAULT_VARIABLES: [(&str, &str); 6] = [
    ("--accent-color", "#a855f7"),
    ("--accent-color-400", "#c084fc"),
    ("--accent-color-500", "#a855f7"),
    ("--accent-color-600", "#9333ea"),
    ("--accent-color-700", "#7e22ce"),
    ("--accent-color-rgb", "168, 85, 247"),
];

/// Parse `#rrggbb` (leading `#` optional) into its three channels.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn lighten(channel: u8, percent: f64) -> u8 {
    let c = f64::from(channel);
    (c + (255.0 - c) * percent).round().min(255.0) as u8
}

fn darken(channel: u8, percent: f64) -> u8 {
    (f64::from(channel) * (1.0 - percent)).round().max(0.0) as u8
}

/// Compute the accent CSS variables for a hex color.
///
/// A missing or malformed color yields the default violet palette.
pub fn compute_theme_variables(hex_color: Option<&str>) -> BTreeMap<&'static str, String> {
    let Some((color, (r, g, b))) =
        hex_color.and_then(|hex| parse_hex_color(hex).map(|rgb| (hex, rgb)))
    else {
        return DEFAULT_VARIABLES
            .iter()
            .map(|(k, v)| (*k, (*v).to_string()))
            .collect();
    };

    let rgb = |f: &dyn Fn(u8) -> u8| format!("rgb({}, {}, {})", f(r), f(g), f(b));
    let color = if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{color}")
    };

    BTreeMap::from([
        ("--accent-color", color.clone()),
        ("--accent-color-400", rgb(&|c| lighten(c, 0.3))),
        ("--accent-color-500", color),
        ("--accent-color-600", rgb(&|c| darken(c, 0.1))),
        ("--accent-color-700", rgb(&|c| darken(c, 0.2))),
        ("--accent-color-rgb", format!("{r}, {g}, {b}")),
    ])
}
