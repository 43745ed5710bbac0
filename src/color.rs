//! Colors used by lights, backgrounds and material tints.
//!
//! Viewer configurations describe colors the way the product pages do: as
//! `0xRRGGBB` integers or `"#rrggbb"` strings. This module converts both into
//! [`Color`] values with RGBA components in the range [0.0, 1.0].
//!
//! # Example
//! ```
//! # use showroom::color::{self, Color};
//! let key_light = color::from_hex(0xf3f3f3);
//! let tint: Color = color::parse("#b76e79").unwrap();
//! assert_eq!(key_light.a, 1.0);
//! assert!(tint.r > tint.b);
//! ```

use crate::error::ConfigError;

pub use rgb::Rgba;

/// The color type used throughout showroom. RGBA with f32 components in [0.0, 1.0].
pub type Color = Rgba<f32>;

/// <div style="margin:2px 0"><span style="background-color:rgb(0, 0, 0);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Black (0, 0, 0)</div>
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(255, 255, 255);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>White (255, 255, 255)</div>
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(187, 187, 187);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Studio gray (187, 187, 187), the furniture backdrop</div>
pub const STUDIO_GRAY: Color = Color::new(0.73333335, 0.73333335, 0.73333335, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(128, 128, 128);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Ambient gray (128, 128, 128)</div>
pub const AMBIENT_GRAY: Color = Color::new(0.5019608, 0.5019608, 0.5019608, 1.0);

/// <div style="margin:2px 0"><span style="background-color:rgb(243, 243, 243);padding:0 0.7em;margin-right:0.5em;border:1px solid"></span>Soft white (243, 243, 243), the fill light tint</div>
pub const SOFT_WHITE: Color = Color::new(0.9529412, 0.9529412, 0.9529412, 1.0);

/// Builds an opaque color from a packed `0xRRGGBB` integer.
pub fn from_hex(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Color::new(r, g, b, 1.0)
}

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or `0xrrggbb`.
pub fn parse(text: &str) -> Result<Color, ConfigError> {
    let invalid = || ConfigError::InvalidColor(text.to_string());
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(invalid)?;

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map(|v| v as f32 / 255.0);

    match digits.len() {
        3 => {
            let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
            Ok(Color::new(
                expand(0).map_err(|_| invalid())?,
                expand(1).map_err(|_| invalid())?,
                expand(2).map_err(|_| invalid())?,
                1.0,
            ))
        }
        6 | 8 => {
            let alpha = if digits.len() == 8 {
                channel(&digits[6..8]).map_err(|_| invalid())?
            } else {
                1.0
            };
            Ok(Color::new(
                channel(&digits[0..2]).map_err(|_| invalid())?,
                channel(&digits[2..4]).map_err(|_| invalid())?,
                channel(&digits[4..6]).map_err(|_| invalid())?,
                alpha,
            ))
        }
        _ => Err(invalid()),
    }
}

/// Converts an sRGB-encoded color to linear space, leaving alpha untouched.
pub fn srgb_to_linear(color: Color) -> Color {
    fn channel(c: f32) -> f32 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    Color::new(channel(color.r), channel(color.g), channel(color.b), color.a)
}

/// Converts a linear color to sRGB encoding, leaving alpha untouched.
pub fn linear_to_srgb(color: Color) -> Color {
    fn channel(c: f32) -> f32 {
        if c <= 0.0031308 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    }

    Color::new(channel(color.r), channel(color.g), channel(color.b), color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_hex_matches_constants() {
        let close = |a: Color, b: Color| {
            (a.r - b.r).abs() < 1.0e-6 && (a.g - b.g).abs() < 1.0e-6 && (a.b - b.b).abs() < 1.0e-6
        };
        assert!(close(from_hex(0xbbbbbb), STUDIO_GRAY));
        assert!(close(from_hex(0x808080), AMBIENT_GRAY));
        assert!(close(from_hex(0xf3f3f3), SOFT_WHITE));
        assert_eq!(from_hex(0xffffff), WHITE);
    }

    #[test]
    fn parse_accepts_page_formats() {
        assert_eq!(parse("#ffffff").unwrap(), WHITE);
        assert_eq!(parse("0x000000").unwrap(), BLACK);
        assert_eq!(parse("#fff").unwrap(), WHITE);
        let translucent = parse("#ff000080").unwrap();
        assert_eq!(translucent.r, 1.0);
        assert!((translucent.a - 128.0 / 255.0).abs() < 1.0e-6);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("red").is_err());
        assert!(parse("#12345").is_err());
        assert!(parse("#gg0000").is_err());
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        let c = srgb_to_linear(Color::new(0.0, 1.0, 0.5, 0.25));
        assert_eq!(c.r, 0.0);
        assert!((c.g - 1.0).abs() < 1.0e-6);
        assert!(c.b < 0.5);
        assert_eq!(c.a, 0.25);

        let back = linear_to_srgb(c);
        assert!((back.b - 0.5).abs() < 1.0e-5);
    }
}
