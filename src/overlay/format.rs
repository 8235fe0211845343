//! Parser for overlay format strings such as `X:10;Y:20;C:xor;CPU:{{.CpuUser}}`.
//!
//! Tokens are separated by `;`. `X:`, `Y:`, `S:` take integers, `C:` takes
//! `r,g,b`, `or` or `xor`. Any other token is the template text; the last one
//! wins.

use crate::error::{Error, Result};

pub const DEFAULT_X: i32 = 100;
pub const DEFAULT_Y: i32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// How an overlay pixel combines with the image pixel underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRule {
    /// Paint the given RGB regardless of the image.
    FixedColor([u8; 3]),
    /// Bitwise OR of image and glyph sample.
    Or,
    /// Bitwise XOR of image and glyph sample.
    Xor,
}

impl Default for ColorRule {
    fn default() -> Self {
        Self::FixedColor([255, 255, 255])
    }
}

/// One piece of on-screen text. Rebuilt every render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDescriptor {
    pub x: i32,
    pub y: i32,
    pub font_size: u32,
    pub color_rule: ColorRule,
    pub template: String,
    pub rendered_text: String,
}

impl Default for OverlayDescriptor {
    fn default() -> Self {
        Self {
            x: DEFAULT_X,
            y: DEFAULT_Y,
            font_size: DEFAULT_FONT_SIZE,
            color_rule: ColorRule::default(),
            template: String::new(),
            rendered_text: String::new(),
        }
    }
}

/// Parse a single format string. `rendered_text` is left empty.
///
/// # Errors
/// [`Error::Format`] when a numeric token is not an integer or a color token
/// does not hold exactly three components in `0..=255`.
pub fn parse_format(raw: &str) -> Result<OverlayDescriptor> {
    let mut info = OverlayDescriptor::default();
    for token in raw.split(';').filter(|t| !t.is_empty()) {
        if let Some(v) = token.strip_prefix("X:") {
            info.x = parse_int(v, token)?;
        } else if let Some(v) = token.strip_prefix("Y:") {
            info.y = parse_int(v, token)?;
        } else if let Some(v) = token.strip_prefix("S:") {
            info.font_size = parse_int(v, token)?;
        } else if let Some(v) = token.strip_prefix("C:") {
            info.color_rule = parse_color(v, token)?;
        } else {
            info.template = token.to_string();
        }
    }
    // S:0 means "unset".
    if info.font_size == 0 {
        info.font_size = DEFAULT_FONT_SIZE;
    }
    Ok(info)
}

fn parse_int<T: std::str::FromStr>(value: &str, token: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| Error::Format(format!("{token:?}: {err}")))
}

fn parse_color(value: &str, token: &str) -> Result<ColorRule> {
    match value {
        "or" => return Ok(ColorRule::Or),
        "xor" => return Ok(ColorRule::Xor),
        _ => {}
    }
    let parts: Vec<&str> = value.split(',').collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(Error::Format(format!(
            "{token:?}: expected r,g,b, or, xor; got {} components",
            parts.len()
        )));
    };
    Ok(ColorRule::FixedColor([
        parse_int(r, token)?,
        parse_int(g, token)?,
        parse_int(b, token)?,
    ]))
}
