//! Rasterizes overlay text into a single screen-sized mask whose alpha
//! channel records which descriptor owns each pixel.

use std::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13, FONT_9X15, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::{Rgba, RgbaImage};
use tracing::trace;

use crate::error::{Error, Result};
use crate::overlay::MAX_OVERLAYS;
use crate::overlay::format::{ColorRule, OverlayDescriptor};
use crate::platform::framebuffer::ScreenGeometry;

/// RGB written for every glyph pixel.
const GLYPH_SAMPLE: [u8; 3] = [255, 255, 255];

/// Screen-sized surface where alpha 0 means "no overlay" and alpha `i + 1`
/// means "owned by descriptor `i`".
#[derive(Debug, Clone)]
pub struct OverlayMask {
    surface: RgbaImage,
    rules: Vec<ColorRule>,
}

impl OverlayMask {
    /// Owner rule and glyph sample at `(x, y)`, if any overlay touched it.
    /// Coordinates past the mask's edge are never covered.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32) -> Option<(ColorRule, [u8; 3])> {
        let px = self.surface.get_pixel_checked(x, y)?;
        let owner = px[3];
        if owner == 0 {
            return None;
        }
        let rule = *self.rules.get(usize::from(owner) - 1)?;
        Some((rule, [px[0], px[1], px[2]]))
    }

    /// Raw owner index stored at `(x, y)` (0 = untouched).
    #[must_use]
    pub fn owner_at(&self, x: u32, y: u32) -> u8 {
        self.surface.get_pixel_checked(x, y).map_or(0, |px| px[3])
    }

}

/// Draw every descriptor's rendered text, in order, into a fresh mask.
/// Later descriptors overwrite earlier ones where glyphs overlap.
///
/// # Errors
/// [`Error::TooManyOverlays`] when the owner index would not fit the alpha channel.
pub fn build_mask(descriptors: &[OverlayDescriptor], screen: ScreenGeometry) -> Result<OverlayMask> {
    if descriptors.len() > MAX_OVERLAYS {
        return Err(Error::TooManyOverlays(descriptors.len()));
    }
    let mut surface = RgbaImage::new(screen.width, screen.height);
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let owner = u8::try_from(idx + 1).map_err(|_| Error::TooManyOverlays(descriptors.len()))?;
        let mut canvas = MaskCanvas {
            surface: &mut surface,
            owner,
        };
        let style = MonoTextStyle::new(font_for_size(descriptor.font_size), BinaryColor::On);
        let origin = Point::new(descriptor.x, descriptor.y);
        let Ok(_) = Text::with_baseline(&descriptor.rendered_text, origin, style, Baseline::Alphabetic)
            .draw(&mut canvas);
        trace!(owner, x = descriptor.x, y = descriptor.y, text = %descriptor.rendered_text, "overlay drawn");
    }
    Ok(OverlayMask {
        surface,
        rules: descriptors.iter().map(|d| d.color_rule).collect(),
    })
}

/// Closest fixed bitmap face for a requested pixel size.
fn font_for_size(size: u32) -> &'static MonoFont<'static> {
    match size {
        0..=10 => &FONT_6X10,
        11..=13 => &FONT_7X13,
        14..=15 => &FONT_9X15,
        _ => &FONT_10X20,
    }
}

struct MaskCanvas<'a> {
    surface: &'a mut RgbaImage,
    owner: u8,
}

impl OriginDimensions for MaskCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.surface.width(), self.surface.height())
    }
}

impl DrawTarget for MaskCanvas<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let [r, g, b] = GLYPH_SAMPLE;
        for Pixel(point, color) in pixels {
            if color != BinaryColor::On {
                continue;
            }
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < self.surface.width() && y < self.surface.height() {
                self.surface.put_pixel(x, y, Rgba([r, g, b, self.owner]));
            }
        }
        Ok(())
    }
}
