//! Pixel writer: streams one placed image, optionally merged with an overlay
//! mask, into a framebuffer-shaped byte buffer.

use serde::Deserialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::overlay::{ColorRule, OverlayMask};
use crate::platform::framebuffer::ScreenGeometry;
use crate::processing::layout::ImagePlacement;

/// Byte order of one pixel in device memory. Depends on the driver, so it is
/// configured rather than inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgba,
    Bgra,
}

impl ChannelOrder {
    fn write(self, [r, g, b, a]: [u8; 4], out: &mut [u8]) {
        let bytes = match self {
            Self::Rgba => [r, g, b, a],
            Self::Bgra => [b, g, r, a],
        };
        out[..4].copy_from_slice(&bytes);
    }
}

/// Color channel of an RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    const fn pick(self, [r, g, b]: [u8; 3]) -> u8 {
        match self {
            Self::Red => r,
            Self::Green => g,
            Self::Blue => b,
        }
    }
}

/// Combine one color channel of the image (`base`) with the overlay's glyph
/// sample according to `rule`. `channel` selects the component of a fixed color.
#[must_use]
pub fn twist(base: u8, sample: u8, rule: ColorRule, channel: Channel) -> u8 {
    match rule {
        ColorRule::FixedColor(rgb) => channel.pick(rgb),
        ColorRule::Or => base | sample,
        ColorRule::Xor => base ^ sample,
    }
}

/// Zero the whole frame.
pub fn clear(dst: &mut [u8]) {
    dst.fill(0);
}

/// Write `placement` into `dst`, row by row from its screen offset.
///
/// The mask is sampled at the same source coordinates as the image, so
/// overlay positions are relative to the image's crop origin. Pixels covered
/// by `mask` get their RGB from [`twist`] and alpha 255; all others are
/// copied verbatim.
///
/// # Errors
/// [`Error::UnsupportedPixelFormat`] for fewer than 4 bytes per pixel,
/// [`Error::BufferTooSmall`] when `dst` cannot hold a full frame.
pub fn composite(
    placement: &ImagePlacement,
    mask: Option<&OverlayMask>,
    dst: &mut [u8],
    screen: ScreenGeometry,
    order: ChannelOrder,
) -> Result<()> {
    let bpp = screen.bytes_per_pixel as usize;
    if bpp < 4 {
        return Err(Error::UnsupportedPixelFormat {
            bits_per_pixel: screen.bytes_per_pixel * 8,
        });
    }
    if dst.len() < screen.buffer_len() {
        return Err(Error::BufferTooSmall {
            needed: screen.buffer_len(),
            actual: dst.len(),
        });
    }

    let pixels = placement.pixels();
    let (image_x, image_y) = placement.image_offset();
    let (screen_x, screen_y) = placement.screen_offset();
    let (visible_w, visible_h) = placement.visible_size();
    let row_gap = (screen.width - visible_w) as usize * bpp;

    let mut cursor = screen_y as usize * screen.row_len() + screen_x as usize * bpp;
    for row in 0..visible_h {
        for col in 0..visible_w {
            let (x, y) = (image_x + col, image_y + row);
            let base = pixels.get_pixel(x, y).0;
            let out = match mask.and_then(|m| m.sample(x, y)) {
                Some((rule, sample)) => {
                    let mut px = [0, 0, 0, 255];
                    for (i, channel) in Channel::ALL.into_iter().enumerate() {
                        px[i] = twist(base[i], sample[i], rule, channel);
                    }
                    px
                }
                None => base,
            };
            order.write(out, &mut dst[cursor..cursor + bpp]);
            cursor += bpp;
        }
        cursor += row_gap;
    }
    trace!(rows = visible_h, cols = visible_w, "frame composited");
    Ok(())
}
