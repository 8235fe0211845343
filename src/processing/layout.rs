//! Placement engine: applies the configured transform operations to a decoded
//! image and records which part of it lands where on the screen.

use std::fmt;

use fast_image_resize as fir;
use image::{DynamicImage, RgbaImage};
use serde::de::{self, Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::platform::framebuffer::ScreenGeometry;

/// One step of the per-image transform pipeline, applied in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransformOp {
    /// Resample to exactly the screen size.
    Fit,
    /// Resample to the screen width, keeping the current height.
    #[value(name = "hfit")]
    HorizontalFit,
    /// Resample to the screen height, keeping the current width.
    #[value(name = "vfit")]
    VerticalFit,
    /// Center on both axes, cropping or padding as needed.
    Center,
}

impl TransformOp {
    const ALL: &'static [Self] = &[Self::Fit, Self::HorizontalFit, Self::VerticalFit, Self::Center];
    const NAMES: &'static [&'static str] = &["fit", "hfit", "vfit", "center"];

    fn as_str(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::HorizontalFit => "hfit",
            Self::VerticalFit => "vfit",
            Self::Center => "center",
        }
    }

    /// Look up an op by its command-line name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == raw)
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransformOp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Final, immutable description of where one image is drawn.
///
/// The visible rectangle `[image_offset, image_offset + visible)` always lies
/// inside the pixel source, and the destination rectangle starting at the
/// screen offset always lies inside the screen.
#[derive(Debug, Clone)]
pub struct ImagePlacement {
    pixels: RgbaImage,
    image_offset_x: u32,
    image_offset_y: u32,
    screen_offset_x: u32,
    screen_offset_y: u32,
    visible_width: u32,
    visible_height: u32,
}

impl ImagePlacement {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub const fn image_offset(&self) -> (u32, u32) {
        (self.image_offset_x, self.image_offset_y)
    }

    pub const fn screen_offset(&self) -> (u32, u32) {
        (self.screen_offset_x, self.screen_offset_y)
    }

    pub const fn visible_size(&self) -> (u32, u32) {
        (self.visible_width, self.visible_height)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Offsets {
    image_x: u32,
    image_y: u32,
    screen_x: u32,
    screen_y: u32,
}

/// Run `ops` over `image` in order and compute its placement on `screen`.
///
/// Every op starts by zeroing all offsets, so only the offsets computed by the
/// last op survive.
///
/// # Errors
/// [`Error::Resize`] when a resample is requested with a zero dimension.
pub fn place(image: DynamicImage, screen: ScreenGeometry, ops: &[TransformOp]) -> Result<ImagePlacement> {
    let mut working = image;
    let mut offsets = Offsets::default();

    for op in ops {
        offsets = Offsets::default();
        match op {
            TransformOp::Fit => {
                working = resample(working, screen.width, screen.height)?;
            }
            TransformOp::HorizontalFit => {
                let height = working.height();
                working = resample(working, screen.width, height)?;
            }
            TransformOp::VerticalFit => {
                let width = working.width();
                working = resample(working, width, screen.height)?;
            }
            TransformOp::Center => {
                let (img_w, img_h) = (working.width(), working.height());
                let (image_x, screen_x) = center_axis(img_w, screen.width);
                let (image_y, screen_y) = center_axis(img_h, screen.height);
                offsets = Offsets {
                    image_x,
                    image_y,
                    screen_x,
                    screen_y,
                };
                debug!(op = %op, width = img_w, height = img_h, "centered image");
            }
        }
    }

    let pixels = working.into_rgba8();
    let visible_width = pixels.width().min(screen.width);
    let visible_height = pixels.height().min(screen.height);
    debug!(
        x_from = offsets.image_x,
        x_to = offsets.image_x + visible_width,
        y_from = offsets.image_y,
        y_to = offsets.image_y + visible_height,
        screen_x = offsets.screen_x,
        screen_y = offsets.screen_y,
        "placement computed"
    );

    Ok(ImagePlacement {
        pixels,
        image_offset_x: offsets.image_x,
        image_offset_y: offsets.image_y,
        screen_offset_x: offsets.screen_x,
        screen_offset_y: offsets.screen_y,
        visible_width,
        visible_height,
    })
}

/// Returns `(image_offset, screen_offset)`; at most one of them is non-zero.
fn center_axis(image_len: u32, screen_len: u32) -> (u32, u32) {
    if image_len > screen_len {
        ((image_len - screen_len) / 2, 0)
    } else {
        (0, (screen_len - image_len) / 2)
    }
}

fn resample(image: DynamicImage, target_w: u32, target_h: u32) -> Result<DynamicImage> {
    debug!(
        from_width = image.width(),
        from_height = image.height(),
        to_width = target_w,
        to_height = target_h,
        "resampling image"
    );
    let source = match image {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    };
    Ok(DynamicImage::ImageRgba8(resize_rgba(source, target_w, target_h)?))
}

/// High-quality (Lanczos3) resample of an RGBA8 buffer.
///
/// # Errors
/// [`Error::Resize`] for zero-sized sources or targets.
pub fn resize_rgba(source: RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if target_w == 0 || target_h == 0 {
        return Err(Error::Resize(format!(
            "target dimensions must be positive, got {target_w}x{target_h}"
        )));
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source);
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| Error::Resize(format!("invalid source image: {err}")))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| Error::Resize(err.to_string()))?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| Error::Resize("resized buffer has unexpected length".into()))
}
