//! Render still images onto a Linux framebuffer, optionally overlaid with
//! live memory/CPU figures and cycled as a slideshow.

pub mod config;
pub mod error;
pub mod stats;
pub mod overlay;
pub mod platform {
    pub mod console;
    pub mod framebuffer;
}
pub mod processing {
    pub mod decode;
    pub mod layout;
}
pub mod render {
    pub mod writer;
}
pub mod tasks {
    pub mod slideshow;
}

use std::path::Path;

use tracing::{info, warn};

pub use config::Configuration;
pub use error::{Error, Result};
pub use platform::framebuffer::ScreenGeometry;
pub use processing::layout::{ImagePlacement, TransformOp};
pub use tasks::slideshow::RunSummary;

use platform::console::{CursorGuard, TerminalKeys};
use platform::framebuffer::Framebuffer;
use stats::HostStats;
use tasks::slideshow::{CancelSource, NeverCancel, Slideshow, SlideshowOptions};

/// Decode `path` and compute its placement on `screen`.
///
/// # Errors
/// Decode and resize failures.
pub fn load_placement(path: &Path, screen: ScreenGeometry, ops: &[TransformOp]) -> Result<ImagePlacement> {
    let image = processing::decode::decode_path(path)?;
    processing::layout::place(image, screen, ops)
}

/// Set up the device, prepare every image and run the slideshow until it
/// finishes or is cancelled. All resources are released on return.
///
/// # Errors
/// Any setup, decode, format or stats failure; nothing is retried.
pub fn run(config: &Configuration) -> Result<RunSummary> {
    config.validate()?;
    let overlays = config.overlay_set()?;
    if !config.stats && !overlays.is_empty() {
        warn!(count = overlays.len(), "overlay formats given but stats are disabled; ignoring");
    }

    let framebuffer = Framebuffer::open(&config.device)?;
    let _cursor = if config.hide_cursor {
        Some(CursorGuard::hide(&config.console)?)
    } else {
        None
    };
    let screen = framebuffer.geometry();

    let placements = config
        .images
        .iter()
        .map(|path| load_placement(path, screen, &config.transforms))
        .collect::<Result<Vec<_>>>()?;
    info!(count = placements.len(), "images prepared");

    let mut mapped = framebuffer.map()?;
    let cancel: Box<dyn CancelSource> = if config.redraw_interval.is_zero() {
        Box::new(NeverCancel)
    } else {
        Box::new(TerminalKeys::claim()?)
    };
    let options = SlideshowOptions {
        clear: config.clear,
        redraw_interval: config.redraw_interval,
        channel_order: config.channel_order,
        ..SlideshowOptions::default()
    };

    let mut show = Slideshow::new(&placements, screen, options, cancel)?;
    if config.stats {
        show = show.with_overlays(overlays, Box::new(HostStats::default()));
    }
    let summary = show.run(mapped.as_mut_slice())?;
    info!(
        frames = summary.frames_rendered,
        cancelled = summary.cancelled,
        "slideshow finished"
    );
    Ok(summary)
}
