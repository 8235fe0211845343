//! YAML configuration. Every key is optional; command-line flags are applied
//! on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::overlay::{MAX_OVERLAYS, OverlaySet};
use crate::platform::console::DEFAULT_CONSOLE;
use crate::processing::layout::TransformOp;
use crate::render::writer::ChannelOrder;

pub const DEFAULT_DEVICE: &str = "/dev/fb0";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Images shown in order.
    pub images: Vec<PathBuf>,
    /// Framebuffer device.
    pub device: PathBuf,
    /// Console whose cursor is hidden when `hide-cursor` is set.
    pub console: PathBuf,
    /// Transform ops applied to every image, in order.
    pub transforms: Vec<TransformOp>,
    /// Zero the frame before drawing.
    pub clear: bool,
    pub hide_cursor: bool,
    /// Delay between frames; zero draws once and exits.
    #[serde(with = "humantime_serde")]
    pub redraw_interval: Duration,
    /// Draw the stats overlays.
    pub stats: bool,
    /// Overlay format strings, e.g. `X:10;Y:20;C:xor;CPU:{{.CpuUser}}`.
    pub overlays: Vec<String>,
    pub channel_order: ChannelOrder,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            device: PathBuf::from(DEFAULT_DEVICE),
            console: PathBuf::from(DEFAULT_CONSOLE),
            transforms: Vec::new(),
            clear: true,
            hide_cursor: false,
            redraw_interval: Duration::ZERO,
            stats: false,
            overlays: Vec::new(),
            channel_order: ChannelOrder::default(),
        }
    }
}

impl Configuration {
    /// Check everything that can be checked before touching the device.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] without images, [`Error::TooManyOverlays`]
    /// or [`Error::Format`] for unusable overlays.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::InvalidConfig("at least one image is required".into()));
        }
        if self.overlays.len() > MAX_OVERLAYS {
            return Err(Error::TooManyOverlays(self.overlays.len()));
        }
        self.overlay_set().map(|_| ())
    }

    /// Parse and compile the overlay format strings.
    ///
    /// # Errors
    /// See [`OverlaySet::compile`].
    pub fn overlay_set(&self) -> Result<OverlaySet> {
        OverlaySet::compile(self.overlays.as_slice())
    }
}

/// Parse configuration from YAML text.
///
/// # Errors
/// [`Error::Config`] for malformed YAML or unknown keys.
pub fn from_yaml_str(yaml: &str) -> Result<Configuration> {
    // An empty document deserializes to unit, not an empty map.
    if yaml.trim().is_empty() {
        return Ok(Configuration::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a YAML configuration file.
///
/// # Errors
/// [`Error::Io`] when the file cannot be read, [`Error::Config`] when it
/// does not parse.
pub fn from_yaml_file(path: &Path) -> Result<Configuration> {
    let raw = fs::read_to_string(path)?;
    from_yaml_str(&raw)
}
