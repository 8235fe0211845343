use std::path::PathBuf;

use thiserror::Error;

/// Library error type for framebuffer slideshow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening, querying or mapping the display device failed.
    #[error("setup failed: {what}")]
    Setup {
        what: String,
        #[source]
        source: std::io::Error,
    },

    /// The device reports a pixel layout other than 32 bits per pixel.
    #[error("unsupported framebuffer format: {bits_per_pixel} bits per pixel")]
    UnsupportedPixelFormat { bits_per_pixel: u32 },

    /// The destination cannot hold one full frame.
    #[error("frame buffer too small: need {needed} bytes, have {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// An image could not be read or decoded.
    #[error("failed to decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image extension is not one of the supported containers.
    #[error("unsupported image type: {}", .0.display())]
    UnsupportedImage(PathBuf),

    /// Resampling was asked for an impossible target.
    #[error("resize error: {0}")]
    Resize(String),

    /// Malformed overlay format string or template.
    #[error("format error: {0}")]
    Format(String),

    /// The mask alpha channel can only tell 254 overlays apart.
    #[error("too many overlays: {0} (at most {max})", max = crate::overlay::MAX_OVERLAYS)]
    TooManyOverlays(usize),

    /// Host statistics could not be read or understood.
    #[error("stats error: {0}")]
    Stats(String),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn setup(what: impl Into<String>, source: impl Into<std::io::Error>) -> Self {
        Self::Setup {
            what: what.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
