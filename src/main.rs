//! Binary entrypoint for the framebuffer slideshow.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rust_fb_slideshow::config::{self, Configuration};
use rust_fb_slideshow::render::writer::ChannelOrder;
use rust_fb_slideshow::TransformOp;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Display an image in your graphical console using the frame buffer.
/// You may apply multiple transformations.
#[derive(Debug, Parser)]
#[command(name = "fb-slideshow")]
struct Cli {
    /// Images to display (.png, .jpg, .jpeg)
    #[arg(value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Framebuffer device
    #[arg(long, value_name = "PATH")]
    device_path: Option<PathBuf>,

    /// Transform applied to every image; can be given multiple times
    #[arg(long = "transform", value_enum, value_name = "OP")]
    transforms: Vec<TransformOp>,

    /// Do not clear screen before rendering image
    #[arg(long)]
    dont_clear: bool,

    /// Hide console cursor
    #[arg(long)]
    no_cursor: bool,

    /// Keep re-rendering every n seconds (0 renders once)
    #[arg(long, value_name = "SECONDS")]
    redraw: Option<u64>,

    /// Display server statistics
    #[arg(long)]
    stats: bool,

    /// Display format for statistics; can be given multiple times
    #[arg(long = "format", value_name = "FORMAT")]
    formats: Vec<String>,

    /// Byte order of pixels in device memory
    #[arg(long, value_enum)]
    channel_order: Option<ChannelOrder>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layer command-line values over `cfg`.
    fn apply(self, mut cfg: Configuration) -> Configuration {
        if !self.images.is_empty() {
            cfg.images = self.images;
        }
        if let Some(device) = self.device_path {
            cfg.device = device;
        }
        if !self.transforms.is_empty() {
            cfg.transforms = self.transforms;
        }
        if self.dont_clear {
            cfg.clear = false;
        }
        if self.no_cursor {
            cfg.hide_cursor = true;
        }
        if let Some(secs) = self.redraw {
            cfg.redraw_interval = Duration::from_secs(secs);
        }
        if self.stats {
            cfg.stats = true;
        }
        if !self.formats.is_empty() {
            cfg.overlays = self.formats;
        }
        if let Some(order) = self.channel_order {
            cfg.channel_order = order;
        }
        cfg
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("rust_fb_slideshow={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let base = match &cli.config {
        Some(path) => config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    let cfg = cli.apply(base);
    cfg.validate().context("validating configuration")?;

    rust_fb_slideshow::run(&cfg).context("running slideshow")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let base = config::from_yaml_str("device: /dev/fb1\nredraw-interval: 5s\nclear: true\n").unwrap();
        let cli = Cli::parse_from([
            "fb-slideshow",
            "a.png",
            "--transform",
            "hfit",
            "--transform",
            "center",
            "--dont-clear",
            "--redraw",
            "2",
            "--channel-order",
            "bgra",
        ]);
        let cfg = cli.apply(base);
        assert_eq!(cfg.images, vec![PathBuf::from("a.png")]);
        assert_eq!(cfg.device, PathBuf::from("/dev/fb1"));
        assert_eq!(cfg.transforms, vec![TransformOp::HorizontalFit, TransformOp::Center]);
        assert!(!cfg.clear);
        assert_eq!(cfg.redraw_interval, Duration::from_secs(2));
        assert_eq!(cfg.channel_order, ChannelOrder::Bgra);
    }

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::parse_from(["fb-slideshow", "x.jpg", "--stats", "--format", "X:1;hi", "-vv"]);
        assert_eq!(cli.verbose, 2);
        let cfg = cli.apply(Configuration::default());
        assert_eq!(cfg.device, PathBuf::from("/dev/fb0"));
        assert!(cfg.clear);
        assert!(cfg.stats);
        assert_eq!(cfg.overlays, vec!["X:1;hi".to_string()]);
        assert!(cfg.redraw_interval.is_zero());
    }
}
