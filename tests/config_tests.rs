use std::path::PathBuf;
use std::time::Duration;

use rust_fb_slideshow::config::{Configuration, from_yaml_file, from_yaml_str};
use rust_fb_slideshow::render::writer::ChannelOrder;
use rust_fb_slideshow::{Error, TransformOp};

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
images: [/photos/a.png, /photos/b.jpg]
device: /dev/fb1
transforms: [hfit, center]
clear: false
hide-cursor: true
redraw-interval: 5s
stats: true
overlays:
  - "X:10;Y:20;C:xor;CPU:{{.CpuUser}}"
channel-order: bgra
"#;
    let cfg = from_yaml_str(yaml).unwrap();
    assert_eq!(cfg.images, vec![PathBuf::from("/photos/a.png"), PathBuf::from("/photos/b.jpg")]);
    assert_eq!(cfg.device, PathBuf::from("/dev/fb1"));
    assert_eq!(cfg.transforms, vec![TransformOp::HorizontalFit, TransformOp::Center]);
    assert!(!cfg.clear);
    assert!(cfg.hide_cursor);
    assert_eq!(cfg.redraw_interval, Duration::from_secs(5));
    assert!(cfg.stats);
    assert_eq!(cfg.channel_order, ChannelOrder::Bgra);
    cfg.validate().unwrap();
}

#[test]
fn empty_document_uses_defaults() {
    let cfg = from_yaml_str("").unwrap();
    assert_eq!(cfg.device, PathBuf::from("/dev/fb0"));
    assert_eq!(cfg.console, PathBuf::from("/dev/console"));
    assert!(cfg.clear);
    assert!(!cfg.stats);
    assert!(cfg.redraw_interval.is_zero());
    assert_eq!(cfg.channel_order, ChannelOrder::Rgba);
}

#[test]
fn unknown_keys_and_ops_are_rejected() {
    assert!(matches!(from_yaml_str("colour: red\n"), Err(Error::Config(_))));
    assert!(matches!(from_yaml_str("transforms: [zoom]\n"), Err(Error::Config(_))));
    assert!(matches!(from_yaml_str("channel-order: argb\n"), Err(Error::Config(_))));
}

#[test]
fn validate_requires_images() {
    let err = Configuration::default().validate().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn validate_rejects_bad_overlays_before_any_frame() {
    let mut cfg = Configuration {
        images: vec![PathBuf::from("a.png")],
        ..Configuration::default()
    };
    cfg.overlays = vec!["X:ten;hello".into()];
    assert!(matches!(cfg.validate(), Err(Error::Format(_))));

    cfg.overlays = vec!["{{.NotAField}}".into()];
    assert!(matches!(cfg.validate(), Err(Error::Format(_))));

    cfg.overlays = vec!["x".into(); 255];
    assert!(matches!(cfg.validate(), Err(Error::TooManyOverlays(255))));
}

#[test]
fn reads_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "images: [x.png]\nredraw-interval: 1m\n").unwrap();
    let cfg = from_yaml_file(&path).unwrap();
    assert_eq!(cfg.redraw_interval, Duration::from_secs(60));

    let missing = from_yaml_file(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, Error::Io(_)));
}
