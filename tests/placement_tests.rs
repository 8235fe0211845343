use image::{DynamicImage, Rgba, RgbaImage};
use rust_fb_slideshow::processing::layout::place;
use rust_fb_slideshow::{ImagePlacement, ScreenGeometry, TransformOp};

fn screen(width: u32, height: u32) -> ScreenGeometry {
    ScreenGeometry {
        width,
        height,
        bytes_per_pixel: 4,
    }
}

fn image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([90, 60, 30, 255])))
}

fn assert_within_bounds(p: &ImagePlacement, s: ScreenGeometry) {
    let (ix, iy) = p.image_offset();
    let (sx, sy) = p.screen_offset();
    let (vw, vh) = p.visible_size();
    assert!(vw <= s.width && vh <= s.height, "visible {vw}x{vh} exceeds screen");
    assert!(ix + vw <= p.pixels().width(), "x range leaves the image");
    assert!(iy + vh <= p.pixels().height(), "y range leaves the image");
    assert!(sx + vw <= s.width, "x range leaves the screen");
    assert!(sy + vh <= s.height, "y range leaves the screen");
}

#[test]
fn center_crops_wide_image_and_pads_short_one() {
    let s = screen(100, 50);
    let p = place(image(301, 40), s, &[TransformOp::Center]).unwrap();
    // (301 - 100) / 2 = 100, (50 - 40) / 2 = 5
    assert_eq!(p.image_offset(), (100, 0));
    assert_eq!(p.screen_offset(), (0, 5));
    assert_eq!(p.visible_size(), (100, 40));
    assert_within_bounds(&p, s);
}

#[test]
fn center_crops_tall_image() {
    let s = screen(100, 50);
    let p = place(image(20, 81), s, &[TransformOp::Center]).unwrap();
    assert_eq!(p.image_offset(), (0, 15));
    assert_eq!(p.screen_offset(), (40, 0));
    assert_eq!(p.visible_size(), (20, 50));
}

#[test]
fn earlier_center_is_nullified_by_fit() {
    let s = screen(64, 48);
    let centered_then_fit = place(image(200, 20), s, &[TransformOp::Center, TransformOp::Fit]).unwrap();
    let fit_only = place(image(200, 20), s, &[TransformOp::Fit]).unwrap();
    assert_eq!(centered_then_fit.image_offset(), fit_only.image_offset());
    assert_eq!(centered_then_fit.screen_offset(), fit_only.screen_offset());
    assert_eq!(centered_then_fit.visible_size(), fit_only.visible_size());
    assert_eq!(fit_only.screen_offset(), (0, 0));
    assert_eq!(fit_only.visible_size(), (64, 48));
}

#[test]
fn trailing_center_survives() {
    let s = screen(100, 50);
    let p = place(image(60, 20), s, &[TransformOp::HorizontalFit, TransformOp::Center]).unwrap();
    assert_eq!(p.pixels().dimensions(), (100, 20));
    assert_eq!(p.screen_offset(), (0, 15));
    assert_eq!(p.image_offset(), (0, 0));
}

#[test]
fn center_before_vfit_is_reset() {
    let s = screen(100, 50);
    let p = place(image(10, 10), s, &[TransformOp::Center, TransformOp::VerticalFit]).unwrap();
    assert_eq!(p.pixels().dimensions(), (10, 50));
    assert_eq!(p.screen_offset(), (0, 0));
}

#[test]
fn hfit_then_center_on_matching_height() {
    let s = screen(100, 50);
    let p = place(image(200, 50), s, &[TransformOp::HorizontalFit, TransformOp::Center]).unwrap();
    assert_eq!(p.pixels().dimensions(), (100, 50));
    assert_eq!(p.image_offset(), (0, 0));
    assert_eq!(p.screen_offset(), (0, 0));
    assert_eq!(p.visible_size(), (100, 50));
}

#[test]
fn visible_size_never_exceeds_screen() {
    let s = screen(32, 24);
    let op_lists: [&[TransformOp]; 5] = [
        &[],
        &[TransformOp::Center],
        &[TransformOp::HorizontalFit],
        &[TransformOp::VerticalFit, TransformOp::Center],
        &[TransformOp::Fit, TransformOp::Center],
    ];
    for (w, h) in [(1, 1), (5, 60), (60, 5), (32, 24), (33, 25), (100, 100)] {
        for ops in op_lists {
            let p = place(image(w, h), s, ops).unwrap();
            assert_within_bounds(&p, s);
        }
    }
}

#[test]
fn resampling_preserves_uniform_color() {
    let p = place(image(40, 40), screen(20, 10), &[TransformOp::Fit]).unwrap();
    let px = p.pixels().get_pixel(10, 5);
    assert!((i16::from(px[0]) - 90).abs() <= 1);
    assert!((i16::from(px[1]) - 60).abs() <= 1);
    assert!((i16::from(px[2]) - 30).abs() <= 1);
    assert_eq!(px[3], 255);
}
