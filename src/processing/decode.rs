//! Image decoding boundary: picks a container format from the file extension
//! and hands back a decoded image.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::{Error, Result};

/// Map a path's extension to a supported container format.
#[must_use]
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

/// Decode a byte stream declared to be in `format`.
pub fn decode_reader<R: BufRead + Seek>(reader: R, format: ImageFormat) -> image::ImageResult<DynamicImage> {
    image::load(reader, format)
}

/// Open and decode the image at `path`.
///
/// # Errors
/// [`Error::UnsupportedImage`] for unknown extensions, [`Error::Decode`] when
/// the file cannot be read or decoded.
pub fn decode_path(path: &Path) -> Result<DynamicImage> {
    let format = format_for_path(path).ok_or_else(|| Error::UnsupportedImage(path.to_path_buf()))?;
    let file = File::open(path).map_err(|err| Error::Decode {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(err),
    })?;
    let img = decode_reader(BufReader::new(file), format).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{Rgba, RgbaImage};

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(format_for_path(Path::new("a.PNG")), Some(ImageFormat::Png));
        assert_eq!(format_for_path(Path::new("b.jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("c.JpG")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("d.gif")), None);
        assert_eq!(format_for_path(Path::new("noext")), None);
    }

    #[test]
    fn decodes_png_from_memory() {
        let src = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        let mut bytes = Vec::new();
        src.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

        let img = decode_reader(Cursor::new(bytes), ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.to_rgba8().get_pixel(2, 1), &Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = decode_path(Path::new("/nonexistent/photo.bmp")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImage(_)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = decode_path(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
