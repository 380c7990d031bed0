use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::Result;

/// Decode an image file, keeping its native pixel format and bit depth.
///
/// The format is guessed from the file contents, not the extension.
pub fn load_grid(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Decode an in-memory encoded image.
pub fn load_grid_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FootprintError, traits::AlphaGrid};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encoded_png() -> Vec<u8> {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("Should encode png");
        bytes
    }

    #[test]
    fn test_load_grid_from_bytes_keeps_alpha() {
        let grid = load_grid_from_bytes(&encoded_png()).expect("Should decode png");
        assert_eq!(AlphaGrid::dimensions(&grid), (3, 2));
        assert!(grid.is_transparent(0, 0));
        assert!(!grid.is_transparent(1, 1));
    }

    #[test]
    fn test_load_grid_from_file() {
        let path = std::env::temp_dir().join(format!("footprint-decode-{}.png", std::process::id()));
        std::fs::write(&path, encoded_png()).expect("Should write temp file");

        let grid = load_grid(&path);
        std::fs::remove_file(&path).ok();

        let grid = grid.expect("Should decode file");
        assert!(!grid.is_transparent(1, 1));
    }

    #[test]
    fn test_garbage_bytes_are_an_image_error() {
        let err = load_grid_from_bytes(b"definitely not an image").expect_err("Should fail");
        assert!(matches!(err, FootprintError::ImageLoad(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_grid("/nonexistent/footprint/sprite.png").expect_err("Should fail");
        assert!(matches!(err, FootprintError::Io(_)));
    }
}
