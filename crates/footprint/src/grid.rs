use std::ops::Deref;

use image::{DynamicImage, ImageBuffer, Pixel, Primitive};

use crate::traits::AlphaGrid;

impl<P, C> AlphaGrid for ImageBuffer<P, C>
where
    P: Pixel,
    C: Deref<Target = [P::Subpixel]>,
{
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn is_transparent(&self, x: u32, y: u32) -> bool {
        // Pixel formats without alpha are fully opaque
        P::HAS_ALPHA
            && self.get_pixel(x, y).to_rgba()[3] == <P::Subpixel as Primitive>::DEFAULT_MIN_VALUE
    }
}

/// Alpha is read at the decoded bit depth. Converting to 8 bits first would
/// round very faint 16-bit alpha down to zero.
impl AlphaGrid for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn is_transparent(&self, x: u32, y: u32) -> bool {
        match self {
            DynamicImage::ImageLumaA8(buffer) => buffer.is_transparent(x, y),
            DynamicImage::ImageRgba8(buffer) => buffer.is_transparent(x, y),
            DynamicImage::ImageLumaA16(buffer) => buffer.is_transparent(x, y),
            DynamicImage::ImageRgba16(buffer) => buffer.is_transparent(x, y),
            DynamicImage::ImageRgba32F(buffer) => buffer.is_transparent(x, y),
            _ => false,
        }
    }
}
