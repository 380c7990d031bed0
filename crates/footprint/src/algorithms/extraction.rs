use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::{FootprintError, Result},
    traits::{AlphaGrid, OutlineExtractor},
    types::Outline,
};

/// How neighbours that fall outside the image are classified
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BorderPolicy {
    /// Everything outside the image is transparent, so opaque pixels on any
    /// edge are outline pixels
    #[default]
    Strict,
    /// Left and top neighbours outside the image count as opaque, right and
    /// bottom ones as transparent. Only opaque pixels on the right column and
    /// bottom row are forced into the outline.
    Legacy,
}

impl BorderPolicy {
    fn left_or_top_outside_is_transparent(self) -> bool {
        match self {
            BorderPolicy::Strict => true,
            BorderPolicy::Legacy => false,
        }
    }
}

/// Marks opaque pixels with at least one transparent 4-neighbour
#[derive(Debug, Clone, Default)]
pub struct AlphaOutlineExtractor {
    pub border_policy: BorderPolicy,
}

impl AlphaOutlineExtractor {
    pub fn new(border_policy: BorderPolicy) -> Self {
        Self { border_policy }
    }

    fn is_outline(&self, grid: &dyn AlphaGrid, x: u32, y: u32, width: u32, height: u32) -> bool {
        let left_top_outside = self.border_policy.left_or_top_outside_is_transparent();

        let left = if x > 0 { grid.is_transparent(x - 1, y) } else { left_top_outside };
        let up = if y > 0 { grid.is_transparent(x, y - 1) } else { left_top_outside };
        // Both policies treat the far edges as transparent
        let right = x + 1 >= width || grid.is_transparent(x + 1, y);
        let down = y + 1 >= height || grid.is_transparent(x, y + 1);

        left || up || right || down
    }
}

impl OutlineExtractor for AlphaOutlineExtractor {
    fn extract_outline(&self, grid: &dyn AlphaGrid) -> Result<Outline> {
        let (width, height) = grid.dimensions();
        if width == 0 || height == 0 {
            return Err(FootprintError::InvalidGrid { width, height });
        }

        let mut points = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if grid.is_transparent(x, y) {
                    continue;
                }
                if self.is_outline(grid, x, y, width, height) {
                    points.push(Coord { x: x as f64, y: y as f64 });
                }
            }
        }

        Ok(Outline {
            points,
            image_width: width,
            image_height: height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::str::FromStr;

    const OPAQUE: Rgba<u8> = Rgba([200, 40, 40, 255]);

    fn coords(outline: &Outline) -> Vec<(u32, u32)> {
        outline.points.iter().map(|p| (p.x as u32, p.y as u32)).collect()
    }

    #[test]
    fn test_opaque_square_on_transparent_background() {
        let mut img = RgbaImage::new(4, 4);
        for y in 1..=2 {
            for x in 1..=2 {
                img.put_pixel(x, y, OPAQUE);
            }
        }

        let outline = AlphaOutlineExtractor::default()
            .extract_outline(&img)
            .expect("Should extract outline");
        assert_eq!(coords(&outline), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert_eq!((outline.image_width, outline.image_height), (4, 4));
    }

    #[test]
    fn test_interior_pixels_are_not_outline() {
        let mut img = RgbaImage::new(5, 5);
        for y in 1..=3 {
            for x in 1..=3 {
                img.put_pixel(x, y, OPAQUE);
            }
        }

        let outline = AlphaOutlineExtractor::default()
            .extract_outline(&img)
            .expect("Should extract outline");
        assert_eq!(outline.len(), 8);
        assert!(!coords(&outline).contains(&(2, 2)));
    }

    #[test]
    fn test_strict_policy_outlines_every_edge() {
        let img = RgbaImage::from_pixel(3, 3, OPAQUE);
        let outline = AlphaOutlineExtractor::new(BorderPolicy::Strict)
            .extract_outline(&img)
            .expect("Should extract outline");
        assert_eq!(
            coords(&outline),
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)]
        );
    }

    #[test]
    fn test_legacy_policy_outlines_right_and_bottom_edges_only() {
        let img = RgbaImage::from_pixel(3, 3, OPAQUE);
        let outline = AlphaOutlineExtractor::new(BorderPolicy::Legacy)
            .extract_outline(&img)
            .expect("Should extract outline");
        assert_eq!(coords(&outline), vec![(2, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_policies_agree_away_from_the_border() {
        let mut img = RgbaImage::new(6, 6);
        img.put_pixel(2, 3, OPAQUE);
        img.put_pixel(3, 3, OPAQUE);

        let strict = AlphaOutlineExtractor::new(BorderPolicy::Strict)
            .extract_outline(&img)
            .expect("Should extract outline");
        let legacy = AlphaOutlineExtractor::new(BorderPolicy::Legacy)
            .extract_outline(&img)
            .expect("Should extract outline");
        assert_eq!(strict, legacy);
    }

    #[test]
    fn test_single_pixel_image() {
        let img = RgbaImage::from_pixel(1, 1, OPAQUE);
        for policy in [BorderPolicy::Strict, BorderPolicy::Legacy] {
            let outline = AlphaOutlineExtractor::new(policy)
                .extract_outline(&img)
                .expect("Should extract outline");
            assert_eq!(coords(&outline), vec![(0, 0)]);
        }
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let img = RgbaImage::new(0, 5);
        let err = AlphaOutlineExtractor::default()
            .extract_outline(&img)
            .expect_err("Zero width should be rejected");
        assert!(matches!(err, FootprintError::InvalidGrid { width: 0, height: 5 }));
    }

    #[test]
    fn test_border_policy_names() {
        assert_eq!(BorderPolicy::Strict.to_string(), "strict");
        assert_eq!(BorderPolicy::from_str("legacy").ok(), Some(BorderPolicy::Legacy));
        assert_eq!(BorderPolicy::default(), BorderPolicy::Strict);
        let json = serde_json::to_string(&BorderPolicy::Legacy).expect("Should serialize");
        assert_eq!(json, "\"legacy\"");
    }
}
