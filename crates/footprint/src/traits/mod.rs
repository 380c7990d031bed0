use crate::{
    error::Result,
    types::{Hull, Outline, Point},
};

/// Read-only access to the alpha channel of a decoded image
pub trait AlphaGrid {
    /// Width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Whether the pixel at `(x, y)` has zero alpha. Callers stay in bounds.
    fn is_transparent(&self, x: u32, y: u32) -> bool;
}

/// Trait for outline extraction algorithms
pub trait OutlineExtractor: Send + Sync {
    /// Collect the boundary pixels of the opaque region
    fn extract_outline(&self, grid: &dyn AlphaGrid) -> Result<Outline>;
}

/// Trait for hull construction algorithms
pub trait HullBuilder: Send + Sync {
    /// Build an ordered polygon around an unordered point cloud
    fn build_hull(&self, points: &[Point]) -> Result<Hull>;
}
