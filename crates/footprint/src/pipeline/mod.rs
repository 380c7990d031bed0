pub mod builder;

use tracing::debug;

use crate::{
    error::Result,
    traits::{AlphaGrid, HullBuilder, OutlineExtractor},
    types::Footprint,
};

/// Outline extraction followed by hull construction, one image at a time
pub struct Pipeline {
    outline_extractor: Box<dyn OutlineExtractor>,
    hull_builder: Box<dyn HullBuilder>,
    trim_closing_point: bool,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        outline_extractor: Box<dyn OutlineExtractor>,
        hull_builder: Box<dyn HullBuilder>,
        trim_closing_point: bool,
    ) -> Self {
        Self {
            outline_extractor,
            hull_builder,
            trim_closing_point,
        }
    }

    /// Process an image through the entire pipeline
    pub fn process(&self, grid: &dyn AlphaGrid) -> Result<Footprint> {
        // Step 1: Collect the boundary pixels
        let outline = self.outline_extractor.extract_outline(grid)?;
        debug!("Found outline of {} pixels", outline.len());

        // Step 2: Wrap them in a hull
        let hull = self.hull_builder.build_hull(&outline.points)?;
        let degenerate = !hull.is_ring();

        // Step 3: Drop the ring's leading closing point
        let vertices = hull.into_polygon(self.trim_closing_point);
        debug!("{} pixels remaining after filtering", vertices.len());

        Ok(Footprint {
            vertices,
            degenerate,
            outline_points: outline.len(),
            image_width: outline.image_width,
            image_height: outline.image_height,
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: 1 outline extractor, 1 hull builder, closing point {}",
            if self.trim_closing_point { "trimmed" } else { "kept" }
        )
    }
}
