use crate::{
    algorithms::{AlphaOutlineExtractor, BorderPolicy, KnnConcaveHull},
    pipeline::Pipeline,
    traits::{HullBuilder, OutlineExtractor},
};

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    outline_extractor: Option<Box<dyn OutlineExtractor>>,
    hull_builder: Option<Box<dyn HullBuilder>>,
    border_policy: BorderPolicy,
    hull: KnnConcaveHull,
    trim_closing_point: bool,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            outline_extractor: None,
            hull_builder: None,
            border_policy: BorderPolicy::default(),
            hull: KnnConcaveHull::default(),
            trim_closing_point: true,
        }
    }

    /// Border policy of the default outline extractor
    pub fn border_policy(mut self, border_policy: BorderPolicy) -> Self {
        self.border_policy = border_policy;
        self
    }

    /// Segment length of the default concave hull
    pub fn max_segment_length(mut self, max_segment_length: f64) -> Self {
        self.hull.max_segment_length = max_segment_length;
        self
    }

    /// Smallest neighbour count of the default concave hull
    pub fn min_neighbors(mut self, min_neighbors: usize) -> Self {
        self.hull.min_neighbors = min_neighbors;
        self
    }

    /// Set the outline extractor (replaces the default one)
    pub fn set_outline_extractor<E>(mut self, extractor: E) -> Self
    where
        E: OutlineExtractor + 'static,
    {
        self.outline_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the hull builder (replaces the default one)
    pub fn set_hull_builder<H>(mut self, builder: H) -> Self
    where
        H: HullBuilder + 'static,
    {
        self.hull_builder = Some(Box::new(builder));
        self
    }

    /// Keep the ring's leading closing point, for hull builders that do not emit one
    pub fn keep_closing_point(mut self) -> Self {
        self.trim_closing_point = false;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let outline_extractor = self
            .outline_extractor
            .unwrap_or_else(|| Box::new(AlphaOutlineExtractor::new(self.border_policy)));

        let hull = self.hull;
        let hull_builder = self.hull_builder.unwrap_or_else(|| Box::new(hull));

        Pipeline::new(outline_extractor, hull_builder, self.trim_closing_point)
    }

    /// Build a pipeline with the given segment length and default everything else
    pub fn build_simple(max_segment_length: f64) -> Pipeline {
        Self::new().max_segment_length(max_segment_length).build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
