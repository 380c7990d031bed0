//! # Sprite Footprint Library
//!
//! Turns the opaque silhouette of a sprite into an ordered polygon.
//!
//! Processing happens in two steps:
//!
//! - **Outline extraction**: every opaque pixel with a transparent
//!   4-neighbour is collected, in row-major scan order
//! - **Concave hull**: a k-nearest-neighbour walk orders those pixels into a
//!   simple, closed, clockwise ring whose edges stay close to
//!   `max_segment_length`
//!
//! Both steps sit behind traits, so either one can be swapped out through
//! the pipeline builder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use footprint::{Pipeline, io::decode::load_grid};
//!
//! let pipeline = Pipeline::builder()
//!     .max_segment_length(1.0)
//!     .build();
//!
//! let image = load_grid("sprite.png")?;
//! let footprint = pipeline.process(&image)?;
//!
//! println!("{}", footprint.to_flat_string());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use footprint::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .border_policy(BorderPolicy::Legacy)
//!     .set_hull_builder(KnnConcaveHull { max_segment_length: 4.0, min_neighbors: 5 })
//!     .keep_closing_point()
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;
mod grid;

// Re-exports for convenience
pub use error::{FootprintError, Result};
pub use types::{Footprint, Hull, Outline, Point};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::geojson::{footprints_to_geojson, save_geojson, to_geojson_string};
