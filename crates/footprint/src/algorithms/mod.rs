pub mod extraction;
pub mod hull;
pub(crate) mod neighbors;
pub(crate) mod segments;

pub use extraction::*;
pub use hull::*;
