pub mod decode;
pub mod geojson;

pub use self::geojson::*;
