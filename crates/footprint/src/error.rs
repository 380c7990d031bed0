use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Invalid pixel grid: {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },

    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Non-finite point ({x}, {y})")]
    InvalidPoint { x: f64, y: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, FootprintError>;
