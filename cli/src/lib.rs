use footprint::{BorderPolicy, Footprint, FootprintError, Pipeline, io::decode::load_grid, to_geojson_string};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString, VariantNames};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FootprintError(#[from] FootprintError),
    #[error("Missing 'path' field")]
    MissingPath,
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// How results are written
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// One `name: x1,y1,x2,y2,...` line per image
    #[default]
    Flat,
    /// A single GeoJSON feature collection
    #[strum(serialize = "geojson")]
    #[serde(rename = "geojson")]
    GeoJson,
}

/// Batch run over a directory of sprites
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory holding the images
    pub path: PathBuf,
    /// Longest hull edge accepted before looking for a closer vertex
    pub max_segment_length: f64,
    /// Smallest neighbour count tried at each hull vertex
    pub min_neighbors: usize,
    pub border_policy: BorderPolicy,
    /// Drop the ring's leading closing point
    pub trim_closing_point: bool,
    pub format: OutputFormat,
    /// Images processed at the same time
    pub jobs: usize,
    /// Write results here instead of stdout
    pub output: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            max_segment_length: 1.0,
            min_neighbors: 3,
            border_policy: BorderPolicy::default(),
            trim_closing_point: true,
            format: OutputFormat::default(),
            jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            output: None,
        }
    }
}

impl BatchConfig {
    /// Load BatchConfig configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load BatchConfig configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load BatchConfig configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load BatchConfig configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Save BatchConfig configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Convert BatchConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Save BatchConfig configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Convert BatchConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(BatchConfig))?)
    }

    pub fn validate(&self) -> Result<(), CliError> {
        if self.path.as_os_str().is_empty() {
            return Err(CliError::MissingPath);
        }
        if !(self.max_segment_length.is_finite() && self.max_segment_length > 0.0) {
            return Err(FootprintError::InvalidParameter {
                name: "max_segment_length",
                value: self.max_segment_length,
            }
            .into());
        }
        Ok(())
    }

    /// Pipeline configured from this batch
    pub fn pipeline(&self) -> Pipeline {
        let builder = Pipeline::builder()
            .border_policy(self.border_policy)
            .max_segment_length(self.max_segment_length)
            .min_neighbors(self.min_neighbors);
        if self.trim_closing_point {
            builder.build()
        } else {
            builder.keep_closing_point().build()
        }
    }
}

/// Regular files of `dir`, sorted by file name. Hidden files are skipped.
pub fn collect_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, CliError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CliError::NotADirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        images.push(entry.path());
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Display name of an image: its file name
pub fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode one image and run it through the pipeline
pub fn process_image(pipeline: &Pipeline, path: &Path) -> Result<Footprint, CliError> {
    info!("Opening {}", path.display());
    let grid = load_grid(path)?;
    Ok(pipeline.process(&grid)?)
}

/// One `name: x1,y1,...` line for each footprint
pub fn render_flat(footprints: &[(String, Footprint)]) -> String {
    footprints
        .iter()
        .map(|(name, footprint)| format!("{}: {}\n", name, footprint.to_flat_string()))
        .collect()
}

/// Render every footprint in the requested format
pub fn render_report(footprints: &[(String, Footprint)], format: OutputFormat) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Flat => render_flat(footprints),
        OutputFormat::GeoJson => to_geojson_string(footprints)? + "\n",
    })
}

/// Write a rendered report to `output`, or to stdout when no file is given
pub fn write_report(report: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            fs::write(path, report)?;
            info!("Footprints saved to: {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}
