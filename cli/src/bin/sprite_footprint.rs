use clap::{Parser, Subcommand};
use cli::{
    BatchConfig, OutputFormat, collect_images, image_name, process_image, render_report, write_report,
};
use color_eyre::eyre::{Result, eyre};
use footprint::{BorderPolicy, Footprint};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the footprint of every image in a directory
    Process {
        /// Directory of images to build footprints for
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Path to a TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Longest hull edge accepted before looking for a closer vertex
        #[arg(long)]
        max_segment_length: Option<f64>,
        /// Smallest neighbour count tried at each hull vertex
        #[arg(long)]
        min_neighbors: Option<usize>,
        /// How pixels outside the image are classified (strict, legacy)
        #[arg(long)]
        border_policy: Option<BorderPolicy>,
        /// Keep the ring's closing point at the start of each footprint
        #[arg(long)]
        keep_closing_point: bool,
        /// Output format (flat, geojson)
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Number of images processed at the same time
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so stdout only carries footprints
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            path,
            config,
            max_segment_length,
            min_neighbors,
            border_policy,
            keep_closing_point,
            format,
            jobs,
            output,
        } => {
            let mut batch = match config {
                Some(config_path) => BatchConfig::from_file(config_path)?,
                None => BatchConfig::default(),
            };
            if let Some(path) = path {
                batch.path = path;
            }
            if let Some(max_segment_length) = max_segment_length {
                batch.max_segment_length = max_segment_length;
            }
            if let Some(min_neighbors) = min_neighbors {
                batch.min_neighbors = min_neighbors;
            }
            if let Some(border_policy) = border_policy {
                batch.border_policy = border_policy;
            }
            if keep_closing_point {
                batch.trim_closing_point = false;
            }
            if let Some(format) = format {
                batch.format = format;
            }
            if let Some(jobs) = jobs {
                batch.jobs = jobs;
            }
            if output.is_some() {
                batch.output = output;
            }

            process_directory(batch).await?;
        }
        Commands::Schema => {
            println!("{}", BatchConfig::json_schema()?);
        }
    }

    Ok(())
}

async fn process_directory(batch: BatchConfig) -> Result<()> {
    batch.validate()?;
    let images = collect_images(&batch.path)?;
    info!(
        "Processing {} images from {} with segment length {}",
        images.len(),
        batch.path.display(),
        batch.max_segment_length
    );

    let pipeline = Arc::new(batch.pipeline());
    let semaphore = Arc::new(Semaphore::new(batch.jobs.max(1)));

    let mut handles = Vec::with_capacity(images.len());
    for path in images {
        let permit = semaphore.clone().acquire_owned().await?;
        let pipeline = pipeline.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let result = process_image(&pipeline, &path);
            (image_name(&path), result)
        }));
    }

    // Reported in directory order, whatever order they finished in
    let total = handles.len();
    let mut footprints: Vec<(String, Footprint)> = Vec::with_capacity(total);
    let mut failed = 0;
    for handle in handles {
        let (name, result) = handle.await?;
        match result {
            Ok(footprint) => {
                info!(
                    "{}: {} outline pixels, {} vertices",
                    name,
                    footprint.outline_points,
                    footprint.vertex_count()
                );
                footprints.push((name, footprint));
            }
            Err(err) => {
                error!("Failed to process {}: {}", name, err);
                failed += 1;
            }
        }
    }

    let report = render_report(&footprints, batch.format)?;
    write_report(&report, batch.output.as_deref())?;

    if failed > 0 {
        return Err(eyre!("{} of {} images failed", failed, total));
    }
    info!("Processed {} images", total);
    Ok(())
}
