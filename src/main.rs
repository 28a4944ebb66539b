pub mod types;
pub mod config;
pub mod data;
pub mod render;
pub mod server;
pub mod page;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use types::NamedUpload;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the upload pipeline over CSV files on disk
    Ingest {
        /// CSV files with a WKT `geometry` column
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Write one GeoJSON file per dataset into this directory
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Serve the upload dashboard
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Ingest { files, out } => {
            let mut uploads = Vec::new();
            for path in files {
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("upload.csv")
                    .to_string();
                let bytes = fs::read(path)
                    .with_context(|| format!("Failed to read input file: {:?}", path))?;
                uploads.push(NamedUpload { file_name, bytes });
            }

            let outcome = data::ingest_uploads(&uploads);

            for issue in &outcome.issues {
                eprintln!("Error loading {}: {}", issue.file, issue.message);
            }
            if !uploads.is_empty() && outcome.datasets.is_empty() {
                println!("No valid data was loaded. Check the CSV files.");
            }
            for dataset in &outcome.datasets {
                println!(
                    "Loaded dataset '{}' ({}): {} records, {} rows dropped",
                    dataset.name,
                    dataset.crs,
                    dataset.records.len(),
                    dataset.skipped_rows
                );
            }

            if let Some(out_dir) = out {
                fs::create_dir_all(out_dir).context("Failed to create output directory")?;
                for dataset in &outcome.datasets {
                    let collection = render::to_feature_collection(dataset);
                    let path = out_dir.join(format!("{}.geojson", dataset.name));
                    fs::write(&path, serde_json::to_string_pretty(&collection)?)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Wrote {:?}", path);
                }
            }
        }
        Commands::Serve { config } => {
            println!("Serving dashboard with config: {:?}", config);
            let app_config = config::AppConfig::load_or_default(config)?;
            server::start_server(app_config).await?;
        }
    }

    Ok(())
}
