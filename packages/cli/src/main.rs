#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Developer CLI for the survey dashboard.
//!
//! ```text
//! survey_map_cli stats surveys.json [--wards] [--recent]
//! survey_map_cli markers surveys.json [--ward 12] [--zoom 12] [--geojson]
//! survey_map_cli resolve-ward --number 12
//! survey_map_cli resolve-ward --name sirpur
//! survey_map_cli export buildings.csv [--search term] [--out-dir exports/]
//! survey_map_cli wards
//! ```
//!
//! Every command prints JSON on stdout. Logs go to stderr and honor
//! `RUST_LOG`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use survey_map_dashboard::{Dashboard, DashboardConfig};
use survey_map_spatial::GeoJsonRenderer;

#[derive(Parser)]
#[command(name = "survey_map_cli", about = "Survey statistics, map layers and sheet export")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print aggregate statistics for a survey file
    Stats {
        /// JSON file with a survey array or a `{ "surveys": [...] }` envelope
        records: PathBuf,
        /// Include per-ward rollups, worst compliance first
        #[arg(long)]
        wards: bool,
        /// Include activity over the last seven days
        #[arg(long)]
        recent: bool,
    },
    /// Print map markers, cluster policy and bounds for a survey file
    Markers {
        /// JSON file with a survey array or a `{ "surveys": [...] }` envelope
        records: PathBuf,
        /// Only map surveys in this ward
        #[arg(long)]
        ward: Option<u32>,
        /// Zoom level for the cluster policy
        #[arg(long, default_value = "12")]
        zoom: u8,
        /// Emit a `GeoJSON` `FeatureCollection` instead
        #[arg(long)]
        geojson: bool,
    },
    /// Resolve a ward by number or name
    ResolveWard {
        /// Ward number (takes precedence over the name)
        #[arg(long)]
        number: Option<u32>,
        /// Ward name, case-insensitive
        #[arg(long)]
        name: Option<String>,
    },
    /// Export the rows of a CSV sheet matching a search term
    Export {
        /// CSV file with a header row
        sheet_file: PathBuf,
        /// Case-insensitive search term; empty exports every row
        #[arg(long, default_value = "")]
        search: String,
        /// Dataset name used in the export filename
        #[arg(long)]
        dataset: Option<String>,
        /// Sheet name used in the export filename (defaults to the file stem)
        #[arg(long)]
        sheet: Option<String>,
        /// Write the export into this directory instead of stdout
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List the wards of the configured catalog
    Wards,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => DashboardConfig::default(),
    };
    let mut dashboard = Dashboard::new(config)?;

    match cli.command {
        Commands::Stats {
            records,
            wards,
            recent,
        } => {
            load_records(&mut dashboard, &records)?;

            let mut output = serde_json::json!({
                "stats": dashboard.get_aggregate_stats(),
                "malformed": dashboard.malformed().len(),
            });
            if wards {
                output["wardSummaries"] = serde_json::to_value(dashboard.ward_summaries())?;
            }
            if recent {
                let now = chrono::Local::now().naive_local();
                output["recentActivity"] = serde_json::to_value(dashboard.recent_activity(now))?;
            }
            print_json(&output)?;
        }
        Commands::Markers {
            records,
            ward,
            zoom,
            geojson,
        } => {
            load_records(&mut dashboard, &records)?;

            if geojson {
                let mut renderer = GeoJsonRenderer::new();
                dashboard.render_map(&mut renderer, ward)?;
                println!("{}", renderer.to_geojson_string());
            } else {
                let output = serde_json::json!({
                    "markers": dashboard.get_marker_set(ward)?,
                    "cluster": dashboard.cluster_hint(ward, zoom)?,
                    "clusters": dashboard.clusters(ward, zoom)?,
                    "bounds": dashboard.fit_bounds(ward)?,
                });
                print_json(&output)?;
            }
        }
        Commands::ResolveWard { number, name } => {
            let ward = dashboard.resolve_ward(number, name.as_deref())?;
            print_json(&ward)?;
        }
        Commands::Export {
            sheet_file,
            search,
            dataset,
            sheet,
            out_dir,
        } => {
            let dataset_name = dataset.unwrap_or_else(|| dashboard.config().dataset_name.clone());
            let sheet_name = sheet.unwrap_or_else(|| file_stem(&sheet_file));
            let file = std::fs::File::open(&sheet_file)?;
            let loaded = survey_map_tabular::load_csv(&dataset_name, &sheet_name, file)?;
            dashboard.load_dataset(loaded);

            let export = dashboard.export_filtered(&search)?;
            match out_dir {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    let path = dir.join(&export.filename);
                    std::fs::write(&path, &export.content)?;
                    log::info!("Wrote {} rows to {}", export.row_count, path.display());
                    print_json(&serde_json::json!({
                        "filename": export.filename,
                        "path": path.display().to_string(),
                        "rows": export.row_count,
                    }))?;
                }
                None => print_json(&export)?,
            }
        }
        Commands::Wards => {
            let wards: Vec<_> = dashboard.registry().iter().collect();
            print_json(&wards)?;
        }
    }

    Ok(())
}

fn load_records(dashboard: &mut Dashboard, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let count = dashboard.ingest_json(&json)?;
    if !dashboard.malformed().is_empty() {
        log::warn!(
            "Skipped {} malformed records in {}",
            dashboard.malformed().len(),
            path.display()
        );
    }
    log::info!("Loaded {count} surveys from {}", path.display());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "Sheet1".to_string(), |stem| stem.to_string_lossy().into_owned())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
