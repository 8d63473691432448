//! schoolsite CLI - school-site suitability analysis

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use schoolsite_algorithms::suitability::{
    compute_suitable_areas, BoundarySelector, SuitabilityParams,
};
use schoolsite_algorithms::vector::total_area;
use schoolsite_core::io::{read_geojson, write_geojson};
use schoolsite_core::{Crs, Layer};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "schoolsite")]
#[command(author, version, about = "School-site suitability analysis", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a GeoJSON layer file
    Info {
        /// Input layer file
        input: PathBuf,
        /// EPSG code of the layer's CRS
        #[arg(long, default_value = "4326")]
        epsg: u32,
    },
    /// Identify areas suitable for new school construction
    Suitability {
        /// Boundary / districts layer (GeoJSON)
        #[arg(long)]
        boundary: PathBuf,
        /// Population layer (GeoJSON)
        #[arg(long)]
        population: PathBuf,
        /// Existing schools layer (GeoJSON)
        #[arg(long)]
        schools: PathBuf,
        /// Restricted-use layer, e.g. rivers (GeoJSON)
        #[arg(long)]
        restricted: PathBuf,
        /// Output file for the suitable areas (GeoJSON)
        #[arg(short, long)]
        output: PathBuf,
        /// District name to analyse; omit to use the whole boundary layer
        #[arg(long)]
        district: Option<String>,
        /// Attribute holding the district name
        #[arg(long, default_value = "name")]
        name_field: String,
        /// Attribute holding population counts
        #[arg(long, default_value = "population")]
        population_field: String,
        /// Minimum population for a candidate area (inclusive)
        #[arg(long)]
        population_threshold: f64,
        /// Exclusion distance around existing schools, in CRS units
        #[arg(long)]
        school_distance: f64,
        /// Exclusion distance around restricted geometry, in CRS units
        #[arg(long)]
        restricted_distance: f64,
        /// EPSG code shared by all input layers
        #[arg(long, default_value = "4326")]
        epsg: u32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_layer(path: &PathBuf, crs: &Crs) -> Result<Layer> {
    let layer = read_geojson(path, crs.clone())
        .with_context(|| format!("Failed to read layer {}", path.display()))?;
    info!("{}: {} features", layer.name, layer.len());
    Ok(layer)
}

fn geometry_summary(layer: &Layer) -> String {
    use geo_types::Geometry;
    let mut points = 0usize;
    let mut lines = 0usize;
    let mut polygons = 0usize;
    let mut other = 0usize;
    for feature in layer.iter() {
        match feature.geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => points += 1,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => lines += 1,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) => polygons += 1,
            _ => other += 1,
        }
    }
    format!(
        "{} point, {} line, {} polygon, {} other",
        points, lines, polygons, other
    )
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, epsg } => {
            let layer = read_layer(&input, &Crs::from_epsg(epsg))?;
            println!("File: {}", input.display());
            println!("Layer: {}", layer.name);
            println!("CRS: {}", layer.crs);
            println!("Features: {} ({})", layer.len(), geometry_summary(&layer));
            println!("Total area: {:.2}", total_area(&layer));
        }

        Commands::Suitability {
            boundary,
            population,
            schools,
            restricted,
            output,
            district,
            name_field,
            population_field,
            population_threshold,
            school_distance,
            restricted_distance,
            epsg,
        } => {
            let crs = Crs::from_epsg(epsg);
            let pb = spinner("Reading layers...");
            let boundary_layer = read_layer(&boundary, &crs)?;
            let population_layer = read_layer(&population, &crs)?;
            let school_layer = read_layer(&schools, &crs)?;
            let restricted_layer = read_layer(&restricted, &crs)?;
            pb.finish_and_clear();

            let selector = match &district {
                Some(value) => BoundarySelector::Named {
                    layer: &boundary_layer,
                    field: name_field.as_str(),
                    value: value.as_str(),
                },
                None => BoundarySelector::WholeLayer(&boundary_layer),
            };
            let params = SuitabilityParams {
                population_threshold,
                school_exclusion_distance: school_distance,
                restricted_exclusion_distance: restricted_distance,
                population_field,
            };

            let pb = spinner("Computing suitable areas...");
            let start = Instant::now();
            let result = compute_suitable_areas(
                selector,
                &population_layer,
                &school_layer,
                &restricted_layer,
                &params,
                None,
            )
            .context("Suitability analysis failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            let pb = spinner("Writing output...");
            write_geojson(&result, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            pb.finish_and_clear();

            println!("Suitable areas saved to: {}", output.display());
            println!("  Candidate features: {}", result.len());
            println!("  Total area: {:.2}", total_area(&result));
            println!("  Processing time: {:.2?}", elapsed);
        }
    }

    Ok(())
}
