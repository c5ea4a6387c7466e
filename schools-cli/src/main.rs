use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::StoreOptions;

/// School registry CLI tool
#[derive(Parser)]
#[command(name = "schools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (e.g. sqlite://schools.db), or "memory"
    #[arg(
        short,
        long,
        env = "SCHOOLS_DATABASE_URL",
        default_value = "sqlite://schools.db",
        global = true
    )]
    database_url: String,

    /// Maximum pooled database connections
    #[arg(
        short,
        long,
        env = "SCHOOLS_MAX_CONNECTIONS",
        default_value = "5",
        global = true
    )]
    max_connections: u32,

    /// Reject out-of-range coordinates when adding schools
    #[arg(
        long,
        env = "SCHOOLS_STRICT_COORDINATES",
        value_parser = clap::builder::BoolishValueParser::new(),
        global = true
    )]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a single school
    Add {
        /// School name
        #[arg(long)]
        name: String,

        /// Street address
        #[arg(long)]
        address: String,

        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List schools, by name or by distance from a point
    List {
        /// Rank by distance from this latitude
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Rank by distance from this longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Output as a GeoJSON FeatureCollection
        #[arg(short, long, conflicts_with = "json")]
        geojson: bool,
    },

    /// Register schools from a CSV file
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Column name for the school name
        #[arg(long, default_value = "name")]
        name_col: String,

        /// Column name for the address
        #[arg(long, default_value = "address")]
        address_col: String,

        /// Column name for latitude
        #[arg(long, default_value = "latitude")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "longitude")]
        lon_col: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = StoreOptions {
        database_url: cli.database_url,
        max_connections: cli.max_connections,
        strict: cli.strict,
    };

    match cli.command {
        Commands::Add {
            name,
            address,
            lat,
            lon,
            json,
        } => commands::add::run(&store, name, address, lat, lon, json).await,
        Commands::List {
            lat,
            lon,
            json,
            geojson,
        } => commands::list::run(&store, lat.zip(lon), json, geojson).await,
        Commands::Import {
            input,
            name_col,
            address_col,
            lat_col,
            lon_col,
        } => {
            let columns = commands::import::Columns {
                name: name_col,
                address: address_col,
                lat: lat_col,
                lon: lon_col,
            };
            commands::import::run(&store, &input, &columns).await
        }
    }
}
