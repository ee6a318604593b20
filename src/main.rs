mod config;
mod predict;
mod web;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use crate::config::Config;
use crate::predict::{
    current_position, predict_all, satellite_path, ApiVersion, Observer, PredictError,
    PredictionOptions, SatelliteCatalog, TimeOfDay, DEFAULT_API_VERSION, DEFAULT_DAYS_COUNT,
    DEFAULT_PATH_MINUTES,
};
use crate::web::AppState;

#[derive(Parser)]
#[command(name = "sat-sighting")]
#[command(about = "Naked-eye satellite visibility predictions")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "sat-sighting.yaml")]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the visibility events for a location
    Predict {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Days to scan
        #[arg(long, default_value_t = DEFAULT_DAYS_COUNT)]
        days: u32,
        #[arg(long, value_enum, default_value_t = TimeOfDay::All)]
        time_of_day: TimeOfDay,
        /// Days from now the scan starts at
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        start_offset: i64,
        #[arg(long, default_value = DEFAULT_API_VERSION)]
        api_version: String,
        /// Restrict to these satellites (repeatable); all active ones otherwise
        #[arg(long = "satellite")]
        satellites: Vec<String>,
    },
    /// Print the ground track around now
    Path {
        name: String,
        #[arg(long, default_value_t = DEFAULT_PATH_MINUTES)]
        minutes: u32,
    },
    /// Print the current sub-satellite point and altitude
    Position { name: String },
    /// Run the HTTP API
    Serve,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading config {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Predict {
            lat,
            lon,
            days,
            time_of_day,
            start_offset,
            api_version,
            satellites,
        } => {
            let options = PredictionOptions {
                days_count: days,
                time_of_day,
                start_days_offset: start_offset,
                api_version: ApiVersion::new(api_version),
            };
            run_predict(&config, lat, lon, &satellites, &options)
        }
        Commands::Path { name, minutes } => {
            let mut catalog = config.catalog();
            print_result(
                catalog
                    .propagator(&name)
                    .and_then(|p| satellite_path(&p, Utc::now(), minutes)),
            )
        }
        Commands::Position { name } => {
            let mut catalog = config.catalog();
            print_result(
                catalog
                    .propagator(&name)
                    .and_then(|p| current_position(&p, Utc::now())),
            )
        }
        Commands::Serve => serve(config),
    }
}

fn run_predict(
    config: &Config,
    lat: f64,
    lon: f64,
    satellites: &[String],
    options: &PredictionOptions,
) -> ExitCode {
    let zones = match config.zone_resolver() {
        Ok(z) => z,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut catalog: SatelliteCatalog = config.catalog();
    let report = Observer::locate(lat, lon, Utc::now(), zones.as_ref())
        .and_then(|observer| predict_all(&mut catalog, satellites, &observer, options));
    print_result(report)
}

fn print_result<T: Serialize>(result: Result<T, PredictError>) -> ExitCode {
    let value = match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Prediction error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn serve(config: Config) -> ExitCode {
    let state = match AppState::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(state)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
