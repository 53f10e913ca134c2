//! `parklot` - CLI and HTTP server for parking lot vehicle tracking
//!
//! This binary wires configuration, logging and the storage backends together
//! and dispatches to the requested command.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use parklot::cli::{CarCommand, Cli, Command, ConfigCommand, ListArgs, LotCommand, OutputFormat};
use parklot::model::CarRecord;
use parklot::{http, init_logging, Config, ParkingService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Lot(cmd) => {
            let config = load_config(cli.config)?;
            handle_lot(&open_service(&config)?, cmd).await
        }
        Command::Car(cmd) => {
            let config = load_config(cli.config)?;
            handle_car(&open_service(&config)?, cmd).await
        }
        Command::Serve(cmd) => {
            let mut config = load_config(cli.config)?;
            if let Some(bind) = cmd.bind {
                config.server.bind = bind;
                config.bind_addr()?;
            }
            let service = open_service(&config)?;
            http::serve(service, &config).await.context("running HTTP server")
        }
        // Config commands load configuration themselves.
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(config_path).context("loading configuration")
}

fn open_service(config: &Config) -> anyhow::Result<ParkingService> {
    ParkingService::open(config).with_context(|| {
        format!(
            "opening database {} and blob store {}",
            config.database_path().display(),
            config.blob_root().display()
        )
    })
}

async fn handle_lot(service: &ParkingService, cmd: LotCommand) -> anyhow::Result<()> {
    match cmd {
        LotCommand::Register {
            name,
            time_zone,
            json,
        } => {
            let parking_lot_id = service.register_lot(&name, &time_zone).await?;
            if json {
                let out = serde_json::json!({ "success": true, "parkingLotId": parking_lot_id });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{parking_lot_id}");
            }
        }
        LotCommand::Show { lot_id, json } => {
            let lot = service.get_lot(&lot_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&lot)?);
            } else {
                println!("Id:        {}", lot.id);
                println!("Name:      {}", lot.name);
                println!("Time zone: {}", lot.time_zone);
            }
        }
    }
    Ok(())
}

async fn handle_car(service: &ParkingService, cmd: CarCommand) -> anyhow::Result<()> {
    match cmd {
        CarCommand::Add {
            lot,
            plate,
            image,
            json,
        } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("reading image {}", image.display()))?;
            let unique_code = service.add_car(&lot, &plate, &bytes).await?;
            if json {
                let out = serde_json::json!({ "success": true, "uniqueCode": unique_code });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{unique_code}");
            }
        }
        CarCommand::Remove {
            lot,
            identifier,
            json,
        } => {
            let checkout = service.remove_car(&lot, &identifier).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&checkout)?);
            } else {
                println!("Checked out {}", checkout.unique_code);
                println!("  Entered: {}", checkout.time_of_entry.to_rfc3339());
                println!("  Exited:  {}", checkout.time_of_exit.to_rfc3339());
            }
        }
        CarCommand::List(args) => {
            let cars = service.list_current(&args.lot).await?;
            print_cars(&args, &cars)?;
        }
        CarCommand::History(args) => {
            let cars = service.list_history(&args.lot).await?;
            print_cars(&args, &cars)?;
        }
    }
    Ok(())
}

fn print_cars(args: &ListArgs, cars: &[CarRecord]) -> anyhow::Result<()> {
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(cars)?),
        OutputFormat::Table => {
            if cars.is_empty() {
                println!("No cars.");
                return Ok(());
            }
            println!(
                "{:<38} {:<12} {:<26} {:<26}",
                "UNIQUE CODE", "PLATE", "ENTERED", "EXITED"
            );
            for car in cars {
                let exited = car
                    .time_of_exit
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default();
                println!(
                    "{:<38} {:<12} {:<26} {:<26}",
                    car.unique_code,
                    car.car_number_plate,
                    car.time_of_entry.to_rfc3339(),
                    exited
                );
            }
            println!();
            println!("{} car(s)", cars.len());
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                let mut shown = config;
                if shown.blobs.signing_secret.is_some() {
                    shown.blobs.signing_secret = Some("<redacted>".to_string());
                }
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Blobs]");
                println!("  Root:               {}", config.blob_root().display());
                println!("  Public base URL:    {}", config.public_base_url());
                println!("  Path prefix:        {}", config.blobs.path_prefix);
                println!("  Content type:       {}", config.blobs.content_type);
                println!("  URL expiry:         {}", config.blobs.url_expires_at.to_rfc3339());
                println!(
                    "  Signing secret:     {}",
                    if config.blobs.signing_secret.is_some() {
                        "configured"
                    } else {
                        "generated"
                    }
                );
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                println!("  Permissive CORS:    {}", config.server.cors_permissive);
                println!("  Max body bytes:     {}", config.server.max_body_bytes);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::validate_file(&path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
