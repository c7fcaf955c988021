use std::{path::PathBuf, time::Duration};

use auto_lookup::{build_services, config::load_config, lookup, Country};
use clap::{Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Result};
use log::{info, LevelFilter};
use reqwest::blocking::ClientBuilder;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Registration number looked up when `test` is given as the identifier.
const TEST_REG_NO: &str = "BX71743";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Look up vehicle data by registration number or VIN.
#[derive(Parser)]
#[command(name = "auto-lookup", version, about, long_about = None)]
struct Cli {
    /// Path to the service configuration.
    #[arg(short, long, default_value = "conf.yml", global = true)]
    config: PathBuf,

    /// Request timeout in seconds. Overrides `timeout_secs` from the config.
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a vehicle. Identifiers of 17 characters are treated as VINs.
    Lookup {
        /// Country code of the service to use, e.g. `dk`.
        country: String,
        /// Registration number or VIN. `test` looks up an example registration.
        identifier: String,
        /// Print the vehicle as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the configured services.
    Services,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_config(&cli.config)
        .wrap_err_with(|| format!("Could not load {}", cli.config.display()))?;

    match cli.command {
        Command::Services => {
            for definition in &config.services {
                println!("provider: {}", definition.provider);
                println!("{}", definition.config);
            }
        }
        Command::Lookup {
            country,
            identifier,
            json,
        } => {
            let timeout = cli
                .timeout
                .map(Duration::from_secs)
                .or(config.timeout)
                .unwrap_or(DEFAULT_TIMEOUT);
            let client = ClientBuilder::new().timeout(timeout).build()?;
            let configured = config.services.len();
            let manager = build_services(config.services, &client)?;
            info!("Registered {} of {configured} configured services", manager.len());

            let identifier = match identifier.as_str() {
                "test" | "TEST" => TEST_REG_NO.to_string(),
                _ => identifier,
            };
            let vehicle = lookup(&manager, &Country::from(country), &identifier)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&vehicle)?);
            } else {
                println!("{vehicle}");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("auto_lookup")
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}
