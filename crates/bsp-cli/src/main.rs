//! bsp: type checking and epoch processing from the command line
//!
//! ```bash
//! bsp check 'DOUBLE[1 -]' '[1, 2, 3]' --name ival
//! bsp variance epochs.json --sections 4 --std
//! bsp zscore epochs.json --ival -200 0 --config bsp.json
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bsp")]
#[command(about = "Type checking and processing of epoched biosignals", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON value against a type expression
    Check {
        /// Type expression, e.g. 'DOUBLE[1 -]|CHAR'
        #[arg(value_name = "TYPE")]
        type_def: String,

        /// Value as JSON text
        #[arg(value_name = "JSON", allow_hyphen_values = true)]
        json: String,

        /// Variable name used in diagnostics
        #[arg(long, default_value = "value")]
        name: String,
    },

    /// Variance per time section, channel and epoch
    Variance {
        /// Signal data as JSON
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Number of time sections
        #[arg(long)]
        sections: Option<usize>,

        /// Standard deviation instead of variance
        #[arg(long)]
        std: bool,

        /// Processing configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Z-score every channel and epoch
    Zscore {
        /// Signal data as JSON
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Reference interval in ms
        #[arg(long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
        ival: Option<Vec<f64>>,

        /// Processing configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check { type_def, json, name } => {
            let verdict = commands::check(&type_def, &json, &name)?;
            match verdict.message() {
                None => {
                    println!("ok");
                    Ok(0)
                }
                Some(message) => {
                    println!("{}", message);
                    Ok(1)
                }
            }
        }
        Commands::Variance {
            data,
            sections,
            std,
            config,
        } => {
            let config = commands::load_config(config.as_deref())?;
            let dat = commands::load_data(&data)?;
            let out = commands::variance(&dat, &config, sections, std)?;
            println!("{}", commands::to_json(&out)?);
            Ok(0)
        }
        Commands::Zscore { data, ival, config } => {
            let config = commands::load_config(config.as_deref())?;
            let dat = commands::load_data(&data)?;
            let out = commands::z_score(&dat, &config, ival.as_deref())?;
            println!("{}", commands::to_json(&out)?);
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}
