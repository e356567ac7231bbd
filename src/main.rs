//! pinreclaim - Explore GPIO9/GPIO10 reclaim recipes without hardware
//!
//! Every command builds a simulated flash chip from the config file and
//! command line, then runs the same core routines the firmware would run
//! against the real controller.

mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use pinreclaim_dummy::SimChip;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let settings = match Settings::load(&cli.chip) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let mut chip = SimChip::new(settings.sim.clone());

    let result = match cli.command {
        Commands::Probe => commands::probe::run(&mut chip, &settings),
        Commands::Status => commands::status::run(&mut chip),
        Commands::Reclaim { boots } => commands::reclaim::run(&mut chip, &settings, boots),
        Commands::SetQe {
            recipe,
            non_volatile,
        } => commands::status::run_set(&mut chip, &recipe, non_volatile, true),
        Commands::ClearQe {
            recipe,
            non_volatile,
        } => commands::status::run_set(&mut chip, &recipe, non_volatile, false),
        Commands::Reset {
            set_first,
            non_volatile,
        } => commands::status::run_reset(&mut chip, set_first.as_deref(), non_volatile),
        Commands::ListVendors => {
            commands::list::list_vendors(&settings);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
