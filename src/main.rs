//! geckoflash - EFM32 in-circuit flash programmer
//!
//! Drives the flashing sequence for Silicon Labs EFM32 (Gecko)
//! microcontrollers over an SWD debug port: identify, erase, program,
//! verify, reset, plus the AAP recovery sequence for parts with a locked
//! debug interface.
//!
//! The chip-specific algorithms live in `geckoflash-core`; probes
//! (implementations of its `DebugPort` trait) are dispatched through the
//! registry in `probes.rs`. This binary is the thin I/O wrapper around
//! them: argument parsing, file loading, progress rendering.

mod cli;
mod commands;
mod probes;

use clap::Parser;
use cli::{Cli, Commands};
use commands::WriteOptions;

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

    let result = match cli.command {
        Commands::Identify { probe } => commands::run_identify(probes::open_probe(&probe)?),
        Commands::Erase {
            probe,
            all,
            start,
            length,
            page_size,
        } => commands::run_erase(probes::open_probe(&probe)?, all, start, length, page_size),
        Commands::Write {
            probe,
            input,
            offset,
            page_size,
            no_erase,
            safe_write,
            no_verify,
            no_reset,
        } => commands::run_write(
            probes::open_probe(&probe)?,
            &input,
            WriteOptions {
                offset,
                page_size,
                no_erase,
                safe_write,
                no_verify,
                no_reset,
            },
        ),
        Commands::Unlock { probe, timeout } => {
            commands::run_unlock(probes::open_probe(&probe)?, timeout)
        }
        Commands::Reset { probe } => commands::run_reset(probes::open_probe(&probe)?),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
