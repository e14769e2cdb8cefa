//! CLI argument parsing

use crate::probes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the probe argument
fn probe_help() -> String {
    format!("Debug probe to use [available: {}]", probes::probe_names_short())
}

#[derive(Parser)]
#[command(name = "geckoflash")]
#[command(author, version, about = "EFM32 in-circuit flash programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the connected microcontroller
    Identify {
        /// Debug probe to use
        #[arg(short, long, help = probe_help())]
        probe: String,
    },

    /// Erase flash memory (whole array or a range)
    Erase {
        /// Debug probe to use
        #[arg(short, long, help = probe_help())]
        probe: String,

        /// Erase the whole flash array
        #[arg(long)]
        all: bool,

        /// Start address for partial erase (hex, e.g. 0x1000)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Length of region to erase (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,

        /// Flash page size override in bytes (ignore the value read from the device)
        #[arg(long, value_parser = parse_hex_u32)]
        page_size: Option<u32>,
    },

    /// Write a firmware image to flash (erase + program + verify + reset)
    Write {
        /// Debug probe to use
        #[arg(short, long, help = probe_help())]
        probe: String,

        /// Firmware image file (flat little-endian words, no header)
        #[arg(short, long)]
        input: PathBuf,

        /// Byte offset to program at (hex or decimal, word aligned)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Flash page size override in bytes
        #[arg(long, value_parser = parse_hex_u32)]
        page_size: Option<u32>,

        /// Don't erase before programming (the range must already be blank)
        #[arg(long)]
        no_erase: bool,

        /// Poll the flash busy flag after every word (for fast transports)
        #[arg(long)]
        safe_write: bool,

        /// Don't verify the written image
        #[arg(long)]
        no_verify: bool,

        /// Don't reset the target when done
        #[arg(long)]
        no_reset: bool,
    },

    /// Unlock a locked debug interface (WARNING: erases all flash)
    Unlock {
        /// Debug probe to use
        #[arg(short, long, help = probe_help())]
        probe: String,

        /// Erase timeout budget in seconds
        #[arg(short, long, default_value = "5")]
        timeout: u32,
    },

    /// Reset the target (core and peripherals)
    Reset {
        /// Debug probe to use
        #[arg(short, long, help = probe_help())]
        probe: String,
    },
}
