//! Probe registration and dispatch
//!
//! A probe is anything implementing [`DebugPort`]: a physical SWD adapter
//! driver or the built-in simulator. The registry keeps the CLI decoupled
//! from concrete probe types and generates the `--probe` help text.
//!
//! Probe specs look like `name` or `name:key=value,flag,...`, e.g.
//! `sim:flash=128,page=512,locked`.

use geckoflash_core::port::DebugPort;
use geckoflash_sim::{SimConfig, SimTarget};
use thiserror::Error;

/// Information about a probe
pub struct ProbeInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available probes
pub fn available_probes() -> Vec<ProbeInfo> {
    vec![ProbeInfo {
        name: "sim",
        description: "In-memory EFM32 emulator (flash=<kB>,page=<B>,locked,erase-polls=<n>)",
    }]
}

/// Short comma-separated list of probe names for help text
pub fn probe_names_short() -> String {
    available_probes()
        .iter()
        .map(|p| p.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors opening a probe from its spec string
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The name before the first ':' matched no registered probe
    #[error("unknown probe '{0}'")]
    Unknown(String),
    /// An option after the ':' failed to parse
    #[error("invalid probe option '{0}'")]
    InvalidOption(String),
}

/// Open a probe from a spec string like `sim:flash=128,locked`
pub fn open_probe(spec: &str) -> Result<Box<dyn DebugPort>, ProbeError> {
    let (name, opts) = spec.split_once(':').unwrap_or((spec, ""));
    match name {
        "sim" => {
            let config = parse_sim_options(opts)?;
            log::debug!(
                "opening simulated target: {} kB flash, {} B pages, locked={}",
                config.flash_kb,
                config.page_size,
                config.locked
            );
            Ok(Box::new(SimTarget::new(config)))
        }
        other => Err(ProbeError::Unknown(other.to_string())),
    }
}

fn parse_sim_options(opts: &str) -> Result<SimConfig, ProbeError> {
    let mut config = SimConfig::default();
    for opt in opts.split(',').filter(|s| !s.is_empty()) {
        let invalid = || ProbeError::InvalidOption(opt.to_string());
        match opt.split_once('=') {
            Some(("flash", v)) => config.flash_kb = v.parse().map_err(|_| invalid())?,
            Some(("page", v)) => config.page_size = v.parse().map_err(|_| invalid())?,
            Some(("erase-polls", v)) => {
                config.erase_busy_polls = v.parse().map_err(|_| invalid())?
            }
            None if opt == "locked" => config.locked = true,
            _ => return Err(invalid()),
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sim_options() {
        let config = parse_sim_options("flash=256,page=1024,locked").unwrap();
        assert_eq!(config.flash_kb, 256);
        assert_eq!(config.page_size, 1024);
        assert!(config.locked);
    }

    #[test]
    fn test_bad_options_rejected() {
        assert!(parse_sim_options("bogus").is_err());
        assert!(parse_sim_options("flash=many").is_err());
        assert!(open_probe("buspirate:/dev/ttyUSB0").is_err());
    }
}
