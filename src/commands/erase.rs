//! Erase command implementation

use geckoflash_core::flash::FlashController;
use geckoflash_core::port::DebugPort;

use super::{identify_or_hint, PercentBar};

/// Run the erase command
pub fn run_erase(
    port: Box<dyn DebugPort>,
    all: bool,
    start: Option<u32>,
    length: Option<u32>,
    page_size: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = FlashController::new(port);
    let info = identify_or_hint(&mut ctrl)?;
    println!(
        "Found: {} ({} kB flash, {} B pages)",
        info.part_name(),
        info.flash_size_kb,
        info.page_size
    );

    // Flash operations require a halted core
    ctrl.halt()?;

    match (all, start, length) {
        (true, None, None) => {
            let mut bar = PercentBar::new("Erasing");
            ctrl.erase_all(page_size, &mut bar)?;
            bar.finish("Erase complete");
            println!("Erased {} bytes", info.flash_size());
        }
        (false, Some(start), Some(length)) => {
            let mut bar = PercentBar::new("Erasing");
            ctrl.erase(start, length, page_size, &mut bar)?;
            bar.finish("Erase complete");
            println!("Erased {} bytes starting at 0x{:08X}", length, start);
        }
        (true, _, _) => {
            return Err("--all cannot be combined with --start/--length".into());
        }
        _ => {
            return Err("specify --all, or both --start and --length".into());
        }
    }

    Ok(())
}
