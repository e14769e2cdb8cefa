//! Unlock command implementation

use geckoflash_core::{aap, target};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use geckoflash_core::port::DebugPort;

/// Run the unlock command
///
/// Recovers a locked debug interface by mass-erasing the device through the
/// AAP. Irreversible; all flash contents are lost.
pub fn run_unlock(
    mut port: Box<dyn DebugPort>,
    timeout_secs: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("WARNING: unlocking erases ALL flash memory");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Erasing device...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = aap::device_erase(
        &mut port,
        &target::EFM32,
        timeout_secs.saturating_mul(1000),
    );

    match result {
        Ok(()) => {
            pb.finish_with_message("Device erased, debug interface unlocked");
            println!("The target was reset; identification should now succeed");
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("Unlock failed");
            Err(e.into())
        }
    }
}
