//! Identify command implementation

use geckoflash_core::flash::FlashController;
use geckoflash_core::port::DebugPort;

use super::identify_or_hint;

/// Run the identify command
pub fn run_identify(port: Box<dyn DebugPort>) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = FlashController::new(port);
    let info = identify_or_hint(&mut ctrl)?;

    println!("{:<20} {}", "Part number:", info.part_name());
    println!("{:<20} {} kB", "Flash size:", info.flash_size_kb);
    println!("{:<20} {} B", "Flash page size:", info.page_size);
    println!("{:<20} {} kB", "RAM size:", info.ram_size_kb);
    println!("{:<20} {}", "Production rev:", info.prod_rev);
    println!("{:<20} {:016X}", "Unique number:", info.unique_id);

    Ok(())
}
