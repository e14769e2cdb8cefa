//! Reset command implementation

use geckoflash_core::flash::FlashController;
use geckoflash_core::port::DebugPort;

/// Run the reset command
pub fn run_reset(port: Box<dyn DebugPort>) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctrl = FlashController::new(port);
    ctrl.sys_reset()?;
    println!("Target reset");
    Ok(())
}
