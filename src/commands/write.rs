//! Write command implementation
//!
//! The whole flashing scenario in one command: load the image, identify the
//! part, halt, erase the range the image needs, program word by word,
//! verify the read-back, reset.

use geckoflash_core::flash::{FlashController, ProgramOptions};
use geckoflash_core::image::FirmwareImage;
use geckoflash_core::port::DebugPort;
use std::path::Path;

use super::{identify_or_hint, PercentBar};

/// Options for the write command beyond the image itself
pub struct WriteOptions {
    /// Byte offset to program at (word aligned)
    pub offset: u32,
    /// Flash page size override for the erase step
    pub page_size: Option<u32>,
    /// Skip the erase step (range must already be blank)
    pub no_erase: bool,
    /// Poll the busy flag after every programmed word
    pub safe_write: bool,
    /// Skip read-back verification
    pub no_verify: bool,
    /// Leave the target halted instead of resetting
    pub no_reset: bool,
}

/// Run the write command
pub fn run_write(
    port: Box<dyn DebugPort>,
    input: &Path,
    opts: WriteOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(input)?;
    let image = FirmwareImage::from_bytes(&bytes);
    if image.is_empty() {
        return Err(format!("firmware image {} is empty", input.display()).into());
    }
    println!(
        "Loaded {} bytes ({} words) from {}",
        bytes.len(),
        image.len(),
        input.display()
    );

    let mut ctrl = FlashController::new(port);
    let info = identify_or_hint(&mut ctrl)?;
    println!("Found: {} ({} kB flash)", info.part_name(), info.flash_size_kb);

    if opts.offset as u64 + image.byte_len() as u64 > info.flash_size() as u64 {
        log::warn!(
            "image ends at 0x{:08X}, past the end of flash (0x{:08X}); \
             writes beyond the array are undefined",
            opts.offset as u64 + image.byte_len() as u64,
            info.flash_size()
        );
    }

    ctrl.halt()?;

    if opts.no_erase {
        // Still need write access armed; erase normally does this.
        ctrl.enable_flash_writes()?;
        log::info!("skipping erase as requested");
    } else {
        let mut bar = PercentBar::new("Erasing");
        ctrl.erase(opts.offset, image.byte_len(), opts.page_size, &mut bar)?;
        bar.finish("Erase complete");
    }

    let mut bar = PercentBar::new("Programming");
    ctrl.program(
        opts.offset,
        image.words(),
        ProgramOptions {
            poll_between_words: opts.safe_write,
        },
        &mut bar,
    )?;
    bar.finish("Programming complete");

    if opts.no_verify {
        log::info!("skipping verification as requested");
    } else {
        let mut bar = PercentBar::new("Verifying");
        ctrl.verify(opts.offset, image.words(), &mut bar)?;
        bar.finish("Verification passed");
    }

    if opts.no_reset {
        println!("Target left halted (--no-reset)");
    } else {
        ctrl.sys_reset()?;
        println!("Target reset");
    }

    Ok(())
}
