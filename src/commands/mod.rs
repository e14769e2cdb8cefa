//! CLI command implementations
//!
//! Each command opens a probe, builds a [`FlashController`] over it and
//! sequences the core operations. Long-running operations get an indicatif
//! progress bar through the core's `Progress` observer; the core itself
//! never prints.

mod erase;
mod identify;
mod reset;
mod unlock;
mod write;

pub use erase::run_erase;
pub use identify::run_identify;
pub use reset::run_reset;
pub use unlock::run_unlock;
pub use write::{run_write, WriteOptions};

use geckoflash_core::error::Error;
use geckoflash_core::flash::FlashController;
use geckoflash_core::port::DebugPort;
use geckoflash_core::progress::Progress;
use indicatif::{ProgressBar, ProgressStyle};

/// Percent-driven progress bar adapter for the core's observer hook
pub(crate) struct PercentBar {
    bar: ProgressBar,
}

impl PercentBar {
    pub(crate) fn new(label: &'static str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message(label);
        PercentBar { bar }
    }

    pub(crate) fn finish(self, message: &'static str) {
        self.bar.set_position(100);
        self.bar.finish_with_message(message);
    }
}

impl Progress for PercentBar {
    fn report(&mut self, percent: f32) {
        self.bar.set_position(percent.round() as u64);
    }
}

/// Identify the target, turning the locked-device error into operator advice
pub(crate) fn identify_or_hint<P: DebugPort>(
    ctrl: &mut FlashController<P>,
) -> Result<geckoflash_core::device::DeviceInfo, Box<dyn std::error::Error>> {
    match ctrl.identify() {
        Ok(info) => Ok(info),
        Err(Error::LockedDevice) => Err(
            "can't read device information: the debug interface appears to be locked. \
             Run 'geckoflash unlock' (erases ALL flash) and try again"
                .into(),
        ),
        Err(e) => Err(e.into()),
    }
}
