//! MSC flash controller algorithms
//!
//! [`FlashController`] drives the EFM32 Memory System Controller over the
//! memory-mapped bus: core halt/reset, device identification, page erase and
//! word programming. Every operation blocks until its register transactions
//! complete; the only suspension points are the explicit busy polls.
//!
//! Sequencing is caller-enforced: halt before erase, erase before program,
//! reset only after all writes are done. One controller exclusively owns one
//! debug-port connection for the session.

use log::{debug, trace};

use crate::device::DeviceInfo;
use crate::error::{Error, Result};
use crate::port::DebugPort;
use crate::progress::Progress;
use crate::target::{MscStatus, MscWriteCmd, MscWriteCtrl, TargetDescriptor};

/// Busy-poll tuning for page erase
///
/// The hardware offers no completion interrupt, so waiting on the busy flag
/// is the only correct strategy. The default is an unbounded tight spin;
/// callers that need cancellation inject a bound and a poll interval without
/// changing the algorithm.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between busy-flag reads, in milliseconds (0 = tight spin)
    pub interval_ms: u32,
    /// Maximum number of busy reads before [`Error::PollTimeout`]
    /// (`None` = poll until the hardware answers)
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval_ms: 0,
            max_polls: None,
        }
    }
}

/// Word-programming options
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramOptions {
    /// Poll the busy flag after each word
    ///
    /// Off by default: at normal transport speeds the per-word bus round
    /// trip exceeds the flash write time, matching the legacy contract of
    /// one write sequence per word with no status reads in between. Turn on
    /// when the transport is fast enough to outrun the flash.
    pub poll_between_words: bool,
}

/// A logical view of an erasable address range
///
/// Erase always acts on whole pages. `length` need not be page-aligned; the
/// erase loop walks the half-open range in page steps and therefore covers
/// the page containing the final byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashRegion {
    /// First byte address of the range
    pub base: u32,
    /// Range length in bytes
    pub length: u32,
    /// Bytes per erasable page
    pub page_size: u32,
}

impl FlashRegion {
    /// Number of pages the erase loop will touch: `ceil(length / page_size)`
    pub fn page_count(&self) -> u32 {
        self.length.div_ceil(self.page_size)
    }
}

/// Flash/debug controller for one target, bound to one debug port
///
/// Session-scoped: create it, identify, do the work, drop it. It keeps no
/// state across sessions beyond the borrowed port.
pub struct FlashController<P: DebugPort> {
    port: P,
    target: &'static TargetDescriptor,
    device: Option<DeviceInfo>,
    poll: PollConfig,
}

impl<P: DebugPort> FlashController<P> {
    /// Create a controller for the default EFM32 series 0 target
    pub fn new(port: P) -> Self {
        Self::with_target(port, &crate::target::EFM32)
    }

    /// Create a controller for an explicit target descriptor
    pub fn with_target(port: P, target: &'static TargetDescriptor) -> Self {
        FlashController {
            port,
            target,
            device: None,
            poll: PollConfig::default(),
        }
    }

    /// The target descriptor this controller drives
    pub fn target(&self) -> &'static TargetDescriptor {
        self.target
    }

    /// Device info from the last successful [`identify`](Self::identify)
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Replace the erase busy-poll configuration
    pub fn set_poll_config(&mut self, poll: PollConfig) {
        self.poll = poll;
    }

    /// Access the underlying debug port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the debug port
    pub fn into_port(self) -> P {
        self.port
    }

    /// Halt the processor core
    ///
    /// Required before touching the flash controller: the core must not be
    /// executing from the region being erased or written. Fire-and-forget,
    /// idempotent, no read-back.
    pub fn halt(&mut self) -> Result<()> {
        use crate::target::cortex_m::{DHCSR, DHCSR_HALT};
        debug!("halting core");
        self.port.write_word(DHCSR, DHCSR_HALT)
    }

    /// Let the halted core run again
    pub fn run(&mut self) -> Result<()> {
        use crate::target::cortex_m::{DHCSR, DHCSR_RUN};
        debug!("unhalting core");
        self.port.write_word(DHCSR, DHCSR_RUN)
    }

    /// Request a full system reset, core and peripherals
    ///
    /// The final step after programming. Fire-and-forget, no read-back.
    pub fn sys_reset(&mut self) -> Result<()> {
        use crate::target::cortex_m::{AIRCR, AIRCR_SYSRESETREQ};
        debug!("requesting system reset");
        self.port.write_word(AIRCR, AIRCR_SYSRESETREQ)
    }

    /// Read and decode the device-information page
    ///
    /// Idempotent and side-effect free beyond the DI reads. Fails with
    /// [`Error::LockedDevice`] when the part family decodes to zero, the
    /// signal that the debug interface is locked and the AAP recovery
    /// sequence is needed. On success the info is kept for later erase
    /// bounds and page-size defaults.
    pub fn identify(&mut self) -> Result<DeviceInfo> {
        let di = &self.target.di;
        let mem_info = self.port.read_word(di.mem_info)?;
        let unique_lo = self.port.read_word(di.unique_lo)?;
        let unique_hi = self.port.read_word(di.unique_hi)?;
        let mem_sizes = self.port.read_word(di.mem_sizes)?;
        let part_info = self.port.read_word(di.part_info)?;

        let info = DeviceInfo::decode(mem_info, unique_lo, unique_hi, mem_sizes, part_info)?;
        debug!(
            "identified family {} part {} with {} kB flash, {} B pages",
            info.family, info.part_number, info.flash_size_kb, info.page_size
        );
        self.device = Some(info);
        Ok(info)
    }

    /// Enable write and erase access to the flash array (MSC_WRITECTRL.WREN)
    ///
    /// Erase arms this itself; call it directly only when programming a
    /// range that was erased in an earlier session.
    pub fn enable_flash_writes(&mut self) -> Result<()> {
        self.port
            .write_word(self.target.msc.writectrl, MscWriteCtrl::WREN.bits())
    }

    /// Erase every page intersecting `[offset, offset + length)`
    ///
    /// The page size is `page_size_override` when given, otherwise the
    /// identified device's; [`Error::NotIdentified`] when neither is
    /// available. The core must already be halted.
    pub fn erase(
        &mut self,
        offset: u32,
        length: u32,
        page_size_override: Option<u32>,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let page_size = match page_size_override {
            Some(ps) => ps,
            None => self.device.ok_or(Error::NotIdentified)?.page_size,
        };
        self.erase_region(
            FlashRegion {
                base: self.target.flash_base + offset,
                length,
                page_size,
            },
            progress,
        )
    }

    /// Erase the whole flash array through the memory-mapped controller
    ///
    /// Requires identification for the flash size. Distinct from the AAP
    /// device erase, which works on locked parts.
    pub fn erase_all(
        &mut self,
        page_size_override: Option<u32>,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        let length = self.device.ok_or(Error::NotIdentified)?.flash_size();
        self.erase(0, length, page_size_override, progress)
    }

    /// Erase an explicit region, page by page
    ///
    /// For each page: latch the address, strobe ERASEPAGE, then poll the
    /// busy flag until the hardware signals completion (per [`PollConfig`]).
    /// A page erase can take milliseconds and offers no interrupt, so
    /// polling to completion is the only correct strategy.
    pub fn erase_region(
        &mut self,
        region: FlashRegion,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        if region.page_size == 0 || !region.page_size.is_power_of_two() {
            return Err(Error::InvalidPageSize {
                page_size: region.page_size,
            });
        }

        debug!(
            "erasing 0x{:08X}..0x{:08X} in {} B pages",
            region.base,
            region.base as u64 + region.length as u64,
            region.page_size
        );

        self.enable_flash_writes()?;
        progress.report(0.0);

        let total = region.page_count();
        if total == 0 {
            progress.report(100.0);
            return Ok(());
        }

        let msc = &self.target.msc;
        let end = region.base as u64 + region.length as u64;
        let mut addr = region.base as u64;
        let mut done = 0u32;
        while addr < end {
            let page = addr as u32;
            self.port.write_word(msc.addrb, page)?;
            self.port
                .write_word(msc.writecmd, MscWriteCmd::LADDRIM.bits())?;
            self.port
                .write_word(msc.writecmd, MscWriteCmd::ERASEPAGE.bits())?;
            self.wait_flash_ready(page)?;

            trace!("erased page 0x{:08X}", page);
            done += 1;
            progress.report(100.0 * done as f32 / total as f32);
            addr += region.page_size as u64;
        }

        Ok(())
    }

    /// Program `words` starting at byte address `offset` (word aligned)
    ///
    /// One register sequence per word: latch the address, load the data,
    /// strobe the write trigger. No bounds check against the flash size is
    /// performed; staying inside the array is the caller's responsibility.
    /// Assumes the range was erased and write access is armed (both done by
    /// [`erase`](Self::erase)).
    pub fn program(
        &mut self,
        offset: u32,
        words: &[u32],
        options: ProgramOptions,
        progress: &mut dyn Progress,
    ) -> Result<()> {
        if offset % 4 != 0 {
            return Err(Error::UnalignedOffset { offset });
        }

        debug!(
            "programming {} words at 0x{:08X}",
            words.len(),
            self.target.flash_base + offset
        );

        progress.report(0.0);
        if words.is_empty() {
            progress.report(100.0);
            return Ok(());
        }

        let msc = &self.target.msc;
        let mut addr = self.target.flash_base + offset;
        for (i, &word) in words.iter().enumerate() {
            self.port.write_word(msc.addrb, addr)?;
            self.port
                .write_word(msc.writecmd, MscWriteCmd::LADDRIM.bits())?;
            self.port.write_word(msc.wdata, word)?;
            self.port
                .write_word(msc.writecmd, MscWriteCmd::WRITETRIG.bits())?;
            if options.poll_between_words {
                self.wait_flash_ready(addr)?;
            }
            progress.report(100.0 * (i + 1) as f32 / words.len() as f32);
            addr += 4;
        }

        Ok(())
    }

    /// Read back `words.len()` words from `offset` and compare
    ///
    /// Fails with [`Error::VerifyMismatch`] at the first differing word.
    pub fn verify(
        &mut self,
        offset: u32,
        words: &[u32],
        progress: &mut dyn Progress,
    ) -> Result<()> {
        if offset % 4 != 0 {
            return Err(Error::UnalignedOffset { offset });
        }

        progress.report(0.0);
        if words.is_empty() {
            progress.report(100.0);
            return Ok(());
        }

        let mut addr = self.target.flash_base + offset;
        for (i, &expected) in words.iter().enumerate() {
            let found = self.port.read_word(addr)?;
            if found != expected {
                return Err(Error::VerifyMismatch {
                    addr,
                    expected,
                    found,
                });
            }
            progress.report(100.0 * (i + 1) as f32 / words.len() as f32);
            addr += 4;
        }

        Ok(())
    }

    /// Poll MSC_STATUS until the busy flag clears
    fn wait_flash_ready(&mut self, addr: u32) -> Result<()> {
        let status_reg = self.target.msc.status;
        let mut polls = 0u32;
        loop {
            let status = self.port.read_word(status_reg)?;
            if status & MscStatus::BUSY.bits() == 0 {
                return Ok(());
            }
            polls += 1;
            if let Some(max) = self.poll.max_polls {
                if polls >= max {
                    return Err(Error::PollTimeout { addr });
                }
            }
            if self.poll.interval_ms > 0 {
                self.port.delay_ms(self.poll.interval_ms);
            }
        }
    }
}
