//! geckoflash-sim - In-memory EFM32 target emulator
//!
//! Implements [`DebugPort`] over a modelled EFM32: device-information page,
//! MSC flash controller (latch/erase/write/busy protocol), AAP debug lock
//! and device erase. Useful for testing and dry runs without hardware.
//!
//! The model also keeps counters the integration tests lean on: status-read
//! counts, erased page addresses, issued write sequences, virtual sleep
//! time.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use geckoflash_core::error::{Error, Result};
use geckoflash_core::port::DebugPort;
use geckoflash_core::target::{self, AapCmd, AapStatus, MscStatus, MscWriteCmd, TargetDescriptor};

/// Configuration for the simulated part
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Main flash size in kB
    pub flash_kb: u16,
    /// RAM size in kB
    pub ram_kb: u16,
    /// Flash page size in bytes (power of two, 512..=4096)
    pub page_size: u32,
    /// Part number within the family
    pub part_number: u16,
    /// DI page family id
    pub family: u8,
    /// Production revision
    pub prod_rev: u8,
    /// 64-bit hardware unique id
    pub unique_id: u64,
    /// Start with the debug interface locked (bus reads return zero)
    pub locked: bool,
    /// MSC busy reads returned after each page erase before BUSY clears
    pub erase_busy_polls: u32,
    /// AAP ERASEBUSY read-backs returned before a device erase completes
    pub aap_busy_polls: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        // EFM32G890F128 (Gecko)
        SimConfig {
            flash_kb: 128,
            ram_kb: 16,
            page_size: 512,
            part_number: 890,
            family: 71,
            prod_rev: 1,
            unique_id: 0x0011_2233_4455_6677,
            locked: false,
            erase_busy_polls: 2,
            aap_busy_polls: 3,
        }
    }
}

/// Simulated EFM32 behind the [`DebugPort`] trait
pub struct SimTarget {
    config: SimConfig,
    target: &'static TargetDescriptor,
    flash: Vec<u8>,

    // MSC state
    wren: bool,
    addrb: u32,
    latched: u32,
    wdata: u32,
    msc_busy_left: u32,

    // AAP state
    locked: bool,
    key_valid: bool,
    erase_started: bool,
    erase_done: bool,
    aap_busy_left: u32,
    last_value: u32,

    // Instrumentation
    msc_status_reads: u32,
    erased_pages: Vec<u32>,
    program_triggers: u32,
    dhcsr_writes: Vec<u32>,
    reset_count: u32,
    aap_status_reads: u32,
    aap_reset_writes: u32,
    slept_ms: u32,
}

impl SimTarget {
    /// Create a simulated target with the given configuration
    pub fn new(config: SimConfig) -> Self {
        let locked = config.locked;
        let flash = vec![0xFF; config.flash_kb as usize * 1024];
        SimTarget {
            config,
            target: &target::EFM32,
            flash,
            wren: false,
            addrb: 0,
            latched: 0,
            wdata: 0,
            msc_busy_left: 0,
            locked,
            key_valid: false,
            erase_started: false,
            erase_done: false,
            aap_busy_left: 0,
            last_value: 0,
            msc_status_reads: 0,
            erased_pages: Vec::new(),
            program_triggers: 0,
            dhcsr_writes: Vec::new(),
            reset_count: 0,
            aap_status_reads: 0,
            aap_reset_writes: 0,
            slept_ms: 0,
        }
    }

    /// Create a simulated target with default configuration (EFM32G890F128)
    pub fn new_default() -> Self {
        Self::new(SimConfig::default())
    }

    /// The flash array contents
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// Mutable flash array contents, for corrupting fixtures
    pub fn flash_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// The configuration this target was built with
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Whether the debug interface is currently locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of MSC_STATUS reads observed
    pub fn msc_status_reads(&self) -> u32 {
        self.msc_status_reads
    }

    /// Page addresses erased through the MSC, in order
    pub fn erased_pages(&self) -> &[u32] {
        &self.erased_pages
    }

    /// Number of WRITETRIG strobes observed
    pub fn program_triggers(&self) -> u32 {
        self.program_triggers
    }

    /// Values written to DHCSR, in order
    pub fn dhcsr_writes(&self) -> &[u32] {
        &self.dhcsr_writes
    }

    /// Number of AIRCR system resets observed
    pub fn reset_count(&self) -> u32 {
        self.reset_count
    }

    /// Number of AAP_STATUS read-backs observed
    pub fn aap_status_reads(&self) -> u32 {
        self.aap_status_reads
    }

    /// Number of AAP SYSRESETREQ commands accepted (the unlock re-arm)
    pub fn aap_reset_writes(&self) -> u32 {
        self.aap_reset_writes
    }

    /// Virtual milliseconds slept via `delay_ms`
    pub fn slept_ms(&self) -> u32 {
        self.slept_ms
    }

    fn di_mem_info(&self) -> u32 {
        // Inverse of the decode: code = log2(page_size) - 10, mod 256
        let code = (self.config.page_size.trailing_zeros() as i32 - 10) & 0xFF;
        (code as u32) << 24
    }

    fn handle_msc_write(&mut self, cmd: u32) {
        if cmd & MscWriteCmd::LADDRIM.bits() != 0 {
            self.latched = self.addrb;
        }
        if cmd & MscWriteCmd::ERASEPAGE.bits() != 0 && self.wren {
            let page = self.latched & !(self.config.page_size - 1);
            let start = page as usize;
            let end = (start + self.config.page_size as usize).min(self.flash.len());
            if start < self.flash.len() {
                self.flash[start..end].fill(0xFF);
            }
            self.erased_pages.push(self.latched);
            self.msc_busy_left = self.config.erase_busy_polls;
        }
        if cmd & MscWriteCmd::WRITETRIG.bits() != 0 && self.wren {
            let addr = self.latched as usize;
            if addr + 4 <= self.flash.len() {
                self.flash[addr..addr + 4].copy_from_slice(&self.wdata.to_le_bytes());
            }
            self.program_triggers += 1;
        }
    }

    fn handle_aap_cmd(&mut self, value: u32) {
        if !self.key_valid {
            // AAP_CMD ignores writes unless the key register holds the
            // valid key.
            return;
        }
        if value & AapCmd::DEVICEERASE.bits() != 0 {
            log::debug!("sim: device erase commanded");
            self.erase_started = true;
            self.erase_done = false;
            self.aap_busy_left = self.config.aap_busy_polls;
            self.flash.fill(0xFF);
        }
        if value & AapCmd::SYSRESETREQ.bits() != 0 {
            self.aap_reset_writes += 1;
            if self.erase_done {
                self.locked = false;
            }
        }
    }
}

impl DebugPort for SimTarget {
    fn read_word(&mut self, addr: u32) -> Result<u32> {
        let msc = &self.target.msc;
        let di = &self.target.di;

        if addr == msc.status {
            self.msc_status_reads += 1;
            if self.msc_busy_left > 0 {
                self.msc_busy_left -= 1;
                return Ok(MscStatus::BUSY.bits());
            }
            return Ok(0);
        }

        // A locked part answers blank on the whole bus.
        if self.locked {
            return Ok(0);
        }

        if addr == di.mem_info {
            return Ok(self.di_mem_info());
        }
        if addr == di.unique_lo {
            return Ok(self.config.unique_id as u32);
        }
        if addr == di.unique_hi {
            return Ok((self.config.unique_id >> 32) as u32);
        }
        if addr == di.mem_sizes {
            return Ok((self.config.ram_kb as u32) << 16 | self.config.flash_kb as u32);
        }
        if addr == di.part_info {
            return Ok((self.config.prod_rev as u32) << 24
                | (self.config.family as u32) << 16
                | self.config.part_number as u32);
        }

        let offset = addr as usize;
        if addr % 4 == 0 && offset + 4 <= self.flash.len() {
            let mut word = [0u8; 4];
            word.copy_from_slice(&self.flash[offset..offset + 4]);
            return Ok(u32::from_le_bytes(word));
        }

        Err(Error::Transport)
    }

    fn write_word(&mut self, addr: u32, value: u32) -> Result<()> {
        use geckoflash_core::target::cortex_m::{AIRCR, AIRCR_SYSRESETREQ, DHCSR};

        if self.locked {
            // The bus ignores writes while the debug lock is engaged.
            return Ok(());
        }

        let msc = &self.target.msc;
        match addr {
            DHCSR => self.dhcsr_writes.push(value),
            AIRCR => {
                if value == AIRCR_SYSRESETREQ {
                    self.reset_count += 1;
                }
            }
            a if a == msc.writectrl => self.wren = value & 1 != 0,
            a if a == msc.addrb => self.addrb = value,
            a if a == msc.wdata => self.wdata = value,
            a if a == msc.writecmd => self.handle_msc_write(value),
            _ => return Err(Error::Transport),
        }
        Ok(())
    }

    fn read_ap(&mut self, _port: u8, reg: u8) -> Result<()> {
        let aap = &self.target.aap;
        self.last_value = if reg == aap.status {
            self.aap_status_reads += 1;
            if self.erase_started && self.aap_busy_left > 0 {
                self.aap_busy_left -= 1;
                AapStatus::ERASEBUSY.bits()
            } else {
                if self.erase_started {
                    self.erase_done = true;
                }
                0
            }
        } else if reg == aap.idr {
            aap.idr_expected
        } else {
            0
        };
        Ok(())
    }

    fn write_ap(&mut self, _port: u8, reg: u8, value: u32) -> Result<()> {
        let aap = &self.target.aap;
        if reg == aap.cmdkey {
            self.key_valid = value == aap.cmdkey_valid;
        } else if reg == aap.cmd {
            self.handle_aap_cmd(value);
        }
        Ok(())
    }

    fn read_last(&mut self) -> Result<u32> {
        Ok(self.last_value)
    }

    fn delay_ms(&mut self, ms: u32) {
        // Virtual clock only; tests must not sleep for real.
        self.slept_ms += ms;
    }
}
