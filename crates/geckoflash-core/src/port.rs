//! Debug-port adapter contract
//!
//! The core drives the target exclusively through this trait. An
//! implementation wraps a physical adapter (Bus Pirate, FTDI, ...) or a
//! simulator and exposes two address spaces:
//!
//! - the memory-mapped bus (`read_word`/`write_word`), used for normal
//!   peripherals and, once unlocked, the flash controller registers;
//! - the debug access-port register space (`read_ap`/`write_ap`), a small
//!   indexed register set that stays reachable even while the device's
//!   memory bus is locked.
//!
//! AP reads are deferred: the transport posts the read and the result is
//! fetched with [`DebugPort::read_last`] in a following operation.
//!
//! Transport failures surface as [`Error::Transport`](crate::Error) and are
//! propagated unchanged by every algorithm in this crate; retrying is the
//! adapter's business, not ours.

use crate::error::Result;

/// A debug-port connection to one target.
///
/// Exclusively owned by one controller for the duration of a flashing
/// session; concurrent access to the same physical target is not supported.
pub trait DebugPort {
    /// Read a 32-bit word from the memory-mapped bus
    fn read_word(&mut self, addr: u32) -> Result<u32>;

    /// Write a 32-bit word to the memory-mapped bus
    fn write_word(&mut self, addr: u32, value: u32) -> Result<()>;

    /// Post a read of an access-port register; fetch the result with
    /// [`read_last`](Self::read_last)
    fn read_ap(&mut self, port: u8, reg: u8) -> Result<()>;

    /// Write an access-port register
    fn write_ap(&mut self, port: u8, reg: u8, value: u32) -> Result<()>;

    /// Fetch the read-back value of the previous posted AP read
    fn read_last(&mut self) -> Result<u32>;

    /// Block for the given number of milliseconds
    ///
    /// Used by the polling loops. Simulated ports may advance a virtual
    /// clock instead of sleeping.
    fn delay_ms(&mut self, ms: u32);
}

impl<P: DebugPort + ?Sized> DebugPort for &mut P {
    fn read_word(&mut self, addr: u32) -> Result<u32> {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).write_word(addr, value)
    }

    fn read_ap(&mut self, port: u8, reg: u8) -> Result<()> {
        (**self).read_ap(port, reg)
    }

    fn write_ap(&mut self, port: u8, reg: u8, value: u32) -> Result<()> {
        (**self).write_ap(port, reg, value)
    }

    fn read_last(&mut self) -> Result<u32> {
        (**self).read_last()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

#[cfg(feature = "alloc")]
impl<P: DebugPort + ?Sized> DebugPort for alloc::boxed::Box<P> {
    fn read_word(&mut self, addr: u32) -> Result<u32> {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).write_word(addr, value)
    }

    fn read_ap(&mut self, port: u8, reg: u8) -> Result<()> {
        (**self).read_ap(port, reg)
    }

    fn write_ap(&mut self, port: u8, reg: u8, value: u32) -> Result<()> {
        (**self).write_ap(port, reg, value)
    }

    fn read_last(&mut self) -> Result<u32> {
        (**self).read_last()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
