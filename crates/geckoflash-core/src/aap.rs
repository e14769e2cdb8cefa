//! Debug unlock / recovery over the Authentication Access Port
//!
//! A locked EFM32 refuses all memory-mapped access; the AAP register set is
//! the only thing left listening. Commanding a device erase through it wipes
//! the entire flash array and clears the lock. Irreversible, and the only
//! way back in.
//!
//! These are free functions over any [`DebugPort`], in the spirit of a
//! register-level protocol: they need no controller state and no working
//! memory bus.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::port::DebugPort;
use crate::target::{AapCmd, AapStatus, TargetDescriptor};

/// Interval between AAP_STATUS polls during a device erase
pub const POLL_INTERVAL_MS: u32 = 100;

/// Default erase-busy timeout budget
pub const DEFAULT_TIMEOUT_MS: u32 = 5_000;

/// Read the AAP identification register
pub fn read_idr<P: DebugPort>(port: &mut P, target: &TargetDescriptor) -> Result<u32> {
    port.read_ap(target.aap.port, target.aap.idr)?;
    port.read_last()
}

/// Mass erase the device through the AAP and release the debug lock
///
/// WARNING: erases all flash, unconditionally.
///
/// The sequence the hardware demands, in order:
/// 1. write the valid key to AAP_CMDKEY (arms AAP_CMD for writes),
/// 2. strobe DEVICEERASE in AAP_CMD,
/// 3. write zero to AAP_CMDKEY - the key must be invalidated for the
///    command to actually execute,
/// 4. poll AAP_STATUS.ERASEBUSY every [`POLL_INTERVAL_MS`] until it clears,
///    draining the `timeout_ms` budget,
/// 5. once clear, re-arm the key, strobe SYSRESETREQ and invalidate again,
///    bringing the now-unlocked part out of the erase state.
///
/// A drained budget fails with [`Error::EraseTimeout`]; no reset is issued
/// and the device may be mid-erase, so a retry starts from step 1.
pub fn device_erase<P: DebugPort>(
    port: &mut P,
    target: &TargetDescriptor,
    timeout_ms: u32,
) -> Result<()> {
    let aap = &target.aap;

    let idr = read_idr(port, target)?;
    if idr != aap.idr_expected {
        warn!(
            "AAP IDR reads 0x{:08X}, expected 0x{:08X}; continuing anyway",
            idr, aap.idr_expected
        );
    }

    debug!("commanding device erase, budget {} ms", timeout_ms);
    port.write_ap(aap.port, aap.cmdkey, aap.cmdkey_valid)?;
    port.write_ap(aap.port, aap.cmd, AapCmd::DEVICEERASE.bits())?;
    port.write_ap(aap.port, aap.cmdkey, 0)?;

    let mut remaining = timeout_ms;
    loop {
        port.read_ap(aap.port, aap.status)?;
        let status = port.read_last()?;
        if status & AapStatus::ERASEBUSY.bits() == 0 {
            debug!("erase complete, triggering reset");
            port.write_ap(aap.port, aap.cmdkey, aap.cmdkey_valid)?;
            port.write_ap(aap.port, aap.cmd, AapCmd::SYSRESETREQ.bits())?;
            port.write_ap(aap.port, aap.cmdkey, 0)?;
            return Ok(());
        }
        if remaining == 0 {
            return Err(Error::EraseTimeout {
                waited_ms: timeout_ms,
            });
        }
        port.delay_ms(POLL_INTERVAL_MS);
        remaining = remaining.saturating_sub(POLL_INTERVAL_MS);
    }
}
