//! Error types for geckoflash-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Failure in the underlying debug transport (lost acknowledgement,
    /// protocol fault). Raised by `DebugPort` implementations, never by the
    /// core itself, and never retried.
    Transport,

    /// Device identification decoded a part family of zero, meaning the
    /// debug interface is locked. Recoverable via the AAP device-erase
    /// sequence.
    LockedDevice,

    /// The AAP device-erase busy flag did not clear within the timeout
    /// budget. The erase may be partially complete; device state is
    /// indeterminate.
    EraseTimeout {
        /// Total time waited before giving up, in milliseconds
        waited_ms: u32,
    },

    /// A bounded flash busy-poll exceeded its maximum attempt count
    PollTimeout {
        /// Page address whose erase never signalled completion
        addr: u32,
    },

    /// An operation needed `DeviceInfo` (page size or flash size) but
    /// `identify()` has not been run and no override was supplied
    NotIdentified,

    /// The device-information page contained a page-size code that does not
    /// decode to a plausible page size
    InvalidPageSizeCode {
        /// Raw 8-bit code from the DI page
        code: u8,
    },

    /// A caller-supplied page size was zero or not a power of two
    InvalidPageSize {
        /// The rejected page size in bytes
        page_size: u32,
    },

    /// Program offset is not 32-bit word aligned
    UnalignedOffset {
        /// The rejected byte offset
        offset: u32,
    },

    /// Read-back after programming did not match the written data
    VerifyMismatch {
        /// Address of the first mismatching word
        addr: u32,
        /// Word that was written
        expected: u32,
        /// Word that was read back
        found: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "debug transport failure"),
            Self::LockedDevice => {
                write!(f, "device information unreadable: debug interface is locked")
            }
            Self::EraseTimeout { waited_ms } => {
                write!(f, "device erase still busy after {} ms", waited_ms)
            }
            Self::PollTimeout { addr } => {
                write!(f, "flash busy flag stuck erasing page 0x{:08X}", addr)
            }
            Self::NotIdentified => {
                write!(f, "device not identified and no override supplied")
            }
            Self::InvalidPageSizeCode { code } => {
                write!(f, "implausible flash page size code 0x{:02X}", code)
            }
            Self::InvalidPageSize { page_size } => {
                write!(f, "page size {} is not a nonzero power of two", page_size)
            }
            Self::UnalignedOffset { offset } => {
                write!(f, "offset 0x{:08X} is not word aligned", offset)
            }
            Self::VerifyMismatch {
                addr,
                expected,
                found,
            } => {
                write!(
                    f,
                    "verify failed at 0x{:08X}: wrote 0x{:08X}, read 0x{:08X}",
                    addr, expected, found
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
