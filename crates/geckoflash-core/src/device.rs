//! Device identification
//!
//! The EFM32 reports what it is through a handful of read-only words in its
//! device-information (DI) page. Decoding them is a pure computation; the
//! fetch itself lives in [`FlashController::identify`](crate::flash::FlashController::identify).

#[cfg(feature = "alloc")]
use alloc::format;
#[cfg(feature = "alloc")]
use alloc::string::String;

use crate::error::{Error, Result};
use crate::target::Family;

/// Smallest flash page size considered plausible, in bytes
pub const MIN_PAGE_SIZE: u32 = 512;
/// Largest flash page size considered plausible, in bytes
pub const MAX_PAGE_SIZE: u32 = 4096;

/// Decode the raw 8-bit DI page-size code into a page size in bytes
///
/// The encoding is `page_size = 2^((code + 10) mod 256)`: code 0 means
/// 1024 B, 1 means 2048 B, 255 wraps around to 512 B. Codes whose exponent
/// does not fit a 32-bit size return `None`.
pub fn page_size_from_code(code: u8) -> Option<u32> {
    let shift = (code as u32 + 10) & 0xFF;
    if shift < 32 {
        Some(1 << shift)
    } else {
        None
    }
}

/// Identity of the connected part, decoded once per session
///
/// Immutable after [`decode`](DeviceInfo::decode); the controller keeps a
/// copy for erase bounds and the default page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Bytes per erasable flash page
    pub page_size: u32,
    /// 64-bit hardware unique id, informational only
    pub unique_id: u64,
    /// Main flash size in kB
    pub flash_size_kb: u16,
    /// RAM size in kB
    pub ram_size_kb: u16,
    /// Part number within the family (990 in EFM32GG990F1024)
    pub part_number: u16,
    /// Family id, nonzero ([`Family::lookup`] maps it to a name)
    pub family: u8,
    /// Production revision
    pub prod_rev: u8,
}

impl DeviceInfo {
    /// Decode the DI page words into a `DeviceInfo`
    ///
    /// Pure over the already-fetched words; no partial result is ever
    /// produced. A part family of zero means the words read back blank
    /// because the debug interface is locked, and fails with
    /// [`Error::LockedDevice`].
    pub fn decode(
        mem_info: u32,
        unique_lo: u32,
        unique_hi: u32,
        mem_sizes: u32,
        part_info: u32,
    ) -> Result<Self> {
        let family = (part_info >> 16 & 0xFF) as u8;
        if family == 0 {
            return Err(Error::LockedDevice);
        }

        let code = (mem_info >> 24 & 0xFF) as u8;
        let page_size = page_size_from_code(code)
            .filter(|ps| (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(ps))
            .ok_or(Error::InvalidPageSizeCode { code })?;

        Ok(DeviceInfo {
            page_size,
            unique_id: (unique_hi as u64) << 32 | unique_lo as u64,
            flash_size_kb: (mem_sizes & 0xFFFF) as u16,
            ram_size_kb: (mem_sizes >> 16 & 0xFFFF) as u16,
            part_number: (part_info & 0xFFFF) as u16,
            family,
            prod_rev: (part_info >> 24 & 0xFF) as u8,
        })
    }

    /// Family table entry for this part, if the family is known
    pub fn family_info(&self) -> Option<&'static Family> {
        Family::lookup(self.family)
    }

    /// Full part name, e.g. "EFM32GG990F1024 (Giant Gecko)"
    ///
    /// Unknown families fall back to the raw family id.
    #[cfg(feature = "alloc")]
    pub fn part_name(&self) -> String {
        match self.family_info() {
            Some(family) => format!(
                "EFM32{}{}F{} ({})",
                family.code, self.part_number, self.flash_size_kb, family.name
            ),
            None => format!(
                "unknown family {} part {}",
                self.family, self.part_number
            ),
        }
    }

    /// Main flash size in bytes
    pub fn flash_size(&self) -> u32 {
        self.flash_size_kb as u32 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_codes() {
        assert_eq!(page_size_from_code(0), Some(1024));
        assert_eq!(page_size_from_code(1), Some(2048));
        assert_eq!(page_size_from_code(2), Some(4096));
        // 255 + 10 wraps mod 256 to an exponent of 9
        assert_eq!(page_size_from_code(255), Some(512));
        // exponent 32 and beyond does not fit a u32 size
        assert_eq!(page_size_from_code(22), None);
        assert_eq!(page_size_from_code(100), None);
    }

    #[test]
    fn test_decode_giant_gecko() {
        // Page size code 2 (4096 B), 1 MB flash, 128 kB RAM, GG990 rev 1
        let info = DeviceInfo::decode(
            0x02FF_FFFF,
            0x89AB_CDEF,
            0x0123_4567,
            (128 << 16) | 1024,
            (1 << 24) | (72 << 16) | 990,
        )
        .unwrap();

        assert_eq!(info.page_size, 4096);
        assert_eq!(info.unique_id, 0x0123_4567_89AB_CDEF);
        assert_eq!(info.flash_size_kb, 1024);
        assert_eq!(info.ram_size_kb, 128);
        assert_eq!(info.part_number, 990);
        assert_eq!(info.family, 72);
        assert_eq!(info.prod_rev, 1);
        assert_eq!(info.flash_size(), 1024 * 1024);
    }

    #[test]
    #[cfg(feature = "alloc")]
    fn test_part_names() {
        let info = DeviceInfo::decode(
            0x02FF_FFFF,
            0,
            0,
            (128 << 16) | 1024,
            (1 << 24) | (72 << 16) | 990,
        )
        .unwrap();
        assert_eq!(info.part_name(), "EFM32GG990F1024 (Giant Gecko)");

        let info = DeviceInfo::decode(0, 0, 0, 64, (42 << 16) | 7).unwrap();
        assert_eq!(info.part_name(), "unknown family 42 part 7");
    }

    #[test]
    fn test_decode_locked_device() {
        // A locked part reads back zeros: family 0 is the designated signal
        let err = DeviceInfo::decode(0, 0, 0, 0, 0).unwrap_err();
        assert_eq!(err, Error::LockedDevice);
    }

    #[test]
    fn test_decode_rejects_implausible_page_size() {
        // Code 10 would decode to 2^20 = 1 MB pages
        let err = DeviceInfo::decode(
            10 << 24,
            0,
            0,
            128,
            (71 << 16) | 890,
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidPageSizeCode { code: 10 });
    }

    #[test]
    fn test_unknown_family_is_not_an_error() {
        let info = DeviceInfo::decode(0, 0, 0, 64, (42 << 16) | 7).unwrap();
        assert_eq!(info.family, 42);
        assert!(info.family_info().is_none());
    }
}
