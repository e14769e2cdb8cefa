//! Target register descriptors
//!
//! All fixed register addresses and command bit patterns are part of a chip
//! family's hardware contract, so they live in data rather than in the
//! algorithms: supporting another family is a new [`TargetDescriptor`] and
//! new [`Family`] table rows, not a code change.

use bitflags::bitflags;

/// Cortex-M core debug registers, common to the whole architecture
pub mod cortex_m {
    /// Debug Halting Control and Status Register
    pub const DHCSR: u32 = 0xE000_EDF0;
    /// DHCSR write: debug key + C_DEBUGEN + C_HALT
    pub const DHCSR_HALT: u32 = 0xA05F_0003;
    /// DHCSR write: debug key + C_DEBUGEN, core running
    pub const DHCSR_RUN: u32 = 0xA05F_0000;

    /// Application Interrupt and Reset Control Register
    pub const AIRCR: u32 = 0xE000_ED0C;
    /// AIRCR write: VECTKEY + SYSRESETREQ (resets core and peripherals)
    pub const AIRCR_SYSRESETREQ: u32 = 0x05FA_0004;
}

bitflags! {
    /// MSC_WRITECMD bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MscWriteCmd: u32 {
        /// Latch the address written to MSC_ADDRB
        const LADDRIM = 1 << 0;
        /// Erase the page containing the latched address
        const ERASEPAGE = 1 << 1;
        /// Write the word in MSC_WDATA to the latched address
        const WRITETRIG = 1 << 3;
    }
}

bitflags! {
    /// MSC_WRITECTRL bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MscWriteCtrl: u32 {
        /// Enable write and erase access to the flash array
        const WREN = 1 << 0;
    }
}

bitflags! {
    /// MSC_STATUS bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MscStatus: u32 {
        /// An erase or write operation is in progress
        const BUSY = 1 << 0;
    }
}

bitflags! {
    /// AAP_CMD bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AapCmd: u32 {
        /// Erase all data and program code in the main block
        const DEVICEERASE = 1 << 0;
        /// Generate a system reset request
        const SYSRESETREQ = 1 << 1;
    }
}

bitflags! {
    /// AAP_STATUS bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AapStatus: u32 {
        /// A device erase is executing
        const ERASEBUSY = 1 << 0;
    }
}

/// Memory System Controller register addresses (memory-mapped)
#[derive(Debug, Clone, Copy)]
pub struct MscRegisters {
    /// MSC_WRITECTRL - write/erase enable
    pub writectrl: u32,
    /// MSC_WRITECMD - command strobes ([`MscWriteCmd`])
    pub writecmd: u32,
    /// MSC_ADDRB - page/word address buffer
    pub addrb: u32,
    /// MSC_WDATA - write data
    pub wdata: u32,
    /// MSC_STATUS - busy flag ([`MscStatus`])
    pub status: u32,
}

/// Device-information page word addresses (memory-mapped, read-only)
#[derive(Debug, Clone, Copy)]
pub struct DiPage {
    /// Word carrying the flash page size code in bits 31:24
    pub mem_info: u32,
    /// Low half of the 64-bit unique id
    pub unique_lo: u32,
    /// High half of the 64-bit unique id
    pub unique_hi: u32,
    /// Flash size (kB) in bits 15:0, RAM size (kB) in bits 31:16
    pub mem_sizes: u32,
    /// Part number in bits 15:0, family in 23:16, production rev in 31:24
    pub part_info: u32,
}

/// Authentication Access Port register indices (access-port space)
///
/// The AAP stays reachable while the device's memory bus is locked; it is
/// the only path for recovering a locked part.
#[derive(Debug, Clone, Copy)]
pub struct AapRegisters {
    /// Access port number the AAP answers on
    pub port: u8,
    /// AAP_CMD - command register ([`AapCmd`]), gated by the key
    pub cmd: u8,
    /// AAP_CMDKEY - command key register
    pub cmdkey: u8,
    /// AAP_STATUS - erase busy flag ([`AapStatus`])
    pub status: u8,
    /// Identification register
    pub idr: u8,
    /// Key value that arms AAP_CMD for one command
    pub cmdkey_valid: u32,
    /// Expected IDR value (JEDEC manufacturer id)
    pub idr_expected: u32,
}

/// Everything the flash algorithms need to know about one chip line
#[derive(Debug, Clone, Copy)]
pub struct TargetDescriptor {
    /// Human-readable line name
    pub name: &'static str,
    /// Base address of the flash array
    pub flash_base: u32,
    /// Flash controller registers
    pub msc: MscRegisters,
    /// Device-information page
    pub di: DiPage,
    /// Debug-unlock access port
    pub aap: AapRegisters,
}

/// EFM32 series 0 (Gecko line)
pub static EFM32: TargetDescriptor = TargetDescriptor {
    name: "EFM32",
    flash_base: 0x0000_0000,
    msc: MscRegisters {
        writectrl: 0x400C_0008,
        writecmd: 0x400C_000C,
        addrb: 0x400C_0010,
        wdata: 0x400C_0018,
        status: 0x400C_001C,
    },
    di: DiPage {
        mem_info: 0x0FE0_81E4,
        unique_lo: 0x0FE0_81F0,
        unique_hi: 0x0FE0_81F4,
        mem_sizes: 0x0FE0_81F8,
        part_info: 0x0FE0_81FC,
    },
    aap: AapRegisters {
        port: 0,
        cmd: 0x00,
        cmdkey: 0x04,
        status: 0x08,
        idr: 0xFC,
        cmdkey_valid: 0xCFAC_C118,
        idr_expected: 0x16E6_0001,
    },
};

/// One row of the part-family table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    /// Family id as reported by the DI page
    pub id: u8,
    /// Short code used in part numbers ("GG" in EFM32GG990F1024)
    pub code: &'static str,
    /// Marketing name
    pub name: &'static str,
}

/// Known EFM32 families, keyed by the DI page family id
pub static FAMILIES: &[Family] = &[
    Family { id: 71, code: "G", name: "Gecko" },
    Family { id: 72, code: "GG", name: "Giant Gecko" },
    Family { id: 73, code: "TG", name: "Tiny Gecko" },
    Family { id: 74, code: "LG", name: "Leopard Gecko" },
    Family { id: 75, code: "WG", name: "Wonder Gecko" },
];

impl Family {
    /// Look up a family by its DI page id
    pub fn lookup(id: u8) -> Option<&'static Family> {
        FAMILIES.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lookup() {
        let gg = Family::lookup(72).unwrap();
        assert_eq!(gg.code, "GG");
        assert_eq!(gg.name, "Giant Gecko");
        assert!(Family::lookup(0).is_none());
        assert!(Family::lookup(200).is_none());
    }

    #[test]
    fn test_command_bits_match_hardware() {
        // Values from the EFM32 reference manual; the sim relies on them too.
        assert_eq!(MscWriteCmd::LADDRIM.bits(), 0x1);
        assert_eq!(MscWriteCmd::ERASEPAGE.bits(), 0x2);
        assert_eq!(MscWriteCmd::WRITETRIG.bits(), 0x8);
        assert_eq!(AapCmd::DEVICEERASE.bits(), 0x1);
        assert_eq!(AapCmd::SYSRESETREQ.bits(), 0x2);
    }
}
