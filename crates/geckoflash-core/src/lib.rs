//! geckoflash-core - Core library for EFM32 in-circuit flash programming
//!
//! This crate implements the microcontroller-specific side of flashing a
//! Silicon Labs EFM32 (Gecko) device over its debug port: device
//! identification, the page-erase and word-program algorithms of the MSC
//! flash controller, and the debug-unlock (mass erase) recovery sequence
//! spoken over the Authentication Access Port.
//!
//! The bit-level debug transport is not implemented here. Anything that can
//! read and write 32-bit words on the target's memory bus and its access-port
//! register space plugs in through the [`port::DebugPort`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation (firmware images)
//!
//! # Example
//!
//! ```ignore
//! use geckoflash_core::flash::FlashController;
//! use geckoflash_core::progress::NoProgress;
//!
//! fn flash_words<P: geckoflash_core::port::DebugPort>(port: P, words: &[u32]) {
//!     let mut ctrl = FlashController::new(port);
//!     let info = ctrl.identify().unwrap();
//!     println!("Found: {} ({} kB flash)", info.family, info.flash_size_kb);
//!     ctrl.halt().unwrap();
//!     ctrl.erase(0, 4 * words.len() as u32, None, &mut NoProgress).unwrap();
//!     ctrl.program(0, words, Default::default(), &mut NoProgress).unwrap();
//!     ctrl.sys_reset().unwrap();
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod aap;
pub mod device;
pub mod error;
pub mod flash;
#[cfg(feature = "alloc")]
pub mod image;
pub mod port;
pub mod progress;
pub mod target;

pub use error::{Error, Result};
