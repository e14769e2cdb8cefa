//! AAP device-erase (debug unlock) behavior against the simulated target

use geckoflash_core::aap;
use geckoflash_core::error::Error;
use geckoflash_core::flash::FlashController;
use geckoflash_core::target;
use geckoflash_sim::{SimConfig, SimTarget};

fn locked_sim(aap_busy_polls: u32) -> SimTarget {
    SimTarget::new(SimConfig {
        locked: true,
        aap_busy_polls,
        ..SimConfig::default()
    })
}

#[test]
fn read_idr_returns_jedec_id() {
    let mut sim = locked_sim(0);
    let idr = aap::read_idr(&mut sim, &target::EFM32).unwrap();
    assert_eq!(idr, 0x16E6_0001);
}

#[test]
fn unlock_succeeds_within_budget() {
    let mut sim = locked_sim(3);
    aap::device_erase(&mut sim, &target::EFM32, aap::DEFAULT_TIMEOUT_MS).unwrap();

    assert!(!sim.is_locked());
    // Busy cleared on the fourth status read, after three 100 ms waits
    assert_eq!(sim.aap_status_reads(), 4);
    assert_eq!(sim.slept_ms(), 300);
    // The re-arm + reset + invalidate tail ran exactly once
    assert_eq!(sim.aap_reset_writes(), 1);
    // Mass erase left the array blank
    assert!(sim.flash().iter().all(|&b| b == 0xFF));
}

#[test]
fn unlock_times_out_when_busy_never_clears() {
    let mut sim = locked_sim(u32::MAX);
    let err = aap::device_erase(&mut sim, &target::EFM32, 500).unwrap_err();

    assert_eq!(err, Error::EraseTimeout { waited_ms: 500 });
    // The full budget was consumed before giving up
    assert_eq!(sim.slept_ms(), 500);
    // No re-arm writes were issued; the device stays locked
    assert_eq!(sim.aap_reset_writes(), 0);
    assert!(sim.is_locked());
}

#[test]
fn unlock_then_identify_recovers_a_locked_part() {
    let mut sim = locked_sim(2);

    // Identification on a locked part is the designated failure
    {
        let mut ctrl = FlashController::new(&mut sim);
        assert_eq!(ctrl.identify().unwrap_err(), Error::LockedDevice);
    }

    aap::device_erase(&mut sim, &target::EFM32, aap::DEFAULT_TIMEOUT_MS).unwrap();

    let mut ctrl = FlashController::new(&mut sim);
    let info = ctrl.identify().unwrap();
    assert_eq!(info.family, 71);
}
