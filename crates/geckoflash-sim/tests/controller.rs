//! Flash controller behavior against the simulated target

use geckoflash_core::error::Error;
use geckoflash_core::flash::{FlashController, PollConfig, ProgramOptions};
use geckoflash_core::progress::{FnProgress, NoProgress};
use geckoflash_sim::{SimConfig, SimTarget};

#[test]
fn identify_decodes_device_info() {
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);

    let info = ctrl.identify().unwrap();
    assert_eq!(info.page_size, 512);
    assert_eq!(info.flash_size_kb, 128);
    assert_eq!(info.ram_size_kb, 16);
    assert_eq!(info.part_number, 890);
    assert_eq!(info.family, 71);
    assert_eq!(info.unique_id, 0x0011_2233_4455_6677);
    assert_eq!(info.part_name(), "EFM32G890F128 (Gecko)");

    // Idempotent: a second call decodes the same thing
    assert_eq!(ctrl.identify().unwrap(), info);
    assert_eq!(ctrl.device(), Some(&info));
}

#[test]
fn identify_locked_device_fails() {
    let mut sim = SimTarget::new(SimConfig {
        locked: true,
        ..SimConfig::default()
    });
    let mut ctrl = FlashController::new(&mut sim);
    assert_eq!(ctrl.identify().unwrap_err(), Error::LockedDevice);
    assert!(ctrl.device().is_none());
}

#[test]
fn halt_twice_writes_same_pattern() {
    let mut sim = SimTarget::new_default();
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.halt().unwrap();
        ctrl.halt().unwrap();
    }
    assert_eq!(sim.dhcsr_writes(), &[0xA05F_0003, 0xA05F_0003]);
}

#[test]
fn sys_reset_hits_aircr() {
    let mut sim = SimTarget::new_default();
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.sys_reset().unwrap();
    }
    assert_eq!(sim.reset_count(), 1);
}

#[test]
fn erase_covers_final_partial_page() {
    let mut sim = SimTarget::new_default();
    let mut reports: Vec<f32> = Vec::new();
    {
        let mut ctrl = FlashController::new(&mut sim);
        let mut progress = FnProgress(|p: f32| reports.push(p));
        // 600 bytes is not a multiple of 512: the page holding the last
        // byte must be erased too.
        ctrl.erase(0, 600, Some(512), &mut progress).unwrap();
    }
    assert_eq!(sim.erased_pages(), &[0, 512]);
    assert_eq!(reports, vec![0.0, 50.0, 100.0]);
}

#[test]
fn erase_polls_busy_until_clear() {
    // The fixture answers busy twice per page, then clears: each page must
    // cost exactly busy_polls + 1 status reads.
    let mut sim = SimTarget::new(SimConfig {
        erase_busy_polls: 2,
        ..SimConfig::default()
    });
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.erase(0, 3 * 512, Some(512), &mut NoProgress).unwrap();
    }
    assert_eq!(sim.erased_pages().len(), 3);
    assert_eq!(sim.msc_status_reads(), 3 * (2 + 1));
}

#[test]
fn erase_bounded_poll_times_out() {
    let mut sim = SimTarget::new(SimConfig {
        erase_busy_polls: 10,
        ..SimConfig::default()
    });
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.set_poll_config(PollConfig {
            interval_ms: 0,
            max_polls: Some(2),
        });
        let err = ctrl.erase(0, 512, Some(512), &mut NoProgress).unwrap_err();
        assert_eq!(err, Error::PollTimeout { addr: 0 });
    }
    assert_eq!(sim.msc_status_reads(), 2);
}

#[test]
fn erase_requires_page_size_from_somewhere() {
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);
    assert_eq!(
        ctrl.erase(0, 512, None, &mut NoProgress).unwrap_err(),
        Error::NotIdentified
    );
    assert_eq!(
        ctrl.erase_all(None, &mut NoProgress).unwrap_err(),
        Error::NotIdentified
    );
}

#[test]
fn erase_rejects_bad_page_size() {
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);
    assert_eq!(
        ctrl.erase(0, 512, Some(600), &mut NoProgress).unwrap_err(),
        Error::InvalidPageSize { page_size: 600 }
    );
    assert_eq!(
        ctrl.erase(0, 512, Some(0), &mut NoProgress).unwrap_err(),
        Error::InvalidPageSize { page_size: 0 }
    );
}

#[test]
fn erase_all_covers_whole_array() {
    let mut sim = SimTarget::new_default();
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.identify().unwrap();
        ctrl.halt().unwrap();
        ctrl.erase_all(None, &mut NoProgress).unwrap();
    }
    // 128 kB of 512 B pages
    assert_eq!(sim.erased_pages().len(), 256);
    assert_eq!(sim.erased_pages()[0], 0);
    assert_eq!(*sim.erased_pages().last().unwrap(), 128 * 1024 - 512);
}

#[test]
fn program_issues_one_sequence_per_word_without_polling() {
    let words = [0xDEAD_BEEF, 0x0BAD_F00D, 0x1234_5678, 0xFFFF_0000];
    let mut sim = SimTarget::new_default();
    let mut reports: Vec<f32> = Vec::new();
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.enable_flash_writes().unwrap();
        let mut progress = FnProgress(|p: f32| reports.push(p));
        ctrl.program(16, &words, ProgramOptions::default(), &mut progress)
            .unwrap();
    }
    assert_eq!(sim.program_triggers(), 4);
    // Legacy timing contract: zero status reads between words
    assert_eq!(sim.msc_status_reads(), 0);
    // Each word landed at offset + 4*i
    for (i, word) in words.iter().enumerate() {
        let at = 16 + 4 * i;
        assert_eq!(&sim.flash()[at..at + 4], &word.to_le_bytes());
    }
    assert_eq!(reports, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn program_safe_mode_polls_each_word() {
    let words = [1, 2, 3];
    let mut sim = SimTarget::new_default();
    {
        let mut ctrl = FlashController::new(&mut sim);
        ctrl.enable_flash_writes().unwrap();
        ctrl.program(
            0,
            &words,
            ProgramOptions {
                poll_between_words: true,
            },
            &mut NoProgress,
        )
        .unwrap();
    }
    assert_eq!(sim.program_triggers(), 3);
    assert_eq!(sim.msc_status_reads(), 3);
}

#[test]
fn program_rejects_unaligned_offset() {
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);
    let err = ctrl
        .program(2, &[1], ProgramOptions::default(), &mut NoProgress)
        .unwrap_err();
    assert_eq!(err, Error::UnalignedOffset { offset: 2 });
}

#[test]
fn roundtrip_program_and_verify() {
    let words = [0xCAFE_BABE, 0x0000_0001, 0xA5A5_5A5A];
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);

    ctrl.identify().unwrap();
    ctrl.halt().unwrap();
    ctrl.erase(0, 12, None, &mut NoProgress).unwrap();
    ctrl.program(0, &words, ProgramOptions::default(), &mut NoProgress)
        .unwrap();
    ctrl.verify(0, &words, &mut NoProgress).unwrap();

    // Reading back over the bus yields byte-identical content
    let port = ctrl.port_mut();
    assert_eq!(port.flash()[..4], 0xCAFE_BABEu32.to_le_bytes());
    assert_eq!(port.flash()[8..12], 0xA5A5_5A5Au32.to_le_bytes());
}

#[test]
fn verify_reports_first_mismatch() {
    let words = [0x1111_1111, 0x2222_2222];
    let mut sim = SimTarget::new_default();
    let mut ctrl = FlashController::new(&mut sim);

    ctrl.identify().unwrap();
    ctrl.halt().unwrap();
    ctrl.erase(0, 8, None, &mut NoProgress).unwrap();
    ctrl.program(0, &words, ProgramOptions::default(), &mut NoProgress)
        .unwrap();

    ctrl.port_mut().flash_mut()[5] = 0x00;
    let err = ctrl.verify(0, &words, &mut NoProgress).unwrap_err();
    assert_eq!(
        err,
        Error::VerifyMismatch {
            addr: 4,
            expected: 0x2222_2222,
            found: 0x2222_0022,
        }
    );
}
