use hal::gpio::{Level, PinMode};

use super::rig;
use crate::error::{AcquireStage, ErrorKind, IoOp, WiringError};
use crate::key::ResourceKey;

#[test]
fn register_then_release_leaves_nothing_behind() {
    let mut rig = rig();
    let gpio = rig.io.gpio_mut();

    gpio.register(0, 5, PinMode::Output).unwrap();
    assert!(gpio.is_registered(0, 5));
    assert!(rig.gpio.is_requested(0, 5));

    gpio.release(0, 5).unwrap();
    assert!(!gpio.is_registered(0, 5));
    assert!(!rig.gpio.is_requested(0, 5));

    let read = gpio.read(0, 5).unwrap_err();
    assert_eq!(read.kind(), ErrorKind::NotRegistered);
    let write = gpio.write(0, 5, 1).unwrap_err();
    assert_eq!(write.kind(), ErrorKind::NotRegistered);
}

#[test]
fn output_lines_start_low_with_the_consumer_label() {
    let mut rig = rig();
    rig.io.gpio_mut().register(1, 3, PinMode::Output).unwrap();

    assert_eq!(rig.gpio.level(1, 3), Some(Level::Low));
    assert_eq!(rig.gpio.requested_mode(1, 3), Some(PinMode::Output));
    assert_eq!(rig.gpio.consumer(1, 3).as_deref(), Some("test-rig"));
    assert_eq!(rig.io.gpio().mode(1, 3), Some(PinMode::Output));
    assert_eq!(
        rig.io.gpio().entry(1, 3).map(|entry| entry.chip_label().to_owned()),
        Some("mock-chip1".to_owned())
    );
}

#[test]
fn write_then_read_returns_normalised_level() {
    let mut rig = rig();
    let gpio = rig.io.gpio_mut();
    gpio.register(0, 7, PinMode::Output).unwrap();

    for state in [0u8, 1, 2, 0x7F, 0x80, 255, 0] {
        gpio.write(0, 7, state).unwrap();
        let expected = if state == 0 { Level::Low } else { Level::High };
        assert_eq!(gpio.read(0, 7).unwrap(), expected, "state {state}");
    }
}

#[test]
fn input_lines_follow_the_pin() {
    let mut rig = rig();
    rig.gpio.drive(0, 2, 1);
    rig.io.gpio_mut().register(0, 2, PinMode::Input).unwrap();
    assert_eq!(rig.io.gpio().read(0, 2).unwrap(), Level::High);

    rig.gpio.drive(0, 2, 0);
    assert_eq!(rig.io.gpio().read(0, 2).unwrap(), Level::Low);
}

#[test]
fn unknown_keys_fail_without_creating_entries() {
    let mut rig = rig();
    let gpio = rig.io.gpio_mut();

    assert!(matches!(
        gpio.read(0, 9),
        Err(WiringError::NotRegistered(key)) if key == ResourceKey::new(0, 9)
    ));
    assert!(matches!(gpio.write(0, 9, 1), Err(WiringError::NotRegistered(_))));
    assert!(matches!(gpio.release(0, 9), Err(WiringError::NotRegistered(_))));
    assert!(gpio.is_empty());
    assert_eq!(rig.gpio.chip_opens(), 0);
}

#[test]
fn each_acquisition_step_fails_distinctly() {
    let mut rig = rig();
    rig.gpio.reject_requests(0, 1);

    let stage = |err: WiringError| match err {
        WiringError::Acquisition { stage, .. } => stage,
        other => panic!("unexpected error {other:?}"),
    };

    let gpio = rig.io.gpio_mut();
    assert_eq!(
        stage(gpio.register(9, 0, PinMode::Input).unwrap_err()),
        AcquireStage::ChipOpen
    );
    assert_eq!(
        stage(gpio.register(1, 200, PinMode::Input).unwrap_err()),
        AcquireStage::LineGet
    );
    assert_eq!(
        stage(gpio.register(0, 1, PinMode::Input).unwrap_err()),
        AcquireStage::InputRequest
    );
    assert_eq!(
        stage(gpio.register(0, 1, PinMode::Output).unwrap_err()),
        AcquireStage::OutputRequest
    );
    assert!(gpio.is_empty());
    assert_eq!(rig.gpio.requested_count(), 0);
}

#[test]
fn registering_a_busy_line_keeps_the_live_entry() {
    let mut rig = rig();
    let gpio = rig.io.gpio_mut();
    gpio.register(0, 4, PinMode::Output).unwrap();
    gpio.write(0, 4, 1).unwrap();

    let err = gpio.register(0, 4, PinMode::Input).unwrap_err();
    assert_eq!(err.code(), -4);
    assert_eq!(gpio.mode(0, 4), Some(PinMode::Output));
    assert_eq!(gpio.read(0, 4).unwrap(), Level::High);
}

#[test]
fn rejected_reads_and_writes_are_io_faults() {
    let mut rig = rig();
    rig.io.gpio_mut().register(0, 6, PinMode::Output).unwrap();
    rig.gpio.reject_writes(0, 6);
    rig.gpio.reject_reads(0, 6);

    let gpio = rig.io.gpio_mut();
    assert!(matches!(
        gpio.write(0, 6, 1),
        Err(WiringError::Io { op: IoOp::Write, .. })
    ));
    assert!(matches!(
        gpio.read(0, 6),
        Err(WiringError::Io { op: IoOp::Read, .. })
    ));
    assert!(gpio.is_registered(0, 6));
}

#[test]
fn out_of_range_levels_are_not_returned_as_values() {
    let mut rig = rig();
    rig.io.gpio_mut().register(0, 8, PinMode::Input).unwrap();
    rig.gpio.drive(0, 8, 3);

    let err = rig.io.gpio().read(0, 8).unwrap_err();
    assert!(matches!(err, WiringError::InvalidLevel { raw: 3, .. }));
    assert_eq!(err.kind(), ErrorKind::IoFault);
}

#[test]
fn release_is_best_effort() {
    let mut rig = rig();
    rig.io.gpio_mut().register(1, 1, PinMode::Input).unwrap();
    rig.gpio.reject_releases(1, 1);

    assert!(rig.io.gpio_mut().release(1, 1).is_ok());
    assert!(!rig.io.gpio().is_registered(1, 1));
    assert!(matches!(
        rig.io.gpio_mut().release(1, 1),
        Err(WiringError::NotRegistered(_))
    ));
}

#[test]
fn keys_are_listed_in_order() {
    let mut rig = rig();
    let gpio = rig.io.gpio_mut();
    gpio.register(1, 0, PinMode::Input).unwrap();
    gpio.register(0, 31, PinMode::Input).unwrap();
    gpio.register(0, 2, PinMode::Output).unwrap();

    let keys: Vec<_> = gpio.keys().map(|key| key.packed()).collect();
    assert_eq!(keys, vec![0x0002, 0x001F, 0x0100]);
    assert_eq!(gpio.len(), 3);
}
