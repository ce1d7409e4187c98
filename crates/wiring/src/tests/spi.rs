use std::path::PathBuf;

use hal::mock::{KernelSpiConfig, SpiFailure};
use hal::spi::{SpiMode, TransferParams};

use super::rig;
use crate::error::{AcquireStage, ConfigStage, ErrorKind, IoOp, WiringError};

#[test]
fn configure_applies_and_records_the_kernel_settings() {
    let mut rig = rig();
    rig.io.spi_mut().configure(0, 1, 500_000, 2).unwrap();

    let config = rig.io.spi().config(0, 1).unwrap();
    assert_eq!(config.path, PathBuf::from("/dev/spidev0.1"));
    assert_eq!(config.mode, SpiMode::Mode2);
    assert_eq!(config.params, TransferParams::with_speed(500_000));

    assert_eq!(
        rig.spi.kernel_config("/dev/spidev0.1"),
        Some(KernelSpiConfig {
            mode: Some(SpiMode::Mode2),
            bits_per_word: Some(8),
            max_speed_hz: Some(500_000),
        })
    );
}

#[test]
fn mode_keeps_only_its_low_two_bits() {
    let mut rig = rig();
    for raw in [4u8, 5, 6, 7, 0x83, 255] {
        rig.io.spi_mut().configure(1, 0, 1_000_000, raw).unwrap();
        let applied = rig.io.spi().config(1, 0).unwrap().mode;
        assert_eq!(applied.bits(), raw & 3, "mode {raw}");
        assert_eq!(
            rig.spi.kernel_config("/dev/spidev1.0").and_then(|cfg| cfg.mode),
            Some(SpiMode::from_bits(raw))
        );
    }
}

#[test]
fn configure_default_uses_mode_zero() {
    let mut rig = rig();
    rig.io.spi_mut().configure_default(0, 0, 250_000).unwrap();
    assert_eq!(rig.io.spi().config(0, 0).unwrap().mode, SpiMode::Mode0);
}

#[test]
fn reconfigure_replaces_entry_and_closes_stale_handle() {
    let mut rig = rig();
    let spi = rig.io.spi_mut();
    spi.configure(0, 0, 100_000, 0).unwrap();
    spi.configure(0, 0, 8_000_000, 3).unwrap();

    let config = spi.config(0, 0).unwrap();
    assert_eq!(config.mode, SpiMode::Mode3);
    assert_eq!(config.params.speed_hz, 8_000_000);
    assert_eq!(spi.len(), 1);

    assert_eq!(rig.spi.open_handles_for("/dev/spidev0.0"), 1);
    assert_eq!(rig.spi.closes(), vec![PathBuf::from("/dev/spidev0.0")]);
}

#[test]
fn each_setup_step_fails_distinctly_and_closes_the_handle() {
    let cases = [
        (SpiFailure::Mode, ConfigStage::Mode, -3),
        (SpiFailure::BitsPerWord, ConfigStage::BitsPerWord, -4),
        (SpiFailure::Speed, ConfigStage::MaxSpeed, -5),
    ];
    for (failure, expected, code) in cases {
        let mut rig = rig();
        rig.spi.fail("/dev/spidev0.0", failure);

        let err = rig.io.spi_mut().configure(0, 0, 1_000, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.code(), code);
        assert!(matches!(err, WiringError::Configuration { stage, .. } if stage == expected));

        assert!(!rig.io.spi().is_configured(0, 0));
        assert_eq!(rig.spi.open_handles(), 0);
    }
}

#[test]
fn open_failures_store_nothing() {
    let mut rig = rig();
    let err = rig.io.spi_mut().configure(3, 3, 1_000, 0).unwrap_err();
    assert!(matches!(
        err,
        WiringError::Acquisition {
            stage: AcquireStage::DeviceOpen,
            ..
        }
    ));
    assert_eq!(err.code(), -2);
    assert!(rig.io.spi().is_empty());
}

#[test]
fn failed_reconfigure_keeps_the_previous_device() {
    let mut rig = rig();
    rig.io.spi_mut().configure(0, 1, 100_000, 1).unwrap();
    rig.spi.fail("/dev/spidev0.1", SpiFailure::Speed);

    assert!(rig.io.spi_mut().configure(0, 1, 200_000, 1).is_err());
    assert_eq!(rig.io.spi().config(0, 1).unwrap().params.speed_hz, 100_000);
    assert_eq!(rig.spi.open_handles_for("/dev/spidev0.1"), 1);
}

#[test]
fn transfer_is_full_duplex_in_place() {
    let mut rig = rig();
    rig.io.spi_mut().configure(0, 0, 500_000, 0).unwrap();
    rig.spi.reply("/dev/spidev0.0", &[0xEF, 0x40, 0x18, 0x00]);

    let mut buf = [0x9F, 0x00, 0x00, 0x00];
    let count = rig.io.spi_mut().transfer(0, 0, &mut buf).unwrap();
    assert_eq!(count, 4);
    assert_eq!(buf, [0xEF, 0x40, 0x18, 0x00]);

    let transfers = rig.spi.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].tx, vec![0x9F, 0x00, 0x00, 0x00]);
    assert_eq!(transfers[0].params, TransferParams::with_speed(500_000));
}

#[test]
fn transfer_uses_the_latest_configuration() {
    let mut rig = rig();
    let spi = rig.io.spi_mut();
    spi.configure(0, 0, 500_000, 0).unwrap();
    spi.configure(0, 0, 2_000_000, 0).unwrap();
    spi.transfer(0, 0, &mut [1, 2]).unwrap();

    assert_eq!(rig.spi.transfers()[0].params.speed_hz, 2_000_000);
}

#[test]
fn transfer_failures() {
    let mut rig = rig();
    let err = rig.io.spi_mut().transfer(0, 0, &mut [0; 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotRegistered);

    rig.io.spi_mut().configure(0, 0, 500_000, 0).unwrap();
    rig.spi.fail("/dev/spidev0.0", SpiFailure::Transfer);
    let err = rig.io.spi_mut().transfer(0, 0, &mut [0; 2]).unwrap_err();
    assert!(matches!(err, WiringError::Io { op: IoOp::Transfer, .. }));
}

#[test]
fn close_then_transfer_is_not_registered() {
    let mut rig = rig();
    let spi = rig.io.spi_mut();
    spi.configure(0, 0, 500_000, 0).unwrap();
    spi.close(0, 0).unwrap();

    assert_eq!(
        spi.transfer(0, 0, &mut [0; 4]).unwrap_err().kind(),
        ErrorKind::NotRegistered
    );
    assert_eq!(spi.close(0, 0).unwrap_err().kind(), ErrorKind::NotRegistered);
    assert_eq!(rig.spi.open_handles(), 0);
}

#[test]
fn close_failure_is_reported_and_entry_is_gone() {
    let mut rig = rig();
    rig.io.spi_mut().configure(1, 0, 500_000, 0).unwrap();
    rig.spi.fail("/dev/spidev1.0", SpiFailure::Close);

    let err = rig.io.spi_mut().close(1, 0).unwrap_err();
    assert!(matches!(err, WiringError::Io { op: IoOp::Close, .. }));
    assert_eq!(err.code(), -2);
    assert!(!rig.io.spi().is_configured(1, 0));
}
