//! Application-level context owning both registries and the clock.

use hal::gpio::GpioBackend;
use hal::spi::SpiBackend;
use hal::timer::MonotonicSource;
use log::{debug, warn};

use crate::clock::Clock;
use crate::config::WiringConfig;
use crate::error::WiringError;
use crate::gpio::GpioRegistry;
use crate::spi::SpiRegistry;

/// What a teardown sweep did
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub lines_released: usize,
    pub devices_closed: usize,
    pub failures: Vec<WiringError>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One GPIO registry, one SPI registry and one clock
///
/// Independent contexts do not share state, so several can live side by side.
/// [`shutdown`](Self::shutdown) releases every line and closes every device
/// once; dropping a context that was never shut down runs the same sweep.
pub struct Wiring<G, S, C>
where
    G: GpioBackend,
    S: SpiBackend,
    C: MonotonicSource,
{
    gpio: GpioRegistry<G>,
    spi: SpiRegistry<S>,
    clock: Clock<C>,
    shut_down: bool,
}

impl<G, S, C> Wiring<G, S, C>
where
    G: GpioBackend,
    S: SpiBackend,
    C: MonotonicSource,
{
    pub fn new(config: &WiringConfig, gpio: G, spi: S, clock: C) -> Self {
        Self {
            gpio: GpioRegistry::new(gpio, config.consumer.clone()),
            spi: SpiRegistry::new(spi, config.dev_root.clone()),
            clock: Clock::new(clock),
            shut_down: false,
        }
    }

    pub fn gpio(&self) -> &GpioRegistry<G> {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut GpioRegistry<G> {
        &mut self.gpio
    }

    pub fn spi(&self) -> &SpiRegistry<S> {
        &self.spi
    }

    pub fn spi_mut(&mut self) -> &mut SpiRegistry<S> {
        &mut self.spi
    }

    pub fn clock(&self) -> &Clock<C> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock<C> {
        &mut self.clock
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Releases all lines and closes all devices. Only the first call sweeps;
    /// later calls return an empty report.
    pub fn shutdown(&mut self) -> TeardownReport {
        if self.shut_down {
            return TeardownReport::default();
        }
        self.shut_down = true;

        let lines = self.gpio.release_all();
        let devices = self.spi.close_all();
        let mut report = TeardownReport {
            lines_released: lines.removed,
            devices_closed: devices.removed,
            failures: lines.failures,
        };
        report.failures.extend(devices.failures);
        debug!(
            "teardown: {} line(s), {} device(s), {} failure(s)",
            report.lines_released,
            report.devices_closed,
            report.failures.len()
        );
        report
    }
}

impl<G, S, C> Drop for Wiring<G, S, C>
where
    G: GpioBackend,
    S: SpiBackend,
    C: MonotonicSource,
{
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        let report = self.shutdown();
        for err in &report.failures {
            warn!("teardown on drop: {err}");
        }
    }
}

#[cfg(feature = "linux")]
mod linux {
    use hal_linux::{CdevGpio, RawMonotonic, Spidev};

    use super::Wiring;
    use crate::config::WiringConfig;

    /// Context backed by the kernel's GPIO, spidev and monotonic clock
    pub type LinuxWiring = Wiring<CdevGpio, Spidev, RawMonotonic>;

    impl LinuxWiring {
        pub fn linux(config: &WiringConfig) -> Self {
            Self::new(
                config,
                CdevGpio::new(config.dev_root.clone()),
                Spidev,
                RawMonotonic,
            )
        }
    }
}

#[cfg(feature = "linux")]
pub use linux::LinuxWiring;
