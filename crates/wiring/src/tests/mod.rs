mod gpio;
mod spi;

use hal::mock::{MockClock, MockGpio, MockSpi};
use hal::timer::Timestamp;

use crate::config::WiringConfig;
use crate::context::Wiring;

type TestWiring = Wiring<MockGpio, MockSpi, MockClock>;

/// A context plus handles onto the mock kernel behind it.
struct Rig {
    io: TestWiring,
    gpio: MockGpio,
    spi: MockSpi,
}

fn rig() -> Rig {
    let gpio = MockGpio::new().with_chip(0, 32).with_chip(1, 8);
    let spi = MockSpi::new()
        .with_node("/dev/spidev0.0")
        .with_node("/dev/spidev0.1")
        .with_node("/dev/spidev1.0");
    let clock = MockClock::starting_at(Timestamp::new(10, 0));
    let config = WiringConfig::builder().consumer("test-rig").build();
    Rig {
        io: Wiring::new(&config, gpio.clone(), spi.clone(), clock),
        gpio,
        spi,
    }
}
