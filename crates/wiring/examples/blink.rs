//! Toggles one GPIO line a few times, then reads it back.
//!
//! Usage: `blink [chip] [pin]`, defaults to line 17 on gpiochip0.

use hal::gpio::PinMode;
use wiring::{delay, LinuxWiring, WiringConfig, WiringResult};

fn arg(index: usize, default: u8) -> u8 {
    std::env::args()
        .nth(index)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn main() -> WiringResult<()> {
    let chip = arg(1, 0);
    let pin = arg(2, 17);

    let config = WiringConfig::builder().consumer("blink").build();
    let mut io = LinuxWiring::linux(&config);
    io.clock_mut().init_epoch()?;

    println!("Blinking gpiochip{chip} line {pin}");
    io.gpio_mut().register(chip, pin, PinMode::Output)?;
    for i in 0..10u8 {
        io.gpio_mut().write(chip, pin, i % 2)?;
        let level = io.gpio().read(chip, pin)?;
        println!("[{:>5} ms] {:?}", io.clock().elapsed_millis(), level);
        delay(250);
    }

    let report = io.shutdown();
    println!(
        "Released {} line(s), {} failure(s)",
        report.lines_released,
        report.failures.len()
    );
    Ok(())
}
