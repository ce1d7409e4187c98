//! Sends a fixed frame over spidev and prints what came back.
//!
//! With MOSI wired to MISO the reply equals the frame.
//! Usage: `spi_loopback [bus] [channel] [speed_hz]`.

use wiring::{LinuxWiring, WiringConfig, WiringResult};

fn main() -> WiringResult<()> {
    let mut args = std::env::args().skip(1);
    let bus: u8 = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
    let channel: u8 = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
    let speed: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(500_000);

    let mut io = LinuxWiring::linux(&WiringConfig::default());
    io.spi_mut().configure(bus, channel, speed, 0)?;
    println!("Opened {}", io.spi().path(bus, channel).display());

    let frame = [0x9F, 0x00, 0x55, 0xAA];
    let mut buf = frame;
    let count = io.spi_mut().transfer(bus, channel, &mut buf)?;
    println!("sent     {frame:02X?}");
    println!("received {:02X?} ({count} bytes)", buf);
    if buf == frame {
        println!("loopback OK");
    }

    io.spi_mut().close(bus, channel)?;
    Ok(())
}
