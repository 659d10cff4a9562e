use kd3005ctl::proto::response::OutputMode;
use kd3005ctl::{Device, DEFAULT_BAUDRATE, DEFAULT_TTY};
use std::time::Duration;

#[tokio::main]
async fn main() -> kd3005ctl::Result<()> {
    let mut device = Device::new(DEFAULT_TTY, DEFAULT_BAUDRATE)?;
    eprintln!("Connected to: {}\n", device.ident().await?);

    loop {
        let status = device.status().await?;
        let volts = device.output_voltage().await?;
        let amps = device.output_current().await?;
        let mode = match status.mode() {
            OutputMode::ConstantVoltage => "CV",
            OutputMode::ConstantCurrent => "CC",
        };
        println!("{} {}V {}A", mode, volts, amps);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
