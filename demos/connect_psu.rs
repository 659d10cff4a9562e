use kd3005ctl::{Device, DEFAULT_BAUDRATE, DEFAULT_TTY};

#[tokio::main]
async fn main() -> kd3005ctl::Result<()> {
    let mut device = Device::new(DEFAULT_TTY, DEFAULT_BAUDRATE)?;
    eprintln!("Connected to: {}\n", device.ident().await?);
    Ok(())
}
