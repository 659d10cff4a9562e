//!
//! This library provides remote control of a KORAD KD3005P bench power supply.
//!
//! <br>
//!
//! # Details
//!
//! - The KD3005P enumerates as a USB CDC serial device (`/dev/ttyACM0` on
//!   most Linux systems), no adapter cable needed.
//!
//! - Basic setup and connection
//!
//!   ```no_run
//!   use kd3005ctl::{Device, DEFAULT_BAUDRATE};
//!   #[tokio::main]
//!   async fn main() -> kd3005ctl::Result<()> {
//!       let path = "/dev/ttyACM0".to_string();
//!       let mut device = Device::new(&path, DEFAULT_BAUDRATE)?;
//!       eprintln!("Connected to: {}\n", device.ident().await?);
//!       Ok(())
//!   }
//!   ```
//!
//! # Supported devices
//!
//!  * KORAD KD3005P (firmware V6.6)
//!  * Compatible rebrands (Velleman LABPS3005D and similar), with the
//!    identity check overridden
//!

pub mod device;
pub mod proto;
pub mod session;

pub use device::Device;
pub use proto::Result;

#[cfg(unix)]
pub const DEFAULT_TTY: &str = "/dev/ttyACM0";
#[cfg(windows)]
pub const DEFAULT_TTY: &str = "COM1";

/// Default baudrate of the KD3005P USB port.
pub const DEFAULT_BAUDRATE: u32 = 9600;
