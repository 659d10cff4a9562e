//! One-shot control sessions.
//!
//! A [`Request`] collects everything a single invocation wants done. The
//! session opens the port, verifies the identity and applies the settings
//! in a fixed order before the optional status readout.

use crate::device::Device;
use crate::proto::command::MemorySlot;
use crate::proto::response::{Ident, Status};
use crate::proto::Result;

/// Work order for one session. Unset fields are skipped.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub device: String,
    pub baudrate: u32,
    pub current_limit: Option<String>,
    pub voltage_limit: Option<String>,
    pub output: Option<bool>,
    pub ocp: Option<bool>,
    pub save_slot: Option<MemorySlot>,
    pub recall_slot: Option<MemorySlot>,
    pub report_status: bool,
    /// Skip the identity check and talk to whatever answers.
    pub accept_unknown: bool,
}

/// Snapshot of the panel state, taken after all settings are applied.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: Status,
    pub voltage_setpoint: String,
    pub current_setpoint: String,
    pub output_voltage: String,
    pub output_current: String,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub ident: Ident,
    pub status: Option<StatusReport>,
}

/// Runs a full session against the port named in the request.
pub async fn run(request: &Request) -> Result<Summary> {
    let device = Device::new(&request.device, request.baudrate)?;
    run_with(device, request).await
}

async fn run_with(mut device: Device, request: &Request) -> Result<Summary> {
    let ident = device.ident().await?.validate(request.accept_unknown)?;

    // Fixed apply order. A recalled slot overrides settings written
    // earlier in the same run.
    if let Some(amps) = &request.current_limit {
        device.set_current_limit(amps).await?;
    }
    if let Some(volts) = &request.voltage_limit {
        device.set_voltage_limit(volts).await?;
    }
    if let Some(on) = request.output {
        device.set_output(on).await?;
    }
    if let Some(on) = request.ocp {
        device.set_overcurrent_protection(on).await?;
    }
    if let Some(slot) = request.save_slot {
        device.save_settings(slot).await?;
    }
    if let Some(slot) = request.recall_slot {
        device.recall_settings(slot).await?;
    }

    let status = if request.report_status {
        Some(report(&mut device).await?)
    } else {
        None
    };

    Ok(Summary { ident, status })
}

async fn report(device: &mut Device) -> Result<StatusReport> {
    let status = device.status().await?;
    let voltage_setpoint = device.voltage_setpoint().await?;
    let current_setpoint = device.current_setpoint().await?;
    let output_voltage = device.output_voltage().await?;
    let output_current = device.output_current().await?;

    Ok(StatusReport {
        status,
        voltage_setpoint,
        current_setpoint,
        output_voltage,
        output_current,
    })
}
