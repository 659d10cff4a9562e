use futures::{SinkExt, StreamExt};
use std::pin::Pin;
use tokio_serial::SerialPortBuilderExt;
use tokio_util::codec::Decoder;

use super::proto::{
    codec::ProtocolCodec,
    command::Command,
    response::{Ident, Response, Status},
    ProtoError,
};
use crate::proto::command::MemorySlot;
use crate::proto::Result;

trait AsyncReadWrite<S>: futures::Sink<S> + futures::Stream {}

impl<T, S> AsyncReadWrite<S> for T where T: futures::Sink<S> + futures::Stream {}

/// Open connection to a single power supply.
#[allow(clippy::type_complexity)]
pub struct Device {
    stream: Pin<
        Box<
            dyn AsyncReadWrite<
                Command,
                Error = std::io::Error,
                Item = std::result::Result<Response, std::io::Error>,
            >,
        >,
    >,
}

impl Device {
    pub fn new(com: impl AsRef<str>, baudrate: u32) -> Result<Self> {
        let mut port = tokio_serial::new(com.as_ref(), baudrate).open_native_async()?;

        // Two controllers on one port would interleave commands.
        #[cfg(unix)]
        port.set_exclusive(true)?;

        log::debug!("Connected to {}", com.as_ref());

        let stream = ProtocolCodec::default().framed(port);

        Ok(Self {
            stream: Box::pin(stream),
        })
    }

    #[cfg(test)]
    pub fn new_faked(response_buf: Vec<u8>) -> Self {
        let stream =
            ProtocolCodec::default().framed(super::proto::fake::FakeBuffer::new(response_buf));

        Self {
            stream: Box::pin(stream),
        }
    }

    #[cfg(test)]
    pub fn new_faked_with_transcript(
        response_buf: Vec<u8>,
    ) -> (Self, super::proto::fake::Transcript) {
        let (buffer, transcript) = super::proto::fake::FakeBuffer::with_transcript(response_buf);
        let stream = ProtocolCodec::default().framed(buffer);

        (
            Self {
                stream: Box::pin(stream),
            },
            transcript,
        )
    }

    async fn transmit(&mut self, cmd: Command) -> Result<()> {
        let command = cmd.mnemonic();
        let settle = cmd.settle_time();
        self.stream
            .send(cmd)
            .await
            .map_err(|source| ProtoError::Write { command, source })?;
        if !settle.is_zero() {
            // The firmware needs a moment to latch a setting.
            tokio::time::sleep(settle).await;
        }
        Ok(())
    }

    async fn request(&mut self, cmd: Command) -> Result<Response> {
        let command = cmd.mnemonic();
        self.transmit(cmd).await?;
        match self.stream.next().await {
            Some(Ok(response)) => Ok(response),
            Some(Err(source)) => Err(ProtoError::Read { command, source }),
            None => Err(ProtoError::EndOfStream { command }),
        }
    }

    async fn reading(&mut self, cmd: Command) -> Result<String> {
        match self.request(cmd).await? {
            Response::Reading(value) => Ok(value),
            response => Err(response.into()),
        }
    }

    pub async fn ident(&mut self) -> Result<Ident> {
        match self.request(Command::Idn).await? {
            Response::Ident(ident) => Ok(ident),
            response => Err(response.into()),
        }
    }

    /// The value goes out verbatim, e.g. "1.000" for one ampere.
    pub async fn set_current_limit(&mut self, amps: impl AsRef<str>) -> Result<()> {
        self.transmit(Command::SetCurrentLimit(amps.as_ref().to_string()))
            .await
    }

    /// The value goes out verbatim, e.g. "5.00" for five volt.
    pub async fn set_voltage_limit(&mut self, volts: impl AsRef<str>) -> Result<()> {
        self.transmit(Command::SetVoltageLimit(volts.as_ref().to_string()))
            .await
    }

    pub async fn set_output(&mut self, on: bool) -> Result<()> {
        self.transmit(Command::SetOutput(on)).await
    }

    pub async fn set_overcurrent_protection(&mut self, on: bool) -> Result<()> {
        self.transmit(Command::SetOvercurrentProtection(on)).await
    }

    pub async fn save_settings(&mut self, slot: MemorySlot) -> Result<()> {
        self.transmit(Command::Save(slot)).await
    }

    pub async fn recall_settings(&mut self, slot: MemorySlot) -> Result<()> {
        self.transmit(Command::Recall(slot)).await
    }

    pub async fn status(&mut self) -> Result<Status> {
        match self.request(Command::Status).await? {
            Response::Status(status) => Ok(status),
            response => Err(response.into()),
        }
    }

    pub async fn voltage_setpoint(&mut self) -> Result<String> {
        self.reading(Command::GetVoltageSetpoint).await
    }

    pub async fn current_setpoint(&mut self) -> Result<String> {
        self.reading(Command::GetCurrentSetpoint).await
    }

    pub async fn output_voltage(&mut self) -> Result<String> {
        self.reading(Command::GetOutputVoltage).await
    }

    pub async fn output_current(&mut self) -> Result<String> {
        self.reading(Command::GetOutputCurrent).await
    }
}
