use self::response::Response;

pub mod codec;
pub mod command;
pub mod response;

#[cfg(test)]
pub mod fake;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("Serial I/O error: {:?}", _0)]
    Serial(#[from] tokio_serial::Error),

    #[error("error sending {command}: {source}")]
    Write {
        command: &'static str,
        source: std::io::Error,
    },

    #[error("error reading {command} output: {source}")]
    Read {
        command: &'static str,
        source: std::io::Error,
    },

    #[error("error reading {command} output")]
    EndOfStream { command: &'static str },

    #[error("device identified as '{}'. Unknown, aborting.", _0)]
    UnrecognizedDevice(String),

    #[error("Unexpected response: {:?}", _0)]
    Unexpected(Response),
}

impl From<Response> for ProtoError {
    fn from(value: Response) -> Self {
        Self::Unexpected(value)
    }
}

pub type Result<T> = std::result::Result<T, ProtoError>;
