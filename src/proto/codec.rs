use bytes::{Buf, BytesMut};
use std::{
    fmt::{self, Write},
    io::{self},
    str,
};
use tokio_util::codec::{Decoder, Encoder};

use super::response::{Ident, Response, Status};
use crate::proto::command::Command;

/// Line codec for the KD3005P. Commands go out newline-terminated; what
/// comes back depends on the command last sent, so the codec keeps it.
#[derive(Default)]
pub struct ProtocolCodec {
    last_cmd: Option<Command>,
}

impl ProtocolCodec {
    fn convert_string(payload: impl AsRef<[u8]>) -> std::io::Result<String> {
        Ok(str::from_utf8(payload.as_ref())
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?
            .to_string())
    }

    fn parse_line(cmd: &Command, payload: &[u8]) -> io::Result<Response> {
        let line = Self::convert_string(payload)?;
        let line = line.trim_end_matches(['\r', '\n']);
        log::debug!("RX: {}", line);
        match cmd {
            Command::Idn => Ok(Response::Ident(Ident::from(line))),
            Command::GetVoltageSetpoint
            | Command::GetCurrentSetpoint
            | Command::GetOutputVoltage
            | Command::GetOutputCurrent => Ok(Response::Reading(line.to_string())),
            cmd => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("unsolicited response to {}", cmd.mnemonic()),
            )),
        }
    }
}

impl Decoder for ProtocolCodec {
    type Item = Response;
    // Low level failures stay io::Error; the device layer attaches the
    // command name before anything reaches a caller.
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &self.last_cmd {
            // STATUS? answers with exactly one raw byte, no terminator.
            Some(Command::Status) => {
                if src.is_empty() {
                    return Ok(None);
                }
                let raw = src.get_u8();
                log::debug!("RX: 0x{:02x}", raw);
                Ok(Some(Response::Status(Status::from(raw))))
            }
            Some(cmd) => match src.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    let payload = src.split_to(pos + 1);
                    Self::parse_line(cmd, &payload).map(Some)
                }
                None => Ok(None),
            },
            None => panic!("No command called"),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            // The device went away mid-line; the bytes so far are the line.
            None => {
                let Some(cmd) = &self.last_cmd else {
                    panic!("No command called")
                };
                let payload = src.split_to(src.len());
                Self::parse_line(cmd, &payload).map(Some)
            }
        }
    }
}

fn write_fmt_guarded(dst: &mut BytesMut, args: fmt::Arguments<'_>) -> Result<(), io::Error> {
    dst.write_fmt(args)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

impl Encoder<Command> for ProtocolCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mark = dst.len();
        match &item {
            Command::SetCurrentLimit(amps) => {
                write_fmt_guarded(dst, format_args!("{}:{}", item.mnemonic(), amps))?
            }
            Command::SetVoltageLimit(volts) => {
                write_fmt_guarded(dst, format_args!("{}:{}", item.mnemonic(), volts))?
            }
            Command::SetOutput(on) | Command::SetOvercurrentProtection(on) => {
                write_fmt_guarded(dst, format_args!("{}{}", item.mnemonic(), u8::from(*on)))?
            }
            Command::Save(slot) | Command::Recall(slot) => {
                write_fmt_guarded(dst, format_args!("{}{}", item.mnemonic(), slot))?
            }
            Command::Idn
            | Command::Status
            | Command::GetVoltageSetpoint
            | Command::GetCurrentSetpoint
            | Command::GetOutputVoltage
            | Command::GetOutputCurrent => {
                write_fmt_guarded(dst, format_args!("{}", item.mnemonic()))?
            }
        }
        dst.write_str("\n")
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        log::debug!("TX: {}", String::from_utf8_lossy(&dst[mark..]).trim_end());
        self.last_cmd = Some(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::command::MemorySlot;

    fn encoded(cmd: Command) -> BytesMut {
        let mut codec = ProtocolCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(cmd, &mut buf).expect("encode");
        buf
    }

    fn decode_after(cmd: Command, raw: &[u8]) -> Option<Response> {
        let mut codec = ProtocolCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(cmd, &mut buf).expect("encode");
        let mut src = BytesMut::from(raw);
        codec.decode(&mut src).expect("decode")
    }

    #[test]
    fn encodes_commands_with_newline() {
        let slot = MemorySlot::new(3).expect("slot");
        assert_eq!(&encoded(Command::Idn)[..], b"*IDN?\n");
        assert_eq!(
            &encoded(Command::SetCurrentLimit("1.000".to_string()))[..],
            b"ISET1:1.000\n"
        );
        assert_eq!(
            &encoded(Command::SetVoltageLimit("5.00".to_string()))[..],
            b"VSET1:5.00\n"
        );
        assert_eq!(&encoded(Command::SetOutput(true))[..], b"OUT1\n");
        assert_eq!(&encoded(Command::SetOutput(false))[..], b"OUT0\n");
        assert_eq!(
            &encoded(Command::SetOvercurrentProtection(true))[..],
            b"OCP1\n"
        );
        assert_eq!(&encoded(Command::Save(slot))[..], b"SAV3\n");
        assert_eq!(&encoded(Command::Recall(slot))[..], b"RCL3\n");
        assert_eq!(&encoded(Command::Status)[..], b"STATUS?\n");
        assert_eq!(&encoded(Command::GetVoltageSetpoint)[..], b"VSET1?\n");
        assert_eq!(&encoded(Command::GetOutputCurrent)[..], b"IOUT1?\n");
    }

    #[test]
    fn strips_any_line_ending() {
        for raw in [&b"5.00\n"[..], &b"5.00\r\n"[..]] {
            match decode_after(Command::GetVoltageSetpoint, raw) {
                Some(Response::Reading(value)) => assert_eq!(value, "5.00"),
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn flushes_unterminated_line_at_eof() {
        let mut codec = ProtocolCodec::default();
        let mut buf = BytesMut::new();
        codec
            .encode(Command::GetVoltageSetpoint, &mut buf)
            .expect("encode");
        let mut src = BytesMut::from(&b"5.00"[..]);
        assert!(codec.decode(&mut src).expect("decode").is_none());
        match codec.decode_eof(&mut src).expect("decode_eof") {
            Some(Response::Reading(value)) => assert_eq!(value, "5.00"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(codec.decode_eof(&mut src).expect("decode_eof").is_none());
    }

    #[test]
    fn status_is_a_single_raw_byte() {
        let mut codec = ProtocolCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(Command::Status, &mut buf).expect("encode");
        let mut src = BytesMut::from(&[0x61u8, 0x41][..]);
        match codec.decode(&mut src).expect("decode") {
            Some(Response::Status(status)) => assert_eq!(status.raw(), 0x61),
            other => panic!("unexpected: {:?}", other),
        }
        // The rest of the buffer is left for the next command.
        assert_eq!(&src[..], [0x41]);
    }

    #[test]
    fn waits_for_a_complete_line() {
        let mut codec = ProtocolCodec::default();
        let mut buf = BytesMut::new();
        codec.encode(Command::Idn, &mut buf).expect("encode");
        let mut src = BytesMut::from(&b"KORAD KD30"[..]);
        assert!(codec.decode(&mut src).expect("decode").is_none());
        src.extend_from_slice(b"05P V6.6 SN:1\n");
        match codec.decode(&mut src).expect("decode") {
            Some(Response::Ident(ident)) => {
                assert_eq!(ident.to_string(), "KORAD KD3005P V6.6 SN:1")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
