#![deny(clippy::unwrap_used)]

use clap::builder::BoolishValueParser;
use clap::{arg, command, value_parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::io::{ErrorKind, IsTerminal};
use std::path::PathBuf;
use std::process::exit;

use kd3005ctl::proto::command::MemorySlot;
use kd3005ctl::proto::response::OutputMode;
use kd3005ctl::proto::ProtoError;
use kd3005ctl::session::{self, Request, StatusReport};
use kd3005ctl::{DEFAULT_BAUDRATE, DEFAULT_TTY};

// Usage mistakes and a failed identity check share clap's own usage code,
// so scripts can tell "wrong device or bad arguments" from "device
// unreachable".
const EXIT_USAGE: i32 = 2;
const EXIT_COMM: i32 = 1;

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const MAGENTA: &str = "\x1b[95m";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

/// The firmware takes limit values as plain decimal text, e.g. "5.00".
fn decimal_value(s: &str) -> Result<String, String> {
    let plain = s.chars().all(|c| c.is_ascii_digit() || c == '.');
    let dots = s.chars().filter(|c| *c == '.').count();
    if plain && dots <= 1 && s.chars().any(|c| c.is_ascii_digit()) {
        Ok(s.to_string())
    } else {
        Err(format!("'{}' is not a plain decimal value", s))
    }
}

#[tokio::main]
async fn main() {
    let matches = command!() // requires `cargo` feature
        .arg(
            arg!(
                -p --device <PORT> "Serial port of the power supply"
            )
            .default_value(DEFAULT_TTY)
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(
                -b --baudrate <BAUDRATE> "Baudrate"
            )
            .default_value(DEFAULT_BAUDRATE.to_string())
            .required(false)
            .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(
                -I --current <AMPS> "Set the maximum output current, e.g. 1.000"
            )
            .required(false)
            .value_parser(decimal_value),
        )
        .arg(
            arg!(
                -U --voltage <VOLTS> "Set the maximum output voltage, e.g. 5.00"
            )
            .required(false)
            .value_parser(decimal_value),
        )
        .arg(
            arg!(
                -o --output <STATE> "Switch the output on or off"
            )
            .required(false)
            .value_parser(BoolishValueParser::new()),
        )
        .arg(
            arg!(
                -O --ocp <STATE> "Switch over-current protection on or off"
            )
            .required(false)
            .value_parser(BoolishValueParser::new()),
        )
        .arg(
            arg!(
                -S --save <SLOT> "Store the panel settings in a memory slot"
            )
            .required(false)
            .value_parser(value_parser!(u8).range(1..=5)),
        )
        .arg(
            arg!(
                -R --recall <SLOT> "Restore the panel settings from a memory slot"
            )
            .required(false)
            .value_parser(value_parser!(u8).range(1..=5)),
        )
        .arg(arg!(
            -s --status "Print the status line after all settings are applied"
        ))
        .arg(arg!(
            -v --ident "Print the device identification line"
        ))
        .arg(arg!(
            -f --force "Talk to an unrecognized device anyway"
        ))
        .arg(arg!(
            -d --debug ... "Turn debugging information on"
        ))
        .get_matches();

    let level = match matches.get_count("debug") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .expect("Logger init");

    let request = build_request(&matches);

    match session::run(&request).await {
        Ok(summary) => {
            if matches.get_flag("ident") {
                println!("device identified as: {}", summary.ident);
            }
            if let Some(report) = &summary.status {
                print_status(report);
            }
        }
        Err(ProtoError::Serial(err)) => {
            if err.kind() == tokio_serial::ErrorKind::NoDevice
                || matches!(err.kind(), tokio_serial::ErrorKind::Io(ErrorKind::NotFound))
            {
                eprintln!("{}: File not found", request.device);
            } else {
                eprintln!("I/O Error: {} [device: {}]", err, request.device);
            }
            exit(EXIT_COMM);
        }
        Err(err @ ProtoError::UnrecognizedDevice(_)) => {
            eprintln!("error: {}", err);
            exit(EXIT_USAGE);
        }
        Err(err) => {
            eprintln!("{}", err);
            exit(EXIT_COMM);
        }
    }
}

fn build_request(matches: &clap::ArgMatches) -> Request {
    let device = matches
        .get_one::<PathBuf>("device")
        .expect("Requires device parameter")
        .to_string_lossy()
        .to_string();
    let baudrate = *matches
        .get_one::<u32>("baudrate")
        .unwrap_or(&DEFAULT_BAUDRATE);

    Request {
        device,
        baudrate,
        current_limit: matches.get_one::<String>("current").cloned(),
        voltage_limit: matches.get_one::<String>("voltage").cloned(),
        output: matches.get_one::<bool>("output").copied(),
        ocp: matches.get_one::<bool>("ocp").copied(),
        save_slot: matches
            .get_one::<u8>("save")
            .copied()
            .and_then(MemorySlot::new),
        recall_slot: matches
            .get_one::<u8>("recall")
            .copied()
            .and_then(MemorySlot::new),
        report_status: matches.get_flag("status"),
        accept_unknown: matches.get_flag("force"),
    }
}

fn print_status(report: &StatusReport) {
    let color = std::io::stdout().is_terminal();
    let (red, green, magenta, cyan, reset) = if color {
        (RED, GREEN, MAGENTA, CYAN, RESET)
    } else {
        ("", "", "", "", "")
    };

    let on = format!("{}on{}", green, reset);
    let off = format!("{}off{}", red, reset);
    let on_off = |enabled: bool| if enabled { &on } else { &off };

    let (mode_color, mode) = match report.status.mode() {
        OutputMode::ConstantVoltage => (magenta, "voltage"),
        OutputMode::ConstantCurrent => (cyan, "current"),
    };

    println!(
        "constant {}{}{} mode, ocp {}, output {} (0x{:02x}), set to {}{}{}V / {}{}{}A, actual output: {}{}{}V / {}{}{}A",
        mode_color,
        mode,
        reset,
        on_off(report.status.ocp_enabled()),
        on_off(report.status.output_enabled()),
        report.status.raw(),
        magenta,
        report.voltage_setpoint,
        reset,
        cyan,
        report.current_setpoint,
        reset,
        magenta,
        report.output_voltage,
        reset,
        cyan,
        report.output_current,
        reset,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_decimals() {
        assert_eq!(decimal_value("5.00"), Ok("5.00".to_string()));
        assert_eq!(decimal_value("1.000"), Ok("1.000".to_string()));
        assert_eq!(decimal_value("12"), Ok("12".to_string()));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(decimal_value("").is_err());
        assert!(decimal_value(".").is_err());
        assert!(decimal_value("5,00").is_err());
        assert!(decimal_value("5.0.0").is_err());
        assert!(decimal_value("-5.00").is_err());
        assert!(decimal_value("5V").is_err());
    }
}
