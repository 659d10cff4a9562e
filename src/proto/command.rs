use std::fmt;
use std::time::Duration;

/// Pause owed to the device after a mutating command. The firmware applies
/// a setting asynchronously and drops commands that arrive while it is busy.
pub const SETTLE_TIME: Duration = Duration::from_millis(50);

/// Front panel memory slot, 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySlot(u8);

impl MemorySlot {
    pub fn new(slot: u8) -> Option<Self> {
        (1..=5).contains(&slot).then_some(Self(slot))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for MemorySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Idn,
    // Output limits
    SetCurrentLimit(String),
    SetVoltageLimit(String),
    // Switches
    SetOutput(bool),
    SetOvercurrentProtection(bool),
    // Memory slots
    Save(MemorySlot),
    Recall(MemorySlot),
    // Queries
    Status,
    GetVoltageSetpoint,
    GetCurrentSetpoint,
    GetOutputVoltage,
    GetOutputCurrent,
}

impl Command {
    /// Wire name of the command, without argument or terminator.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Command::Idn => "*IDN?",
            Command::SetCurrentLimit(_) => "ISET1",
            Command::SetVoltageLimit(_) => "VSET1",
            Command::SetOutput(_) => "OUT",
            Command::SetOvercurrentProtection(_) => "OCP",
            Command::Save(_) => "SAV",
            Command::Recall(_) => "RCL",
            Command::Status => "STATUS?",
            Command::GetVoltageSetpoint => "VSET1?",
            Command::GetCurrentSetpoint => "ISET1?",
            Command::GetOutputVoltage => "VOUT1?",
            Command::GetOutputCurrent => "IOUT1?",
        }
    }

    /// Delay to wait after sending this command.
    ///
    /// Only mutating commands need the settle pause; queries are answered
    /// immediately and the caller reads the response right away.
    pub fn settle_time(&self) -> Duration {
        match self {
            Command::SetCurrentLimit(_)
            | Command::SetVoltageLimit(_)
            | Command::SetOutput(_)
            | Command::SetOvercurrentProtection(_)
            | Command::Save(_)
            | Command::Recall(_) => SETTLE_TIME,
            Command::Idn
            | Command::Status
            | Command::GetVoltageSetpoint
            | Command::GetCurrentSetpoint
            | Command::GetOutputVoltage
            | Command::GetOutputCurrent => Duration::ZERO,
        }
    }

    /// Whether the device answers this command at all.
    pub fn expects_response(&self) -> bool {
        match self {
            Command::SetCurrentLimit(_)
            | Command::SetVoltageLimit(_)
            | Command::SetOutput(_)
            | Command::SetOvercurrentProtection(_)
            | Command::Save(_)
            | Command::Recall(_) => false,
            Command::Idn
            | Command::Status
            | Command::GetVoltageSetpoint
            | Command::GetCurrentSetpoint
            | Command::GetOutputVoltage
            | Command::GetOutputCurrent => true,
        }
    }
}
