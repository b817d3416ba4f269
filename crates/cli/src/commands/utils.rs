use std::fmt;
use tally_core::VerificationError;

#[derive(Debug)]
pub enum CliError {
    Config(String),
    Verification(String),
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Verification(msg) => write!(f, "Verification failed: {msg}"),
            Self::General(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::General(error.to_string())
    }
}

impl From<VerificationError> for CliError {
    fn from(error: VerificationError) -> Self {
        let mut message = error.to_string();
        if let Some(report) = error.report() {
            for failure in &report.failures {
                message.push_str(&format!("\n  {}: {}", failure.endpoint, failure.reason));
            }
        }
        Self::Verification(message)
    }
}

pub type CliResult<T> = Result<T, CliError>;

pub fn print_success(message: &str) {
    println!("[SUCCESS] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn print_info(message: &str) {
    println!("[INFO] {message}");
}

/// Writes `value` to stdout as pretty JSON.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
