use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Search parameters rejected by validation (all problems, `; `-joined).
    InvalidParams(Vec<String>),
    /// Amount text that is not a decimal number.
    AmountParse { value: String },
    /// Missing required column in tabular input.
    MissingColumn { column: String },
    /// Finalizing a combination that reuses a consumed position.
    Ledger(String),
    /// Background search thread could not be started or panicked.
    Worker(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::InvalidParams(problems) => {
                write!(f, "invalid search parameters: {}", problems.join("; "))
            }
            Self::AmountParse { value } => write!(f, "cannot parse amount '{value}'"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Ledger(msg) => write!(f, "ledger error: {msg}"),
            Self::Worker(msg) => write!(f, "search worker error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<std::io::Error> for ReconError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
