use std::fmt;

#[derive(Debug)]
pub enum ExtractError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero window, negative tolerance, etc.).
    ConfigValidation(String),
    /// CSV read error while loading a table.
    Csv(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Csv(msg) => write!(f, "csv error: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}
