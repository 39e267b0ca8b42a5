use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("invalid integer value '{1}' for {0}")]
    ParseInt(&'static str, String),

    #[error("{arg} must be between {min} and {max}, inclusive")]
    OutOfRange { arg: &'static str, min: u64, max: u64 },

    #[error("{0} must be at least {1}")]
    TooSmall(&'static str, u64),
}
