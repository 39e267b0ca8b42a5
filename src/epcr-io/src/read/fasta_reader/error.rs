use thiserror::Error;

#[derive(Error, Debug)]
pub enum FastaError {
    #[error("failed to open sequence file '{0}'")]
    OpenFile(String, #[source] std::io::Error),

    #[error("failed to read sequence file '{0}'")]
    ReadFile(String, #[source] std::io::Error),

    #[error("expected '>' at the start of the sequence file")]
    MissingHeader,

    #[error("unexpected '>' encountered not at the beginning of a line")]
    StrayDefline,
}
