use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to re-read the STS file at offset {0}")]
    RecoverLine(u64, #[source] std::io::Error),

    #[error("malformed STS line recovered at offset {0}")]
    MalformedLine(u64),
}
