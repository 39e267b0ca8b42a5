use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("failed to open output file")]
    IOError(#[from] std::io::Error),
}
