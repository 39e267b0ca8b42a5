use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(
        "line {0}: the maximum STS line length ({1}) has been exceeded. \
        Rerun with S=<n>, where <n> is at least the length of the longest \
        line in the file (line terminators excluded)"
    )]
    LineTooLong(usize, usize),

    #[error("line {0}: bad STS file format (expected: id<TAB>primer<TAB>primer<TAB>size)")]
    MissingField(usize),

    #[error("line {0}: empty primer field. Make sure the STS file is tab-delimited")]
    EmptyPrimer(usize),

    #[error("line {0}: invalid PCR size value '{1}'")]
    InvalidSize(usize, String),

    #[error("failed to read the STS file")]
    Read(#[source] std::io::Error),
}
