use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardError {
    #[error(
        "overlap of {overlap} equals or exceeds the chunk size of {chunk}. \
        Try fewer threads; a large margin or an excessively large STS in \
        the catalog can also cause this"
    )]
    OverlapExceedsChunk { overlap: usize, chunk: usize },

    #[error("failed to build the worker thread pool")]
    BuildThreadPool(#[source] rayon::ThreadPoolBuildError),
}
