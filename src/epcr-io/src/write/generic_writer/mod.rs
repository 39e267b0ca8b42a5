use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

pub mod error;
pub use error::WriterError;

/// A generic row writer.
/// - source: Boxed `BufWriter` (can either handle file-writing, or stdout).
pub struct GenericWriter<'a> {
    source: BufWriter<Box<dyn Write + 'a>>,
}

impl<'a> GenericWriter<'a> {
    /// Instantiate a new writer. `None` targets stdout.
    ///
    /// # Errors
    /// if `path` is either an invalid file, or the user does not have the
    /// proper UNIX permissions to write at this location.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<GenericWriter<'a>> {
        use WriterError::IOError;
        Ok(GenericWriter {
            source: match path {
                Some(path) => {
                    let file = File::create(path).map_err(IOError).context("while creating file")?;
                    BufWriter::new(Box::new(file))
                }
                None => BufWriter::new(Box::new(std::io::stdout())),
            },
        })
    }

    /// Write one output row, terminated with a newline.
    ///
    /// # Errors
    /// - If the row fails to get written into the file.
    pub fn write_row<T: Display>(&mut self, row: T) -> Result<()> {
        writeln!(self.source, "{row}")
            .map_err(WriterError::IOError)
            .context("while writing contents into file")
    }

    /// Flush the underlying buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.source.flush().context("while flushing buffer contents of writer")
    }
}
