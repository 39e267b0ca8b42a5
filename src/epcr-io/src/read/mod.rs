pub mod fasta_reader;
pub use fasta_reader::{read_fasta, FastaError, FastaRecord};
