//! FASTA ingest: the whole file lands in one contiguous buffer, then each
//! record is carved out with its sequence upcased and filtered down to the
//! nucleotide alphabet.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

pub mod error;
pub use error::FastaError;

/// Bytes retained from sequence lines; everything else is dropped.
/// Lowercase input is folded onto these.
pub const NUCLEOTIDE_ALPHABET: &[u8] = b"GATCNBDHKMRSVWY-";

/// One FASTA record: the whitespace-delimited label, the full description
/// line (without the leading `>`), and the cleaned sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub label: String,
    pub defline: String,
    pub seq: Vec<u8>,
}

/// Slurp and parse a whole FASTA file.
///
/// # Errors
/// Fatal when the file cannot be opened or read, when the first record
/// marker is missing, or when a `>` shows up outside the first column.
pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<FastaRecord>, FastaError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut file = File::open(path).map_err(|e| FastaError::OpenFile(display.clone(), e))?;

    let file_len = file.metadata().map(|meta| meta.len() as usize).unwrap_or(0);
    let mut text = Vec::with_capacity(file_len + 1);
    file.read_to_end(&mut text)
        .map_err(|e| FastaError::ReadFile(display.clone(), e))?;

    if text.is_empty() {
        warn!("sequence file '{display}' is empty");
    }
    parse_fasta(&text)
}

/// Parse the records out of an in-memory FASTA image.
pub fn parse_fasta(text: &[u8]) -> Result<Vec<FastaRecord>, FastaError> {
    let charmap = build_charmap();
    let mut records = Vec::new();
    let mut i = 0;

    while i < text.len() {
        if text[i] != b'>' {
            return Err(FastaError::MissingHeader);
        }
        // ---- description line
        let line_end = text[i..]
            .iter()
            .position(|&byte| byte == b'\n' || byte == b'\r')
            .map_or(text.len(), |at| i + at);
        let defline = String::from_utf8_lossy(&text[i + 1..line_end]).into_owned();
        let label = parse_label(&defline);

        let mut j = line_end;
        while j < text.len() && (text[j] == b'\n' || text[j] == b'\r') {
            j += 1;
        }

        // ---- sequence lines, up to the next record or EOF
        let mut seq = Vec::new();
        let mut prev = b'\n';
        while j < text.len() {
            let byte = text[j];
            if byte == b'>' {
                if prev != b'\n' && prev != b'\r' {
                    return Err(FastaError::StrayDefline);
                }
                break;
            }
            let mapped = charmap[byte as usize];
            if mapped != 0 {
                seq.push(mapped);
            }
            prev = byte;
            j += 1;
        }

        debug!("parsed record '{label}' ({} bases)", seq.len());
        records.push(FastaRecord { label, defline, seq });
        i = j;
    }
    Ok(records)
}

/// The record label is the first whitespace-delimited token of the
/// description, leading blanks skipped.
fn parse_label(defline: &str) -> String {
    defline
        .trim_start_matches(|c: char| c == ' ' || c == '\t')
        .split(|c: char| c == ' ' || c == '\t')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Filter-and-upcase map: alphabet bytes map onto their uppercase form
/// (from either case), everything else onto 0.
fn build_charmap() -> [u8; 256] {
    let mut charmap = [0u8; 256];
    for &byte in NUCLEOTIDE_ALPHABET {
        charmap[byte.to_ascii_uppercase() as usize] = byte.to_ascii_uppercase();
        charmap[byte.to_ascii_lowercase() as usize] = byte.to_ascii_uppercase();
    }
    charmap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_record() {
        let records = parse_fasta(b">s1 some description\nACGTacgt\nNNNN\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "s1");
        assert_eq!(records[0].defline, "s1 some description");
        assert_eq!(records[0].seq, b"ACGTACGTNNNN");
    }

    #[test]
    fn multiple_records() {
        let records = parse_fasta(b">a\nACGT\n>b\nTTTT\nGGGG\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "a");
        assert_eq!(records[0].seq, b"ACGT");
        assert_eq!(records[1].label, "b");
        assert_eq!(records[1].seq, b"TTTTGGGG");
    }

    #[test]
    fn out_of_alphabet_bytes_are_dropped() {
        // X is not part of the nucleotide alphabet: stripped at ingest.
        let records = parse_fasta(b">s\nTTTTACGTACGTXXXXGGGGTTTTAAA\n").unwrap();
        assert_eq!(records[0].seq, b"TTTTACGTACGTGGGGTTTTAAA");
        // Digits, blanks and '*' vanish the same way.
        let records = parse_fasta(b">s\nAC GT\n12NN*\n").unwrap();
        assert_eq!(records[0].seq, b"ACGTNN");
    }

    #[test]
    fn alphabet_ambiguity_codes_are_retained() {
        let records = parse_fasta(b">s\nGATCNBDHKMRSVWY-\n").unwrap();
        assert_eq!(records[0].seq, b"GATCNBDHKMRSVWY-");
    }

    #[test]
    fn crlf_terminated_records() {
        let records = parse_fasta(b">s desc\r\nACGT\r\nTTTT\r\n>t\r\nGGGG\r\n").unwrap();
        assert_eq!(records[0].label, "s");
        assert_eq!(records[0].seq, b"ACGTTTTT");
        assert_eq!(records[1].seq, b"GGGG");
    }

    #[test]
    fn missing_header_is_fatal() {
        assert!(matches!(parse_fasta(b"ACGT\n"), Err(FastaError::MissingHeader)));
    }

    #[test]
    fn stray_defline_marker_is_fatal() {
        assert!(matches!(parse_fasta(b">s\nACGT>TTTT\n"), Err(FastaError::StrayDefline)));
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_fasta(b"").unwrap().is_empty());
    }

    #[test]
    fn label_skips_leading_blanks() {
        let records = parse_fasta(b">  \t L78833 Homo sapiens BRCA1\nACGT\n").unwrap();
        assert_eq!(records[0].label, "L78833");
    }

    #[test]
    fn record_without_sequence_lines() {
        let records = parse_fasta(b">empty\n>full\nACGT\n").unwrap();
        assert_eq!(records[0].seq, b"");
        assert_eq!(records[1].seq, b"ACGT");
    }
}
