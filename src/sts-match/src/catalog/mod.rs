//! STS catalog: parse the STS file and index every primer pair by the
//! 2-bit hash of a word taken from the tail of its forward primer.

use std::io::{BufRead, BufReader, Read};

use log::{debug, warn};

use crate::alphabet::{encode_word, is_ambiguous, reverse_complement};

pub mod error;
pub use error::CatalogError;

mod sts;
pub use sts::{Strand, Sts};

/// Bucket chain terminator.
const NIL: u32 = u32::MAX;

/// Catalog-building knobs, lifted from the command line.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Word size (W). The bucket table holds exactly `4^W` heads.
    pub word_size: u32,
    /// Global margin (M), inherited by every STS.
    pub margin: usize,
    /// Amplicon size substituted when the STS file says `-` or `0` (Z).
    pub default_pcr_size: usize,
    /// Longest tolerated STS line, terminators excluded (S).
    pub max_line_len: usize,
    /// Honour IUPAC ambiguity codes within primers (I).
    pub iupac_mode: bool,
}

/// Per-category rejection counters, summarized once after the build.
#[derive(Debug, Default, Clone, Copy)]
struct Rejections {
    short_primer: usize,
    unhashable: usize,
    coerced_size: usize,
}

impl Rejections {
    fn warn_summary(self, word_size: u32) {
        if self.short_primer > 0 {
            warn!(
                "{} STSs have a primer shorter than W ({word_size}): not included in search",
                self.short_primer
            );
        }
        if self.unhashable > 0 {
            warn!(
                "{} STSs have ambiguities which prevent computation of a hash value: \
                not included in search",
                self.unhashable
            );
        }
        if self.coerced_size > 0 {
            warn!(
                "{} STSs have a primer length sum greater than the pcr size: \
                expected pcr size adjusted",
                self.coerced_size
            );
        }
    }
}

/// Immutable once built. STS records live in a flat vector; each bucket of
/// the `4^W` table is the head of an index chain threaded through `chain`.
pub struct StsCatalog {
    stss: Vec<Sts>,
    chain: Vec<u32>,
    bucket_heads: Vec<u32>,
    pub word_size: u32,
    /// Largest accepted amplicon size; drives the shard overlap.
    pub max_pcr_size: usize,
}

impl StsCatalog {
    /// Parse an entire STS file and hand the (still open) source back for
    /// the hit reporter to seek into.
    ///
    /// # Errors
    /// Fatal on I/O failure, on any malformed line (missing tab, empty
    /// primer, non-integer size), and on lines exceeding the configured
    /// length cap. Per-STS rejections (short primer, unhashable primer)
    /// skip the line and are summarized with a warning instead.
    pub fn read<R: Read>(source: R, settings: &CatalogSettings) -> Result<(Self, R), CatalogError> {
        let mut catalog = Self {
            stss: Vec::new(),
            chain: Vec::new(),
            bucket_heads: vec![NIL; 1usize << (2 * settings.word_size)],
            word_size: settings.word_size,
            max_pcr_size: 0,
        };

        let mut rejections = Rejections::default();
        let mut reader = BufReader::new(source);
        let mut line_buf: Vec<u8> = Vec::with_capacity(settings.max_line_len + 2);
        let mut offset: u64 = 0;
        let mut line_no: usize = 0;

        loop {
            line_buf.clear();
            let n_read = reader
                .read_until(b'\n', &mut line_buf)
                .map_err(CatalogError::Read)?;
            if n_read == 0 {
                break;
            }
            line_no += 1;
            let line_offset = offset;
            offset += n_read as u64;

            let line = trim_eol(&line_buf);
            if line.len() > settings.max_line_len {
                return Err(CatalogError::LineTooLong(line_no, settings.max_line_len));
            }
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            catalog.parse_line(line, line_offset, line_no, settings, &mut rejections)?;
        }

        rejections.warn_summary(settings.word_size);
        debug!(
            "catalog built: {} records, max_pcr_size={}",
            catalog.stss.len(),
            catalog.max_pcr_size
        );
        Ok((catalog, reader.into_inner()))
    }

    /// Both orientations of one STS line. Both hash offsets are computed
    /// before either record goes in, so a line never contributes a lone
    /// orientation.
    fn parse_line(
        &mut self,
        line: &[u8],
        file_offset: u64,
        line_no: usize,
        settings: &CatalogSettings,
        rejections: &mut Rejections,
    ) -> Result<(), CatalogError> {
        let mut fields = line.split(|&byte| byte == b'\t');
        let id = fields.next().ok_or(CatalogError::MissingField(line_no))?;
        let primer1 = fields.next().ok_or(CatalogError::MissingField(line_no))?;
        let primer2 = fields.next().ok_or(CatalogError::MissingField(line_no))?;
        let size_field = fields.next().ok_or(CatalogError::MissingField(line_no))?;
        if id.is_empty() {
            return Err(CatalogError::MissingField(line_no));
        }
        if primer1.is_empty() || primer2.is_empty() {
            return Err(CatalogError::EmptyPrimer(line_no));
        }

        let (mut pcr_size, extra_margin) =
            parse_size(size_field, line_no, settings.default_pcr_size)?;
        let margin = settings.margin + extra_margin;

        let primer1 = primer1.to_ascii_uppercase();
        let primer2 = primer2.to_ascii_uppercase();

        if primer1.len() + primer2.len() > pcr_size {
            rejections.coerced_size += 1;
            pcr_size = primer1.len() + primer2.len();
        }

        let word_size = settings.word_size as usize;
        if primer1.len() < word_size || primer2.len() < word_size {
            debug!("line {line_no}: PCR primer shorter than word size, skipped");
            rejections.short_primer += 1;
            return Ok(());
        }

        let ambig1 = settings.iupac_mode && primer1.iter().any(|&base| is_ambiguous(base));
        let ambig2 = settings.iupac_mode && primer2.iter().any(|&base| is_ambiguous(base));

        let (Some((hash1, hash_offset1)), Some((hash2, hash_offset2))) =
            (hash_value(&primer1, word_size), hash_value(&primer2, word_size))
        else {
            debug!("line {line_no}: no ambiguity-free hash window in primer, skipped");
            rejections.unhashable += 1;
            return Ok(());
        };

        let rc1 = reverse_complement(&primer1);
        let rc2 = reverse_complement(&primer2);

        self.insert(
            Sts {
                primer_fwd: primer1,
                primer_rev: rc2,
                pcr_size,
                margin,
                hash_offset: hash_offset1,
                ambig_fwd: ambig1,
                ambig_rev: ambig2,
                strand: Strand::Plus,
                file_offset,
            },
            hash1,
        );
        self.insert(
            Sts {
                primer_fwd: primer2,
                primer_rev: rc1,
                pcr_size,
                margin,
                hash_offset: hash_offset2,
                ambig_fwd: ambig2,
                ambig_rev: ambig1,
                strand: Strand::Minus,
                file_offset,
            },
            hash2,
        );

        self.max_pcr_size = self.max_pcr_size.max(pcr_size);
        Ok(())
    }

    fn insert(&mut self, sts: Sts, hash: u32) {
        let index = self.stss.len() as u32;
        self.stss.push(sts);
        self.chain.push(self.bucket_heads[hash as usize]);
        self.bucket_heads[hash as usize] = index;
    }

    /// Walk the collision chain of one hash bucket.
    pub fn bucket(&self, hash: u32) -> Bucket<'_> {
        Bucket { catalog: self, cursor: self.bucket_heads[hash as usize] }
    }

    #[inline]
    pub fn get(&self, index: u32) -> &Sts {
        &self.stss[index as usize]
    }

    pub fn len(&self) -> usize {
        self.stss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stss.is_empty()
    }
}

/// Iterator over the `(index, record)` pairs of one collision chain.
pub struct Bucket<'c> {
    catalog: &'c StsCatalog,
    cursor: u32,
}

impl<'c> Iterator for Bucket<'c> {
    type Item = (u32, &'c Sts);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let index = self.cursor;
        self.cursor = self.catalog.chain[index as usize];
        Some((index, self.catalog.get(index)))
    }
}

/// Strip `\n` / `\r\n` / stray `\r` from the end of a raw line.
fn trim_eol(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Parse the size field: a positive integer, a `lo-hi` range, or the
/// "unknown" markers `-` and `0`. A range coerces the size to the midpoint
/// and widens the margin so both bounds stay reachable.
fn parse_size(
    field: &[u8],
    line_no: usize,
    default_pcr_size: usize,
) -> Result<(usize, usize), CatalogError> {
    let invalid = || CatalogError::InvalidSize(line_no, String::from_utf8_lossy(field).into_owned());
    let text = std::str::from_utf8(field).map_err(|_| invalid())?;

    if text == "-" {
        return Ok((default_pcr_size, 0));
    }
    match text.split_once('-') {
        Some((lo, hi)) => {
            let lo: usize = lo.parse().map_err(|_| invalid())?;
            let hi: usize = hi.parse().map_err(|_| invalid())?;
            if lo == 0 || hi < lo {
                return Err(invalid());
            }
            let mid = (lo + hi) / 2;
            Ok((mid, hi - mid + 1))
        }
        None => {
            let size: usize = text.parse().map_err(|_| invalid())?;
            match size {
                0 => Ok((default_pcr_size, 0)),
                _ => Ok((size, 0)),
            }
        }
    }
}

/// Locate the rightmost ambiguity-free window of `word_size` bases within
/// a primer, scanning towards the start. Returns `(hash, offset)` for the
/// surviving window, or `None` when every window is contaminated.
fn hash_value(primer: &[u8], word_size: usize) -> Option<(u32, usize)> {
    let mut offset = primer.len() as isize - word_size as isize;
    while offset >= 0 {
        let start = offset as usize;
        match encode_word(&primer[start..start + word_size]) {
            Ok(hash) => return Some((hash, start)),
            // The next candidate window must end before the ambiguous base.
            Err(ambig_at) => offset = offset + ambig_at as isize - word_size as isize,
        }
    }
    None
}
