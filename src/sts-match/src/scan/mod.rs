//! Matching engine: a rolling word-hash scan over one shard of sequence,
//! dispatching bucket candidates into the constrained match procedure.

use crate::alphabet::{IupacMatrix, AMBIG, SCODE};
use crate::catalog::{Sts, StsCatalog};

mod comparator;
pub use comparator::{Comparator, ThreePrime};

/// Scanning parameters shared read-only by every worker.
pub struct ScanParams {
    pub word_size: u32,
    pub mismatches: u32,
    pub margin: usize,
    pub three_prime: usize,
    /// Compatibility matrix, present only in IUPAC mode.
    pub iupac: Option<IupacMatrix>,
    mask: u32,
}

impl ScanParams {
    pub fn new(
        word_size: u32,
        mismatches: u32,
        margin: usize,
        three_prime: usize,
        iupac_mode: bool,
    ) -> Self {
        // W <= 16, so the 2W-bit window fills a u32 at most.
        let mask = match word_size {
            16 => u32::MAX,
            w => (1u32 << (2 * w)) - 1,
        };
        Self {
            word_size,
            mismatches,
            margin,
            three_prime,
            iupac: iupac_mode.then(IupacMatrix::new),
            mask,
        }
    }

    fn comparator(&self) -> Comparator<'_> {
        Comparator::new(self.mismatches, self.three_prime, self.iupac.as_ref())
    }
}

/// One candidate amplification site, in shard-local 0-based coordinates.
/// `pos1`/`pos2` are the inclusive endpoints of the inferred amplicon;
/// `sts` indexes into the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub pos1: usize,
    pub pos2: usize,
    pub sts: u32,
}

/// Scan one shard, accumulating hits into a private buffer.
///
/// The window hash is carried along as a 2W-bit integer; any ambiguous base
/// poisons the following W windows (`nskip`). At each clean window the
/// bucket's collision chain is walked and every STS whose hash offset fits
/// inside the shard is handed to the match procedure.
pub fn scan_shard(shard: &[u8], catalog: &StsCatalog, params: &ScanParams) -> Vec<Hit> {
    let word_size = params.word_size as usize;
    let mut hits = Vec::new();
    if shard.len() < word_size {
        return hits;
    }

    let comparator = params.comparator();
    let mut hash: u32 = 0;
    let mut nskip = word_size;

    for (end, &base) in shard.iter().enumerate() {
        hash = (hash << 2) & params.mask;
        match SCODE[base as usize] {
            AMBIG => nskip = word_size,
            code => {
                hash |= u32::from(code);
                if nskip > 0 {
                    nskip -= 1;
                }
            }
        }
        if end + 1 < word_size || nskip > 0 {
            continue;
        }
        let pos = end + 1 - word_size;
        for (index, sts) in catalog.bucket(hash) {
            if pos < sts.hash_offset {
                continue;
            }
            match_at(shard, pos - sts.hash_offset, sts, index, &comparator, &mut hits);
        }
    }
    hits
}

/// Brute-force confirmation of a hash candidate: match the forward primer
/// at `k`, then search for the reverse primer around the expected amplicon
/// size, widening symmetrically up to the STS margin. Every confirmed
/// placement is an independent hit.
fn match_at(
    shard: &[u8],
    k: usize,
    sts: &Sts,
    index: u32,
    comparator: &Comparator<'_>,
    hits: &mut Vec<Hit>,
) {
    let len_fwd = sts.len_fwd();
    let len_rev = sts.len_rev();
    let remaining = shard.len() - k;
    if len_fwd > remaining {
        return;
    }
    if !comparator.matches(&shard[k..k + len_fwd], &sts.primer_fwd, sts.ambig_fwd, ThreePrime::High)
    {
        return;
    }

    let mut exp_size = sts.pcr_size;
    let hi_margin;
    if exp_size > remaining {
        // The nominal amplicon overruns the shard: pull the reverse-primer
        // search back to the end, or give up when even the primers no
        // longer fit.
        if remaining < len_fwd + len_rev {
            return;
        }
        exp_size = remaining;
        hi_margin = 0;
    } else {
        hi_margin = sts.margin.min(remaining - exp_size);
    }
    let lo_margin = sts.margin.min(exp_size - len_fwd - len_rev);

    let q = k + exp_size - len_rev;
    if comparator.matches(&shard[q..q + len_rev], &sts.primer_rev, sts.ambig_rev, ThreePrime::Low) {
        hits.push(Hit { pos1: k, pos2: k + exp_size - 1, sts: index });
    }
    for delta in 1..=sts.margin {
        if delta <= lo_margin
            && comparator.matches(
                &shard[q - delta..q - delta + len_rev],
                &sts.primer_rev,
                sts.ambig_rev,
                ThreePrime::Low,
            )
        {
            hits.push(Hit { pos1: k, pos2: k + exp_size - delta - 1, sts: index });
        }
        if delta <= hi_margin
            && comparator.matches(
                &shard[q + delta..q + delta + len_rev],
                &sts.primer_rev,
                sts.ambig_rev,
                ThreePrime::Low,
            )
        {
            hits.push(Hit { pos1: k, pos2: k + exp_size + delta - 1, sts: index });
        }
    }
}
