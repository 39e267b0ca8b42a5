use crate::alphabet::IupacMatrix;

/// Which end of a stored primer is its 3' end.
///
/// The forward primer reads left-to-right, 3' end at the high index. The
/// stored reverse primer is already reverse-complemented, so its 3' end
/// sits at the low index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreePrime {
    High,
    Low,
}

/// Constrained primer-to-sequence comparison: a bounded mismatch budget,
/// plus an exact-match anchor covering the 3'-most bases.
pub struct Comparator<'p> {
    mismatches: u32,
    three_prime: usize,
    iupac: Option<&'p IupacMatrix>,
}

impl<'p> Comparator<'p> {
    pub fn new(mismatches: u32, three_prime: usize, iupac: Option<&'p IupacMatrix>) -> Self {
        Self { mismatches, three_prime, iupac }
    }

    /// Compare `primer.len()` sequence bases against the primer.
    ///
    /// `ambig` selects the IUPAC matrix comparison for primers flagged as
    /// carrying ambiguity codes; otherwise bases must be strictly equal
    /// (an `N` in the primer then only matches a literal `N`).
    #[inline]
    pub fn matches(&self, sequence: &[u8], primer: &[u8], ambig: bool, end: ThreePrime) -> bool {
        match self.iupac.filter(|_| ambig) {
            Some(matrix) => self.compare(sequence, primer, end, |seq, pri| matrix.matches(pri, seq)),
            None => self.compare(sequence, primer, end, |seq, pri| seq == pri),
        }
    }

    fn compare(
        &self,
        sequence: &[u8],
        primer: &[u8],
        end: ThreePrime,
        base_match: impl Fn(u8, u8) -> bool,
    ) -> bool {
        let len = primer.len();
        // With no mismatch budget the anchor is irrelevant: any mismatch fails.
        if self.mismatches == 0 {
            return sequence
                .iter()
                .zip(primer)
                .all(|(&seq, &pri)| base_match(seq, pri));
        }

        let mut mismatches = 0;
        for (i, (&seq, &pri)) in sequence.iter().zip(primer).enumerate() {
            if base_match(seq, pri) {
                continue;
            }
            mismatches += 1;
            if mismatches > self.mismatches {
                return false;
            }
            let anchored = match end {
                ThreePrime::High => i + self.three_prime >= len,
                ThreePrime::Low => i < self.three_prime,
            };
            if anchored {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mode_rejects_any_mismatch() {
        let cmp = Comparator::new(0, 1, None);
        assert!(cmp.matches(b"ACGTACGT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"ACGTACGA", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"TCGTACGT", b"ACGTACGT", false, ThreePrime::High));
    }

    #[test]
    fn mismatch_budget_is_bounded() {
        let cmp = Comparator::new(2, 0, None);
        assert!(cmp.matches(b"TCGAACGT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"TCGAACGA", b"ACGTACGT", false, ThreePrime::High));
    }

    #[test]
    fn three_prime_anchor_forward() {
        // 3' end on the right: a mismatch within the last X bases fails even
        // when the budget would allow it.
        let cmp = Comparator::new(2, 2, None);
        assert!(cmp.matches(b"TCGTACGT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"ACGTACAT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"ACGTACGA", b"ACGTACGT", false, ThreePrime::High));
        assert!(cmp.matches(b"ACGTAAGT", b"ACGTACGT", false, ThreePrime::High));
    }

    #[test]
    fn three_prime_anchor_reverse() {
        // The stored reverse primer carries its 3' end at the low index.
        let cmp = Comparator::new(2, 2, None);
        assert!(!cmp.matches(b"TCGTACGT", b"ACGTACGT", false, ThreePrime::Low));
        assert!(!cmp.matches(b"AGGTACGT", b"ACGTACGT", false, ThreePrime::Low));
        assert!(cmp.matches(b"ACTTACGT", b"ACGTACGT", false, ThreePrime::Low));
    }

    #[test]
    fn anchor_spanning_the_whole_primer_forces_exactness() {
        let cmp = Comparator::new(3, 8, None);
        assert!(cmp.matches(b"ACGTACGT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"ACGAACGT", b"ACGTACGT", false, ThreePrime::High));
        assert!(!cmp.matches(b"ACGAACGT", b"ACGTACGT", false, ThreePrime::Low));
    }

    #[test]
    fn iupac_primer_uses_the_matrix() {
        let matrix = IupacMatrix::new();
        let cmp = Comparator::new(0, 1, Some(&matrix));
        // N in the primer accepts any sequence base when flagged ambiguous...
        assert!(cmp.matches(b"ACGTACGA", b"ACGTACGN", true, ThreePrime::High));
        assert!(cmp.matches(b"ACGTACGN", b"ACGTACGN", true, ThreePrime::High));
        // ...but reverts to literal matching when the flag is off.
        assert!(!cmp.matches(b"ACGTACGA", b"ACGTACGN", false, ThreePrime::High));
        assert!(cmp.matches(b"ACGTACGN", b"ACGTACGN", false, ThreePrime::High));
    }

    #[test]
    fn iupac_r_expands_to_purines() {
        let matrix = IupacMatrix::new();
        let cmp = Comparator::new(0, 1, Some(&matrix));
        assert!(cmp.matches(b"ACGTACGA", b"ACGTACGR", true, ThreePrime::High));
        assert!(cmp.matches(b"ACGTACGG", b"ACGTACGR", true, ThreePrime::High));
        assert!(!cmp.matches(b"ACGTACGC", b"ACGTACGR", true, ThreePrime::High));
    }
}
