use crate::{
    oligonucleotide::OligoId,
    pool::{Pool, StrandPair},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One measured duplex. `size` is the segment count of the longer side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GelBand {
    pub left: OligoId,
    pub right: OligoId,
    pub size: usize,
}

/// Simulated electrophoresis: separates duplexes by length.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Gel {
    pairs: Vec<StrandPair>,
    #[serde(default)]
    bands: Vec<GelBand>,
}

impl Gel {
    pub fn new(pairs: Vec<StrandPair>) -> Self {
        Self {
            pairs,
            bands: vec![],
        }
    }

    pub fn pairs(&self) -> &[StrandPair] {
        &self.pairs
    }

    pub fn bands(&self) -> &[GelBand] {
        &self.bands
    }

    /// Measures every pair against the current pool. Earlier measurements
    /// are discarded.
    pub fn run(&mut self, pool: &Pool) {
        self.bands = self
            .pairs
            .iter()
            .map(|&(left, right)| GelBand {
                left,
                right,
                size: pool.strand_len(left).max(pool.strand_len(right)),
            })
            .collect();
        debug!(duplexes = self.bands.len(), "gel run");
    }

    pub fn get_strand_with_size(&self, size: usize) -> Vec<StrandPair> {
        self.bands
            .iter()
            .filter(|band| band.size == size)
            .map(|band| (band.left, band.right))
            .collect()
    }

    pub fn size_histogram(&self) -> BTreeMap<usize, usize> {
        let mut ret = BTreeMap::new();
        for band in &self.bands {
            *ret.entry(band.size).or_insert(0) += 1;
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oligonucleotide::Oligonucleotide;

    fn duplex(pool: &mut Pool, seqs: &[&str]) {
        let segments: Vec<Oligonucleotide> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| Oligonucleotide::from_sequence(s, 3, &format!("s{i}")).unwrap())
            .collect();
        let complements: Vec<Oligonucleotide> = segments.iter().map(|s| s.complement()).collect();
        let upper = pool.add_oligonucleotides(segments);
        let lower = pool.add_oligonucleotides(complements);
        for strand in [&upper, &lower] {
            for pair in strand.windows(2) {
                assert!(pool.ligate(pair[0], pair[1]));
            }
        }
        for (a, b) in upper.into_iter().zip(lower) {
            assert!(pool.anneal_center(a, b));
        }
    }

    fn sample_pool() -> Pool {
        let mut pool = Pool::default();
        duplex(&mut pool, &["AACCGG"]);
        duplex(&mut pool, &["ACACAC", "GAGAGA", "CTCTCT"]);
        duplex(&mut pool, &["TTAACC", "GTGTCA"]);
        duplex(&mut pool, &["ATATGC", "CGCGAT", "TGTGAC"]);
        pool
    }

    #[test]
    fn test_filter_by_size() {
        let pool = sample_pool();
        let mut gel = Gel::new(pool.get_dna_strands());
        assert_eq!(gel.pairs().len(), 4);
        gel.run(&pool);
        let three = gel.get_strand_with_size(3);
        assert_eq!(three.len(), 2);
        for (left, right) in &three {
            assert_eq!(pool.strand_len(*left), 3);
            assert_eq!(pool.strand_len(*right), 3);
        }
        assert!(gel.get_strand_with_size(7).is_empty());
        assert_eq!(
            gel.size_histogram(),
            BTreeMap::from([(1, 1), (2, 1), (3, 2)])
        );
    }

    #[test]
    fn test_filtering_a_filtered_set_is_stable() {
        let pool = sample_pool();
        let mut gel = Gel::new(pool.get_dna_strands());
        gel.run(&pool);
        let three = gel.get_strand_with_size(3);
        assert!(!three.is_empty());

        let mut again = Gel::new(three.clone());
        again.run(&pool);
        assert_eq!(again.get_strand_with_size(3), three);
        assert_eq!(again.size_histogram(), BTreeMap::from([(3, three.len())]));
    }

    #[test]
    fn test_unrun_gel_has_no_bands() {
        let pool = sample_pool();
        let gel = Gel::new(pool.get_dna_strands());
        assert!(gel.bands().is_empty());
        assert!(gel.get_strand_with_size(1).is_empty());
    }

    #[test]
    fn test_rerun_replaces_measurements() {
        let mut pool = sample_pool();
        let mut gel = Gel::new(pool.get_dna_strands());
        gel.run(&pool);
        let (upper, lower) = gel.get_strand_with_size(2)[0];
        let tails = [pool.strand(upper)[1], pool.strand(lower)[1]];
        for tail in tails {
            pool.remove(tail).unwrap();
        }
        gel.run(&pool);
        assert_eq!(gel.bands().len(), 4);
        assert!(gel.get_strand_with_size(2).is_empty());
        assert_eq!(gel.get_strand_with_size(1).len(), 2);
    }
}
