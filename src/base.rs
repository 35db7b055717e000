use crate::error::{AdlemanError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single nucleotide. Complementing is an involution: A<->T, C<->G.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Base {
    A,
    T,
    C,
    G,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

    #[inline(always)]
    pub fn complement(self) -> Self {
        match self {
            Base::A => Base::T,
            Base::T => Base::A,
            Base::C => Base::G,
            Base::G => Base::C,
        }
    }

    #[inline(always)]
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            b'A' => Some(Base::A),
            b'T' => Some(Base::T),
            b'C' => Some(Base::C),
            b'G' => Some(Base::G),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn letter(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::T => b'T',
            Base::C => b'C',
            Base::G => b'G',
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter() as char)
    }
}

pub fn parse_sequence(text: &str) -> Result<Vec<Base>> {
    text.bytes()
        .enumerate()
        .map(|(position, letter)| {
            Base::from_letter(letter).ok_or(AdlemanError::InvalidBase {
                letter: letter as char,
                position,
            })
        })
        .collect()
}

pub fn sequence_string(bases: &[Base]) -> String {
    bases.iter().map(|b| b.letter() as char).collect()
}

pub fn complement_sequence(bases: &[Base]) -> Vec<Base> {
    bases.iter().map(|b| b.complement()).collect()
}

/// Position-wise complementarity at equal length. There is deliberately no
/// reversal here: strands are compared in the same reading direction.
pub fn can_anneal(a: &[Base], b: &[Base]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.complement() == *y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn bases() -> impl Strategy<Value = Vec<Base>> {
        prop::collection::vec(prop::sample::select(Base::ALL.to_vec()), 0..64)
    }

    #[test]
    fn test_complement() {
        assert_eq!(Base::A.complement(), Base::T);
        assert_eq!(Base::T.complement(), Base::A);
        assert_eq!(Base::C.complement(), Base::G);
        assert_eq!(Base::G.complement(), Base::C);
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(
            parse_sequence("acGT").unwrap(),
            vec![Base::A, Base::C, Base::G, Base::T]
        );
        match parse_sequence("ACNT") {
            Err(AdlemanError::InvalidBase { letter, position }) => {
                assert_eq!(letter, 'N');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sequence_string(&parse_sequence("gatc").unwrap()), "GATC");
    }

    #[test]
    fn test_can_anneal_needs_equal_length() {
        let a = parse_sequence("AACG").unwrap();
        assert!(can_anneal(&a, &parse_sequence("TTGC").unwrap()));
        assert!(!can_anneal(&a, &parse_sequence("TTG").unwrap()));
        // No reversal: the reverse complement does not pair.
        assert!(!can_anneal(&a, &parse_sequence("CGTT").unwrap()));
    }

    #[test]
    fn test_random_base_is_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let x: Vec<Base> = (0..32).map(|_| Base::random(&mut a)).collect();
        let y: Vec<Base> = (0..32).map(|_| Base::random(&mut b)).collect();
        assert_eq!(x, y);
    }

    proptest! {
        #[test]
        fn complement_is_an_involution(seq in bases()) {
            prop_assert_eq!(complement_sequence(&complement_sequence(&seq)), seq);
        }

        #[test]
        fn can_anneal_matches_complement(a in bases(), b in bases()) {
            let expected = a.len() == b.len() && complement_sequence(&a) == b;
            prop_assert_eq!(can_anneal(&a, &b), expected);
            if a.len() == b.len() {
                prop_assert_eq!(can_anneal(&a, &b), can_anneal(&b, &a));
            }
        }

        #[test]
        fn sequence_pairs_with_its_complement(a in bases()) {
            prop_assert!(can_anneal(&a, &complement_sequence(&a)));
        }
    }
}
