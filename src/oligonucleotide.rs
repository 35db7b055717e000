use crate::{
    base::{Base, can_anneal, complement_sequence, parse_sequence, sequence_string},
    error::{AdlemanError, Result},
    pairing::Pairing,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const COMPLEMENT_SUFFIX: &str = "-co";
const PRIMER_SUFFIX: &str = "-p";

/// Stable handle of an oligonucleotide inside a [`crate::pool::Pool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OligoId(usize);

impl OligoId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OligoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A short synthetic DNA strand segment.
///
/// The sequence is split at `center_index` into two half-sites that can bind
/// independently (staggered annealing). Relations to other segments are
/// handles into the owning pool and are only changed by the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOligonucleotide")]
pub struct Oligonucleotide {
    bases: Vec<Base>,
    center_index: usize,
    label: String,
    is_primer: bool,
    #[serde(default)]
    left: Option<OligoId>,
    #[serde(default)]
    right: Option<OligoId>,
    #[serde(default)]
    pairing: Pairing,
}

/// Wire shape of [`Oligonucleotide`]; loading goes through
/// [`Oligonucleotide::new`] so stored segments are validated like new ones.
#[derive(Deserialize)]
struct RawOligonucleotide {
    bases: Vec<Base>,
    center_index: usize,
    label: String,
    #[serde(default)]
    is_primer: bool,
    #[serde(default)]
    left: Option<OligoId>,
    #[serde(default)]
    right: Option<OligoId>,
    #[serde(default)]
    pairing: Pairing,
}

impl TryFrom<RawOligonucleotide> for Oligonucleotide {
    type Error = AdlemanError;

    fn try_from(raw: RawOligonucleotide) -> Result<Self> {
        let mut ret = Self::new(raw.bases, raw.center_index, &raw.label)?;
        ret.is_primer = raw.is_primer;
        ret.left = raw.left;
        ret.right = raw.right;
        ret.pairing = raw.pairing;
        Ok(ret)
    }
}

impl Oligonucleotide {
    pub fn new(bases: Vec<Base>, center_index: usize, label: &str) -> Result<Self> {
        if bases.is_empty() {
            return Err(AdlemanError::EmptySequence {
                label: label.to_string(),
            });
        }
        if center_index > bases.len() {
            return Err(AdlemanError::CenterOutOfRange {
                center: center_index,
                len: bases.len(),
            });
        }
        Ok(Self {
            bases,
            center_index,
            label: label.to_string(),
            is_primer: false,
            left: None,
            right: None,
            pairing: Pairing::Free,
        })
    }

    pub fn from_sequence(sequence: &str, center_index: usize, label: &str) -> Result<Self> {
        Self::new(parse_sequence(sequence)?, center_index, label)
    }

    /// Uniformly random bases, split in the middle.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize, label: &str) -> Result<Self> {
        let bases = (0..len).map(|_| Base::random(rng)).collect();
        Self::new(bases, len / 2, label)
    }

    pub fn complement(&self) -> Self {
        Self {
            bases: complement_sequence(&self.bases),
            center_index: self.center_index,
            label: complement_label(&self.label),
            is_primer: false,
            left: None,
            right: None,
            pairing: Pairing::Free,
        }
    }

    /// Another physical molecule of the same kind.
    pub fn copy(&self) -> Self {
        self.clone().detached()
    }

    pub fn primer(&self) -> Self {
        let mut ret = self.complement();
        ret.is_primer = true;
        ret.label.push_str(PRIMER_SUFFIX);
        ret
    }

    #[inline(always)]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    #[inline(always)]
    pub fn center_index(&self) -> usize {
        self.center_index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline(always)]
    pub fn is_primer(&self) -> bool {
        self.is_primer
    }

    pub fn sequence(&self) -> String {
        sequence_string(&self.bases)
    }

    #[inline(always)]
    pub fn left_bases(&self) -> &[Base] {
        &self.bases[..self.center_index]
    }

    #[inline(always)]
    pub fn right_bases(&self) -> &[Base] {
        &self.bases[self.center_index..]
    }

    #[inline(always)]
    pub fn left(&self) -> Option<OligoId> {
        self.left
    }

    #[inline(always)]
    pub fn right(&self) -> Option<OligoId> {
        self.right
    }

    #[inline(always)]
    pub fn pairing(&self) -> Pairing {
        self.pairing
    }

    pub fn front(&self) -> Option<OligoId> {
        self.pairing.front()
    }

    pub fn front_left(&self) -> Option<OligoId> {
        self.pairing.front_left()
    }

    pub fn front_right(&self) -> Option<OligoId> {
        self.pairing.front_right()
    }

    /// Full-length pairing: both free and exact complements.
    pub fn can_anneal_center(&self, other: &Self) -> bool {
        self.pairing.is_free() && other.pairing.is_free() && can_anneal(&self.bases, &other.bases)
    }

    /// `other` would sit diagonally under this segment's left half, either
    /// continuing a ladder with its right half or covering the half whole.
    pub fn can_anneal_left(&self, other: &Self) -> bool {
        let half = self.left_bases();
        if half.is_empty() || !self.pairing.accepts_left() || !other.pairing.accepts_right() {
            return false;
        }
        can_anneal(half, other.right_bases())
            || (can_anneal(half, &other.bases) && other.pairing.front_left().is_none())
    }

    /// Mirror image of [`Self::can_anneal_left`] for the right half.
    pub fn can_anneal_right(&self, other: &Self) -> bool {
        let half = self.right_bases();
        if half.is_empty() || !self.pairing.accepts_right() || !other.pairing.accepts_left() {
            return false;
        }
        can_anneal(half, other.left_bases())
            || (can_anneal(half, &other.bases) && other.pairing.front_right().is_none())
    }

    pub(crate) fn set_pairing(&mut self, pairing: Pairing) {
        self.pairing = pairing;
    }

    pub(crate) fn set_left(&mut self, left: Option<OligoId>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<OligoId>) {
        self.right = right;
    }

    pub(crate) fn denature(&mut self) {
        self.pairing = Pairing::Free;
    }

    /// Same molecule, no relations. Used when a segment enters a pool.
    pub(crate) fn detached(self) -> Self {
        Self {
            left: None,
            right: None,
            pairing: Pairing::Free,
            ..self
        }
    }
}

impl fmt::Display for Oligonucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.sequence())
    }
}

fn complement_label(label: &str) -> String {
    match label.strip_suffix(COMPLEMENT_SUFFIX) {
        Some(stem) => stem.to_string(),
        None => format!("{label}{COMPLEMENT_SUFFIX}"),
    }
}
