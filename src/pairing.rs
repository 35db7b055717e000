//! Cross-link state of one oligonucleotide.
//!
//! A segment is either free, paired center-to-center with exactly one
//! partner, or staggered on one or both halves. Holding this as a single
//! enum makes "center paired and staggered at the same time" unrepresentable;
//! the `with_*` transitions return `None` when a bind is not allowed from the
//! current state.

use crate::oligonucleotide::OligoId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    #[default]
    Free,
    CenterBound(OligoId),
    LeftStaggered(OligoId),
    RightStaggered(OligoId),
    Bridged { left: OligoId, right: OligoId },
}

impl Pairing {
    #[inline(always)]
    pub fn is_free(&self) -> bool {
        matches!(self, Pairing::Free)
    }

    #[inline(always)]
    pub fn is_staggered(&self) -> bool {
        matches!(
            self,
            Pairing::LeftStaggered(_) | Pairing::RightStaggered(_) | Pairing::Bridged { .. }
        )
    }

    pub fn front(&self) -> Option<OligoId> {
        match self {
            Pairing::CenterBound(id) => Some(*id),
            _ => None,
        }
    }

    pub fn front_left(&self) -> Option<OligoId> {
        match self {
            Pairing::LeftStaggered(id) | Pairing::Bridged { left: id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn front_right(&self) -> Option<OligoId> {
        match self {
            Pairing::RightStaggered(id) | Pairing::Bridged { right: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The partner a walker reports first: `front_left`, then `front`, then
    /// `front_right`.
    pub fn first_partner(&self) -> Option<OligoId> {
        self.front_left()
            .or_else(|| self.front())
            .or_else(|| self.front_right())
    }

    pub fn partners(&self) -> Vec<OligoId> {
        match self {
            Pairing::Free => vec![],
            Pairing::CenterBound(id) | Pairing::LeftStaggered(id) | Pairing::RightStaggered(id) => {
                vec![*id]
            }
            Pairing::Bridged { left, right } => vec![*left, *right],
        }
    }

    /// A left-side staggered bind is possible from this state.
    #[inline(always)]
    pub fn accepts_left(&self) -> bool {
        matches!(self, Pairing::Free | Pairing::RightStaggered(_))
    }

    #[inline(always)]
    pub fn accepts_right(&self) -> bool {
        matches!(self, Pairing::Free | Pairing::LeftStaggered(_))
    }

    pub fn with_center(self, partner: OligoId) -> Option<Self> {
        match self {
            Pairing::Free => Some(Pairing::CenterBound(partner)),
            _ => None,
        }
    }

    pub fn with_left(self, partner: OligoId) -> Option<Self> {
        match self {
            Pairing::Free => Some(Pairing::LeftStaggered(partner)),
            Pairing::RightStaggered(right) => Some(Pairing::Bridged {
                left: partner,
                right,
            }),
            _ => None,
        }
    }

    pub fn with_right(self, partner: OligoId) -> Option<Self> {
        match self {
            Pairing::Free => Some(Pairing::RightStaggered(partner)),
            Pairing::LeftStaggered(left) => Some(Pairing::Bridged {
                left,
                right: partner,
            }),
            _ => None,
        }
    }

    /// Drops every link to `partner`, keeping the rest.
    pub fn without(self, partner: OligoId) -> Self {
        match self {
            Pairing::CenterBound(id) | Pairing::LeftStaggered(id) | Pairing::RightStaggered(id)
                if id == partner =>
            {
                Pairing::Free
            }
            Pairing::Bridged { left, right } if left == partner && right == partner => {
                Pairing::Free
            }
            Pairing::Bridged { left, right } if left == partner => Pairing::RightStaggered(right),
            Pairing::Bridged { left, right } if right == partner => Pairing::LeftStaggered(left),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> OligoId {
        OligoId::new(i)
    }

    #[test]
    fn test_center_only_from_free() {
        assert_eq!(Pairing::Free.with_center(id(1)), Some(Pairing::CenterBound(id(1))));
        assert_eq!(Pairing::LeftStaggered(id(2)).with_center(id(1)), None);
        assert_eq!(Pairing::CenterBound(id(2)).with_center(id(1)), None);
    }

    #[test]
    fn test_staggered_sides_combine_into_bridge() {
        let state = Pairing::Free.with_left(id(1)).unwrap();
        assert_eq!(state.front_left(), Some(id(1)));
        assert_eq!(state.with_left(id(3)), None);
        let state = state.with_right(id(2)).unwrap();
        assert_eq!(
            state,
            Pairing::Bridged {
                left: id(1),
                right: id(2)
            }
        );
        assert_eq!(state.front(), None);
        assert_eq!(state.first_partner(), Some(id(1)));
        assert_eq!(Pairing::CenterBound(id(4)).with_right(id(2)), None);
        assert!(!Pairing::CenterBound(id(4)).accepts_left());
        assert!(Pairing::LeftStaggered(id(4)).accepts_right());
        assert!(!Pairing::LeftStaggered(id(4)).accepts_left());
    }

    #[test]
    fn test_without_releases_one_side() {
        let bridged = Pairing::Bridged {
            left: id(1),
            right: id(2),
        };
        assert_eq!(bridged.without(id(1)), Pairing::RightStaggered(id(2)));
        assert_eq!(bridged.without(id(2)), Pairing::LeftStaggered(id(1)));
        assert_eq!(bridged.without(id(9)), bridged);
        assert_eq!(Pairing::CenterBound(id(5)).without(id(5)), Pairing::Free);
    }

    #[test]
    fn test_first_partner_priority() {
        assert_eq!(Pairing::RightStaggered(id(7)).first_partner(), Some(id(7)));
        assert_eq!(Pairing::CenterBound(id(8)).first_partner(), Some(id(8)));
        assert_eq!(Pairing::Free.first_partner(), None);
    }
}
