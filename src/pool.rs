use crate::{
    error::{AdlemanError, Result},
    oligonucleotide::{OligoId, Oligonucleotide},
    pairing::Pairing,
};
use adleman_protocol::PoolSummary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Start of one strand and start of the strand it is paired with.
pub type StrandPair = (OligoId, OligoId);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Leftward,
    Rightward,
}

/// Every relation change of one bind, computed before anything is written.
#[derive(Debug, Default)]
struct BindPlan {
    pairings: Vec<(OligoId, Pairing)>,
    splices: Vec<(OligoId, OligoId)>,
}

/// The reaction vessel. Owns every oligonucleotide; relations between them
/// are [`OligoId`] handles into `slots`. Removed members leave an empty slot
/// so handles stay stable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Pool {
    slots: Vec<Option<Oligonucleotide>>,
}

impl Pool {
    pub fn new(oligonucleotides: Vec<Oligonucleotide>) -> Self {
        let mut ret = Self::default();
        ret.add_oligonucleotides(oligonucleotides);
        ret
    }

    /// Adds a free molecule. Relations carried over from another pool are
    /// dropped since their handles mean nothing here.
    pub fn add_oligonucleotide(&mut self, oligo: Oligonucleotide) -> OligoId {
        let id = OligoId::new(self.slots.len());
        self.slots.push(Some(oligo.detached()));
        id
    }

    pub fn add_oligonucleotides<I>(&mut self, oligonucleotides: I) -> Vec<OligoId>
    where
        I: IntoIterator<Item = Oligonucleotide>,
    {
        oligonucleotides
            .into_iter()
            .map(|oligo| self.add_oligonucleotide(oligo))
            .collect()
    }

    #[inline(always)]
    pub fn get(&self, id: OligoId) -> Option<&Oligonucleotide> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn oligo(&self, id: OligoId) -> Result<&Oligonucleotide> {
        self.get(id).ok_or(AdlemanError::UnknownOligo(id))
    }

    #[inline(always)]
    fn get_mut(&mut self, id: OligoId) -> Option<&mut Oligonucleotide> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: OligoId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (OligoId, &Oligonucleotide)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|oligo| (OligoId::new(idx), oligo)))
    }

    pub fn ids(&self) -> Vec<OligoId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn primers(&self) -> Vec<OligoId> {
        self.iter()
            .filter(|(_, oligo)| oligo.is_primer())
            .map(|(id, _)| id)
            .collect()
    }

    fn relation(
        &self,
        id: Option<OligoId>,
        f: impl Fn(&Oligonucleotide) -> Option<OligoId>,
    ) -> Option<OligoId> {
        id.and_then(|id| self.get(id)).and_then(f)
    }

    fn pair(&self, a: OligoId, b: OligoId) -> Option<(&Oligonucleotide, &Oligonucleotide)> {
        if a == b {
            return None;
        }
        Some((self.get(a)?, self.get(b)?))
    }

    pub fn can_anneal_center(&self, a: OligoId, b: OligoId) -> bool {
        self.pair(a, b)
            .map(|(x, y)| x.can_anneal_center(y))
            .unwrap_or(false)
    }

    pub fn can_anneal_left(&self, a: OligoId, b: OligoId) -> bool {
        self.pair(a, b)
            .map(|(x, y)| x.can_anneal_left(y))
            .unwrap_or(false)
    }

    pub fn can_anneal_right(&self, a: OligoId, b: OligoId) -> bool {
        self.pair(a, b)
            .map(|(x, y)| x.can_anneal_right(y))
            .unwrap_or(false)
    }

    /// Staggered binds are tried before the full-length one; the first that
    /// succeeds wins.
    pub fn anneal(&mut self, a: OligoId, b: OligoId) -> bool {
        self.anneal_left(a, b) || self.anneal_right(a, b) || self.anneal_center(a, b)
    }

    pub fn anneal_center(&mut self, a: OligoId, b: OligoId) -> bool {
        self.plan_center(a, b)
            .map(|plan| self.apply(plan))
            .is_some()
    }

    pub fn anneal_left(&mut self, a: OligoId, b: OligoId) -> bool {
        self.plan_left(a, b).map(|plan| self.apply(plan)).is_some()
    }

    pub fn anneal_right(&mut self, a: OligoId, b: OligoId) -> bool {
        self.plan_right(a, b).map(|plan| self.apply(plan)).is_some()
    }

    fn plan_center(&self, a: OligoId, b: OligoId) -> Option<BindPlan> {
        let (sa, sb) = self.pair(a, b)?;
        if !sa.can_anneal_center(sb) {
            return None;
        }
        let mut plan = BindPlan::default();
        plan.pairings.push((a, sa.pairing().with_center(b)?));
        plan.pairings.push((b, sb.pairing().with_center(a)?));
        // Rungs next to an existing rung line up on the partner strand too.
        for (this, partner) in [(sa, b), (sb, a)] {
            if let Some(prev) = self.relation(this.left(), Oligonucleotide::front) {
                plan.splices.push((prev, partner));
            }
            if let Some(next) = self.relation(this.right(), Oligonucleotide::front) {
                plan.splices.push((partner, next));
            }
        }
        Some(plan)
    }

    // `b` ends up under `a`'s left half.
    fn plan_left(&self, a: OligoId, b: OligoId) -> Option<BindPlan> {
        let (sa, sb) = self.pair(a, b)?;
        if !sa.can_anneal_left(sb) {
            return None;
        }
        let mut plan = BindPlan::default();
        plan.pairings.push((a, sa.pairing().with_left(b)?));
        plan.pairings.push((b, sb.pairing().with_right(a)?));
        if let Some(next) = sa.front_right() {
            plan.splices.push((b, next));
        }
        if let Some(prev) = self.relation(sa.left(), Oligonucleotide::front_left) {
            plan.splices.push((prev, b));
        }
        if let Some(prev) = sb.front_left() {
            plan.splices.push((prev, a));
        }
        if let Some(next) = self.relation(sa.front_right(), Oligonucleotide::front_right) {
            plan.splices.push((a, next));
        }
        Some(plan)
    }

    // `b` ends up under `a`'s right half.
    fn plan_right(&self, a: OligoId, b: OligoId) -> Option<BindPlan> {
        let (sa, sb) = self.pair(a, b)?;
        if !sa.can_anneal_right(sb) {
            return None;
        }
        let mut plan = BindPlan::default();
        plan.pairings.push((a, sa.pairing().with_right(b)?));
        plan.pairings.push((b, sb.pairing().with_left(a)?));
        if let Some(prev) = sa.front_left() {
            plan.splices.push((prev, b));
        }
        if let Some(next) = sb.front_right() {
            plan.splices.push((a, next));
        }
        if let Some(next) = self.relation(sa.right(), Oligonucleotide::front_right) {
            plan.splices.push((b, next));
        }
        if let Some(prev) = self.relation(sa.front_left(), Oligonucleotide::front_left) {
            plan.splices.push((prev, a));
        }
        Some(plan)
    }

    fn apply(&mut self, plan: BindPlan) {
        for (id, pairing) in plan.pairings {
            if let Some(oligo) = self.get_mut(id) {
                oligo.set_pairing(pairing);
            }
        }
        for (left, right) in plan.splices {
            self.splice(left, right);
        }
    }

    /// Makes `right` the right neighbour of `left`. Whatever either of them
    /// was linked to on that side before is unlinked on both ends, so
    /// `a.right == b` always implies `b.left == a`. Self links and links that
    /// would close a cycle are refused.
    fn splice(&mut self, left: OligoId, right: OligoId) -> bool {
        if left == right || !self.contains(left) || !self.contains(right) {
            warn!(%left, %right, "refusing splice onto itself or a missing oligonucleotide");
            return false;
        }
        if self.get(left).and_then(|o| o.right()) == Some(right) {
            return true;
        }
        if self.walk(right, Direction::Rightward).contains(&left) {
            warn!(%left, %right, "refusing splice that would close a cycle");
            return false;
        }
        if let Some(old) = self.get(left).and_then(|o| o.right()) {
            if let Some(o) = self.get_mut(old) {
                o.set_left(None);
            }
        }
        if let Some(old) = self.get(right).and_then(|o| o.left()) {
            if let Some(o) = self.get_mut(old) {
                o.set_right(None);
            }
        }
        if let Some(o) = self.get_mut(left) {
            o.set_right(Some(right));
        }
        if let Some(o) = self.get_mut(right) {
            o.set_left(Some(left));
        }
        true
    }

    /// Joins the end of one strand to the start of another, like a ligase
    /// sealing a nick. Both ends must be open.
    pub fn ligate(&mut self, left: OligoId, right: OligoId) -> bool {
        let open_end = self.get(left).map(|o| o.right().is_none()).unwrap_or(false);
        let open_start = self.get(right).map(|o| o.left().is_none()).unwrap_or(false);
        open_end && open_start && self.splice(left, right)
    }

    fn release(&mut self, a: OligoId, b: OligoId) {
        for (this, other) in [(a, b), (b, a)] {
            if let Some(oligo) = self.get_mut(this) {
                let pairing = oligo.pairing().without(other);
                oligo.set_pairing(pairing);
            }
        }
    }

    /// Clears every cross-link of `id`. The partners lose only their slot
    /// pointing back at `id`; their other half-sites stay bound. Links are
    /// reciprocal in the arena, so a one-sided release cannot be stored.
    /// Same-strand neighbours are kept.
    pub fn denature(&mut self, id: OligoId) {
        let Some(oligo) = self.get_mut(id) else {
            return;
        };
        let partners = oligo.pairing().partners();
        oligo.denature();
        for partner in partners {
            if let Some(other) = self.get_mut(partner) {
                let pairing = other.pairing().without(id);
                other.set_pairing(pairing);
            }
        }
    }

    /// One exhaustive pass over all ordered pairs. Returns the number of
    /// binds made; the result of a pass depends on member order.
    pub fn annealing(&mut self) -> usize {
        let ids = self.ids();
        let mut binds = 0;
        for &a in &ids {
            for &b in &ids {
                if a != b && self.anneal(a, b) {
                    binds += 1;
                }
            }
        }
        debug!(members = ids.len(), binds, "annealing pass");
        binds
    }

    /// Like [`Self::annealing`], but only primers are offered as partners.
    pub fn annealing_primers(&mut self) -> usize {
        let ids = self.ids();
        let primers = self.primers();
        let mut binds = 0;
        for &a in &ids {
            for &primer in &primers {
                if a != primer && self.anneal(a, primer) {
                    binds += 1;
                }
            }
        }
        debug!(members = ids.len(), primers = primers.len(), binds, "primer annealing pass");
        binds
    }

    pub fn denaturing(&mut self) {
        for id in self.ids() {
            self.denature(id);
        }
        debug!(members = self.len(), "denatured pool");
    }

    /// Extends a bound primer into a full complementary strand along its
    /// template.
    ///
    /// The template position is the primer's first partner. A primer sitting
    /// on a strand start extends rightward, otherwise leftward. The primer
    /// lets go of the template first, then every template position gets a
    /// freshly synthesized complement bound center-to-center. Synthesis stops
    /// at a position that is already paired. Non-primers and unbound primers
    /// produce nothing.
    pub fn perform_elongation(&mut self, primer: OligoId) -> Vec<OligoId> {
        let Some(oligo) = self.get(primer) else {
            return vec![];
        };
        if !oligo.is_primer() {
            return vec![];
        }
        let Some(position) = oligo.pairing().first_partner() else {
            return vec![];
        };
        let direction = match self.get(position).and_then(|o| o.left()) {
            None => Direction::Rightward,
            Some(_) => Direction::Leftward,
        };
        self.release(primer, position);

        let mut created = vec![];
        let mut seen = HashSet::new();
        let mut current = Some(position);
        while let Some(template_id) = current {
            if !seen.insert(template_id) {
                break;
            }
            let Some(template) = self.get(template_id) else {
                break;
            };
            let synthesized = template.complement();
            if !template.can_anneal_center(&synthesized) {
                debug!(%primer, template = %template_id, "elongation stalled on a paired position");
                break;
            }
            current = match direction {
                Direction::Rightward => template.right(),
                Direction::Leftward => template.left(),
            };
            let new_id = self.add_oligonucleotide(synthesized);
            self.anneal_center(template_id, new_id);
            created.push(new_id);
        }
        debug!(%primer, synthesized = created.len(), ?direction, "elongation");
        created
    }

    /// One extension step for every member that is a primer right now.
    /// Returns the synthesized segments, which are already in the pool.
    pub fn polymerase_chain_reaction(&mut self) -> Vec<OligoId> {
        let primers = self.primers();
        let mut created = vec![];
        for primer in &primers {
            created.extend(self.perform_elongation(*primer));
        }
        debug!(primers = primers.len(), synthesized = created.len(), "PCR step");
        created
    }

    /// Reconstructs duplexes: one `(strand start, paired strand start)` per
    /// double-stranded structure. Strands without any cross-link are skipped,
    /// and so is a strand already reported as someone's partner.
    pub fn get_dna_strands(&self) -> Vec<StrandPair> {
        let mut visited: HashSet<OligoId> = HashSet::new();
        let mut strands = vec![];
        for (id, oligo) in self.iter() {
            if oligo.left().is_some() || visited.contains(&id) {
                continue;
            }
            let strand = self.strand(id);
            visited.extend(strand.iter().copied());
            let Some(partner) = strand
                .iter()
                .find_map(|member| self.get(*member).and_then(|o| o.pairing().first_partner()))
            else {
                continue;
            };
            let paired_start = self.strand_start(partner);
            if visited.contains(&paired_start) {
                continue;
            }
            visited.extend(self.strand(paired_start));
            strands.push((id, paired_start));
        }
        strands
    }

    fn walk(&self, from: OligoId, direction: Direction) -> Vec<OligoId> {
        let mut ret = vec![];
        let mut seen = HashSet::new();
        let mut current = self.get(from).map(|_| from);
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            ret.push(id);
            current = match direction {
                Direction::Rightward => self.get(id).and_then(|o| o.right()),
                Direction::Leftward => self.get(id).and_then(|o| o.left()),
            };
        }
        ret
    }

    /// `start` and everything reachable from it via `right`.
    pub fn strand(&self, start: OligoId) -> Vec<OligoId> {
        self.walk(start, Direction::Rightward)
    }

    pub fn strand_start(&self, id: OligoId) -> OligoId {
        self.walk(id, Direction::Leftward)
            .last()
            .copied()
            .unwrap_or(id)
    }

    pub fn strand_len(&self, start: OligoId) -> usize {
        self.strand(start).len()
    }

    /// Takes a member out of the pool. It is denatured and cut out of its
    /// strand first, so no other member keeps a handle to it.
    pub fn remove(&mut self, id: OligoId) -> Result<Oligonucleotide> {
        let oligo = self.oligo(id)?;
        let (left, right) = (oligo.left(), oligo.right());
        self.denature(id);
        if let Some(o) = left.and_then(|l| self.get_mut(l)) {
            o.set_right(None);
        }
        if let Some(o) = right.and_then(|r| self.get_mut(r)) {
            o.set_left(None);
        }
        self.slots
            .get_mut(id.index())
            .and_then(|slot| slot.take())
            .map(Oligonucleotide::detached)
            .ok_or(AdlemanError::UnknownOligo(id))
    }

    pub fn check_invariants(&self) -> Result<()> {
        for (id, oligo) in self.iter() {
            if let Some(right) = oligo.right() {
                let back = self.oligo(right)?.left();
                if right == id || back != Some(id) {
                    return Err(AdlemanError::Invariant(format!(
                        "{id}.right = {right} but {right}.left = {back:?}"
                    )));
                }
            }
            if let Some(left) = oligo.left() {
                let back = self.oligo(left)?.right();
                if left == id || back != Some(id) {
                    return Err(AdlemanError::Invariant(format!(
                        "{id}.left = {left} but {left}.right = {back:?}"
                    )));
                }
            }
            let reciprocal = match oligo.pairing() {
                Pairing::Free => vec![],
                Pairing::CenterBound(p) => vec![(p, self.oligo(p)?.front())],
                Pairing::LeftStaggered(p) => vec![(p, self.oligo(p)?.front_right())],
                Pairing::RightStaggered(p) => vec![(p, self.oligo(p)?.front_left())],
                Pairing::Bridged { left, right } => vec![
                    (left, self.oligo(left)?.front_right()),
                    (right, self.oligo(right)?.front_left()),
                ],
            };
            for (partner, back) in reciprocal {
                if partner == id || back != Some(id) {
                    return Err(AdlemanError::Invariant(format!(
                        "{id} pairs with {partner} but the link back is {back:?}"
                    )));
                }
            }
        }
        // Strands are doubly linked, so a cycle has no start and shows up here.
        let reachable: usize = self
            .iter()
            .filter(|(_, o)| o.left().is_none())
            .map(|(id, _)| self.strand_len(id))
            .sum();
        if reachable != self.len() {
            return Err(AdlemanError::Invariant(format!(
                "{} of {} members are on a cycle",
                self.len() - reachable,
                self.len()
            )));
        }
        Ok(())
    }

    pub fn summary(&self) -> PoolSummary {
        let mut ret = PoolSummary::default();
        for (_, oligo) in self.iter() {
            ret.member_count += 1;
            if oligo.is_primer() {
                ret.primer_count += 1;
            }
            match oligo.pairing() {
                Pairing::Free => ret.free_count += 1,
                Pairing::CenterBound(_) => ret.center_bound_count += 1,
                _ => ret.staggered_count += 1,
            }
            if oligo.left().is_none() {
                ret.strand_count += 1;
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0: &str = "AAAACAAACA";
    const V1: &str = "AACAAACAAA";
    const V2: &str = "CAAAAAACCA";

    fn oligo(seq: &str, center: usize, label: &str) -> Oligonucleotide {
        Oligonucleotide::from_sequence(seq, center, label).unwrap()
    }

    fn vertex(seq: &str, label: &str) -> Oligonucleotide {
        oligo(seq, 5, label)
    }

    /// Edges 0->1 and 1->2 with splints for all three vertices.
    fn ladder_pool() -> (Pool, Vec<OligoId>) {
        let e01 = oligo(&format!("{V0}{}", &V1[..5]), 10, "0->1");
        let e12 = oligo(&format!("{}{V2}", &V1[5..]), 5, "1->2");
        let c0 = vertex(V0, "0").complement();
        let c1 = vertex(V1, "1").complement();
        let c2 = vertex(V2, "2").complement();
        let mut pool = Pool::default();
        let ids = pool.add_oligonucleotides(vec![e01, e12, c0, c1, c2]);
        (pool, ids)
    }

    fn labels(pool: &Pool, start: OligoId) -> Vec<String> {
        pool.strand(start)
            .into_iter()
            .map(|id| pool.get(id).unwrap().label().to_string())
            .collect()
    }

    #[test]
    fn test_full_complements_center_bind() {
        let a = oligo("AACCGGTTAC", 5, "a");
        let b = a.complement();
        let mut pool = Pool::new(vec![a, b]);
        let ids = pool.ids();
        assert_eq!(pool.annealing(), 1);
        let (x, y) = (pool.get(ids[0]).unwrap(), pool.get(ids[1]).unwrap());
        assert_eq!(x.front(), Some(ids[1]));
        assert_eq!(y.front(), Some(ids[0]));
        assert_eq!(x.front_left(), None);
        assert_eq!(x.front_right(), None);
        assert_eq!(y.front_left(), None);
        assert_eq!(y.front_right(), None);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_staggered_bind_wins_over_center() {
        // Halves are identical, so a left-overlap bind is possible as well as
        // the full-length one; the left bind is tried first.
        let a = oligo("ACGTAACGTA", 5, "a");
        let b = a.complement();
        let mut pool = Pool::new(vec![a, b]);
        let ids = pool.ids();
        assert!(pool.anneal(ids[0], ids[1]));
        let x = pool.get(ids[0]).unwrap();
        assert_eq!(x.front_left(), Some(ids[1]));
        assert_eq!(x.front(), None);
        assert_eq!(pool.get(ids[1]).unwrap().front_right(), Some(ids[0]));
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_ladder_assembly_splices_both_strands() {
        let (mut pool, ids) = ladder_pool();
        let [e01, e12, c0, c1, c2] = ids[..] else {
            panic!("five members expected")
        };
        assert_eq!(pool.annealing(), 4);
        pool.check_invariants().unwrap();

        assert_eq!(pool.get(e01).unwrap().right(), Some(e12));
        assert_eq!(pool.get(e12).unwrap().left(), Some(e01));
        assert_eq!(pool.strand(c0), vec![c0, c1, c2]);
        assert_eq!(labels(&pool, c0), vec!["0-co", "1-co", "2-co"]);

        let x = pool.get(c1).unwrap();
        assert_eq!(x.front_left(), Some(e01));
        assert_eq!(x.front_right(), Some(e12));
        assert_eq!(pool.get_dna_strands(), vec![(e01, c0)]);
    }

    #[test]
    fn test_second_annealing_pass_is_stable() {
        let (mut pool, _) = ladder_pool();
        pool.annealing();
        assert_eq!(pool.annealing(), 0);
    }

    #[test]
    fn test_denaturing_keeps_strands() {
        let (mut pool, ids) = ladder_pool();
        pool.annealing();
        let before: Vec<(Option<OligoId>, Option<OligoId>)> = ids
            .iter()
            .map(|id| {
                let o = pool.get(*id).unwrap();
                (o.left(), o.right())
            })
            .collect();
        pool.denaturing();
        for (id, (left, right)) in ids.iter().zip(before) {
            let o = pool.get(*id).unwrap();
            assert!(o.pairing().is_free());
            assert_eq!(o.front(), None);
            assert_eq!(o.front_left(), None);
            assert_eq!(o.front_right(), None);
            assert_eq!(o.left(), left);
            assert_eq!(o.right(), right);
        }
        pool.check_invariants().unwrap();
        assert!(pool.get_dna_strands().is_empty());
    }

    #[test]
    fn test_single_denature_releases_partner() {
        let (mut pool, ids) = ladder_pool();
        pool.annealing();
        pool.denature(ids[0]);
        let c1 = pool.get(ids[3]).unwrap();
        assert_eq!(c1.front_left(), None);
        assert_eq!(c1.front_right(), Some(ids[1]));
        assert_eq!(pool.get(ids[2]).unwrap().pairing(), Pairing::Free);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_denature_keeps_other_side_of_bridge() {
        let (mut pool, ids) = ladder_pool();
        let [e01, e12, _, c1, _] = ids[..] else {
            panic!("five members expected")
        };
        pool.annealing();
        assert_eq!(
            pool.get(c1).unwrap().pairing(),
            Pairing::Bridged {
                left: e01,
                right: e12
            }
        );
        let e01_before = pool.get(e01).unwrap().pairing();

        pool.denature(e12);
        assert!(pool.get(e12).unwrap().pairing().is_free());
        assert_eq!(pool.get(c1).unwrap().pairing(), Pairing::LeftStaggered(e01));
        assert_eq!(pool.get(e01).unwrap().pairing(), e01_before);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_elongation_from_strand_start() {
        let (mut pool, ids) = ladder_pool();
        let [_, _, c0, c1, c2] = ids[..] else {
            panic!("five members expected")
        };
        pool.annealing();
        pool.denaturing();
        let forward = pool.get(c0).unwrap().primer();
        assert_eq!(forward.sequence(), V0);
        let primer = pool.add_oligonucleotide(forward);
        assert_eq!(pool.annealing_primers(), 1);
        assert_eq!(pool.get(primer).unwrap().front(), Some(c0));

        let created = pool.perform_elongation(primer);
        assert_eq!(created.len(), pool.strand_len(c0));
        assert_eq!(created.len(), 3);
        for (new_id, template) in created.iter().zip([c0, c1, c2]) {
            assert_eq!(pool.get(*new_id).unwrap().front(), Some(template));
            assert_eq!(pool.get(template).unwrap().front(), Some(*new_id));
            assert!(!pool.get(*new_id).unwrap().is_primer());
        }
        assert!(pool.get(primer).unwrap().pairing().is_free());
        assert_eq!(pool.strand(created[0]), created);
        assert_eq!(labels(&pool, created[0]), vec!["0", "1", "2"]);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_elongation_from_strand_end_runs_leftward() {
        let (mut pool, ids) = ladder_pool();
        let [e01, e12, _, _, _] = ids[..] else {
            panic!("five members expected")
        };
        pool.annealing();
        pool.denaturing();
        let reverse = pool.add_oligonucleotide(vertex(V2, "2").primer());
        pool.annealing_primers();
        assert_eq!(pool.get(reverse).unwrap().front_left(), Some(e12));

        let created = pool.perform_elongation(reverse);
        assert_eq!(created.len(), 2);
        assert_eq!(pool.get(created[0]).unwrap().front(), Some(e12));
        assert_eq!(pool.get(created[1]).unwrap().front(), Some(e01));
        assert_eq!(pool.strand(created[1]), vec![created[1], created[0]]);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_elongation_noops() {
        let (mut pool, ids) = ladder_pool();
        assert!(pool.perform_elongation(ids[0]).is_empty());
        let unbound = pool.add_oligonucleotide(vertex(V1, "1").primer());
        let before = pool.len();
        assert!(pool.perform_elongation(unbound).is_empty());
        assert!(pool.polymerase_chain_reaction().is_empty());
        assert_eq!(pool.len(), before);
    }

    #[test]
    fn test_pcr_only_uses_current_primers() {
        let (mut pool, _) = ladder_pool();
        pool.annealing();
        pool.denaturing();
        let primer = pool.get(OligoId::new(2)).unwrap().primer();
        pool.add_oligonucleotides(vec![primer.copy(), primer]);
        pool.annealing_primers();
        let created = pool.polymerase_chain_reaction();
        // Only one splint strand to prime; the second copy finds no template.
        assert_eq!(created.len(), 3);
        assert!(created.iter().all(|id| !pool.get(*id).unwrap().is_primer()));
        assert_eq!(pool.primers().len(), 2);
    }

    #[test]
    fn test_get_dna_strands_one_pair_per_duplex() {
        let a = oligo("AACCGGTTAC", 5, "a");
        let b = oligo("CCAAGGTTCA", 5, "b");
        let mut pool = Pool::new(vec![a.clone(), a.complement(), b.clone(), b.complement()]);
        pool.annealing();
        let pairs = pool.get_dna_strands();
        let ids = pool.ids();
        assert_eq!(pairs, vec![(ids[0], ids[1]), (ids[2], ids[3])]);
    }

    #[test]
    fn test_remove_clears_inbound_links() {
        let (mut pool, ids) = ladder_pool();
        pool.annealing();
        let removed = pool.remove(ids[3]).unwrap();
        assert_eq!(removed.label(), "1-co");
        assert!(removed.pairing().is_free());
        assert!(!pool.contains(ids[3]));
        assert_eq!(pool.get(ids[2]).unwrap().right(), None);
        assert_eq!(pool.get(ids[4]).unwrap().left(), None);
        assert_eq!(pool.get(ids[0]).unwrap().front_right(), None);
        assert_eq!(pool.get(ids[1]).unwrap().front_left(), None);
        pool.check_invariants().unwrap();
        assert!(matches!(
            pool.remove(ids[3]),
            Err(AdlemanError::UnknownOligo(_))
        ));
    }

    #[test]
    fn test_splice_refuses_cycles() {
        let mut pool = Pool::new(vec![
            vertex(V0, "0"),
            vertex(V1, "1"),
            vertex(V2, "2"),
        ]);
        let ids = pool.ids();
        assert!(pool.splice(ids[0], ids[1]));
        assert!(pool.splice(ids[1], ids[2]));
        assert!(!pool.splice(ids[2], ids[0]));
        assert!(!pool.splice(ids[1], ids[1]));
        pool.check_invariants().unwrap();
        assert_eq!(pool.strand(ids[0]), ids);
    }

    #[test]
    fn test_ligate_needs_open_ends() {
        let mut pool = Pool::new(vec![
            vertex(V0, "0"),
            vertex(V1, "1"),
            vertex(V2, "2"),
        ]);
        let ids = pool.ids();
        assert!(pool.ligate(ids[0], ids[1]));
        assert!(!pool.ligate(ids[0], ids[2]));
        assert!(!pool.ligate(ids[2], ids[1]));
        assert!(!pool.ligate(ids[1], ids[0]));
        assert!(pool.ligate(ids[1], ids[2]));
        assert_eq!(pool.strand(ids[0]), ids);
    }

    #[test]
    fn test_splice_detaches_previous_neighbours() {
        let mut pool = Pool::new(vec![
            vertex(V0, "0"),
            vertex(V1, "1"),
            vertex(V2, "2"),
        ]);
        let ids = pool.ids();
        pool.splice(ids[0], ids[1]);
        pool.splice(ids[0], ids[2]);
        assert_eq!(pool.get(ids[1]).unwrap().left(), None);
        assert_eq!(pool.strand(ids[0]), vec![ids[0], ids[2]]);
        pool.check_invariants().unwrap();
    }

    #[test]
    fn test_added_members_enter_free() {
        let (mut pool, ids) = ladder_pool();
        pool.annealing();
        let bound = pool.get(ids[3]).unwrap().clone();
        assert!(!bound.pairing().is_free());
        let mut other = Pool::default();
        let id = other.add_oligonucleotide(bound);
        let o = other.get(id).unwrap();
        assert!(o.pairing().is_free());
        assert_eq!(o.left(), None);
        assert_eq!(o.right(), None);
    }

    #[test]
    fn test_summary_counts() {
        let (mut pool, _) = ladder_pool();
        pool.annealing();
        let summary = pool.summary();
        assert_eq!(summary.member_count, 5);
        assert_eq!(summary.staggered_count, 5);
        assert_eq!(summary.free_count, 0);
        assert_eq!(summary.strand_count, 2);
    }
}
