//! Breadth-first propagation of confirmed pairs across both molecule graphs.
//!
//! Starting from the bonding atom pairs, every dequeued pair compares the
//! unconsumed first-shell neighbours of its pre and post atoms and confirms
//! whatever pairs can be proven locally. Atoms that cannot be paired here are
//! recorded as missing and left for the reconciler.

use super::error::Error;
use super::graph::MoleculeGraph;
use super::symmetry::{self, Basis, Resolution, ResolveBy};
use crate::model::template::{MappedPair, MatchEvent, MatchSource, Side};
use crate::model::types::{AtomId, Element};
use log::{debug, warn};
use std::collections::{HashMap, HashSet, VecDeque};

/// Ordered list of confirmed pairs, injective on both sides.
#[derive(Debug, Clone, Default)]
pub struct MappingList {
    pairs: Vec<MappedPair>,
    pre: HashSet<AtomId>,
    post: HashSet<AtomId>,
}

impl MappingList {
    /// Appends a pair unless either atom is already mapped.
    pub fn insert(&mut self, pre: AtomId, post: AtomId, source: MatchSource) -> bool {
        if self.pre.contains(&pre) || self.post.contains(&post) {
            return false;
        }
        self.pre.insert(pre);
        self.post.insert(post);
        self.pairs.push(MappedPair { pre, post, source });
        true
    }

    #[inline]
    pub fn contains_pre(&self, id: AtomId) -> bool {
        self.pre.contains(&id)
    }

    #[inline]
    pub fn contains_post(&self, id: AtomId) -> bool {
        self.post.contains(&id)
    }

    pub fn mapped(&self, side: Side) -> &HashSet<AtomId> {
        match side {
            Side::Pre => &self.pre,
            Side::Post => &self.post,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[MappedPair] {
        &self.pairs
    }

    /// Pre-to-post lookup table.
    pub fn forward(&self) -> HashMap<AtomId, AtomId> {
        self.pairs.iter().map(|p| (p.pre, p.post)).collect()
    }

    pub fn into_pairs(self) -> Vec<MappedPair> {
        self.pairs
    }
}

/// Mutable state of one mapping computation.
#[derive(Debug)]
pub struct MatchState {
    pub(crate) pre: MoleculeGraph,
    pub(crate) post: MoleculeGraph,
    pub(crate) mapping: MappingList,
    pub(crate) queue: VecDeque<(AtomId, AtomId)>,
    pub(crate) missing_pre: Vec<AtomId>,
    pub(crate) missing_post: Vec<AtomId>,
    pub(crate) events: Vec<MatchEvent>,
}

impl MatchState {
    pub fn new(pre: MoleculeGraph, post: MoleculeGraph) -> Self {
        Self {
            pre,
            post,
            mapping: MappingList::default(),
            queue: VecDeque::new(),
            missing_pre: Vec::new(),
            missing_post: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Trusts the bonding atom pairs and queues them for expansion.
    pub fn seed_anchors(&mut self, pre: &[AtomId], post: &[AtomId]) -> Result<(), Error> {
        if pre.len() != post.len() || pre.is_empty() {
            return Err(Error::UnbalancedAnchors {
                pre: pre.len(),
                post: post.len(),
            });
        }
        for (&a, &b) in pre.iter().zip(post) {
            self.confirm_declared(a, b, MatchSource::Anchor)?;
            self.queue.push_back((a, b));
        }
        Ok(())
    }

    /// Trusts the deletion atom pairs without queuing them.
    pub fn seed_deletions(&mut self, pre: &[AtomId], post: &[AtomId]) -> Result<(), Error> {
        if pre.len() != post.len() {
            return Err(Error::UnbalancedDeletions {
                pre: pre.len(),
                post: post.len(),
            });
        }
        for (&a, &b) in pre.iter().zip(post) {
            self.confirm_declared(a, b, MatchSource::Deletion)?;
        }
        Ok(())
    }

    fn confirm_declared(&mut self, pre: AtomId, post: AtomId, source: MatchSource) -> Result<(), Error> {
        if self.mapping.contains_pre(pre) {
            return Err(Error::DuplicateMapping { side: Side::Pre, id: pre });
        }
        if self.mapping.contains_post(post) {
            return Err(Error::DuplicateMapping { side: Side::Post, id: post });
        }
        self.mapping.insert(pre, post, source);
        debug!("pre {pre} -> post {post} found as {source}");
        Ok(())
    }

    /// Drains the work queue, expanding each pair in FIFO order.
    pub fn run_queue(&mut self) {
        while let Some((pre, post)) = self.queue.pop_front() {
            self.expand(pre, post);
        }
    }

    /// Matches the unconsumed neighbours of one confirmed pair.
    fn expand(&mut self, pre_id: AtomId, post_id: AtomId) {
        let pre_remaining = self.pre.take_remaining(pre_id, self.mapping.mapped(Side::Pre));
        let mut post_remaining = self.post.take_remaining(post_id, self.mapping.mapped(Side::Post));

        let gated = gated_elements(&pre_remaining, &post_remaining);

        for &(nb, element) in &pre_remaining {
            if gated.contains(&element) {
                push_unique(&mut self.missing_pre, nb);
                continue;
            }

            let positions: Vec<usize> = post_remaining
                .iter()
                .enumerate()
                .filter(|(_, (_, el))| *el == element)
                .map(|(idx, _)| idx)
                .collect();

            let chosen = match positions.as_slice() {
                [] => None,
                [only] => Some((*only, MatchSource::Unique)),
                [.., last] if element.is_hydrogen() => Some((*last, MatchSource::Hydrogen)),
                _ => self.resolve_neighbour(nb, &post_remaining, &positions),
            };

            match chosen {
                Some((idx, source)) => {
                    let (post_nb, _) = post_remaining.remove(idx);
                    self.confirm(nb, post_nb, element, source);
                }
                None => push_unique(&mut self.missing_pre, nb),
            }
        }

        for &(post_nb, _) in &post_remaining {
            push_unique(&mut self.missing_post, post_nb);
        }

        self.pre.restore_remaining(pre_id, pre_remaining);
        self.post.restore_remaining(post_id, post_remaining);
    }

    fn resolve_neighbour(
        &self,
        pre_nb: AtomId,
        post_remaining: &[(AtomId, Element)],
        positions: &[usize],
    ) -> Option<(usize, MatchSource)> {
        let reference = self.pre.get(pre_nb)?;
        let candidates: Vec<_> = positions
            .iter()
            .filter_map(|&idx| self.post.get(post_remaining[idx].0))
            .collect();

        let resolved = symmetry::resolve(&candidates, reference, ResolveBy::Id, false);
        let Some(resolved) = resolved else {
            debug!("no symmetric partner found for pre atom {pre_nb}");
            return None;
        };
        let Resolution::ById(post_id) = resolved.resolution else {
            return None;
        };
        let idx = positions
            .iter()
            .copied()
            .find(|&idx| post_remaining[idx].0 == post_id)?;
        Some((idx, source_of(resolved.basis)))
    }

    /// Records a confirmed pair and queues it when it can expand further.
    pub(crate) fn confirm(&mut self, pre: AtomId, post: AtomId, element: Element, source: MatchSource) {
        if !self.mapping.insert(pre, post, source) {
            return;
        }
        debug!("pre {pre} -> post {post} found by {source}");
        if !element.is_hydrogen() {
            self.queue.push_back((pre, post));
        }
    }

    pub(crate) fn advise(&mut self, event: MatchEvent) {
        warn!("{event}");
        self.events.push(event);
    }

    pub fn into_parts(self) -> (MoleculeGraph, MoleculeGraph, MappingList, Vec<MatchEvent>) {
        (self.pre, self.post, self.mapping, self.events)
    }
}

pub(crate) fn source_of(basis: Basis) -> MatchSource {
    match basis {
        Basis::Shell(shell) => MatchSource::Symmetry(shell.depth()),
        Basis::Inference => MatchSource::Inferred,
    }
}

/// Elements whose counts differ between the two neighbour lists.
///
/// Hydrogen is never gated.
fn gated_elements(pre: &[(AtomId, Element)], post: &[(AtomId, Element)]) -> HashSet<Element> {
    let mut counts: HashMap<Element, (usize, usize)> = HashMap::new();
    for (_, el) in pre {
        counts.entry(*el).or_default().0 += 1;
    }
    for (_, el) in post {
        counts.entry(*el).or_default().1 += 1;
    }
    counts
        .into_iter()
        .filter(|(el, (a, b))| a != b && !el.is_hydrogen())
        .map(|(el, _)| el)
        .collect()
}

pub(crate) fn push_unique(list: &mut Vec<AtomId>, id: AtomId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::molecule::{Bond, Molecule};

    fn id(raw: u32) -> AtomId {
        AtomId::new(raw)
    }

    fn molecule(atoms: &[(u32, Element)], bonds: &[(u32, u32)]) -> Molecule {
        let mut mol = Molecule::new();
        for &(id, el) in atoms {
            mol.atoms.push(Atom::new(id, el.symbol(), el));
        }
        for &(a, b) in bonds {
            mol.bonds.push(Bond::new(a, b));
        }
        mol
    }

    fn state(pre: &Molecule, post: &Molecule, pre_anchors: &[u32], post_anchors: &[u32]) -> MatchState {
        let pa: Vec<_> = pre_anchors.iter().copied().map(id).collect();
        let qa: Vec<_> = post_anchors.iter().copied().map(id).collect();
        let pre = MoleculeGraph::build(Side::Pre, pre, &pa, &[]).unwrap();
        let post = MoleculeGraph::build(Side::Post, post, &qa, &[]).unwrap();
        let mut state = MatchState::new(pre, post);
        state.seed_anchors(&pa, &qa).unwrap();
        state
    }

    /// Anchor C1 with neighbours C2, H3, H4; C2 carries H5.
    fn make_ch2() -> Molecule {
        molecule(
            &[
                (1, Element::C),
                (2, Element::C),
                (3, Element::H),
                (4, Element::H),
                (5, Element::H),
            ],
            &[(1, 2), (1, 3), (1, 4), (2, 5)],
        )
    }

    #[test]
    fn mapping_list_rejects_reused_ids() {
        let mut list = MappingList::default();
        assert!(list.insert(id(1), id(10), MatchSource::Anchor));
        assert!(!list.insert(id(1), id(11), MatchSource::Unique));
        assert!(!list.insert(id(2), id(10), MatchSource::Unique));
        assert_eq!(list.len(), 1);
        assert_eq!(list.forward().get(&id(1)), Some(&id(10)));
    }

    #[test]
    fn unique_carbon_is_queued_and_hydrogens_are_not() {
        let mol = make_ch2();
        let mut state = state(&mol, &mol, &[1], &[1]);

        let (pre, post) = state.queue.pop_front().unwrap();
        state.expand(pre, post);

        let sources: HashMap<AtomId, MatchSource> = state
            .mapping
            .pairs()
            .iter()
            .map(|p| (p.pre, p.source))
            .collect();
        assert_eq!(sources[&id(2)], MatchSource::Unique);
        assert_eq!(sources[&id(3)], MatchSource::Hydrogen);
        assert_eq!(sources.len(), 4);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.queue[0], (id(2), id(2)));
    }

    #[test]
    fn hydrogens_take_the_last_candidate() {
        let mol = make_ch2();
        let mut state = state(&mol, &mol, &[1], &[1]);
        state.run_queue();

        let forward = state.mapping.forward();
        assert_eq!(forward[&id(3)], id(4));
        assert_eq!(forward[&id(4)], id(3));
        assert_eq!(forward[&id(5)], id(5));
        assert!(state.missing_pre.is_empty());
        assert!(state.missing_post.is_empty());
    }

    #[test]
    fn unequal_element_counts_defer_to_missing() {
        let pre = molecule(
            &[(1, Element::C), (2, Element::O), (3, Element::N)],
            &[(1, 2), (1, 3)],
        );
        let post = molecule(
            &[(1, Element::C), (2, Element::O), (3, Element::O)],
            &[(1, 2), (1, 3)],
        );
        let mut state = state(&pre, &post, &[1], &[1]);
        state.run_queue();

        assert_eq!(state.missing_pre, vec![id(2), id(3)]);
        assert_eq!(state.missing_post, vec![id(2), id(3)]);
        assert_eq!(state.mapping.len(), 1);
    }

    #[test]
    fn symmetric_neighbours_without_proof_are_missing() {
        let mol = molecule(
            &[(1, Element::O), (2, Element::C), (3, Element::C)],
            &[(1, 2), (1, 3)],
        );
        let mut state = state(&mol, &mol, &[1], &[1]);
        state.run_queue();

        assert_eq!(state.missing_pre, vec![id(2), id(3)]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn unbalanced_declarations_are_rejected() {
        let mol = make_ch2();
        let pre = MoleculeGraph::build(Side::Pre, &mol, &[], &[]).unwrap();
        let post = MoleculeGraph::build(Side::Post, &mol, &[], &[]).unwrap();
        let mut state = MatchState::new(pre, post);

        assert!(matches!(
            state.seed_anchors(&[id(1)], &[]),
            Err(Error::UnbalancedAnchors { pre: 1, post: 0 })
        ));
        assert!(matches!(
            state.seed_deletions(&[id(3), id(4)], &[id(3)]),
            Err(Error::UnbalancedDeletions { pre: 2, post: 1 })
        ));
    }

    #[test]
    fn deletion_overlapping_anchor_is_rejected() {
        let mol = make_ch2();
        let mut state = state(&mol, &mol, &[1], &[1]);
        assert!(matches!(
            state.seed_deletions(&[id(1)], &[id(3)]),
            Err(Error::DuplicateMapping { side: Side::Pre, .. })
        ));
    }
}
