//! Molecule graphs with precomputed neighbour shells.
//!
//! A [`MoleculeGraph`] is built once per molecule and per mapping run. Each
//! [`GraphAtom`] carries three immutable neighbour shells and a mutable
//! `remaining` working list that only shrinks while propagation runs.

use super::error::Error;
use crate::model::molecule::Molecule;
use crate::model::template::Side;
use crate::model::types::{AtomId, Element};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Bond distance of a neighbour shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shell {
    First,
    Second,
    Third,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::First, Shell::Second, Shell::Third];

    #[inline]
    pub fn depth(self) -> u8 {
        match self {
            Shell::First => 1,
            Shell::Second => 2,
            Shell::Third => 3,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self.depth() as usize - 1
    }
}

/// One atom of a [`MoleculeGraph`].
#[derive(Debug, Clone)]
pub struct GraphAtom {
    pub id: AtomId,
    pub kind: String,
    pub element: Element,
    pub is_anchor: bool,
    shells: [Vec<AtomId>; 3],
    shell_elements: [Vec<Element>; 3],
    remaining: Vec<(AtomId, Element)>,
}

impl GraphAtom {
    /// Ids in the given shell. The first shell keeps bond order, the outer
    /// shells are sorted by id.
    #[inline]
    pub fn shell(&self, shell: Shell) -> &[AtomId] {
        &self.shells[shell.slot()]
    }

    #[inline]
    pub fn shell_elements(&self, shell: Shell) -> &[Element] {
        &self.shell_elements[shell.slot()]
    }

    #[inline]
    pub fn neighbours(&self) -> &[AtomId] {
        self.shell(Shell::First)
    }

    /// Sorted, concatenated element symbols of one shell.
    pub fn fingerprint(&self, shell: Shell) -> String {
        let mut symbols: Vec<&str> = self
            .shell_elements(shell)
            .iter()
            .map(Element::symbol)
            .collect();
        symbols.sort_unstable();
        symbols.concat()
    }

    /// First-shell neighbours not yet consumed by the current mapping run.
    #[inline]
    pub fn remaining(&self) -> &[(AtomId, Element)] {
        &self.remaining
    }
}

/// Immutable bonded graph of one molecule.
#[derive(Debug, Clone)]
pub struct MoleculeGraph {
    side: Side,
    atoms: Vec<GraphAtom>,
    index: HashMap<AtomId, usize>,
}

impl MoleculeGraph {
    /// Builds the graph of `molecule`, leaving `creates` out entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBond`] if a bond references an unknown atom or
    /// bonds an atom to itself, and [`Error::UnknownAtom`] if an anchor or a
    /// creation atom is not part of the molecule.
    pub fn build(
        side: Side,
        molecule: &Molecule,
        anchors: &[AtomId],
        creates: &[AtomId],
    ) -> Result<Self, Error> {
        let known: HashSet<AtomId> = molecule.atoms.iter().map(|a| a.id).collect();
        for &id in creates {
            if !known.contains(&id) {
                return Err(Error::unknown_atom(side, id, "creation"));
            }
        }
        let creates: HashSet<AtomId> = creates.iter().copied().collect();
        let anchor_set: HashSet<AtomId> = anchors.iter().copied().collect();

        let mut adjacency: HashMap<AtomId, Vec<AtomId>> = HashMap::new();
        for bond in &molecule.bonds {
            for id in [bond.i, bond.j] {
                if !known.contains(&id) {
                    return Err(Error::invalid_bond(
                        side,
                        bond.i,
                        bond.j,
                        format!("atom {id} is not part of the molecule"),
                    ));
                }
            }
            if bond.i == bond.j {
                return Err(Error::invalid_bond(
                    side,
                    bond.i,
                    bond.j,
                    "atom is bonded to itself",
                ));
            }
            if creates.contains(&bond.i) || creates.contains(&bond.j) {
                continue;
            }
            for (a, b) in [(bond.i, bond.j), (bond.j, bond.i)] {
                let list = adjacency.entry(a).or_default();
                if !list.contains(&b) {
                    list.push(b);
                }
            }
        }

        let elements: HashMap<AtomId, Element> =
            molecule.atoms.iter().map(|a| (a.id, a.element)).collect();

        let mut atoms = Vec::with_capacity(molecule.atoms.len());
        let mut index = HashMap::with_capacity(molecule.atoms.len());
        for atom in molecule.atoms.iter().filter(|a| !creates.contains(&a.id)) {
            let first = neighbours_of(&adjacency, atom.id).to_vec();

            let mut excluded: HashSet<AtomId> = anchor_set.clone();
            excluded.insert(atom.id);
            excluded.extend(first.iter().copied());
            let second = expand_shell(&adjacency, &first, &excluded);

            excluded.extend(second.iter().copied());
            let third = expand_shell(&adjacency, &second, &excluded);

            let shells = [first, second, third];
            let shell_elements: [Vec<Element>; 3] = shells
                .each_ref()
                .map(|shell| shell.iter().map(|id| elements[id]).collect());
            let remaining = shells[0].iter().map(|id| (*id, elements[id])).collect();

            if index.insert(atom.id, atoms.len()).is_some() {
                return Err(Error::DuplicateAtom { side, id: atom.id });
            }
            atoms.push(GraphAtom {
                id: atom.id,
                kind: atom.kind.clone(),
                element: atom.element,
                is_anchor: anchor_set.contains(&atom.id),
                shells,
                shell_elements,
                remaining,
            });
        }

        for &id in anchors {
            if !index.contains_key(&id) {
                return Err(Error::unknown_atom(side, id, "bonding"));
            }
        }

        Ok(Self { side, atoms, index })
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn contains(&self, id: AtomId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: AtomId) -> Option<&GraphAtom> {
        self.index.get(&id).map(|&idx| &self.atoms[idx])
    }

    /// Atoms in input order.
    pub fn atoms(&self) -> impl Iterator<Item = &GraphAtom> {
        self.atoms.iter()
    }

    /// Prunes the working list of `id` against `mapped` and hands it out.
    ///
    /// The list must be given back with [`restore_remaining`](Self::restore_remaining).
    pub(crate) fn take_remaining(
        &mut self,
        id: AtomId,
        mapped: &HashSet<AtomId>,
    ) -> Vec<(AtomId, Element)> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut list = std::mem::take(&mut self.atoms[idx].remaining);
        list.retain(|(nb, _)| !mapped.contains(nb));
        list
    }

    pub(crate) fn restore_remaining(&mut self, id: AtomId, list: Vec<(AtomId, Element)>) {
        if let Some(&idx) = self.index.get(&id) {
            self.atoms[idx].remaining = list;
        }
    }

    /// Breadth-first shortest path from `start` to `goal`.
    ///
    /// The edge named by `forbidden` is never traversed, in either direction.
    pub fn shortest_path(
        &self,
        start: AtomId,
        goal: AtomId,
        forbidden: Option<(AtomId, AtomId)>,
    ) -> Option<Vec<AtomId>> {
        if !self.contains(start) || !self.contains(goal) {
            return None;
        }
        let blocked = |a: AtomId, b: AtomId| {
            forbidden.is_some_and(|(x, y)| (a == x && b == y) || (a == y && b == x))
        };

        let mut parent: HashMap<AtomId, AtomId> = HashMap::new();
        let mut seen: HashSet<AtomId> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            if node == goal {
                let mut path = vec![goal];
                let mut cursor = goal;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            let Some(atom) = self.get(node) else {
                continue;
            };
            for &next in atom.neighbours() {
                if blocked(node, next) || !seen.insert(next) {
                    continue;
                }
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
        None
    }

    /// Every atom connected to `start` by some bonded path, `start` included.
    pub fn reachable_from(&self, start: AtomId) -> HashSet<AtomId> {
        let mut seen = HashSet::new();
        if !self.contains(start) {
            return seen;
        }
        seen.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            if let Some(atom) = self.get(node) {
                for &next in atom.neighbours() {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }
}

fn neighbours_of(adjacency: &HashMap<AtomId, Vec<AtomId>>, id: AtomId) -> &[AtomId] {
    adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
}

fn expand_shell(
    adjacency: &HashMap<AtomId, Vec<AtomId>>,
    frontier: &[AtomId],
    excluded: &HashSet<AtomId>,
) -> Vec<AtomId> {
    let shell: BTreeSet<AtomId> = frontier
        .iter()
        .flat_map(|&id| neighbours_of(adjacency, id).iter().copied())
        .filter(|id| !excluded.contains(id))
        .collect();
    shell.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::molecule::Bond;

    fn ids(raw: &[u32]) -> Vec<AtomId> {
        raw.iter().copied().map(AtomId::new).collect()
    }

    /// Chain C1-C2-C3-C4-C5 with H6 on C1.
    fn make_chain() -> Molecule {
        let mut mol = Molecule::new();
        for id in 1..=5 {
            mol.atoms.push(Atom::new(id, "1", Element::C));
        }
        mol.atoms.push(Atom::new(6, "2", Element::H));
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5), (1, 6)] {
            mol.bonds.push(Bond::new(a, b));
        }
        mol
    }

    /// Six-membered carbon ring 1..=6.
    fn make_ring() -> Molecule {
        let mut mol = Molecule::new();
        for id in 1..=6 {
            mol.atoms.push(Atom::new(id, "1", Element::C));
        }
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)] {
            mol.bonds.push(Bond::new(a, b));
        }
        mol
    }

    #[test]
    fn shells_expand_outward_without_overlap() {
        let graph = MoleculeGraph::build(Side::Pre, &make_chain(), &[], &[]).unwrap();
        let c1 = graph.get(AtomId::new(1)).unwrap();

        assert_eq!(c1.shell(Shell::First), ids(&[2, 6]).as_slice());
        assert_eq!(c1.shell(Shell::Second), ids(&[3]).as_slice());
        assert_eq!(c1.shell(Shell::Third), ids(&[4]).as_slice());
        assert_eq!(c1.shell_elements(Shell::First), &[Element::C, Element::H]);
    }

    #[test]
    fn anchors_are_excluded_from_outer_shells_only() {
        let graph =
            MoleculeGraph::build(Side::Pre, &make_chain(), &ids(&[3]), &[]).unwrap();
        let c2 = graph.get(AtomId::new(2)).unwrap();
        let c1 = graph.get(AtomId::new(1)).unwrap();

        assert!(c2.shell(Shell::First).contains(&AtomId::new(3)));
        assert!(c1.shell(Shell::Second).is_empty());
        assert!(c1.shell(Shell::Third).is_empty());
        assert!(graph.get(AtomId::new(3)).unwrap().is_anchor);
        assert!(!c1.is_anchor);
    }

    #[test]
    fn outer_shells_exclude_self_in_rings() {
        let graph = MoleculeGraph::build(Side::Pre, &make_ring(), &[], &[]).unwrap();
        let c1 = graph.get(AtomId::new(1)).unwrap();

        assert_eq!(c1.shell(Shell::First), ids(&[2, 6]).as_slice());
        assert_eq!(c1.shell(Shell::Second), ids(&[3, 5]).as_slice());
        assert_eq!(c1.shell(Shell::Third), ids(&[4]).as_slice());
    }

    #[test]
    fn create_atoms_are_left_out() {
        let mut mol = make_chain();
        mol.atoms.push(Atom::new(7, "2", Element::H));
        mol.bonds.push(Bond::new(5, 7));

        let graph = MoleculeGraph::build(Side::Post, &mol, &[], &ids(&[7])).unwrap();
        assert_eq!(graph.len(), 6);
        assert!(!graph.contains(AtomId::new(7)));
        assert_eq!(
            graph.get(AtomId::new(5)).unwrap().shell(Shell::First),
            ids(&[4]).as_slice()
        );
    }

    #[test]
    fn fingerprint_sorts_symbols() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(1, "1", Element::C));
        mol.atoms.push(Atom::new(2, "2", Element::N));
        mol.atoms.push(Atom::new(3, "3", Element::H));
        mol.atoms.push(Atom::new(4, "1", Element::C));
        mol.bonds.push(Bond::new(1, 2));
        mol.bonds.push(Bond::new(1, 3));
        mol.bonds.push(Bond::new(1, 4));

        let graph = MoleculeGraph::build(Side::Pre, &mol, &[], &[]).unwrap();
        assert_eq!(graph.get(AtomId::new(1)).unwrap().fingerprint(Shell::First), "CHN");
        assert_eq!(graph.get(AtomId::new(3)).unwrap().fingerprint(Shell::Third), "");
    }

    #[test]
    fn duplicate_bonds_do_not_duplicate_neighbours() {
        let mut mol = make_chain();
        mol.bonds.push(Bond::new(2, 1));
        let graph = MoleculeGraph::build(Side::Pre, &mol, &[], &[]).unwrap();
        assert_eq!(graph.get(AtomId::new(1)).unwrap().neighbours().len(), 2);
    }

    #[test]
    fn errors_on_unknown_bond_atom() {
        let mut mol = make_chain();
        mol.bonds.push(Bond::new(1, 99));
        let result = MoleculeGraph::build(Side::Pre, &mol, &[], &[]);
        assert!(matches!(result, Err(Error::InvalidBond { side: Side::Pre, .. })));
    }

    #[test]
    fn errors_on_unknown_anchor() {
        let result = MoleculeGraph::build(Side::Post, &make_chain(), &ids(&[42]), &[]);
        assert!(matches!(
            result,
            Err(Error::UnknownAtom { side: Side::Post, role: "bonding", .. })
        ));
    }

    #[test]
    fn remaining_is_pruned_against_mapped_ids() {
        let mut graph = MoleculeGraph::build(Side::Pre, &make_chain(), &[], &[]).unwrap();
        let mapped = HashSet::from([AtomId::new(6)]);

        let list = graph.take_remaining(AtomId::new(1), &mapped);
        assert_eq!(list, vec![(AtomId::new(2), Element::C)]);
        graph.restore_remaining(AtomId::new(1), list);

        let c1 = graph.get(AtomId::new(1)).unwrap();
        assert_eq!(c1.remaining().len(), 1);
        assert_eq!(c1.shell(Shell::First).len(), 2);
    }

    #[test]
    fn shortest_path_avoids_forbidden_edge() {
        let graph = MoleculeGraph::build(Side::Pre, &make_ring(), &[], &[]).unwrap();
        let one = AtomId::new(1);
        let two = AtomId::new(2);

        assert_eq!(graph.shortest_path(two, one, None), Some(ids(&[2, 1])));
        let around = graph.shortest_path(two, one, Some((two, one))).unwrap();
        assert_eq!(around, ids(&[2, 3, 4, 5, 6, 1]));
    }

    #[test]
    fn reachability_splits_fragments() {
        let mut mol = make_chain();
        mol.atoms.push(Atom::new(10, "3", Element::O));
        let graph = MoleculeGraph::build(Side::Post, &mol, &[], &[]).unwrap();

        let reach = graph.reachable_from(AtomId::new(3));
        assert_eq!(reach.len(), 6);
        assert!(!reach.contains(&AtomId::new(10)));
    }
}
