use super::atom::Atom;
use super::types::AtomId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: AtomId,
    pub j: AtomId,
}

impl Bond {
    pub fn new(a: impl Into<AtomId>, b: impl Into<AtomId>) -> Self {
        Self {
            i: a.into(),
            j: b.into(),
        }
    }

    /// Returns the partner of `atom` if this bond touches it.
    #[inline]
    pub fn partner(&self, atom: AtomId) -> Option<AtomId> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }
}

/// Plain bonded topology of one molecule, in file order.
///
/// Atom order is significant: it fixes the iteration order of the mapper
/// wherever a tie has to be broken deterministically.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.id == id)
    }
}
