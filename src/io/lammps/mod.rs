//! LAMMPS `read_data` and molecule files.
//!
//! Both file kinds are parsed into the same [`LammpsData`] record, which keeps
//! every per-atom and per-interaction column the molecule writer needs to
//! reproduce them. Chemistry is not interpreted: atom kinds are the numeric
//! LAMMPS types and elements come from a caller-supplied list indexed by type.
//!
//! [`unify_types`] and [`unify_coeffs`] compact the type numbering shared by
//! several data files and their coefficient file.

mod clean;
mod reader;
mod writer;

pub use clean::{
    Coeff, CoeffKind, TypeMaps, read_coeffs, unify_coeffs, unify_types, write_coeffs,
};
pub use reader::read as read_lammps;
pub use writer::{write_data, write_molecule};

use super::error::Error;
use crate::model::atom::Atom;
use crate::model::molecule::{Bond, Molecule};
use crate::model::types::{AtomId, Element};

/// One row of the `Atoms` section, or the merged `Types`/`Charges`/`Coords`
/// rows of a molecule file.
#[derive(Debug, Clone, PartialEq)]
pub struct LammpsAtom {
    pub id: AtomId,
    /// Molecule tag; molecule files do not carry one.
    pub molecule: Option<u32>,
    pub ty: usize,
    pub charge: f64,
    pub position: [f64; 3],
}

/// A typed bonded interaction over `N` atoms (bond, angle, dihedral or improper).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction<const N: usize> {
    pub ty: usize,
    pub atoms: [AtomId; N],
}

/// Number of declared types per kind (`N atom types`, `N bond types`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub atoms: usize,
    pub bonds: usize,
    pub angles: usize,
    pub dihedrals: usize,
    pub impropers: usize,
}

/// One row of the `Masses` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mass {
    pub ty: usize,
    pub mass: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LammpsData {
    pub title: String,
    /// Header lines other than counts, such as box bounds, kept verbatim.
    pub header: Vec<String>,
    pub type_counts: TypeCounts,
    pub masses: Vec<Mass>,
    pub atoms: Vec<LammpsAtom>,
    pub bonds: Vec<Interaction<2>>,
    pub angles: Vec<Interaction<3>>,
    pub dihedrals: Vec<Interaction<4>>,
    pub impropers: Vec<Interaction<4>>,
}

impl LammpsData {
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Builds the mapper input, assigning `elements_by_type[ty - 1]` to each atom.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAtomType`] when an atom's type has no entry in
    /// `elements_by_type`.
    pub fn to_molecule(&self, elements_by_type: &[Element]) -> Result<Molecule, Error> {
        let atoms = self
            .atoms
            .iter()
            .map(|atom| {
                let element = atom
                    .ty
                    .checked_sub(1)
                    .and_then(|idx| elements_by_type.get(idx))
                    .ok_or(Error::UnknownAtomType {
                        atom: atom.id,
                        ty: atom.ty,
                        available: elements_by_type.len(),
                    })?;
                Ok(Atom::new(atom.id, atom.ty.to_string(), *element))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let bonds = self
            .bonds
            .iter()
            .map(|bond| Bond::new(bond.atoms[0], bond.atoms[1]))
            .collect();

        Ok(Molecule { atoms, bonds })
    }
}
