use std::fmt;

pub mod error;
pub mod lammps;
pub mod map;

pub use error::Error;
pub use lammps::{
    Coeff, CoeffKind, Interaction, LammpsAtom, LammpsData, Mass, TypeCounts, TypeMaps,
    read_coeffs, read_lammps, unify_coeffs, unify_types, write_coeffs, write_data,
    write_molecule,
};
pub use map::write_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    LammpsData,
    LammpsMolecule,
    LammpsCoeffs,
    Map,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::LammpsData => write!(f, "LAMMPS data"),
            Format::LammpsMolecule => write!(f, "LAMMPS molecule"),
            Format::LammpsCoeffs => write!(f, "LAMMPS coefficient"),
            Format::Map => write!(f, "reaction map"),
        }
    }
}
