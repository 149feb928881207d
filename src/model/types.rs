use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid atom id: '{0}' (expected a positive integer)")]
pub struct ParseAtomIdError(String);

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Chemical element tag, stored as its atomic number.
///
/// The mapper never interprets chemistry; elements are only compared for
/// equality and rendered as symbols when building neighbour fingerprints.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

#[allow(non_upper_case_globals)]
impl Element {
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const Si: Element = Element(14);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const Cl: Element = Element(17);
    pub const Br: Element = Element(35);
    pub const I: Element = Element(53);

    pub fn from_atomic_number(z: u8) -> Option<Self> {
        (1..=SYMBOLS.len() as u8).contains(&z).then_some(Element(z))
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    pub fn symbol(&self) -> &'static str {
        SYMBOLS[(self.0 - 1) as usize]
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        *self == Element::H
    }

    /// Parses a symbol regardless of case (`"CL"`, `"cl"` and `"Cl"` are all chlorine).
    ///
    /// LAMMPS element-by-type lists are frequently written in upper case.
    pub fn from_symbol_ignore_case(s: &str) -> Result<Self, ParseElementError> {
        SYMBOLS
            .iter()
            .position(|sym| sym.eq_ignore_ascii_case(s.trim()))
            .map(|idx| Element(idx as u8 + 1))
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOLS
            .iter()
            .position(|sym| *sym == s)
            .map(|idx| Element(idx as u8 + 1))
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

/// Atom identifier as it appears in LAMMPS files.
///
/// Identifiers are opaque handles: they are only compared, hashed, ordered
/// and relabelled, never used for arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u32);

impl AtomId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for AtomId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Debug for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AtomId {
    type Err = ParseAtomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ParseAtomIdError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn element_from_str_valid() {
        assert_eq!(Element::from_str("H").unwrap(), Element::H);
        assert_eq!(Element::from_str("Cl").unwrap(), Element::Cl);
        assert_eq!(Element::from_str("Og").unwrap().atomic_number(), 118);
    }

    #[test]
    fn element_from_str_is_case_sensitive() {
        let err = Element::from_str("cl").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid or unsupported element symbol: 'cl'"
        );
    }

    #[test]
    fn element_ignore_case_accepts_upper_case_lists() {
        assert_eq!(Element::from_symbol_ignore_case("CL").unwrap(), Element::Cl);
        assert_eq!(Element::from_symbol_ignore_case("br").unwrap(), Element::Br);
        assert_eq!(Element::from_symbol_ignore_case(" c ").unwrap(), Element::C);
        assert!(Element::from_symbol_ignore_case("Xx").is_err());
    }

    #[test]
    fn element_symbol_and_display_agree() {
        assert_eq!(Element::Si.symbol(), "Si");
        assert_eq!(Element::Si.to_string(), "Si");
        assert_eq!(format!("{:?}", Element::N), "N");
        assert!(Element::H.is_hydrogen());
        assert!(!Element::C.is_hydrogen());
    }

    #[test]
    fn element_from_atomic_number_bounds() {
        assert_eq!(Element::from_atomic_number(6), Some(Element::C));
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(119), None);
    }

    #[test]
    fn atom_id_parses_positive_integers() {
        assert_eq!(AtomId::from_str("42").unwrap(), AtomId::new(42));
        assert_eq!(AtomId::from_str(" 7 ").unwrap().get(), 7);
        assert!(AtomId::from_str("0").is_err());
        assert!(AtomId::from_str("-3").is_err());
        assert!(AtomId::from_str("C1").is_err());
    }

    #[test]
    fn atom_ids_order_numerically() {
        let mut ids = vec![AtomId::new(10), AtomId::new(2), AtomId::new(33)];
        ids.sort();
        assert_eq!(ids, vec![AtomId::new(2), AtomId::new(10), AtomId::new(33)]);
    }
}
