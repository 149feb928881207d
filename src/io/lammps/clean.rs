use super::{Interaction, LammpsData, TypeCounts};
use crate::io::{Format, error::Error};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{BufRead, Write};

/// Old-to-new type numbers for each kind, built by [`unify_types`].
///
/// New numbers are dense (`1..=n`) and follow the ascending order of the old
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMaps {
    pub atoms: BTreeMap<usize, usize>,
    pub bonds: BTreeMap<usize, usize>,
    pub angles: BTreeMap<usize, usize>,
    pub dihedrals: BTreeMap<usize, usize>,
    pub impropers: BTreeMap<usize, usize>,
}

impl TypeMaps {
    pub fn type_counts(&self) -> TypeCounts {
        TypeCounts {
            atoms: self.atoms.len(),
            bonds: self.bonds.len(),
            angles: self.angles.len(),
            dihedrals: self.dihedrals.len(),
            impropers: self.impropers.len(),
        }
    }

    /// The map that renumbers the type fields of a coefficient line.
    pub fn for_kind(&self, kind: CoeffKind) -> &BTreeMap<usize, usize> {
        match kind {
            CoeffKind::Pair => &self.atoms,
            CoeffKind::Bond => &self.bonds,
            CoeffKind::Angle => &self.angles,
            CoeffKind::Dihedral => &self.dihedrals,
            CoeffKind::Improper => &self.impropers,
        }
    }
}

/// Renumbers the types of several data files onto one shared dense numbering.
///
/// Only types used by an atom or interaction of some file survive. `Masses`
/// rows of unused atom types are dropped, and each file's type counts are set
/// to the size of the shared numbering.
pub fn unify_types(files: &mut [LammpsData]) -> TypeMaps {
    let maps = TypeMaps {
        atoms: dense(files.iter().flat_map(|d| d.atoms.iter().map(|a| a.ty))),
        bonds: dense(files.iter().flat_map(|d| used(&d.bonds))),
        angles: dense(files.iter().flat_map(|d| used(&d.angles))),
        dihedrals: dense(files.iter().flat_map(|d| used(&d.dihedrals))),
        impropers: dense(files.iter().flat_map(|d| used(&d.impropers))),
    };
    let counts = maps.type_counts();

    for data in files.iter_mut() {
        for atom in &mut data.atoms {
            if let Some(&ty) = maps.atoms.get(&atom.ty) {
                atom.ty = ty;
            }
        }
        retype(&mut data.bonds, &maps.bonds);
        retype(&mut data.angles, &maps.angles);
        retype(&mut data.dihedrals, &maps.dihedrals);
        retype(&mut data.impropers, &maps.impropers);

        data.masses.retain_mut(|mass| match maps.atoms.get(&mass.ty) {
            Some(&ty) => {
                mass.ty = ty;
                true
            }
            None => false,
        });
        data.masses.sort_by_key(|mass| mass.ty);
        data.masses.dedup_by_key(|mass| mass.ty);
        data.type_counts = counts;
    }

    debug!("atom type map: {:?}", maps.atoms);
    info!(
        "unified {} file(s) onto {} atom, {} bond, {} angle, {} dihedral and {} improper types",
        files.len(),
        counts.atoms,
        counts.bonds,
        counts.angles,
        counts.dihedrals,
        counts.impropers
    );
    maps
}

fn dense(types: impl Iterator<Item = usize>) -> BTreeMap<usize, usize> {
    types
        .collect::<BTreeSet<_>>()
        .into_iter()
        .zip(1..)
        .collect()
}

fn used<const N: usize>(interactions: &[Interaction<N>]) -> impl Iterator<Item = usize> + '_ {
    interactions.iter().map(|i| i.ty)
}

fn retype<const N: usize>(interactions: &mut [Interaction<N>], map: &BTreeMap<usize, usize>) {
    for interaction in interactions {
        if let Some(&ty) = map.get(&interaction.ty) {
            interaction.ty = ty;
        }
    }
}

/// Force-field coefficient commands understood by [`read_coeffs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoeffKind {
    Pair,
    Bond,
    Angle,
    Dihedral,
    Improper,
}

impl CoeffKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CoeffKind::Pair => "pair_coeff",
            CoeffKind::Bond => "bond_coeff",
            CoeffKind::Angle => "angle_coeff",
            CoeffKind::Dihedral => "dihedral_coeff",
            CoeffKind::Improper => "improper_coeff",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pair_coeff" => Some(CoeffKind::Pair),
            "bond_coeff" => Some(CoeffKind::Bond),
            "angle_coeff" => Some(CoeffKind::Angle),
            "dihedral_coeff" => Some(CoeffKind::Dihedral),
            "improper_coeff" => Some(CoeffKind::Improper),
            _ => None,
        }
    }

    /// Number of type fields before the parameters.
    fn type_fields(self) -> usize {
        match self {
            CoeffKind::Pair => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CoeffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One coefficient line: its command, numeric types and raw parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coeff {
    pub kind: CoeffKind,
    pub types: Vec<usize>,
    pub params: Vec<String>,
}

/// Reads the coefficient lines of a LAMMPS input or settings file.
///
/// Other commands and comments are skipped. Lines whose type fields are not
/// plain integers (wildcards such as `*` or `1*3`) are dropped with a warning,
/// since they cannot be renumbered.
pub fn read_coeffs<R: BufRead>(reader: R) -> Result<Vec<Coeff>, Error> {
    let mut coeffs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let ln = idx + 1;
        let content = line.split_once('#').map_or(line.as_str(), |(data, _)| data);

        let mut parts = content.split_whitespace();
        let Some(kind) = parts.next().and_then(CoeffKind::from_keyword) else {
            continue;
        };
        let fields: Vec<&str> = parts.by_ref().take(kind.type_fields()).collect();
        if fields.len() < kind.type_fields() {
            return Err(Error::parse(
                Format::LammpsCoeffs,
                ln,
                format!("{kind} needs {} type field(s)", kind.type_fields()),
            ));
        }

        let Some(types) = fields
            .iter()
            .map(|raw| raw.parse().ok())
            .collect::<Option<Vec<usize>>>()
        else {
            warn!("line {ln}: dropping {kind} with non-numeric types '{}'", fields.join(" "));
            continue;
        };

        coeffs.push(Coeff {
            kind,
            types,
            params: parts.map(str::to_string).collect(),
        });
    }
    Ok(coeffs)
}

/// Keeps the coefficients of used types, renumbered by `maps`.
///
/// Every `pair_coeff` line over two used atom types is kept, with its types
/// in ascending order. For bonded kinds only the first line of each type is
/// kept. The result is ordered by kind, then by new type.
pub fn unify_coeffs(coeffs: &[Coeff], maps: &TypeMaps) -> Vec<Coeff> {
    let mut kept: Vec<Coeff> = Vec::new();
    for coeff in coeffs {
        let map = maps.for_kind(coeff.kind);
        let Some(mut types) = coeff
            .types
            .iter()
            .map(|ty| map.get(ty).copied())
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        if coeff.kind == CoeffKind::Pair {
            types.sort_unstable();
        } else if kept.iter().any(|c| c.kind == coeff.kind && c.types == types) {
            debug!("skipping repeated {} for type {}", coeff.kind, coeff.types[0]);
            continue;
        }
        kept.push(Coeff {
            kind: coeff.kind,
            types,
            params: coeff.params.clone(),
        });
    }
    kept.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.types.cmp(&b.types)));

    for kind in [
        CoeffKind::Bond,
        CoeffKind::Angle,
        CoeffKind::Dihedral,
        CoeffKind::Improper,
    ] {
        for (old, new) in maps.for_kind(kind) {
            if !kept.iter().any(|c| c.kind == kind && c.types == [*new]) {
                warn!("no {kind} line for used type {old}");
            }
        }
    }
    kept
}

pub fn write_coeffs<W: Write>(mut writer: W, coeffs: &[Coeff]) -> Result<(), Error> {
    for coeff in coeffs {
        write!(writer, "{}", coeff.kind)?;
        for ty in &coeff.types {
            write!(writer, " {ty}")?;
        }
        for param in &coeff.params {
            write!(writer, " {param}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::lammps::{LammpsAtom, Mass};
    use crate::model::types::AtomId;
    use std::io::Cursor;

    /// A chain with one atom per entry of `atom_types`, bonded in order with
    /// `bond_types`, and masses declared for types `1..=declared`.
    fn make_data(atom_types: &[usize], bond_types: &[usize], declared: usize) -> LammpsData {
        let atoms = atom_types
            .iter()
            .zip(1u32..)
            .map(|(&ty, raw)| LammpsAtom {
                id: AtomId::new(raw),
                molecule: Some(1),
                ty,
                charge: 0.0,
                position: [raw as f64, 0.0, 0.0],
            })
            .collect();
        let bonds = bond_types
            .iter()
            .zip(1u32..)
            .map(|(&ty, raw)| Interaction {
                ty,
                atoms: [AtomId::new(raw), AtomId::new(raw + 1)],
            })
            .collect();
        LammpsData {
            title: "fragment".into(),
            type_counts: TypeCounts {
                atoms: declared,
                bonds: declared,
                ..TypeCounts::default()
            },
            masses: (1..=declared)
                .map(|ty| Mass {
                    ty,
                    mass: ty as f64 * 10.0,
                })
                .collect(),
            atoms,
            bonds,
            ..LammpsData::default()
        }
    }

    const COEFFS: &str = "\
pair_style lj/cut 10.0
pair_coeff 2 2 0.1 3.0
pair_coeff 5 2 0.2 3.1  # written the other way round
pair_coeff 3 3 0.5 3.5
pair_coeff * * 0.0 0.0
bond_coeff 2 300.0 1.5
bond_coeff 2 999.0 9.9
bond_coeff 4 400.0 1.4
bond_coeff 1 100.0 1.0
angle_coeff 1 50.0 109.5
";

    fn shared_maps() -> TypeMaps {
        let mut files = [make_data(&[2, 5], &[4], 8), make_data(&[5, 7], &[2], 8)];
        unify_types(&mut files)
    }

    #[test]
    fn unify_types_uses_union_of_used_types() {
        let mut files = [make_data(&[2, 5], &[4], 8), make_data(&[5, 7], &[2], 8)];
        let maps = unify_types(&mut files);

        assert_eq!(maps.atoms, BTreeMap::from([(2, 1), (5, 2), (7, 3)]));
        assert_eq!(maps.bonds, BTreeMap::from([(2, 1), (4, 2)]));
        assert!(maps.angles.is_empty());

        let types: Vec<_> = files[0].atoms.iter().map(|a| a.ty).collect();
        assert_eq!(types, [1, 2]);
        let types: Vec<_> = files[1].atoms.iter().map(|a| a.ty).collect();
        assert_eq!(types, [2, 3]);
        assert_eq!(files[0].bonds[0].ty, 2);
        assert_eq!(files[1].bonds[0].ty, 1);
    }

    #[test]
    fn unify_types_compacts_masses_and_type_counts() {
        let mut files = [make_data(&[2, 5], &[4], 8), make_data(&[5, 7], &[2], 8)];
        unify_types(&mut files);

        for data in &files {
            assert_eq!(data.type_counts.atoms, 3);
            assert_eq!(data.type_counts.bonds, 2);
            assert_eq!(data.type_counts.angles, 0);
            let masses: Vec<_> = data.masses.iter().map(|m| (m.ty, m.mass)).collect();
            assert_eq!(masses, [(1, 20.0), (2, 50.0), (3, 70.0)]);
        }
    }

    #[test]
    fn read_coeffs_skips_other_commands_and_wildcards() {
        let coeffs = read_coeffs(Cursor::new(COEFFS)).expect("read coeffs");

        assert_eq!(coeffs.len(), 8);
        assert_eq!(coeffs[0].kind, CoeffKind::Pair);
        assert_eq!(coeffs[1].types, [5, 2]);
        assert_eq!(coeffs[1].params, ["0.2", "3.1"]);
        assert_eq!(coeffs[7].kind, CoeffKind::Angle);
    }

    #[test]
    fn read_coeffs_rejects_missing_type_field() {
        let err = read_coeffs(Cursor::new("pair_coeff 1\n")).unwrap_err();
        match err {
            Error::Parse { format, line, .. } => {
                assert_eq!(format, Format::LammpsCoeffs);
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unify_coeffs_keeps_used_types_renumbered() {
        let coeffs = read_coeffs(Cursor::new(COEFFS)).expect("read coeffs");
        let kept = unify_coeffs(&coeffs, &shared_maps());

        let mut buf = Vec::new();
        write_coeffs(&mut buf, &kept).expect("write coeffs");
        assert_eq!(
            String::from_utf8(buf).expect("utf8 output"),
            "\
pair_coeff 1 1 0.1 3.0
pair_coeff 1 2 0.2 3.1
bond_coeff 1 300.0 1.5
bond_coeff 2 400.0 1.4
"
        );
    }

    #[test]
    fn unify_coeffs_keeps_every_line_of_a_pair() {
        let text = "pair_coeff 5 5 lj/cut 0.1 3.0\npair_coeff 5 5 coul/cut\n";
        let coeffs = read_coeffs(Cursor::new(text)).expect("read coeffs");
        let kept = unify_coeffs(&coeffs, &shared_maps());

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].types, [2, 2]);
        assert_eq!(kept[0].params[0], "lj/cut");
        assert_eq!(kept[1].params, ["coul/cut"]);
    }
}
