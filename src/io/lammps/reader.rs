use super::{Interaction, LammpsAtom, LammpsData, Mass, TypeCounts};
use crate::io::{Format, error::Error};
use crate::model::types::AtomId;
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

/// Keywords that open a body section in data or molecule files.
const SECTIONS: &[&str] = &[
    "Atoms",
    "Velocities",
    "Masses",
    "Bonds",
    "Angles",
    "Dihedrals",
    "Impropers",
    "Types",
    "Charges",
    "Coords",
    "Molecules",
    "Fragments",
    "Diameters",
    "Special Bond Counts",
    "Special Bonds",
    "Shake Flags",
    "Shake Atoms",
    "Shake Bond Types",
    "Pair Coeffs",
    "PairIJ Coeffs",
    "Bond Coeffs",
    "Angle Coeffs",
    "Dihedral Coeffs",
    "Improper Coeffs",
    "BondBond Coeffs",
    "BondAngle Coeffs",
    "MiddleBondTorsion Coeffs",
    "EndBondTorsion Coeffs",
    "AngleTorsion Coeffs",
    "AngleAngleTorsion Coeffs",
    "BondBond13 Coeffs",
    "AngleAngle Coeffs",
];

#[derive(Debug, Default)]
struct Counts {
    atoms: usize,
    bonds: usize,
    angles: usize,
    dihedrals: usize,
    impropers: usize,
}

#[derive(Debug, Default)]
struct Header {
    counts: Counts,
    types: TypeCounts,
    extra: Vec<String>,
}

type Row<'a> = (usize, Vec<&'a str>);

/// Reads a LAMMPS data file (atom style `full`) or molecule file.
///
/// Files with an `Atoms` section are read as data files; files with a
/// `Types` section are read as molecule files. Comments starting with `#`
/// are ignored everywhere except on the title line.
pub fn read<R: BufRead>(reader: R) -> Result<LammpsData, Error> {
    let raw = collect_lines(reader)?;
    let title = raw
        .first()
        .map(|(_, line)| line.trim().to_string())
        .unwrap_or_default();
    let lines: Vec<(usize, String)> = raw
        .into_iter()
        .skip(1)
        .map(|(ln, line)| (ln, strip_comment(&line).trim().to_string()))
        .collect();

    let format = if find_section(&lines, "Atoms").is_some() {
        Format::LammpsData
    } else if find_section(&lines, "Types").is_some() {
        Format::LammpsMolecule
    } else {
        return Err(Error::parse(
            Format::LammpsData,
            1,
            "missing Atoms (data file) or Types (molecule file) section",
        ));
    };

    let Header {
        counts,
        types,
        extra,
    } = parse_header(&lines, format)?;
    let atoms = match format {
        Format::LammpsMolecule => parse_molecule_atoms(&lines, counts.atoms)?,
        _ => parse_full_atoms(&lines, counts.atoms)?,
    };

    Ok(LammpsData {
        title,
        header: extra,
        type_counts: types,
        masses: parse_masses(&lines, format, types.atoms)?,
        atoms,
        bonds: parse_interactions(&lines, format, "Bonds", counts.bonds)?,
        angles: parse_interactions(&lines, format, "Angles", counts.angles)?,
        dihedrals: parse_interactions(&lines, format, "Dihedrals", counts.dihedrals)?,
        impropers: parse_interactions(&lines, format, "Impropers", counts.impropers)?,
    })
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|v| (i + 1, v))
                .map_err(|e| Error::Io { source: e })
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(data, _)| data)
}

fn is_section(line: &str) -> bool {
    SECTIONS.iter().any(|name| line.eq_ignore_ascii_case(name))
}

fn find_section(lines: &[(usize, String)], name: &str) -> Option<usize> {
    lines
        .iter()
        .position(|(_, line)| line.eq_ignore_ascii_case(name))
}

fn next_data_line<'a>(lines: &'a [(usize, String)], cursor: &mut usize) -> Option<(usize, &'a str)> {
    while *cursor < lines.len() {
        let (ln, content) = &lines[*cursor];
        *cursor += 1;
        if content.is_empty() {
            continue;
        }
        return Some((*ln, content.as_str()));
    }
    None
}

fn last_line_no(lines: &[(usize, String)]) -> usize {
    lines.last().map(|(ln, _)| *ln).unwrap_or(1)
}

/// Reads the header lines up to the first section.
///
/// Entry counts and type counts are parsed; any other non-empty line is kept
/// as it is.
fn parse_header(lines: &[(usize, String)], format: Format) -> Result<Header, Error> {
    let mut header = Header::default();
    for (ln, line) in lines.iter().take_while(|(_, line)| !is_section(line)) {
        if line.is_empty() {
            continue;
        }
        let parts: Vec<_> = line.split_whitespace().collect();
        let slot = match parts.as_slice() {
            [_, "atoms"] => &mut header.counts.atoms,
            [_, "bonds"] => &mut header.counts.bonds,
            [_, "angles"] => &mut header.counts.angles,
            [_, "dihedrals"] => &mut header.counts.dihedrals,
            [_, "impropers"] => &mut header.counts.impropers,
            [_, "atom", "types"] => &mut header.types.atoms,
            [_, "bond", "types"] => &mut header.types.bonds,
            [_, "angle", "types"] => &mut header.types.angles,
            [_, "dihedral", "types"] => &mut header.types.dihedrals,
            [_, "improper", "types"] => &mut header.types.impropers,
            _ => {
                header.extra.push(line.clone());
                continue;
            }
        };
        let what = format!("{} count", parts[1..].join(" "));
        *slot = parse_field(parts[0], format, *ln, &what)?;
    }
    Ok(header)
}

/// Reads one `Masses` row per declared atom type when the section is present.
fn parse_masses(
    lines: &[(usize, String)],
    format: Format,
    atom_types: usize,
) -> Result<Vec<Mass>, Error> {
    let Some(rows) = section_rows(lines, format, "Masses", atom_types)? else {
        return Ok(Vec::new());
    };
    rows.into_iter()
        .map(|row| {
            check_columns(&row, format, "Masses", 2)?;
            let (ln, parts) = row;
            Ok(Mass {
                ty: parse_field(parts[0], format, ln, "atom type")?,
                mass: parse_field(parts[1], format, ln, "mass")?,
            })
        })
        .collect()
}

/// Returns the first `expected` data rows of a section, or `None` when the
/// section is absent.
fn section_rows<'a>(
    lines: &'a [(usize, String)],
    format: Format,
    name: &str,
    expected: usize,
) -> Result<Option<Vec<Row<'a>>>, Error> {
    let Some(start) = find_section(lines, name) else {
        return Ok(None);
    };

    let mut cursor = start + 1;
    let mut rows = Vec::with_capacity(expected);
    while rows.len() < expected {
        let row = next_data_line(lines, &mut cursor).filter(|(_, line)| !is_section(line));
        let Some((ln, line)) = row else {
            return Err(Error::parse(
                format,
                last_line_no(lines),
                format!("{name} section ended before the expected {expected} entries"),
            ));
        };
        rows.push((ln, line.split_whitespace().collect()));
    }
    Ok(Some(rows))
}

fn required_rows<'a>(
    lines: &'a [(usize, String)],
    format: Format,
    name: &str,
    expected: usize,
) -> Result<Vec<Row<'a>>, Error> {
    section_rows(lines, format, name, expected)?
        .ok_or_else(|| Error::parse(format, last_line_no(lines), format!("missing {name} section")))
}

fn parse_field<T: FromStr>(raw: &str, format: Format, line: usize, what: &str) -> Result<T, Error> {
    raw.parse::<T>()
        .map_err(|_| Error::parse(format, line, format!("invalid {what}: '{raw}'")))
}

fn check_columns(row: &Row<'_>, format: Format, section: &str, min: usize) -> Result<(), Error> {
    if row.1.len() < min {
        return Err(Error::parse(
            format,
            row.0,
            format!("{section} line needs at least {min} columns"),
        ));
    }
    Ok(())
}

fn parse_full_atoms(lines: &[(usize, String)], expected: usize) -> Result<Vec<LammpsAtom>, Error> {
    let format = Format::LammpsData;
    required_rows(lines, format, "Atoms", expected)?
        .into_iter()
        .map(|row| {
            check_columns(&row, format, "Atoms", 7)?;
            let (ln, parts) = row;
            Ok(LammpsAtom {
                id: parse_field(parts[0], format, ln, "atom id")?,
                molecule: Some(parse_field(parts[1], format, ln, "molecule id")?),
                ty: parse_field(parts[2], format, ln, "atom type")?,
                charge: parse_field(parts[3], format, ln, "charge")?,
                position: [
                    parse_field(parts[4], format, ln, "x coordinate")?,
                    parse_field(parts[5], format, ln, "y coordinate")?,
                    parse_field(parts[6], format, ln, "z coordinate")?,
                ],
            })
        })
        .collect()
}

fn parse_molecule_atoms(lines: &[(usize, String)], expected: usize) -> Result<Vec<LammpsAtom>, Error> {
    let format = Format::LammpsMolecule;
    let mut atoms = Vec::with_capacity(expected);
    let mut index = HashMap::with_capacity(expected);

    for row in required_rows(lines, format, "Types", expected)? {
        check_columns(&row, format, "Types", 2)?;
        let (ln, parts) = row;
        let id: AtomId = parse_field(parts[0], format, ln, "atom id")?;
        index.insert(id, atoms.len());
        atoms.push(LammpsAtom {
            id,
            molecule: None,
            ty: parse_field(parts[1], format, ln, "atom type")?,
            charge: 0.0,
            position: [0.0; 3],
        });
    }

    let lookup = |index: &HashMap<AtomId, usize>, raw: &str, ln: usize| -> Result<usize, Error> {
        let id: AtomId = parse_field(raw, format, ln, "atom id")?;
        index
            .get(&id)
            .copied()
            .ok_or_else(|| Error::parse(format, ln, format!("atom {id} is not listed under Types")))
    };

    if let Some(rows) = section_rows(lines, format, "Charges", expected)? {
        for row in rows {
            check_columns(&row, format, "Charges", 2)?;
            let (ln, parts) = row;
            let idx = lookup(&index, parts[0], ln)?;
            atoms[idx].charge = parse_field(parts[1], format, ln, "charge")?;
        }
    }
    if let Some(rows) = section_rows(lines, format, "Coords", expected)? {
        for row in rows {
            check_columns(&row, format, "Coords", 4)?;
            let (ln, parts) = row;
            let idx = lookup(&index, parts[0], ln)?;
            for (axis, raw) in parts[1..4].iter().enumerate() {
                atoms[idx].position[axis] = parse_field(raw, format, ln, "coordinate")?;
            }
        }
    }

    Ok(atoms)
}

fn parse_interactions<const N: usize>(
    lines: &[(usize, String)],
    format: Format,
    name: &str,
    expected: usize,
) -> Result<Vec<Interaction<N>>, Error> {
    if expected == 0 {
        return Ok(Vec::new());
    }
    required_rows(lines, format, name, expected)?
        .into_iter()
        .map(|row| {
            check_columns(&row, format, name, N + 2)?;
            let (ln, parts) = row;
            let ty = parse_field(parts[1], format, ln, "interaction type")?;
            let mut atoms = [AtomId::new(0); N];
            for (slot, raw) in atoms.iter_mut().zip(&parts[2..N + 2]) {
                *slot = parse_field(raw, format, ln, "atom id")?;
            }
            Ok(Interaction { ty, atoms })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DATA_FILE: &str = "\
LAMMPS data file for ethanol fragment

4 atoms
3 bonds
2 angles
3 atom types  # C O H
0.0 10.0 xlo xhi

Masses

1 12.011
2 15.999
3 1.008

Atoms  # full

1 1 1 -0.18 0.000 0.000 0.000
2 1 1  0.14 1.520 0.000 0.000
3 1 2 -0.68 2.000 1.300 0.000
4 1 3  0.42 2.900 1.400 0.000

Bonds

1 1 1 2
2 2 2 3
3 3 3 4

Angles

1 1 1 2 3
2 2 2 3 4
";

    const MOLECULE_FILE: &str = "\
hydroxyl
# Bonding_Atoms 1

2 atoms
1 bonds

Types

1 2
2 3

Charges

2 0.42
1 -0.68

Coords

1 0.0 0.0 0.0
2 0.96 0.0 0.0

Bonds

1 3 1 2
";

    fn id(raw: u32) -> AtomId {
        AtomId::new(raw)
    }

    #[test]
    fn reads_full_style_data_file() {
        let data = read(Cursor::new(DATA_FILE)).expect("read data file");

        assert_eq!(data.title, "LAMMPS data file for ethanol fragment");
        assert_eq!(data.atom_count(), 4);
        assert_eq!(data.atoms[2].ty, 2);
        assert_eq!(data.atoms[2].molecule, Some(1));
        assert!((data.atoms[2].charge + 0.68).abs() < 1e-12);
        assert!((data.atoms[1].position[0] - 1.52).abs() < 1e-12);
        assert_eq!(
            data.bonds[2],
            Interaction {
                ty: 3,
                atoms: [id(3), id(4)]
            }
        );
        assert_eq!(data.angles.len(), 2);
        assert_eq!(data.angles[1].atoms, [id(2), id(3), id(4)]);
        assert!(data.dihedrals.is_empty());
        assert!(data.impropers.is_empty());
    }

    #[test]
    fn keeps_type_counts_masses_and_box_lines() {
        let data = read(Cursor::new(DATA_FILE)).expect("read data file");

        assert_eq!(data.type_counts.atoms, 3);
        assert_eq!(data.type_counts.bonds, 0);
        assert_eq!(data.header, vec!["0.0 10.0 xlo xhi".to_string()]);
        assert_eq!(data.masses.len(), 3);
        assert_eq!(data.masses[1].ty, 2);
        assert!((data.masses[1].mass - 15.999).abs() < 1e-12);
    }

    #[test]
    fn reports_bad_type_count() {
        let text = DATA_FILE.replace("3 atom types", "x atom types");
        match read(Cursor::new(text)).unwrap_err() {
            Error::Parse { line, details, .. } => {
                assert_eq!(line, 6);
                assert!(details.contains("atom types count"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reads_molecule_file_with_sections_out_of_order() {
        let data = read(Cursor::new(MOLECULE_FILE)).expect("read molecule file");

        assert_eq!(data.title, "hydroxyl");
        assert_eq!(data.atom_count(), 2);
        assert_eq!(data.atoms[0].molecule, None);
        assert_eq!(data.atoms[1].ty, 3);
        assert!((data.atoms[1].charge - 0.42).abs() < 1e-12);
        assert!((data.atoms[1].position[0] - 0.96).abs() < 1e-12);
        assert_eq!(data.bonds.len(), 1);
    }

    #[test]
    fn rejects_file_without_atom_section() {
        let err = read(Cursor::new("title\n\n2 atoms\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn reports_short_section_with_name() {
        let text = DATA_FILE.replace("3 bonds", "4 bonds");
        let err = read(Cursor::new(text)).unwrap_err();
        match err {
            Error::Parse { details, .. } => assert!(details.contains("Bonds section ended")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_missing_interaction_section() {
        let text = DATA_FILE.replace("2 angles", "2 angles\n1 dihedrals");
        let err = read(Cursor::new(text)).unwrap_err();
        match err {
            Error::Parse { details, .. } => assert_eq!(details, "missing Dihedrals section"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_bad_field_with_line_number() {
        let text = DATA_FILE.replace("2 1 1  0.14", "2 1 x  0.14");
        let err = read(Cursor::new(text)).unwrap_err();
        match err {
            Error::Parse { line, details, .. } => {
                assert_eq!(line, 18);
                assert!(details.contains("atom type"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn charge_for_unknown_atom_is_an_error() {
        let text = MOLECULE_FILE.replace("2 0.42", "9 0.42");
        assert!(read(Cursor::new(text)).is_err());
    }
}
