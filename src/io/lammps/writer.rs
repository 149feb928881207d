use super::{Interaction, LammpsAtom, LammpsData};
use crate::io::error::Error;
use crate::model::template::{Selection, SideTemplate};
use crate::model::types::AtomId;
use std::collections::HashSet;
use std::io::Write;

/// Writes `data` as a LAMMPS molecule file.
///
/// With a template, its bonding and deletion atoms are recorded as comment
/// lines and, when the template carries a [`Selection`], only selected atoms
/// and the interactions lying entirely among them are written, relabelled to
/// the template ids. Interaction ids are always written sequentially.
pub fn write_molecule<W: Write>(
    mut writer: W,
    data: &LammpsData,
    template: Option<&SideTemplate>,
) -> Result<(), Error> {
    let selection = template.and_then(|t| t.selection.as_ref());
    let atoms = select_atoms(data, selection)?;
    let bonds = select_interactions(&data.bonds, selection);
    let angles = select_interactions(&data.angles, selection);
    let dihedrals = select_interactions(&data.dihedrals, selection);
    let impropers = select_interactions(&data.impropers, selection);

    writeln!(writer, "{}", data.title)?;
    if let Some(template) = template {
        if !template.anchors.is_empty() {
            writeln!(writer, "# Bonding_Atoms {}", join_ids(&template.anchors))?;
        }
        if !template.deletions.is_empty() {
            writeln!(writer, "# Delete_Atoms {}", join_ids(&template.deletions))?;
        }
    }
    writeln!(writer)?;

    writeln!(writer, "{} atoms", atoms.len())?;
    writeln!(writer, "{} bonds", bonds.len())?;
    writeln!(writer, "{} angles", angles.len())?;
    writeln!(writer, "{} dihedrals", dihedrals.len())?;
    writeln!(writer, "{} impropers", impropers.len())?;

    if !atoms.is_empty() {
        section_header(&mut writer, "Types")?;
        for (id, atom) in &atoms {
            writeln!(writer, "{} {}", id, atom.ty)?;
        }
        section_header(&mut writer, "Charges")?;
        for (id, atom) in &atoms {
            writeln!(writer, "{} {}", id, atom.charge)?;
        }
        section_header(&mut writer, "Coords")?;
        for (id, atom) in &atoms {
            let [x, y, z] = atom.position;
            writeln!(writer, "{id} {x} {y} {z}")?;
        }
    }

    write_interactions(&mut writer, "Bonds", &bonds)?;
    write_interactions(&mut writer, "Angles", &angles)?;
    write_interactions(&mut writer, "Dihedrals", &dihedrals)?;
    write_interactions(&mut writer, "Impropers", &impropers)?;

    Ok(())
}

/// Writes `data` as a LAMMPS data file in atom style `full`.
///
/// Header lines are written after the counts, in their original order.
/// Atoms without a molecule tag are written in molecule 1. Interaction ids
/// are written sequentially.
pub fn write_data<W: Write>(mut writer: W, data: &LammpsData) -> Result<(), Error> {
    let types = &data.type_counts;

    writeln!(writer, "{}", data.title)?;
    writeln!(writer)?;
    writeln!(writer, "{} atoms", data.atoms.len())?;
    writeln!(writer, "{} bonds", data.bonds.len())?;
    writeln!(writer, "{} angles", data.angles.len())?;
    writeln!(writer, "{} dihedrals", data.dihedrals.len())?;
    writeln!(writer, "{} impropers", data.impropers.len())?;
    writeln!(writer)?;
    writeln!(writer, "{} atom types", types.atoms)?;
    writeln!(writer, "{} bond types", types.bonds)?;
    writeln!(writer, "{} angle types", types.angles)?;
    writeln!(writer, "{} dihedral types", types.dihedrals)?;
    writeln!(writer, "{} improper types", types.impropers)?;

    if !data.header.is_empty() {
        writeln!(writer)?;
        for line in &data.header {
            writeln!(writer, "{line}")?;
        }
    }

    if !data.masses.is_empty() {
        section_header(&mut writer, "Masses")?;
        for mass in &data.masses {
            writeln!(writer, "{} {}", mass.ty, mass.mass)?;
        }
    }

    if !data.atoms.is_empty() {
        section_header(&mut writer, "Atoms  # full")?;
        for atom in &data.atoms {
            let [x, y, z] = atom.position;
            writeln!(
                writer,
                "{} {} {} {} {x} {y} {z}",
                atom.id,
                atom.molecule.unwrap_or(1),
                atom.ty,
                atom.charge
            )?;
        }
    }

    write_interactions(&mut writer, "Bonds", &data.bonds)?;
    write_interactions(&mut writer, "Angles", &data.angles)?;
    write_interactions(&mut writer, "Dihedrals", &data.dihedrals)?;
    write_interactions(&mut writer, "Impropers", &data.impropers)?;

    Ok(())
}

/// Atoms to write with their output ids, in output order.
fn select_atoms<'a>(
    data: &'a LammpsData,
    selection: Option<&Selection>,
) -> Result<Vec<(AtomId, &'a LammpsAtom)>, Error> {
    let Some(selection) = selection else {
        return Ok(data.atoms.iter().map(|a| (a.id, a)).collect());
    };

    let present: HashSet<AtomId> = data.atoms.iter().map(|a| a.id).collect();
    if let Some((missing, _)) = selection.iter().find(|(id, _)| !present.contains(id)) {
        return Err(Error::MissingAtom(missing));
    }

    let mut atoms: Vec<_> = data
        .atoms
        .iter()
        .filter_map(|atom| selection.get(atom.id).map(|new_id| (new_id, atom)))
        .collect();
    atoms.sort_by_key(|(id, _)| *id);
    Ok(atoms)
}

fn select_interactions<const N: usize>(
    interactions: &[Interaction<N>],
    selection: Option<&Selection>,
) -> Vec<Interaction<N>> {
    let Some(selection) = selection else {
        return interactions.to_vec();
    };
    interactions
        .iter()
        .filter_map(|interaction| {
            let mut atoms = interaction.atoms;
            for atom in &mut atoms {
                *atom = selection.get(*atom)?;
            }
            Some(Interaction {
                ty: interaction.ty,
                atoms,
            })
        })
        .collect()
}

fn section_header<W: Write>(writer: &mut W, name: &str) -> Result<(), Error> {
    writeln!(writer)?;
    writeln!(writer, "{name}")?;
    writeln!(writer)?;
    Ok(())
}

fn write_interactions<W: Write, const N: usize>(
    writer: &mut W,
    name: &str,
    interactions: &[Interaction<N>],
) -> Result<(), Error> {
    if interactions.is_empty() {
        return Ok(());
    }
    section_header(writer, name)?;
    for (idx, interaction) in interactions.iter().enumerate() {
        write!(writer, "{} {}", idx + 1, interaction.ty)?;
        for atom in &interaction.atoms {
            write!(writer, " {atom}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn join_ids(ids: &[AtomId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::lammps::{Mass, TypeCounts, read_lammps};
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn id(raw: u32) -> AtomId {
        AtomId::new(raw)
    }

    /// Propane-like chain 1-2-3 plus a hydrogen 4 on atom 3.
    fn make_chain() -> LammpsData {
        let atom = |raw: u32, ty: usize, x: f64| LammpsAtom {
            id: id(raw),
            molecule: Some(1),
            ty,
            charge: -0.1 * raw as f64,
            position: [x, 0.0, 0.0],
        };
        LammpsData {
            title: "chain".into(),
            atoms: vec![atom(1, 1, 0.0), atom(2, 1, 1.5), atom(3, 1, 3.0), atom(4, 2, 4.0)],
            bonds: vec![
                Interaction {
                    ty: 1,
                    atoms: [id(1), id(2)],
                },
                Interaction {
                    ty: 1,
                    atoms: [id(2), id(3)],
                },
                Interaction {
                    ty: 2,
                    atoms: [id(3), id(4)],
                },
            ],
            angles: vec![
                Interaction {
                    ty: 1,
                    atoms: [id(1), id(2), id(3)],
                },
                Interaction {
                    ty: 2,
                    atoms: [id(2), id(3), id(4)],
                },
            ],
            ..LammpsData::default()
        }
    }

    fn write_to_string(data: &LammpsData, template: Option<&SideTemplate>) -> String {
        let mut buf = Vec::new();
        write_molecule(&mut buf, data, template).expect("write molecule");
        String::from_utf8(buf).expect("utf8 output")
    }

    #[test]
    fn writes_full_molecule_without_template() {
        let text = write_to_string(&make_chain(), None);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "chain");
        assert_eq!(lines[1], "");
        assert_eq!(&lines[2..7], ["4 atoms", "3 bonds", "2 angles", "0 dihedrals", "0 impropers"]);
        assert!(text.contains("\nTypes\n\n1 1\n2 1\n3 1\n4 2\n"));
        assert!(text.contains("\nBonds\n\n1 1 1 2\n2 1 2 3\n3 2 3 4\n"));
        assert!(!text.contains("Dihedrals"));
        assert!(!text.contains("Bonding_Atoms"));
    }

    #[test]
    fn selection_filters_and_relabels() {
        // Keep atoms 2, 3, 4 as 3, 1, 2.
        let selection = Selection::new(BTreeMap::from([(id(2), id(3)), (id(3), id(1)), (id(4), id(2))]));
        let template = SideTemplate {
            retained: [id(2), id(3), id(4)].into_iter().collect(),
            anchors: vec![id(1)],
            deletions: vec![id(2)],
            selection: Some(selection),
        };

        let text = write_to_string(&make_chain(), Some(&template));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[1], "# Bonding_Atoms 1");
        assert_eq!(lines[2], "# Delete_Atoms 2");
        assert!(text.contains("3 atoms\n2 bonds\n1 angles\n"));
        assert!(text.contains("\nTypes\n\n1 1\n2 2\n3 1\n"));
        assert!(text.contains("\nBonds\n\n1 1 3 1\n2 2 1 2\n"));
        assert!(text.contains("\nAngles\n\n1 2 3 1 2\n"));
    }

    #[test]
    fn selection_of_absent_atom_is_an_error() {
        let template = SideTemplate {
            selection: Some(Selection::new(BTreeMap::from([(id(9), id(1))]))),
            ..SideTemplate::default()
        };
        let mut buf = Vec::new();
        let err = write_molecule(&mut buf, &make_chain(), Some(&template)).unwrap_err();
        assert!(matches!(err, Error::MissingAtom(missing) if missing == id(9)));
    }

    #[test]
    fn written_molecule_reads_back() {
        let data = make_chain();
        let text = write_to_string(&data, None);
        let parsed = read_lammps(Cursor::new(text)).expect("read molecule");

        assert_eq!(parsed.atom_count(), 4);
        assert_eq!(parsed.bonds, data.bonds);
        assert_eq!(parsed.angles, data.angles);
        for (a, b) in data.atoms.iter().zip(&parsed.atoms) {
            assert_eq!(a.ty, b.ty);
            assert!((a.charge - b.charge).abs() < 1e-12);
            assert!((a.position[0] - b.position[0]).abs() < 1e-12);
        }
    }

    #[test]
    fn data_file_keeps_header_masses_and_molecule_tags() {
        let mut data = make_chain();
        data.header = vec!["0.0 20.0 xlo xhi".into()];
        data.type_counts = TypeCounts {
            atoms: 2,
            bonds: 2,
            angles: 2,
            ..TypeCounts::default()
        };
        data.masses = vec![Mass { ty: 1, mass: 12.011 }, Mass { ty: 2, mass: 1.008 }];
        data.atoms[3].molecule = Some(2);

        let mut buf = Vec::new();
        write_data(&mut buf, &data).expect("write data");
        let text = String::from_utf8(buf).expect("utf8 output");
        assert!(text.contains("\n2 atom types\n2 bond types\n2 angle types\n0 dihedral types\n"));
        assert!(text.contains("\nMasses\n\n1 12.011\n2 1.008\n"));

        let parsed = read_lammps(Cursor::new(text)).expect("read data");
        assert_eq!(parsed.header, data.header);
        assert_eq!(parsed.type_counts, data.type_counts);
        assert_eq!(parsed.masses, data.masses);
        assert_eq!(parsed.atoms[3].molecule, Some(2));
        assert_eq!(parsed.bonds, data.bonds);
        assert_eq!(parsed.angles, data.angles);
    }
}
