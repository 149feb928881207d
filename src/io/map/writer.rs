use crate::io::error::Error;
use crate::model::template::ReactionMap;
use crate::model::types::AtomId;
use std::io::Write;

const HEADER: &str = "#This mapping was generated by AutoMapper";

/// Writes the map file for a finished [`ReactionMap`].
///
/// Optional counts and sections (deletions, edges, creations) are omitted
/// entirely when their lists are empty.
pub fn write<W: Write>(mut writer: W, map: &ReactionMap) -> Result<(), Error> {
    let optional: [(&str, &str, &[AtomId]); 3] = [
        ("deleteIDs", "DeleteIDs", map.delete_ids.as_slice()),
        ("edgeIDs", "EdgeIDs", map.edge_ids.as_slice()),
        ("createIDs", "CreateIDs", map.create_ids.as_slice()),
    ];

    writeln!(writer, "{HEADER}")?;
    writeln!(writer, "{} equivalences", map.equivalences.len())?;
    for (count_label, _, ids) in &optional {
        if !ids.is_empty() {
            writeln!(writer, "{} {count_label}", ids.len())?;
        }
    }

    write_ids(&mut writer, "BondingIDs", &map.bonding_ids)?;
    for (_, section, ids) in &optional {
        if !ids.is_empty() {
            write_ids(&mut writer, section, ids)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Equivalences")?;
    writeln!(writer)?;
    for (pre, post) in &map.equivalences {
        writeln!(writer, "{pre}\t{post}")?;
    }

    Ok(())
}

fn write_ids<W: Write>(writer: &mut W, section: &str, ids: &[AtomId]) -> Result<(), Error> {
    writeln!(writer)?;
    writeln!(writer, "{section}")?;
    writeln!(writer)?;
    for id in ids {
        writeln!(writer, "{id}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<AtomId> {
        raw.iter().copied().map(AtomId::new).collect()
    }

    fn write_to_string(map: &ReactionMap) -> String {
        let mut buf = Vec::new();
        write(&mut buf, map).expect("write map");
        String::from_utf8(buf).expect("utf8 output")
    }

    #[test]
    fn writes_minimal_map_without_optional_sections() {
        let map = ReactionMap {
            equivalences: vec![(AtomId::new(1), AtomId::new(1)), (AtomId::new(2), AtomId::new(3))],
            bonding_ids: ids(&[1, 2]),
            ..ReactionMap::default()
        };

        let expected = "\
#This mapping was generated by AutoMapper
2 equivalences

BondingIDs

1
2

Equivalences

1\t1
2\t3
";
        assert_eq!(write_to_string(&map), expected);
    }

    #[test]
    fn writes_optional_counts_and_sections_in_order() {
        let map = ReactionMap {
            equivalences: vec![(AtomId::new(1), AtomId::new(1))],
            bonding_ids: ids(&[1]),
            delete_ids: ids(&[4, 5]),
            edge_ids: ids(&[7]),
            create_ids: ids(&[9]),
            ..ReactionMap::default()
        };

        let expected = "\
#This mapping was generated by AutoMapper
1 equivalences
2 deleteIDs
1 edgeIDs
1 createIDs

BondingIDs

1

DeleteIDs

4
5

EdgeIDs

7

CreateIDs

9

Equivalences

1\t1
";
        assert_eq!(write_to_string(&map), expected);
    }

    #[test]
    fn skips_only_the_empty_sections() {
        let map = ReactionMap {
            bonding_ids: ids(&[1]),
            edge_ids: ids(&[3]),
            ..ReactionMap::default()
        };

        let text = write_to_string(&map);
        assert!(text.contains("0 equivalences\n1 edgeIDs\n"));
        assert!(!text.contains("deleteIDs"));
        assert!(!text.contains("CreateIDs"));
        assert!(text.ends_with("Equivalences\n\n"));
    }
}
