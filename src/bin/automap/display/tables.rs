use std::io::{self, Write};

use automap::io::{LammpsData, TypeCounts};
use automap::{MatchEvent, MatchSource, Molecule, ReactionMap};

use crate::util::text::wrap;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_data_summary(title: &str, data: &LammpsData) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = vec![
        ("Atoms", data.atom_count().to_string()),
        ("Bonds", data.bonds.len().to_string()),
        ("Angles", data.angles.len().to_string()),
        ("Dihedrals", data.dihedrals.len().to_string()),
        ("Impropers", data.impropers.len().to_string()),
    ];

    print_kv_table(&mut out, title, &rows);
}

pub fn print_clean_summary(files: usize, types: &TypeCounts, coeffs: usize) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = vec![
        ("Data Files", files.to_string()),
        ("Atom Types", types.atoms.to_string()),
        ("Bond Types", types.bonds.to_string()),
        ("Angle Types", types.angles.to_string()),
        ("Dihedral Types", types.dihedrals.to_string()),
        ("Improper Types", types.impropers.to_string()),
        ("Coefficient Lines", coeffs.to_string()),
    ];

    print_kv_table(&mut out, "Unified Types", &rows);
}

pub fn print_map_summary(pre: &Molecule, post: &Molecule, map: &ReactionMap) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let template = match &map.pre.selection {
        Some(selection) => format!("{} / {} atoms", selection.len(), pre.atom_count()),
        None => "full molecule".to_string(),
    };

    let rows = vec![
        ("Pre Atoms", pre.atom_count().to_string()),
        ("Post Atoms", post.atom_count().to_string()),
        ("Mapped Pairs", map.pairs.len().to_string()),
        ("Template", template),
        ("Bonding IDs", map.bonding_ids.len().to_string()),
        ("Edge IDs", map.edge_ids.len().to_string()),
        ("Delete IDs", map.delete_ids.len().to_string()),
        ("Create IDs", map.create_ids.len().to_string()),
    ];
    print_kv_table(&mut out, "Mapping Summary", &rows);

    print_source_breakdown(&mut out, map);
}

/// Table of how the pairs were matched, most frequent source first.
fn print_source_breakdown(out: &mut impl Write, map: &ReactionMap) {
    let mut counts: Vec<(MatchSource, usize)> = Vec::new();
    for pair in &map.pairs {
        match counts.iter_mut().find(|(source, _)| *source == pair.source) {
            Some((_, count)) => *count += 1,
            None => counts.push((pair.source, 1)),
        }
    }
    if counts.is_empty() {
        return;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let rows: Vec<(String, String)> = counts
        .into_iter()
        .map(|(source, count)| (source.to_string(), count.to_string()))
        .collect();

    print_kv_table(out, "Match Sources", &rows);
}

pub fn print_advisories(events: &[MatchEvent]) {
    if events.is_empty() {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let text_w = SAFE_TABLE_WIDTH - 4;

    let _ = writeln!(out, "{}┌─ Advisories ({}) ─┐", INDENT, events.len());
    let _ = writeln!(out, "{}┌{}┐", INDENT, "─".repeat(text_w + 2));
    for (idx, event) in events.iter().enumerate() {
        if idx > 0 {
            let _ = writeln!(out, "{}├{}┤", INDENT, "─".repeat(text_w + 2));
        }
        for line in wrap(&event.to_string(), text_w) {
            let _ = writeln!(out, "{}│ {:<text_w$} │", INDENT, line, text_w = text_w);
        }
    }
    let _ = writeln!(out, "{}└{}┘", INDENT, "─".repeat(text_w + 2));
}

fn print_kv_table<K: AsRef<str>>(out: &mut impl Write, title: &str, rows: &[(K, String)]) {
    let key_w = 26usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);
    let k_line = "─".repeat(key_w + 2);
    let v_line = "─".repeat(val_w + 2);

    let _ = writeln!(out, "{}┌─ {} ─┐", INDENT, title);
    let _ = writeln!(out, "{}┌{}┬{}┐", INDENT, k_line, v_line);
    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            key.as_ref(),
            val,
            key_w = key_w,
            val_w = val_w
        );
    }
    let _ = writeln!(out, "{}└{}┴{}┘", INDENT, k_line, v_line);
}
