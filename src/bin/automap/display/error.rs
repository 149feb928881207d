use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::{id_list, wrap};

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = hints_for(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

/// Hints for the first typed error found in the chain, or generic ones
/// derived from the message text.
fn hints_for(err: &Error) -> Vec<String> {
    let mut hints = Vec::new();

    if let Some(io_err) = err.downcast_ref::<automap::io::Error>() {
        io_hints(io_err, &mut hints);
    } else if let Some(map_err) = err.downcast_ref::<automap::MapError>() {
        map_hints(map_err, &mut hints);
    } else if let Some(source) = err.downcast_ref::<std::io::Error>() {
        std_io_hints(source, &mut hints);
    } else {
        fallback_hints(err, &mut hints);
    }

    hints
}

fn io_hints(err: &automap::io::Error, hints: &mut Vec<String>) {
    use automap::io::{Error as IoError, Format};

    match err {
        IoError::Io { source } => std_io_hints(source, hints),

        IoError::Parse { format: Format::LammpsCoeffs, line, .. } => {
            hints.push(format!("The coefficient file is malformed near line {line}"));
            hints.push("pair_coeff takes two atom types, the bonded *_coeff commands take one".into());
        }

        IoError::Parse { format, line, .. } => {
            hints.push(format!(
                "The {format} parser stopped near line {line}"
            ));
            hints.push("Check that the header counts match the number of section rows".into());
            hints.push("Data files need an Atoms section in atom style full (id mol type q x y z)".into());
            hints.push("Molecule files need a Types section".into());
        }

        IoError::UnknownAtomType { ty, available, .. } => {
            hints.push(format!(
                "--elements-by-type lists {available} element(s) but atom type {ty} is used"
            ));
            hints.push("Give one element symbol per atom type, in type order".into());
        }

        IoError::MissingAtom(id) => {
            hints.push(format!(
                "The template refers to atom {id}, which the input file does not define"
            ));
            hints.push("Make sure the files passed to map are the ones written to disk unchanged".into());
        }
    }
}

fn std_io_hints(source: &std::io::Error, hints: &mut Vec<String>) {
    use std::io::ErrorKind;

    match source.kind() {
        ErrorKind::NotFound => {
            hints.push("File or directory not found".into());
            hints.push("Check the path spelling and ensure the file exists".into());
        }
        ErrorKind::PermissionDenied => {
            hints.push("Permission denied accessing the file".into());
            hints.push("Check file permissions with `ls -la`".into());
        }
        ErrorKind::InvalidData => {
            hints.push("File contains invalid or non-UTF-8 data".into());
            hints.push("Verify the file is a plain-text LAMMPS file".into());
        }
        ErrorKind::WriteZero => {
            hints.push("Failed to write data (disk full?)".into());
        }
        ErrorKind::BrokenPipe => {
            hints.push("Output consumer terminated before the file was written".into());
        }
        _ => {
            hints.push("Check file path, permissions, and disk space".into());
        }
    }
}

fn map_hints(err: &automap::MapError, hints: &mut Vec<String>) {
    use automap::MapError;

    match err {
        MapError::UnknownAtom { side, role, .. } => {
            hints.push(format!(
                "Check the {role} atom ids against the {side} input file"
            ));
            hints.push("Pre ids come first and post ids second in each list".into());
        }

        MapError::InvalidBond { side, .. } => {
            hints.push(format!(
                "The Bonds section of the {side} file refers to an atom it does not define"
            ));
        }

        MapError::DuplicateAtom { side, .. } => {
            hints.push(format!("Atom ids in the {side} file must be unique"));
        }

        MapError::UnbalancedAnchors { .. } => {
            hints.push("--bonding-atoms takes the pre ids followed by the matching post ids".into());
            hints.push("Pass an even number of ids with at least one on each side".into());
        }

        MapError::UnbalancedDeletions { .. } => {
            hints.push("--delete-atoms takes the pre ids followed by the matching post ids".into());
        }

        MapError::AtomCountMismatch { pre, post } => {
            hints.push(format!(
                "The pre file defines {pre} atom(s) and the post file {post}"
            ));
            hints.push("Declare atoms that appear only after the reaction with --create-atoms".into());
        }

        MapError::DuplicateMapping { id, .. } => {
            hints.push(format!("Atom {id} is listed in more than one pair"));
            hints.push("An atom cannot be both a bonding atom and a deletion atom".into());
        }

        MapError::ReconcileTimeout { remaining, .. } => {
            hints.push(format!(
                "Unmatched pre atoms: {}",
                id_list(remaining, 12)
            ));
            hints.push("Check that both files describe the same molecules and elements".into());
            hints.push("Atoms that leave the reaction belong in --delete-atoms".into());
            hints.push("Raise --max-rounds for large, highly symmetric molecules".into());
        }

        MapError::AsymmetricPartialPair { .. } => {
            hints.push("The reduced template would keep this pair on one side only".into());
            hints.push("Drop --strict to skip such pairs, or use --no-truncate".into());
        }

        MapError::MissingRenumber { .. } => {
            hints.push("This indicates an inconsistent template; please report it".into());
            hints.push("Running with --no-truncate avoids renumbering".into());
        }
    }
}

fn fallback_hints(err: &Error, hints: &mut Vec<String>) {
    let text = err
        .chain()
        .map(|cause| cause.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    if text.contains("no such file") || text.contains("not found") {
        hints.push("Check that the file path is correct".into());
    } else if text.contains("permission denied") {
        hints.push("Ensure you have the required access rights".into());
    } else if text.contains("odd number") {
        hints.push("Paired id lists hold all pre ids first, then the post ids in the same order".into());
    }
}
