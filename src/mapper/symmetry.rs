//! Symmetry resolution between same-element candidate atoms.
//!
//! Candidates are told apart by the element fingerprints of their first,
//! second and third neighbour shells. A shell decides only when exactly one
//! candidate with a fingerprint unique among the candidates matches the
//! reference atom's fingerprint for the same shell.

use super::graph::{GraphAtom, Shell};
use crate::model::types::AtomId;
use std::collections::HashMap;

/// How the caller wants the chosen candidate reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveBy {
    Id,
    Index,
}

/// The chosen candidate, as an atom id or as a position in the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    ById(AtomId),
    ByIndex(usize),
}

/// What settled the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    Shell(Shell),
    Inference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub resolution: Resolution,
    pub basis: Basis,
}

/// Picks the candidate that corresponds to `reference`.
///
/// Returns `None` when no shell breaks the tie and `allow_inference` is off.
/// With inference on, the first candidate sharing the reference element is
/// chosen and the basis is [`Basis::Inference`].
pub fn resolve(
    candidates: &[&GraphAtom],
    reference: &GraphAtom,
    by: ResolveBy,
    allow_inference: bool,
) -> Option<Resolved> {
    let found = Shell::ALL
        .into_iter()
        .find_map(|shell| match_shell(candidates, reference, shell).map(|idx| (idx, shell)));

    let (idx, basis) = match found {
        Some((idx, shell)) => (idx, Basis::Shell(shell)),
        None if allow_inference => {
            let idx = candidates
                .iter()
                .position(|c| c.element == reference.element)?;
            (idx, Basis::Inference)
        }
        None => return None,
    };

    let resolution = match by {
        ResolveBy::Id => Resolution::ById(candidates[idx].id),
        ResolveBy::Index => Resolution::ByIndex(idx),
    };
    Some(Resolved { resolution, basis })
}

fn match_shell(candidates: &[&GraphAtom], reference: &GraphAtom, shell: Shell) -> Option<usize> {
    let prints: Vec<String> = candidates.iter().map(|c| c.fingerprint(shell)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for print in &prints {
        *counts.entry(print.as_str()).or_default() += 1;
    }
    let unique: Vec<(usize, &str)> = prints
        .iter()
        .enumerate()
        .filter(|(_, p)| counts[p.as_str()] == 1)
        .map(|(idx, p)| (idx, p.as_str()))
        .collect();

    // An empty shell has nothing left to compare at this radius.
    if unique.iter().any(|(_, p)| p.is_empty()) {
        return None;
    }

    let target = reference.fingerprint(shell);
    unique
        .into_iter()
        .find(|(_, p)| *p == target)
        .map(|(idx, _)| idx)
}
