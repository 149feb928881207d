//! Bounded retry loop for atoms that local propagation could not pair.
//!
//! Each round pairs missing pre atoms with missing post atoms of the same
//! element regardless of adjacency, then lets propagation run again from any
//! new pairs. Symmetry inference is only allowed after a round in which the
//! number of missing pre atoms did not shrink.

use super::config::MapConfig;
use super::error::Error;
use super::propagate::{MatchState, push_unique, source_of};
use super::symmetry::{self, Basis, Resolution, ResolveBy};
use crate::model::template::{MatchEvent, MatchSource};
use crate::model::types::AtomId;
use log::{debug, trace, warn};

/// Runs reconciliation rounds until every pre atom is mapped.
///
/// # Errors
///
/// Returns [`Error::ReconcileTimeout`] with the unmatched pre ids when
/// `config.max_rounds` rounds pass without completing the mapping.
pub fn reconcile(state: &mut MatchState, config: &MapConfig) -> Result<(), Error> {
    let mut inference = false;
    let mut round = 0;

    loop {
        refresh_missing(state);
        if state.missing_pre.is_empty() {
            if !state.missing_post.is_empty() {
                warn!("post atoms left without a pre partner: {:?}", state.missing_post);
            }
            return Ok(());
        }
        if round == config.max_rounds {
            return Err(Error::reconcile_timeout(round, state.missing_pre.clone()));
        }
        round += 1;

        let before = state.missing_pre.len();
        map_missing(state, config.max_missing_passes, inference);
        state.run_queue();
        refresh_missing(state);

        debug!(
            "missing pre atoms after round {round}: {:?}",
            state.missing_pre
        );
        inference = state.missing_pre.len() == before;
    }
}

/// Drops mapped ids from both missing lists and adds atoms nothing touched.
fn refresh_missing(state: &mut MatchState) {
    let MatchState {
        pre,
        post,
        mapping,
        missing_pre,
        missing_post,
        ..
    } = state;

    missing_pre.retain(|id| !mapping.contains_pre(*id));
    missing_post.retain(|id| !mapping.contains_post(*id));

    for atom in pre.atoms().filter(|a| !mapping.contains_pre(a.id)) {
        push_unique(missing_pre, atom.id);
    }
    for atom in post.atoms().filter(|a| !mapping.contains_post(a.id)) {
        push_unique(missing_post, atom.id);
    }
}

/// Pairs missing atoms globally by element, ignoring adjacency.
fn map_missing(state: &mut MatchState, passes: usize, inference: bool) {
    for _ in 0..passes {
        if state.missing_post.is_empty() {
            break;
        }

        let pending = state.missing_pre.clone();
        let mut resolved = Vec::new();
        for pre_id in pending {
            let Some(element) = state.pre.get(pre_id).map(|a| a.element) else {
                continue;
            };
            let pool: Vec<AtomId> = state
                .missing_post
                .iter()
                .copied()
                .filter(|id| state.post.get(*id).is_some_and(|a| a.element == element))
                .collect();

            let chosen = match pool.as_slice() {
                [] => {
                    trace!("no missing post atom matches pre atom {pre_id} ({element})");
                    None
                }
                [only] => Some((*only, MatchSource::Unique)),
                [.., last] if element.is_hydrogen() => Some((*last, MatchSource::Hydrogen)),
                _ => resolve_global(state, pre_id, &pool, inference),
            };

            if let Some((post_id, source)) = chosen {
                state.missing_post.retain(|id| *id != post_id);
                state.confirm(pre_id, post_id, element, source);
                resolved.push(pre_id);
            }
        }

        state.missing_pre.retain(|id| !resolved.contains(id));
    }
}

fn resolve_global(
    state: &mut MatchState,
    pre_id: AtomId,
    pool: &[AtomId],
    inference: bool,
) -> Option<(AtomId, MatchSource)> {
    let reference = state.pre.get(pre_id)?;
    let candidates: Vec<_> = pool.iter().filter_map(|id| state.post.get(*id)).collect();
    let resolved = symmetry::resolve(&candidates, reference, ResolveBy::Index, inference)?;
    let Resolution::ByIndex(idx) = resolved.resolution else {
        return None;
    };
    let post_id = candidates.get(idx)?.id;

    if resolved.basis == Basis::Inference {
        state.advise(MatchEvent::Inferred {
            pre: pre_id,
            post: post_id,
            candidates: pool.to_vec(),
        });
    }
    Some((post_id, source_of(resolved.basis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::graph::MoleculeGraph;
    use crate::model::atom::Atom;
    use crate::model::molecule::{Bond, Molecule};
    use crate::model::template::Side;
    use crate::model::types::Element;

    fn id(raw: u32) -> AtomId {
        AtomId::new(raw)
    }

    fn molecule(atoms: &[(u32, Element)], bonds: &[(u32, u32)]) -> Molecule {
        let mut mol = Molecule::new();
        for &(id, el) in atoms {
            mol.atoms.push(Atom::new(id, el.symbol(), el));
        }
        for &(a, b) in bonds {
            mol.bonds.push(Bond::new(a, b));
        }
        mol
    }

    fn run(pre: &Molecule, post: &Molecule, config: &MapConfig) -> (MatchState, Result<(), Error>) {
        let anchors = [id(1)];
        let pre = MoleculeGraph::build(Side::Pre, pre, &anchors, &[]).unwrap();
        let post = MoleculeGraph::build(Side::Post, post, &anchors, &[]).unwrap();
        let mut state = MatchState::new(pre, post);
        state.seed_anchors(&anchors, &anchors).unwrap();
        state.run_queue();
        let result = reconcile(&mut state, config);
        (state, result)
    }

    #[test]
    fn disconnected_fragment_is_matched_globally() {
        let mol = molecule(
            &[(1, Element::C), (2, Element::O), (3, Element::N)],
            &[(1, 2)],
        );
        let (state, result) = run(&mol, &mol, &MapConfig::default());

        assert!(result.is_ok());
        assert_eq!(state.mapping.forward()[&id(3)], id(3));
        assert!(state.missing_pre.is_empty());
    }

    #[test]
    fn stalled_round_enables_inference() {
        let mol = molecule(
            &[(1, Element::O), (2, Element::C), (3, Element::C)],
            &[(1, 2), (1, 3)],
        );
        let (state, result) = run(&mol, &mol, &MapConfig::default());

        assert!(result.is_ok());
        assert_eq!(state.mapping.len(), 3);
        assert_eq!(state.events.len(), 1);
        assert!(matches!(
            &state.events[0],
            MatchEvent::Inferred { pre, post, candidates }
                if *pre == id(2) && *post == id(2) && candidates == &vec![id(2), id(3)]
        ));
        let sources: Vec<_> = state.mapping.pairs().iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            vec![MatchSource::Anchor, MatchSource::Inferred, MatchSource::Unique]
        );
    }

    #[test]
    fn unmatched_atoms_time_out_with_their_ids() {
        let mut pre_atoms = vec![(1, Element::C)];
        let mut post_atoms = vec![(1, Element::C)];
        for raw in 2..=12 {
            pre_atoms.push((raw, Element::N));
            post_atoms.push((raw, Element::O));
        }
        let pre = molecule(&pre_atoms, &[]);
        let post = molecule(&post_atoms, &[]);

        let (_, result) = run(&pre, &post, &MapConfig::default());
        match result {
            Err(Error::ReconcileTimeout { rounds, remaining }) => {
                assert_eq!(rounds, 10);
                assert_eq!(remaining, (2..=12).map(id).collect::<Vec<_>>());
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn round_limit_follows_config() {
        let pre = molecule(&[(1, Element::C), (2, Element::N)], &[]);
        let post = molecule(&[(1, Element::C), (2, Element::O)], &[]);
        let config = MapConfig {
            max_rounds: 2,
            ..MapConfig::default()
        };

        let (_, result) = run(&pre, &post, &config);
        assert!(matches!(
            result,
            Err(Error::ReconcileTimeout { rounds: 2, .. })
        ));
    }
}
