//! Atom-to-atom reaction mapping pipeline.
//!
//! [`map_reaction`] runs the stages in order:
//!
//! 1. build one [`MoleculeGraph`] per side with neighbour shells;
//! 2. seed the declared bonding and deletion pairs and propagate outward;
//! 3. reconcile whatever propagation left unmatched;
//! 4. reduce the complete mapping to a minimal template and renumber it.

mod config;
mod error;
mod graph;
mod propagate;
mod reconcile;
mod reduce;
mod symmetry;

pub use config::MapConfig;
pub use error::Error;

use crate::model::molecule::Molecule;
use crate::model::reaction::ReactionSpec;
use crate::model::template::{ReactionMap, Side};
use graph::MoleculeGraph;
use log::info;
use propagate::MatchState;

/// Maps `pre` onto `post` and derives the reaction template.
///
/// # Errors
///
/// Fails on inconsistent declarations (unknown or unbalanced bonding,
/// deletion or creation atoms), on differing atom counts when no creation
/// atoms are declared, and with [`Error::ReconcileTimeout`] when some pre
/// atoms cannot be matched within `config.max_rounds` rounds.
pub fn map_reaction(
    pre: &Molecule,
    post: &Molecule,
    reaction: &ReactionSpec,
    config: &MapConfig,
) -> Result<ReactionMap, Error> {
    let pre_graph = MoleculeGraph::build(Side::Pre, pre, &reaction.pre_anchors, &[])?;
    let post_graph = MoleculeGraph::build(
        Side::Post,
        post,
        &reaction.post_anchors,
        &reaction.creations,
    )?;

    if !reaction.has_creations() && pre_graph.len() != post_graph.len() {
        return Err(Error::AtomCountMismatch {
            pre: pre_graph.len(),
            post: post_graph.len(),
        });
    }
    for (graph, ids) in [
        (&pre_graph, &reaction.pre_deletions),
        (&post_graph, &reaction.post_deletions),
    ] {
        if let Some(&id) = ids.iter().find(|id| !graph.contains(**id)) {
            return Err(Error::unknown_atom(graph.side(), id, "deletion"));
        }
    }

    let mut state = MatchState::new(pre_graph, post_graph);
    state.seed_anchors(&reaction.pre_anchors, &reaction.post_anchors)?;
    state.seed_deletions(&reaction.pre_deletions, &reaction.post_deletions)?;
    state.run_queue();
    reconcile::reconcile(&mut state, config)?;

    let (pre_graph, post_graph, mapping, events) = state.into_parts();
    info!(
        "mapped {} atom pairs ({} by inference)",
        mapping.len(),
        events.len()
    );

    let pairs = mapping.into_pairs();
    let kept = reduce::retain(&pre_graph, &post_graph, &pairs, reaction);
    reduce::finalize(&pre_graph, &post_graph, pairs, reaction, kept, config, events)
}
