//! Reduction of a full mapping to a minimal reaction template.
//!
//! Retention rules run in a fixed order and only ever add atoms:
//!
//! 1. rings through any bonding atom, with their first-shell substituents;
//! 2. ring opening and closing: the mapped counterparts of such a ring;
//! 3. every bonding atom with its first, second and third shells;
//! 4. declared deletion and creation atoms;
//! 5. edge detection on the pre side;
//! 6. extension of edges that sit too close to a type change;
//! 7. post-side byproduct fragments.
//!
//! [`finalize`] then filters and renumbers the mapping when anything was
//! actually cut away.

use super::config::MapConfig;
use super::error::Error;
use super::graph::{MoleculeGraph, Shell};
use crate::model::reaction::ReactionSpec;
use crate::model::template::{
    MappedPair, MatchEvent, ReactionMap, Selection, Side, SideTemplate,
};
use crate::model::types::AtomId;
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// Atoms each side must keep, plus the pre-side cut boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Retention {
    pub pre: BTreeSet<AtomId>,
    pub post: BTreeSet<AtomId>,
    pub edges: Vec<AtomId>,
}

/// Applies every retention rule to a complete mapping.
pub fn retain(
    pre: &MoleculeGraph,
    post: &MoleculeGraph,
    pairs: &[MappedPair],
    spec: &ReactionSpec,
) -> Retention {
    let forward: HashMap<AtomId, AtomId> = pairs.iter().map(|p| (p.pre, p.post)).collect();
    let backward: HashMap<AtomId, AtomId> = pairs.iter().map(|p| (p.post, p.pre)).collect();
    let mut kept = Retention::default();

    let pre_rings = rings(pre, &spec.pre_anchors);
    let post_rings = rings(post, &spec.post_anchors);
    for ring in pre_rings.values() {
        kept.pre.extend(ring.iter().copied());
    }
    for ring in post_rings.values() {
        kept.post.extend(ring.iter().copied());
    }

    carry_open_rings(&pre_rings, &post_rings, &forward, &mut kept.pre, &mut kept.post);
    carry_open_rings(&post_rings, &pre_rings, &backward, &mut kept.post, &mut kept.pre);

    keep_reaction_shells(pre, &spec.pre_anchors, &mut kept.pre);
    keep_reaction_shells(post, &spec.post_anchors, &mut kept.post);

    kept.pre.extend(spec.pre_deletions.iter().copied());
    kept.post.extend(spec.post_deletions.iter().copied());
    kept.post.extend(spec.creations.iter().copied());

    let edges = edge_atoms(pre, &kept.pre);
    for (edge, distance) in extension_distances(pre, post, &forward, &edges) {
        debug!("edge atom {edge} is {distance} shell(s) short of a type change");
        extend(pre, edge, distance, &mut kept.pre);
        if let Some(&partner) = forward.get(&edge) {
            extend(post, partner, distance, &mut kept.post);
        }
    }
    kept.edges = edge_atoms(pre, &kept.pre);

    if let Some(&target) = spec.post_anchors.first() {
        let connected = post.reachable_from(target);
        let byproducts: Vec<AtomId> = post
            .atoms()
            .map(|a| a.id)
            .filter(|id| !connected.contains(id))
            .collect();
        if !byproducts.is_empty() {
            debug!("byproduct post atoms retained: {byproducts:?}");
            kept.post.extend(byproducts);
        }
    }

    kept
}

/// Ring through each anchor that sits in one, with first-shell substituents.
fn rings(graph: &MoleculeGraph, anchors: &[AtomId]) -> HashMap<AtomId, BTreeSet<AtomId>> {
    anchors
        .iter()
        .filter_map(|&anchor| ring_members(graph, anchor).map(|ring| (anchor, ring)))
        .collect()
}

pub(crate) fn ring_members(graph: &MoleculeGraph, anchor: AtomId) -> Option<BTreeSet<AtomId>> {
    let atom = graph.get(anchor)?;
    let path = atom
        .neighbours()
        .iter()
        .find_map(|&start| graph.shortest_path(start, anchor, Some((start, anchor))))?;
    debug!("{} ring found through anchor {anchor}: {path:?}", graph.side());

    let mut members = BTreeSet::new();
    for id in path {
        members.insert(id);
        if let Some(member) = graph.get(id) {
            members.extend(member.neighbours().iter().copied());
        }
    }
    Some(members)
}

/// Carries a ring that exists on `from` only across to the other side.
fn carry_open_rings(
    from_rings: &HashMap<AtomId, BTreeSet<AtomId>>,
    to_rings: &HashMap<AtomId, BTreeSet<AtomId>>,
    partner: &HashMap<AtomId, AtomId>,
    from_set: &mut BTreeSet<AtomId>,
    to_set: &mut BTreeSet<AtomId>,
) {
    for (anchor, ring) in from_rings {
        let Some(&counterpart) = partner.get(anchor) else {
            continue;
        };
        if to_rings.contains_key(&counterpart) {
            continue;
        }
        debug!("ring through anchor {anchor} has no counterpart ring; keeping it on both sides");
        from_set.insert(*anchor);
        from_set.extend(ring.iter().copied());
        to_set.insert(counterpart);
        to_set.extend(ring.iter().filter_map(|id| partner.get(id).copied()));
    }
}

fn keep_reaction_shells(graph: &MoleculeGraph, anchors: &[AtomId], set: &mut BTreeSet<AtomId>) {
    for &anchor in anchors {
        set.insert(anchor);
        if let Some(atom) = graph.get(anchor) {
            for shell in Shell::ALL {
                set.extend(atom.shell(shell).iter().copied());
            }
        }
    }
}

/// Non-hydrogen atoms of `set` with a first-shell neighbour outside it.
pub(crate) fn edge_atoms(graph: &MoleculeGraph, set: &BTreeSet<AtomId>) -> Vec<AtomId> {
    set.iter()
        .copied()
        .filter(|&id| {
            graph.get(id).is_some_and(|atom| {
                !atom.element.is_hydrogen() && atom.neighbours().iter().any(|nb| !set.contains(nb))
            })
        })
        .collect()
}

/// How many shells each edge must grow so the cut avoids a type change.
fn extension_distances(
    pre: &MoleculeGraph,
    post: &MoleculeGraph,
    forward: &HashMap<AtomId, AtomId>,
    edges: &[AtomId],
) -> Vec<(AtomId, u8)> {
    let kind_changes = |id: AtomId| -> bool {
        let Some(before) = pre.get(id) else {
            return false;
        };
        forward
            .get(&id)
            .and_then(|partner| post.get(*partner))
            .is_some_and(|after| after.kind != before.kind)
    };

    edges
        .iter()
        .filter_map(|&edge| {
            let atom = pre.get(edge)?;
            let distance = if kind_changes(edge) {
                3
            } else if atom.shell(Shell::First).iter().any(|&id| kind_changes(id)) {
                2
            } else if atom.shell(Shell::Second).iter().any(|&id| kind_changes(id)) {
                1
            } else {
                return None;
            };
            Some((edge, distance))
        })
        .collect()
}

fn extend(graph: &MoleculeGraph, id: AtomId, distance: u8, set: &mut BTreeSet<AtomId>) {
    let Some(atom) = graph.get(id) else {
        return;
    };
    for shell in Shell::ALL.into_iter().filter(|s| s.depth() <= distance) {
        set.extend(atom.shell(shell).iter().copied());
    }
}

/// Builds the final [`ReactionMap`], truncating and renumbering when the
/// retained pre atoms fall short of the whole molecule.
///
/// # Errors
///
/// Returns [`Error::AsymmetricPartialPair`] for a one-sided pair when
/// `config.strict_partial` is set, and [`Error::MissingRenumber`] if a
/// bonding or deletion atom dropped out of the template.
pub fn finalize(
    pre: &MoleculeGraph,
    post: &MoleculeGraph,
    mut pairs: Vec<MappedPair>,
    spec: &ReactionSpec,
    kept: Retention,
    config: &MapConfig,
    mut events: Vec<MatchEvent>,
) -> Result<ReactionMap, Error> {
    pairs.sort_by_key(|p| p.pre);

    let truncate = config.truncate && kept.pre.len() != pre.len();
    if !truncate {
        return Ok(ReactionMap {
            equivalences: pairs.iter().map(|p| (p.pre, p.post)).collect(),
            bonding_ids: spec.pre_anchors.clone(),
            delete_ids: spec.pre_deletions.clone(),
            edge_ids: Vec::new(),
            create_ids: spec.creations.clone(),
            pre: SideTemplate {
                retained: pre.atoms().map(|a| a.id).collect(),
                anchors: spec.pre_anchors.clone(),
                deletions: spec.pre_deletions.clone(),
                selection: None,
            },
            post: SideTemplate {
                retained: post
                    .atoms()
                    .map(|a| a.id)
                    .chain(spec.creations.iter().copied())
                    .collect(),
                anchors: spec.post_anchors.clone(),
                deletions: spec.post_deletions.clone(),
                selection: None,
            },
            pairs,
            events,
        });
    }

    debug!(
        "truncating template to {} of {} pre atoms",
        kept.pre.len(),
        pre.len()
    );

    let mut pre_sel = Selection::default();
    let mut post_sel = Selection::default();
    for pair in &pairs {
        let in_pre = kept.pre.contains(&pair.pre);
        let in_post = kept.post.contains(&pair.post);
        match (in_pre, in_post) {
            (true, true) => {
                let renumbered = AtomId::new(pre_sel.len() as u32 + 1);
                pre_sel.insert(pair.pre, renumbered);
                post_sel.insert(pair.post, renumbered);
            }
            (false, false) => {}
            (in_pre, _) => {
                let retained = if in_pre { Side::Pre } else { Side::Post };
                if config.strict_partial {
                    return Err(Error::AsymmetricPartialPair {
                        pre: pair.pre,
                        post: pair.post,
                        retained,
                    });
                }
                let event = MatchEvent::AsymmetricPair {
                    pre: pair.pre,
                    post: pair.post,
                    retained,
                };
                warn!("{event}");
                events.push(event);
            }
        }
    }

    let mut next = post_sel.max_new_id().map_or(0, |id| id.get());
    let mut create_ids = Vec::with_capacity(spec.creations.len());
    for &create in &spec.creations {
        next += 1;
        let renumbered = AtomId::new(next);
        post_sel.insert(create, renumbered);
        create_ids.push(renumbered);
    }

    let bonding_ids = relabel(&spec.pre_anchors, &pre_sel, Side::Pre)?;
    let delete_ids = relabel(&spec.pre_deletions, &pre_sel, Side::Pre)?;
    let post_anchors = relabel(&spec.post_anchors, &post_sel, Side::Post)?;
    let post_deletions = relabel(&spec.post_deletions, &post_sel, Side::Post)?;

    let edge_ids = kept
        .edges
        .iter()
        .filter_map(|&edge| {
            let renumbered = pre_sel.get(edge);
            if renumbered.is_none() {
                warn!("edge atom {edge} has no counterpart in the template and is not listed");
            }
            renumbered
        })
        .collect();

    let equivalences = (1..=pre_sel.len() as u32)
        .map(|n| (AtomId::new(n), AtomId::new(n)))
        .collect();

    Ok(ReactionMap {
        pairs,
        equivalences,
        bonding_ids: bonding_ids.clone(),
        delete_ids: delete_ids.clone(),
        edge_ids,
        create_ids,
        pre: SideTemplate {
            retained: kept.pre,
            anchors: bonding_ids,
            deletions: delete_ids,
            selection: Some(pre_sel),
        },
        post: SideTemplate {
            retained: kept.post,
            anchors: post_anchors,
            deletions: post_deletions,
            selection: Some(post_sel),
        },
        events,
    })
}

fn relabel(ids: &[AtomId], selection: &Selection, side: Side) -> Result<Vec<AtomId>, Error> {
    ids.iter()
        .map(|&id| {
            selection
                .get(id)
                .ok_or(Error::MissingRenumber { side, id })
        })
        .collect()
}
