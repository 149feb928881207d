use super::types::AtomId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which molecule of the reaction an atom belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Pre,
    Post,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Pre => f.write_str("pre"),
            Side::Post => f.write_str("post"),
        }
    }
}

/// How a pair of atoms came to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    /// Declared as a bonding atom pair.
    Anchor,
    /// Declared as a deletion atom pair.
    Deletion,
    /// The only candidate of its element.
    Unique,
    /// One of several interchangeable hydrogens.
    Hydrogen,
    /// Told apart by the fingerprint of the given neighbour shell (1 to 3).
    Symmetry(u8),
    /// Picked arbitrarily after every shell failed to break the tie.
    Inferred,
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::Anchor => f.write_str("bonding atom"),
            MatchSource::Deletion => f.write_str("deletion atom"),
            MatchSource::Unique => f.write_str("single element occurrence"),
            MatchSource::Hydrogen => f.write_str("hydrogen symmetry"),
            MatchSource::Symmetry(shell) => write!(f, "shell {shell} fingerprint"),
            MatchSource::Inferred => f.write_str("symmetry inference"),
        }
    }
}

/// A confirmed correspondence between a pre and a post atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappedPair {
    pub pre: AtomId,
    pub post: AtomId,
    pub source: MatchSource,
}

/// Non-fatal advisory raised while mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// No neighbour shell could tell the candidates apart, so the first
    /// same-element candidate was chosen.
    Inferred {
        pre: AtomId,
        post: AtomId,
        candidates: Vec<AtomId>,
    },
    /// A mapped pair had only one of its atoms inside the truncated template
    /// and was left out of it.
    AsymmetricPair {
        pre: AtomId,
        post: AtomId,
        retained: Side,
    },
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchEvent::Inferred {
                pre,
                post,
                candidates,
            } => {
                let list = candidates
                    .iter()
                    .map(AtomId::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "pre atom {pre} was assigned to post atom {post} by inference (candidates: {list}); check that this is correct"
                )
            }
            MatchEvent::AsymmetricPair {
                pre,
                post,
                retained,
            } => {
                let (kept, dropped) = match retained {
                    Side::Pre => ("pre", "post"),
                    Side::Post => ("post", "pre"),
                };
                write!(
                    f,
                    "pair {pre} -> {post} is retained on the {kept} side only; the {dropped} atom is outside the template"
                )
            }
        }
    }
}

/// Bijection from original atom ids to compact template ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    renumber: BTreeMap<AtomId, AtomId>,
}

impl Selection {
    pub fn new(renumber: BTreeMap<AtomId, AtomId>) -> Self {
        Self { renumber }
    }

    #[inline]
    pub fn get(&self, original: AtomId) -> Option<AtomId> {
        self.renumber.get(&original).copied()
    }

    #[inline]
    pub fn contains(&self, original: AtomId) -> bool {
        self.renumber.contains_key(&original)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.renumber.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.renumber.is_empty()
    }

    /// Largest id handed out so far, or `None` when nothing is selected.
    pub fn max_new_id(&self) -> Option<AtomId> {
        self.renumber.values().copied().max()
    }

    pub(crate) fn insert(&mut self, original: AtomId, renumbered: AtomId) {
        self.renumber.insert(original, renumbered);
    }

    /// Iterates `(original, renumbered)` pairs in ascending original id.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, AtomId)> + '_ {
        self.renumber.iter().map(|(k, v)| (*k, *v))
    }
}

/// Per-molecule view of the reduced template.
///
/// `anchors` and `deletions` carry the ids that belong in this side's
/// molecule file: renumbered when a [`Selection`] is present, original
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideTemplate {
    pub retained: BTreeSet<AtomId>,
    pub anchors: Vec<AtomId>,
    pub deletions: Vec<AtomId>,
    pub selection: Option<Selection>,
}

/// Complete result of mapping one reaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionMap {
    /// Every confirmed pair in original ids, sorted by pre id.
    pub pairs: Vec<MappedPair>,
    /// Equivalences as emitted: renumbered when truncated, sorted by pre id.
    pub equivalences: Vec<(AtomId, AtomId)>,
    pub bonding_ids: Vec<AtomId>,
    pub delete_ids: Vec<AtomId>,
    pub edge_ids: Vec<AtomId>,
    pub create_ids: Vec<AtomId>,
    pub pre: SideTemplate,
    pub post: SideTemplate,
    pub events: Vec<MatchEvent>,
}

impl ReactionMap {
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.pre.selection.is_some()
    }

    /// Looks up the post partner of a pre atom in original ids.
    pub fn partner_of(&self, pre: AtomId) -> Option<AtomId> {
        self.pairs.iter().find(|p| p.pre == pre).map(|p| p.post)
    }

    pub fn inference_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Inferred { .. }))
            .count()
    }
}
