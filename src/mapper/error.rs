//! Error types for reaction mapping.
//!
//! Every variant describes a defect in the user's input or a mapping that
//! could not be completed. Ambiguities that later stages can still retry are
//! never reported here; they surface as [`MatchEvent`](crate::MatchEvent)
//! advisories instead.

use crate::model::template::Side;
use crate::model::types::AtomId;
use thiserror::Error;

/// Errors that can occur while mapping a reaction.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared atom id does not exist in the molecule it was declared for.
    #[error("{role} atom {id} does not exist in the {side} molecule")]
    UnknownAtom {
        /// Molecule the id was looked up in.
        side: Side,
        /// The missing id.
        id: AtomId,
        /// What the atom was declared as (bonding, deletion, creation).
        role: &'static str,
    },

    /// A bond references an atom that is not part of the molecule.
    #[error("invalid bond between atoms {i} and {j} in the {side} molecule: {detail}")]
    InvalidBond {
        side: Side,
        i: AtomId,
        j: AtomId,
        detail: String,
    },

    /// The same atom id appears twice in one molecule.
    #[error("atom id {id} appears more than once in the {side} molecule")]
    DuplicateAtom { side: Side, id: AtomId },

    /// The pre and post bonding atom lists differ in length or are empty.
    #[error("bonding atoms are unbalanced: {pre} pre ids vs {post} post ids")]
    UnbalancedAnchors { pre: usize, post: usize },

    /// The pre and post deletion atom lists differ in length.
    #[error("deletion atoms are unbalanced: {pre} pre ids vs {post} post ids")]
    UnbalancedDeletions { pre: usize, post: usize },

    /// Without creation atoms both molecules must hold the same atoms.
    #[error("pre and post molecules have different atom counts (pre: {pre}, post: {post})")]
    AtomCountMismatch { pre: usize, post: usize },

    /// An atom was declared in two pairs.
    #[error("atom {id} is mapped more than once on the {side} side")]
    DuplicateMapping { side: Side, id: AtomId },

    /// Reconciliation ran out of rounds with pre atoms still unmatched.
    ///
    /// No mapping is produced in this case.
    #[error("missing atom search timed out after {rounds} rounds; unmatched pre atoms: {}", join_ids(.remaining))]
    ReconcileTimeout {
        /// Number of rounds that were attempted.
        rounds: usize,
        /// Pre atom ids still unmatched, ascending.
        remaining: Vec<AtomId>,
    },

    /// A mapped pair lies inside the template on one side only.
    ///
    /// Only raised when strict partial checking is enabled.
    #[error("pair {pre} -> {post} is retained on the {retained} side only")]
    AsymmetricPartialPair {
        pre: AtomId,
        post: AtomId,
        retained: Side,
    },

    /// An atom that must appear in the template has no renumbered id.
    #[error("{side} atom {id} has no renumbered id in the truncated template")]
    MissingRenumber { side: Side, id: AtomId },
}

fn join_ids(ids: &[AtomId]) -> String {
    ids.iter()
        .map(AtomId::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Error {
    /// Creates an [`UnknownAtom`](Error::UnknownAtom) error.
    pub fn unknown_atom(side: Side, id: AtomId, role: &'static str) -> Self {
        Self::UnknownAtom { side, id, role }
    }

    /// Creates an [`InvalidBond`](Error::InvalidBond) error.
    ///
    /// # Arguments
    ///
    /// * `side` - Molecule containing the bond
    /// * `i` - First atom id
    /// * `j` - Second atom id
    /// * `details` - Description of the bond problem
    pub fn invalid_bond(side: Side, i: AtomId, j: AtomId, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            side,
            i,
            j,
            detail: details.into(),
        }
    }

    /// Creates a [`ReconcileTimeout`](Error::ReconcileTimeout) error with
    /// the remaining ids sorted ascending.
    pub fn reconcile_timeout(rounds: usize, mut remaining: Vec<AtomId>) -> Self {
        remaining.sort();
        Self::ReconcileTimeout { rounds, remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_lists_sorted_ids() {
        let err = Error::reconcile_timeout(
            10,
            vec![AtomId::new(12), AtomId::new(3), AtomId::new(7)],
        );
        match &err {
            Error::ReconcileTimeout { remaining, .. } => {
                assert_eq!(remaining, &vec![AtomId::new(3), AtomId::new(7), AtomId::new(12)]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "missing atom search timed out after 10 rounds; unmatched pre atoms: 3 7 12"
        );
    }

    #[test]
    fn unknown_atom_message_names_role_and_side() {
        let err = Error::unknown_atom(Side::Post, AtomId::new(5), "bonding");
        assert_eq!(
            err.to_string(),
            "bonding atom 5 does not exist in the post molecule"
        );
    }
}
