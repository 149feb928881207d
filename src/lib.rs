//! Atom-to-atom reaction mapping for LAMMPS `fix bond/react`.
//!
//! Given the bonded topology of a system before and after a reaction, plus the
//! atoms that form or break the reacting bond, `automap` pairs every pre-reaction
//! atom with its post-reaction counterpart and reduces the result to the
//! smallest template around the reaction site that still describes the event.
//!
//! # Features
//!
//! - **Neighbour-shell matching**: breadth-first propagation outward from the
//!   bonding atoms, telling symmetric substituents apart by the element
//!   fingerprints of up to three neighbour shells
//! - **Bounded reconciliation**: a global retry loop for atoms propagation
//!   could not reach, escalating to reported inference only when stalled
//! - **Template reduction**: ring preservation, reaction shells, byproducts and
//!   cut boundaries pushed away from any change of atom type, followed by
//!   compact renumbering of both sides
//! - **LAMMPS I/O**: read data or molecule files, write truncated molecule
//!   files and the `fix bond/react` map file
//! - **Type unification**: renumber the types of several data files and their
//!   coefficient file onto the types they actually use
//!
//! # Quick Start
//!
//! The main entry point is [`map_reaction`], which takes the two [`Molecule`]s,
//! a [`ReactionSpec`] naming the bonding atoms, and a [`MapConfig`]:
//!
//! ```
//! use automap::{Atom, Bond, Element, Molecule};
//! use automap::{MapConfig, MapError, ReactionSpec, map_reaction};
//!
//! // Methanol: C1 with hydrogens 2-4 and hydroxyl O5-H6.
//! let mut methanol = Molecule::new();
//! for (id, element) in [
//!     (1u32, Element::C),
//!     (2, Element::H),
//!     (3, Element::H),
//!     (4, Element::H),
//!     (5, Element::O),
//!     (6, Element::H),
//! ] {
//!     methanol.atoms.push(Atom::new(id, element.symbol(), element));
//! }
//! for (a, b) in [(1u32, 2u32), (1, 3), (1, 4), (1, 5), (5, 6)] {
//!     methanol.bonds.push(Bond::new(a, b));
//! }
//!
//! let reaction = ReactionSpec::new([1u32], [1u32]);
//! let map = map_reaction(&methanol, &methanol, &reaction, &MapConfig::default())?;
//!
//! // Every atom lies within three bonds of the bonding atom: nothing is cut.
//! assert!(!map.is_truncated());
//! assert_eq!(map.equivalences.len(), 6);
//! assert_eq!(map.partner_of(5u32.into()), Some(5u32.into()));
//! assert!(map.events.is_empty());
//!
//! let mut out = Vec::new();
//! automap::io::write_map(&mut out, &map).expect("in-memory write");
//! assert!(String::from_utf8(out).unwrap().starts_with("#This mapping was generated by AutoMapper"));
//! # Ok::<(), MapError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: LAMMPS data/molecule/coefficient files, type unification and the map file
//! - [`map_reaction`]: the mapping pipeline
//! - [`MapConfig`]: round limits, truncation and strictness switches
//!
//! # Data Types
//!
//! ## Input Structures
//!
//! - [`Molecule`]: atoms and bonds of one side of the reaction
//! - [`Atom`]: atom id, force-field kind and element
//! - [`Bond`]: bond between two atom ids
//! - [`ReactionSpec`]: bonding, deletion and creation atoms
//!
//! ## Output Structures
//!
//! - [`ReactionMap`]: pairs, emitted equivalences, role lists and both side templates
//! - [`SideTemplate`] and [`Selection`]: retained atoms and their renumbering
//! - [`MatchEvent`]: advisories raised while mapping

mod mapper;
mod model;

pub mod io;

pub use model::atom::Atom;
pub use model::molecule::{Bond, Molecule};
pub use model::reaction::ReactionSpec;
pub use model::template::{
    MappedPair, MatchEvent, MatchSource, ReactionMap, Selection, Side, SideTemplate,
};
pub use model::types::{AtomId, Element, ParseAtomIdError, ParseElementError};

pub use mapper::{MapConfig, map_reaction};

pub use mapper::Error as MapError;
