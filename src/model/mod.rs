//! Core data structures describing reacting molecules and mapping results.
//!
//! This module provides the plain records that flow through `automap`:
//!
//! - [`types`] – Element tags and opaque atom identifiers.
//! - [`atom`] – One atom with its force-field type tag and element.
//! - [`molecule`] – Bonded topology of a single molecule.
//! - [`reaction`] – User-declared bonding, deletion and creation atoms.
//! - [`template`] – Mapping output: matched pairs, advisories and the
//!   reduced per-side templates.
//!
//! Input topology ([`Molecule`]) and the computed result ([`ReactionMap`]) are
//! kept apart so the [`crate::mapper`] pipeline reads one and produces the
//! other without mutating its inputs.
//!
//! [`Molecule`]: molecule::Molecule
//! [`ReactionMap`]: template::ReactionMap

pub mod atom;
pub mod molecule;
pub mod reaction;
pub mod template;
pub mod types;
