//! Hierarchical action planning core.
//!
//! `actionmap` decomposes OKR-style objectives into maps of hierarchical
//! action items linked to ground-level tasks, and keeps the derived progress
//! figures consistent while many users edit concurrently:
//!
//! - [`ops::tree`] builds an ordered forest from a flat, parent-referencing
//!   item set, with defensive handling of corrupt (cyclic or dangling)
//!   parent references;
//! - [`ops::progress`] rolls task completion up into item and map
//!   percentages, recomputed purely from the authoritative set on every read;
//! - [`ops::due`] classifies due-date urgency;
//! - [`ops::view`] projects the same item set into a tree or a
//!   status-grouped board without mutating it;
//! - [`edit`] runs version-stamped writes through an optimistic-concurrency
//!   state machine with a three-way conflict resolution protocol
//!   (reload / force-overwrite / cancel);
//! - [`store`] is the persistence-collaborator boundary, with an in-memory
//!   reference implementation.
//!
//! Storage, authentication, transport and rendering live outside this crate.

pub mod edit;
pub mod model;
pub mod ops;
pub mod store;
