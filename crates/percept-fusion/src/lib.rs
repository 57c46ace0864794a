//! `percept-fusion` – the Fusion Engine.
//!
//! Pairs radar and camera observations of the same object into
//! [`FusedObject`][percept_types::FusedObject] records.
//!
//! # Modules
//!
//! - [`fusion`] – [`FusionEngine`][fusion::FusionEngine]: positional
//!   alignment of two pre-sorted streams, with an opt-in keyed join.

pub mod fusion;

pub use fusion::{AlignmentStrategy, FusionEngine};
