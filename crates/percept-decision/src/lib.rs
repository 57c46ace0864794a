//! `percept-decision` – the Decision Engine.
//!
//! Classifies every fused object as [`Action::Brake`][percept_types::Action]
//! or [`Action::Continue`][percept_types::Action] and tallies close calls.
//!
//! # Modules
//!
//! - [`engine`] – [`DecisionEngine`][engine::DecisionEngine] and its
//!   [`Thresholds`][engine::Thresholds]; [`DecisionEngine::decide`][engine::DecisionEngine::decide]
//!   returns a [`DecisionReport`][engine::DecisionReport] carrying the ordered
//!   outcomes and the brake count.

pub mod engine;

pub use engine::{DecisionEngine, DecisionReport, Thresholds};
