//! `percept-store` – the SensorRecord Store.
//!
//! Holds the radar and camera observations for one run in capacity-bounded,
//! arrival-ordered collections.
//!
//! # Modules
//!
//! - [`parse`] – [`SensorRecord`][parse::SensorRecord]: token-stream parsing
//!   of delimited sensor files with best-effort truncation on malformed input.
//! - [`store`] – [`SensorStore`][store::SensorStore]: owns both collections and
//!   exposes the `load_*` operations.

pub mod parse;
pub mod store;

pub use parse::{LoadOutcome, SensorRecord};
pub use store::SensorStore;
