//! # wireup-common
//!
//! Error definitions and constants shared across the Wireup workspace.
//!
//! This crate sits at the bottom of the workspace dependency graph: it
//! depends on no other internal crate and provides the primitives the
//! resolution crates build upon.

pub mod constants;
pub mod error;
