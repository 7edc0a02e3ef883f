//! # wireup-resolve
//!
//! Declarative resource dependency resolution.
//!
//! Resources declare typed capabilities they *provide* and *require* through
//! a small rule grammar (`kind[.instance][mod]`). Starting from a seed list
//! of requested features, the resolver wires every requirement to compatible
//! providers under cardinality constraints and produces a topologically
//! ordered initialization sequence.
//!
//! Handles:
//! - **Rule**: The `kind[.instance][mod]` grammar and cardinality modifiers.
//! - **Link**: Provider/requirement links and the matching primitive.
//! - **Resource**: Configurable components with an opaque attribute bag.
//! - **Catalog**: Insertion-ordered resource store and provider index.
//! - **Resolver**: Feature-seeded walk building the dependency edge map.
//! - **Order**: Dependency-first topological ordering with cycle detection.
//! - **Export**: Neutral graph payload with JSON and DOT emitters.

pub mod catalog;
pub mod export;
pub mod link;
pub mod order;
pub mod resolver;
pub mod resource;
pub mod rule;
