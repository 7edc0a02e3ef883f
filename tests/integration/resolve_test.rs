//! Integration tests for catalog construction and dependency resolution.
//!
//! These tests are implemented in:
//! `crates/wireup-resolve/tests/resolve_test.rs`
//!
//! Covered scenarios:
//! - `linear_chain_orders_dependencies_first`: db/app chain resolves dependencies first
//! - `two_providers_without_remap_are_ambiguous`: duplicate kinds need a remap rule
//! - `remap_rule_disambiguates_renamed_providers`: remap picks one provider, rest unreachable
//! - `plus_cardinality_wires_every_provider`: `+` requirements fan out to all providers
//! - `mutual_requirements_form_a_cycle`: circular capabilities produce a cycle error
//! - `identical_runs_are_identical`: the resolution contract is deterministic
