//! Unified error types for the Wireup workspace.
//!
//! Every fatal condition the resolution pipeline can hit maps to one variant
//! here, carrying enough context to diagnose the failure without re-running.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum WireupError {
    /// A rule string or structured rule failed the grammar.
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule {
        /// Offending rule text.
        rule: String,
        /// What the grammar rejected.
        reason: String,
    },

    /// A resource name collided without `force`.
    #[error("duplicate resource: {name}")]
    DuplicateResource {
        /// Name that already exists in the catalog.
        name: String,
    },

    /// A resource lookup missed.
    #[error("resource not found: {name}")]
    UnknownResource {
        /// Name that was requested.
        name: String,
    },

    /// A requirement matched fewer providers than its cardinality minimum.
    #[error(
        "requirement `{requirement}` on `{resource}` matched {matched} providers, \
         expected at least {min} (as `{effective}`, candidates: {candidates:?})"
    )]
    UnsatisfiedRequirement {
        /// Resource owning the requirement.
        resource: String,
        /// Requirement rule as declared.
        requirement: String,
        /// Requirement rule after remapping.
        effective: String,
        /// Instance names of the providers of the same kind, possibly empty.
        candidates: Vec<String>,
        /// Number of providers that matched.
        matched: usize,
        /// Cardinality minimum that was violated.
        min: usize,
    },

    /// A requirement matched more providers than its cardinality maximum.
    #[error(
        "requirement `{requirement}` on `{resource}` matched {matched} providers, \
         expected at most {max} (as `{effective}`); add a remap rule to pick \
         one of: {candidates:?}"
    )]
    AmbiguousRequirement {
        /// Resource owning the requirement.
        resource: String,
        /// Requirement rule as declared.
        requirement: String,
        /// Requirement rule after remapping.
        effective: String,
        /// Instance names of the matched providers.
        candidates: Vec<String>,
        /// Number of providers that matched.
        matched: usize,
        /// Cardinality maximum that was violated.
        max: usize,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected: {path:?}")]
    CycleDetected {
        /// The cycle as a closed walk of resource names.
        path: Vec<String>,
    },

    /// An I/O operation failed (graph emitters only).
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WireupError>;
