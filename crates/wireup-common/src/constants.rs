//! System-wide constants and defaults.

/// Name of the synthetic root resource seeded with the requested features.
///
/// The root is built in-memory by the resolver and never inserted into the
/// user catalog; it appears at the tail of every dependency order so its
/// edges stay inspectable.
pub const ROOT_RESOURCE: &str = "__build_ctx__";

/// Scope assigned to the synthetic root resource.
pub const ROOT_SCOPE: &str = "builder";

/// Instance name used when a requirement or provider leaves it unset.
pub const DEFAULT_INSTANCE: &str = "default";

/// Application name used in diagnostics.
pub const APP_NAME: &str = "wireup";
