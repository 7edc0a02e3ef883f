//! Provider and requirement links, and the matching primitive.
//!
//! Links are value types holding the owning resource's name rather than a
//! reference, so capability graphs with cycles never turn into ownership
//! cycles. Matching a requirement against the provider index is the central
//! primitive of the resolution engine; strategy overrides compose with it.

use std::collections::BTreeMap;
use std::fmt;

use wireup_common::constants::DEFAULT_INSTANCE;
use wireup_common::error::{Result, WireupError};

use crate::rule::{format_rule, Cardinality, Rule};

/// Remapping rules: kind to instance override, applied to under-specified
/// requirements (and, by default, over explicit instances as well).
pub type RemapRules = BTreeMap<String, String>;

/// A capability exposed by a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderLink {
    /// Capability kind.
    pub kind: String,
    /// Optional instance refinement.
    pub instance: Option<String>,
    /// Name of the resource exposing this capability.
    pub owner: String,
}

impl ProviderLink {
    pub(crate) fn bind(rule: Rule, owner: &str) -> Self {
        Self {
            kind: rule.kind,
            instance: rule.instance,
            owner: owner.to_string(),
        }
    }

    /// Canonical rule string for this provider: `kind[.instance]`.
    #[must_use]
    pub fn rule(&self) -> String {
        format_rule(&self.kind, self.instance.as_deref(), None)
    }

    /// Instance name used during matching, falling back to `default`.
    #[must_use]
    pub fn instance_name(&self) -> &str {
        self.instance.as_deref().unwrap_or(DEFAULT_INSTANCE)
    }
}

impl fmt::Display for ProviderLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.rule(), self.owner)
    }
}

/// A capability a resource needs from another resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementLink {
    /// Capability kind.
    pub kind: String,
    /// Optional instance refinement.
    pub instance: Option<String>,
    /// Optional cardinality; `one` is assumed at match time when unset.
    pub modifier: Option<Cardinality>,
    /// Name of the resource declaring this requirement.
    pub owner: String,
}

impl RequirementLink {
    pub(crate) fn bind(rule: Rule, owner: &str) -> Self {
        Self {
            kind: rule.kind,
            instance: rule.instance,
            modifier: rule.modifier,
            owner: owner.to_string(),
        }
    }

    /// Canonical rule string for this requirement: `kind[.instance][mod]`.
    #[must_use]
    pub fn rule(&self) -> String {
        format_rule(&self.kind, self.instance.as_deref(), self.modifier)
    }

    /// Effective instance after applying remap rules.
    ///
    /// When `remap_requirement` is set and a remap rule exists for this
    /// kind, the override wins even over an explicitly declared instance.
    #[must_use]
    pub fn effective_instance(
        &self,
        remap_rules: &RemapRules,
        remap_requirement: bool,
    ) -> Option<String> {
        if remap_requirement {
            remap_rules
                .get(&self.kind)
                .cloned()
                .or_else(|| self.instance.clone())
        } else {
            self.instance.clone()
        }
    }

    /// Matches this requirement against a provider index.
    ///
    /// The algorithm: apply remapping, keep providers of the same kind,
    /// refine by effective instance (falling back to the kind-level set when
    /// no provider matches the instance exactly), then enforce the
    /// cardinality `self.modifier.unwrap_or(default_mode)`. Providers are
    /// returned in index order, which is catalog insertion order.
    ///
    /// Returns the effective match name (`default` when no instance applies)
    /// and the matching providers.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::UnsatisfiedRequirement`] when fewer providers
    /// match than the cardinality minimum, and
    /// [`WireupError::AmbiguousRequirement`] when more match than the
    /// maximum.
    pub fn match_providers(
        &self,
        providers: &[ProviderLink],
        remap_rules: &RemapRules,
        default_mode: Cardinality,
        remap_requirement: bool,
    ) -> Result<(String, Vec<ProviderLink>)> {
        let effective_instance = self.effective_instance(remap_rules, remap_requirement);

        let kind_set: Vec<&ProviderLink> =
            providers.iter().filter(|p| p.kind == self.kind).collect();

        let selected: Vec<&ProviderLink> = match &effective_instance {
            Some(instance) => {
                let exact: Vec<&ProviderLink> = kind_set
                    .iter()
                    .copied()
                    .filter(|p| p.instance.as_deref() == Some(instance))
                    .collect();
                // Kind first, instance as refinement: an empty exact set
                // falls back to every provider of the kind.
                if exact.is_empty() {
                    kind_set.clone()
                } else {
                    exact
                }
            }
            None => kind_set.clone(),
        };

        let match_name = effective_instance
            .clone()
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        let mode = self.modifier.unwrap_or(default_mode);
        let effective_rule =
            format_rule(&self.kind, effective_instance.as_deref(), self.modifier);

        if selected.len() < mode.min() {
            return Err(WireupError::UnsatisfiedRequirement {
                resource: self.owner.clone(),
                requirement: self.rule(),
                effective: effective_rule,
                candidates: instance_names(&kind_set),
                matched: selected.len(),
                min: mode.min(),
            });
        }
        if let Some(max) = mode.max() {
            if selected.len() > max {
                return Err(WireupError::AmbiguousRequirement {
                    resource: self.owner.clone(),
                    requirement: self.rule(),
                    effective: effective_rule,
                    candidates: instance_names(&selected),
                    matched: selected.len(),
                    max,
                });
            }
        }

        Ok((match_name, selected.into_iter().cloned().collect()))
    }
}

impl fmt::Display for RequirementLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.rule(), self.owner)
    }
}

fn instance_names(providers: &[&ProviderLink]) -> Vec<String> {
    providers
        .iter()
        .map(|p| p.instance_name().to_string())
        .collect()
}
