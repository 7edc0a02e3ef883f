//! Resource definitions and their configuration boundary.
//!
//! A resource is a named component carrying provider and requirement links
//! plus an opaque attribute bag for user payload. Configurations arrive as
//! [`ResourceConfig`] values, either built fluently in code or deserialized
//! from JSON; rules are normalized into links when the resource enters a
//! catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wireup_common::error::Result;

use crate::link::{ProviderLink, RequirementLink};
use crate::rule::{Rule, RuleSpec};

/// Configuration ingested by [`Catalog::add_resource`](crate::catalog::Catalog::add_resource).
///
/// Every key the core does not interpret lands verbatim in the attribute
/// bag and travels with the resource into graph exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Scope this resource belongs to; the `add_resource` argument wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Capabilities this resource exposes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<RuleSpec>,
    /// Capabilities this resource needs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<RuleSpec>,
    /// User variables, opaque to the core.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
    /// Remaining configuration keys, stored verbatim.
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl ResourceConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes a configuration from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the value does not fit the schema.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Sets the description.
    #[must_use]
    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Adds a provider rule.
    #[must_use]
    pub fn provides(mut self, rule: impl Into<RuleSpec>) -> Self {
        self.provides.push(rule.into());
        self
    }

    /// Adds a requirement rule.
    #[must_use]
    pub fn requires(mut self, rule: impl Into<RuleSpec>) -> Self {
        self.requires.push(rule.into());
        self
    }

    /// Adds a user variable.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.vars.insert(key.into(), value.into());
        self
    }

    /// Adds an opaque attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.attrs.insert(key.into(), value.into());
        self
    }
}

/// A named component with capabilities, requirements, and user payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    name: String,
    scope: Option<String>,
    desc: Option<String>,
    provides: Vec<ProviderLink>,
    requires: Vec<RequirementLink>,
    vars: Map<String, Value>,
    attrs: Map<String, Value>,
}

impl Resource {
    /// Builds a resource from its configuration, parsing every rule and
    /// binding the resulting links to this resource.
    ///
    /// Duplicate provider declarations (`kind`, `instance`) on the same
    /// resource collapse to one link.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`](wireup_common::error::WireupError::MalformedRule)
    /// if any rule fails the grammar; the whole resource is rejected.
    pub(crate) fn from_config(
        name: &str,
        scope: Option<&str>,
        config: ResourceConfig,
    ) -> Result<Self> {
        let mut provides: Vec<ProviderLink> = Vec::with_capacity(config.provides.len());
        for spec in &config.provides {
            let link = ProviderLink::bind(Rule::provider_from_spec(spec)?, name);
            if !provides.contains(&link) {
                provides.push(link);
            }
        }

        let mut requires: Vec<RequirementLink> = Vec::with_capacity(config.requires.len());
        for spec in &config.requires {
            requires.push(RequirementLink::bind(Rule::requirement_from_spec(spec)?, name));
        }

        Ok(Self {
            name: name.to_string(),
            scope: scope.map(ToString::to_string).or(config.scope),
            desc: config.desc,
            provides,
            requires,
            vars: config.vars,
            attrs: config.attrs,
        })
    }

    /// Resource name, unique within a catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope this resource belongs to.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Human-readable description.
    #[must_use]
    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    /// Capabilities this resource exposes, in declaration order.
    #[must_use]
    pub fn provides(&self) -> &[ProviderLink] {
        &self.provides
    }

    /// Capabilities this resource needs, in declaration order.
    #[must_use]
    pub fn requires(&self) -> &[RequirementLink] {
        &self.requires
    }

    /// User variables.
    #[must_use]
    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Opaque attribute bag.
    #[must_use]
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    /// Looks up a single attribute by key.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Re-ingests this resource as a configuration, e.g. to copy it into
    /// another catalog under a different name or scope.
    #[must_use]
    pub fn to_config(&self) -> ResourceConfig {
        ResourceConfig {
            desc: self.desc.clone(),
            scope: self.scope.clone(),
            provides: self
                .provides
                .iter()
                .map(|p| RuleSpec::Text(p.rule()))
                .collect(),
            requires: self
                .requires
                .iter()
                .map(|r| RuleSpec::Text(r.rule()))
                .collect(),
            vars: self.vars.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{} ({scope})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_config_binds_links_to_owner() {
        let config = ResourceConfig::new()
            .provides("app.web")
            .requires("database.main");
        let resource = Resource::from_config("application", None, config).expect("should build");

        assert_eq!(resource.provides().len(), 1);
        assert_eq!(resource.provides()[0].owner, "application");
        assert_eq!(resource.requires().len(), 1);
        assert_eq!(resource.requires()[0].owner, "application");
    }

    #[test]
    fn scope_argument_wins_over_config_field() {
        let config = ResourceConfig::new().scope("from-config");
        let resource =
            Resource::from_config("r", Some("from-arg"), config).expect("should build");
        assert_eq!(resource.scope(), Some("from-arg"));

        let config = ResourceConfig::new().scope("from-config");
        let resource = Resource::from_config("r", None, config).expect("should build");
        assert_eq!(resource.scope(), Some("from-config"));
    }

    #[test]
    fn duplicate_provider_collapses() {
        let config = ResourceConfig::new()
            .provides("database.main")
            .provides("database.main")
            .provides("database.backup");
        let resource = Resource::from_config("pg", None, config).expect("should build");
        assert_eq!(resource.provides().len(), 2);
    }

    #[test]
    fn malformed_rule_rejects_whole_resource() {
        let config = ResourceConfig::new().provides("ok.rule").requires("a.b.c");
        assert!(Resource::from_config("r", None, config).is_err());
    }

    #[test]
    fn json_config_extras_land_in_attr_bag() {
        let config = ResourceConfig::from_json(json!({
            "desc": "web application",
            "provides": ["app.web"],
            "requires": ["database.main", {"kind": "cache", "mod": "?"}],
            "vars": {"port": 8080},
            "team": "platform",
            "replicas": 3
        }))
        .expect("should deserialize");
        let resource = Resource::from_config("app", None, config).expect("should build");

        assert_eq!(resource.desc(), Some("web application"));
        assert_eq!(resource.requires().len(), 2);
        assert_eq!(resource.vars().get("port"), Some(&json!(8080)));
        assert_eq!(resource.attr("team"), Some(&json!("platform")));
        assert_eq!(resource.attr("replicas"), Some(&json!(3)));
    }

    #[test]
    fn to_config_round_trips() {
        let config = ResourceConfig::new()
            .desc("scheduler")
            .scope("app")
            .provides("sched.main")
            .requires("worker+")
            .var("threads", 4);
        let resource = Resource::from_config("sched", None, config).expect("should build");

        let copy = Resource::from_config("sched", None, resource.to_config())
            .expect("re-ingestion should build");
        assert_eq!(copy, resource);
    }

    #[test]
    fn display_includes_scope() {
        let resource = Resource::from_config("db", Some("infra"), ResourceConfig::new())
            .expect("should build");
        assert_eq!(resource.to_string(), "db (infra)");
    }
}
