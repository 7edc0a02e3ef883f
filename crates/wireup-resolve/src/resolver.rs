//! The dependency resolution engine.
//!
//! A [`Resolver`] borrows an immutable catalog for its whole lifetime, seeds
//! a synthetic root resource with the requested features, walks requirements
//! depth-first wiring each one to compatible providers, and topologically
//! orders the participating resources. The walk is deterministic: identical
//! catalog insertion order, features, and remap rules produce identical edge
//! maps and dependency orders.

use std::collections::HashMap;
use std::fmt;

use wireup_common::constants::{ROOT_RESOURCE, ROOT_SCOPE};
use wireup_common::error::Result;

use crate::catalog::Catalog;
use crate::export::{self, GraphExport};
use crate::link::{ProviderLink, RemapRules, RequirementLink};
use crate::order;
use crate::resource::{Resource, ResourceConfig};
use crate::rule::Cardinality;

/// A resolved edge: one requirement wired to one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLink {
    /// The requirement that was matched.
    pub requirement: RequirementLink,
    /// The provider satisfying it.
    pub provider: ProviderLink,
    /// Effective instance used during matching.
    pub match_name: String,
}

impl EdgeLink {
    /// Canonical rule string of the underlying requirement.
    #[must_use]
    pub fn rule(&self) -> String {
        self.requirement.rule()
    }
}

impl fmt::Display for EdgeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}",
            self.requirement.owner,
            self.rule(),
            self.provider.owner
        )
    }
}

/// Insertion-ordered map from resource name to its resolved edges.
///
/// Keys appear in walk order; each edge list preserves requirement
/// declaration order, with multi-edges following provider index order.
#[derive(Debug, Clone, Default)]
pub struct EdgeMap {
    entries: Vec<(String, Vec<EdgeLink>)>,
    index: HashMap<String, usize>,
}

impl EdgeMap {
    /// Edges resolved for a resource, if it participated.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[EdgeLink]> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Whether the resource participated in the walk.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of participating resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(resource, edges)` pairs in walk order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EdgeLink])> {
        self.entries
            .iter()
            .map(|(name, edges)| (name.as_str(), edges.as_slice()))
    }

    fn insert_empty(&mut self, name: &str) {
        let _ = self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), Vec::new()));
    }

    fn push_edge(&mut self, name: &str, edge: EdgeLink) {
        if let Some(&pos) = self.index.get(name) {
            self.entries[pos].1.push(edge);
        }
    }
}

/// Everything a matching strategy may consult.
#[derive(Debug)]
pub struct MatchContext<'a> {
    /// Snapshot of every provider link, in catalog order.
    pub providers: &'a [ProviderLink],
    /// Active remap rules.
    pub remap_rules: &'a RemapRules,
}

/// The single documented extension point of the resolver.
///
/// Implementations replace how one requirement is wired to providers, e.g.
/// for environment filtering, feature toggles, or priority selection. The
/// default is [`DefaultMatch`]. Returning providers outside the context's
/// index is allowed but the walk will then fail on unknown owners.
pub trait MatchStrategy {
    /// Resolves one requirement to its match name and providers.
    ///
    /// `level` is the current walk depth, starting at 0 for the root.
    ///
    /// # Errors
    ///
    /// Implementations fail with the matching errors of
    /// [`RequirementLink::match_providers`] or their own fatal conditions.
    fn match_requirement(
        &self,
        requirement: &RequirementLink,
        level: usize,
        ctx: &MatchContext<'_>,
    ) -> Result<(String, Vec<ProviderLink>)>;
}

/// Default matching: remap-aware, kind-first, `one` cardinality when the
/// requirement leaves it unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMatch;

impl MatchStrategy for DefaultMatch {
    fn match_requirement(
        &self,
        requirement: &RequirementLink,
        _level: usize,
        ctx: &MatchContext<'_>,
    ) -> Result<(String, Vec<ProviderLink>)> {
        requirement.match_providers(ctx.providers, ctx.remap_rules, Cardinality::One, true)
    }
}

/// Feature-seeded dependency resolver over a borrowed catalog.
///
/// The shared borrow lasts for the resolver's lifetime, so the catalog
/// cannot be mutated while a run is in progress. Concurrent resolvers over
/// the same catalog are safe.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    feature_names: Vec<String>,
    remap_rules: RemapRules,
    debug: bool,
    strategy: Box<dyn MatchStrategy>,
    provider_index: Vec<ProviderLink>,
    edge_map: EdgeMap,
    dep_order: Vec<String>,
    trace: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver seeded with the given feature rules.
    #[must_use]
    pub fn new<I, S>(catalog: &'a Catalog, feature_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog,
            feature_names: feature_names.into_iter().map(Into::into).collect(),
            remap_rules: RemapRules::new(),
            debug: false,
            strategy: Box::new(DefaultMatch),
            provider_index: Vec::new(),
            edge_map: EdgeMap::default(),
            dep_order: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Replaces the remap rules.
    #[must_use]
    pub fn remap_rules(mut self, rules: RemapRules) -> Self {
        self.remap_rules = rules;
        self
    }

    /// Adds one remap rule: requirements of `kind` resolve to `instance`.
    #[must_use]
    pub fn remap(mut self, kind: impl Into<String>, instance: impl Into<String>) -> Self {
        let _ = self.remap_rules.insert(kind.into(), instance.into());
        self
    }

    /// Enables the human-readable resolution trace.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replaces the matching strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: Box<dyn MatchStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolves dependencies and returns the initialization order.
    ///
    /// Every call restarts from a clean state: the provider index is
    /// snapshotted from the catalog, the synthetic root is seeded with the
    /// feature requirements, the walk builds the edge map, and the result
    /// is topologically ordered with the root at the tail. After a failed
    /// run the partial edge map stays inspectable.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::MalformedRule`](wireup_common::error::WireupError::MalformedRule)
    /// for an invalid feature rule, the matching errors of
    /// [`RequirementLink::match_providers`], or
    /// [`WireupError::CycleDetected`](wireup_common::error::WireupError::CycleDetected)
    /// from the ordering pass.
    pub fn resolve(&mut self) -> Result<Vec<String>> {
        self.edge_map = EdgeMap::default();
        self.dep_order.clear();
        self.trace.clear();
        self.provider_index = self.catalog.provider_links();

        let root = self.build_root()?;
        tracing::debug!(
            features = self.feature_names.len(),
            providers = self.provider_index.len(),
            "resolution started"
        );

        self.walk(ROOT_RESOURCE, 0, &root)?;

        let order = order::topological_order(&self.edge_map, ROOT_RESOURCE)?;
        tracing::debug!(resources = order.len(), "resolution finished");
        self.dep_order.clone_from(&order);
        Ok(order)
    }

    /// Initialization order from the last successful [`Resolver::resolve`].
    #[must_use]
    pub fn dep_order(&self) -> &[String] {
        &self.dep_order
    }

    /// Edge map of the last run, partial if the run failed.
    #[must_use]
    pub fn edge_map(&self) -> &EdgeMap {
        &self.edge_map
    }

    /// Provider index snapshot of the last run.
    #[must_use]
    pub fn provider_index(&self) -> &[ProviderLink] {
        &self.provider_index
    }

    /// Indented resolution trace; populated when `debug` is enabled.
    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Projects the last run into the neutral graph payload.
    #[must_use]
    pub fn export(&self) -> GraphExport {
        export::graph_export(self.catalog, &self.edge_map, &self.dep_order)
    }

    /// Builds the in-memory root resource from the feature list. The root
    /// never enters the user catalog.
    fn build_root(&self) -> Result<Resource> {
        let mut config = ResourceConfig::new().desc("build context");
        for feature in &self.feature_names {
            config = config.requires(feature.as_str());
        }
        Resource::from_config(ROOT_RESOURCE, Some(ROOT_SCOPE), config)
    }

    fn walk(&mut self, name: &str, level: usize, root: &Resource) -> Result<()> {
        self.edge_map.insert_empty(name);
        if self.debug {
            self.trace.push(format!("{}|_ resolve: {name}", "  ".repeat(level)));
        }

        let requires: Vec<RequirementLink> = if name == ROOT_RESOURCE {
            root.requires().to_vec()
        } else {
            self.catalog.get_resource(name)?.requires().to_vec()
        };

        for requirement in &requires {
            let ctx = MatchContext {
                providers: &self.provider_index,
                remap_rules: &self.remap_rules,
            };
            let (match_name, providers) =
                self.strategy.match_requirement(requirement, level, &ctx)?;

            let chosen: Vec<String> = providers.iter().map(ToString::to_string).collect();
            tracing::debug!(
                level,
                resource = name,
                requirement = %requirement.rule(),
                effective = %requirement.effective_instance(&self.remap_rules, true)
                    .unwrap_or_else(|| match_name.clone()),
                candidates = self
                    .provider_index
                    .iter()
                    .filter(|p| p.kind == requirement.kind)
                    .count(),
                chosen = ?chosen,
                "requirement matched"
            );
            if self.debug {
                self.trace.push(format!(
                    "{}   {} ({match_name}) -> {}",
                    "  ".repeat(level),
                    requirement.rule(),
                    if chosen.is_empty() {
                        "<none>".to_string()
                    } else {
                        chosen.join(", ")
                    }
                ));
            }

            for provider in providers {
                let owner = provider.owner.clone();
                self.edge_map.push_edge(
                    name,
                    EdgeLink {
                        requirement: requirement.clone(),
                        provider,
                        match_name: match_name.clone(),
                    },
                );
                if !self.edge_map.contains(&owner) {
                    self.walk(&owner, level + 1, root)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("feature_names", &self.feature_names)
            .field("remap_rules", &self.remap_rules)
            .field("debug", &self.debug)
            .field("resources", &self.edge_map.len())
            .finish_non_exhaustive()
    }
}
