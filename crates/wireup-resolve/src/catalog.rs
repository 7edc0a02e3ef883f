//! Insertion-ordered resource catalog and provider index.
//!
//! Ordering is a documented contract: resources iterate in insertion order,
//! force-replacement keeps the original position, and the provider index
//! concatenates each resource's providers in catalog order. Nothing here
//! depends on hash iteration order.

use std::collections::HashMap;

use wireup_common::error::{Result, WireupError};

use crate::link::ProviderLink;
use crate::resource::{Resource, ResourceConfig};

/// Ordered collection of resources, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource built from `config`.
    ///
    /// The `scope` argument overrides the config's scope field. When `name`
    /// already exists, the add fails unless `force` is set, in which case
    /// the resource is replaced in place and keeps its insertion position.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::DuplicateResource`] on a name collision
    /// without `force`, or [`WireupError::MalformedRule`] if any rule in
    /// the config fails the grammar (the resource is not added at all).
    pub fn add_resource(
        &mut self,
        name: &str,
        scope: Option<&str>,
        config: ResourceConfig,
        force: bool,
    ) -> Result<()> {
        let resource = Resource::from_config(name, scope, config)?;

        match self.index.get(name) {
            Some(&pos) if force => {
                tracing::debug!(name, "resource replaced");
                self.resources[pos] = resource;
            }
            Some(_) => {
                return Err(WireupError::DuplicateResource {
                    name: name.to_string(),
                });
            }
            None => {
                tracing::debug!(name, "resource added");
                let _ = self.index.insert(name.to_string(), self.resources.len());
                self.resources.push(resource);
            }
        }
        Ok(())
    }

    /// Adds several resources in iteration order.
    ///
    /// Not atomic: entries added before a failing one remain in the catalog.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Catalog::add_resource`] failure.
    pub fn add_resources<I>(&mut self, resources: I, scope: Option<&str>, force: bool) -> Result<()>
    where
        I: IntoIterator<Item = (String, ResourceConfig)>,
    {
        for (name, config) in resources {
            self.add_resource(&name, scope, config, force)?;
        }
        Ok(())
    }

    /// Looks up a resource by name.
    ///
    /// # Errors
    ///
    /// Returns [`WireupError::UnknownResource`] if the name is absent.
    pub fn get_resource(&self, name: &str) -> Result<&Resource> {
        self.index
            .get(name)
            .map(|&pos| &self.resources[pos])
            .ok_or_else(|| WireupError::UnknownResource {
                name: name.to_string(),
            })
    }

    /// Returns resources in insertion order, filtered by scope if given.
    #[must_use]
    pub fn get_resources(&self, scope: Option<&str>) -> Vec<&Resource> {
        match scope {
            Some(scope) => self
                .resources
                .iter()
                .filter(|r| r.scope() == Some(scope))
                .collect(),
            None => self.resources.iter().collect(),
        }
    }

    /// Returns the distinct scopes in first-seen order.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<&str> = Vec::new();
        for resource in &self.resources {
            if let Some(scope) = resource.scope() {
                if !scopes.contains(&scope) {
                    scopes.push(scope);
                }
            }
        }
        scopes
    }

    /// Whether a resource with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of resources in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterates resources in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    /// Flattens every provider link in the catalog, in catalog order.
    ///
    /// Computed on demand; the resolver snapshots the result once per run.
    #[must_use]
    pub fn provider_links(&self) -> Vec<ProviderLink> {
        self.resources
            .iter()
            .flat_map(|r| r.provides().iter().cloned())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
