//! Object-property dependency maps.
//!
//! A dependency map answers "which concepts of another dimension does this
//! class (or any of its ancestors) point to via property P?". EDAM relies on
//! this inheritance: a specific format need not redeclare `is_format_of`
//! relations already stated on its parent format.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::TaxonomyError;
use crate::source::{RestrictionSource, TaxonomyReasoner};
use crate::taxonomy::Taxonomy;

/// Source class id → inherited relation targets, for one object property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyMap {
    root: String,
    property: String,
    relations: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyMap {
    /// Dimension root the map was built from.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn get(&self, source_id: &str) -> Option<&BTreeSet<String>> {
        self.relations.get(source_id)
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.relations.contains_key(source_id)
    }

    /// Number of source classes carrying at least one relation.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.relations.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain variants in `taxonomy` are children of their owner, so they
    /// inherit the owner's relations. Returns the number of entries added.
    pub fn extend_to_plain_variants(&mut self, taxonomy: &Taxonomy) -> usize {
        let mut added = 0;
        for (_, node) in taxonomy.iter() {
            let Some(plain) = node.plain_variant() else {
                continue;
            };
            let Some(targets) = self.relations.get(node.id()).cloned() else {
                continue;
            };
            let plain_id = taxonomy.node(plain).id().to_string();
            self.relations.entry(plain_id).or_default().extend(targets);
            added += 1;
        }
        added
    }
}

/// Walks one dimension and accumulates relation targets down the hierarchy.
pub struct DependencyMapBuilder<'a, R: ?Sized, S: ?Sized> {
    reasoner: &'a R,
    restrictions: &'a S,
}

struct Walk<'p> {
    property: &'p str,
    relations: BTreeMap<String, BTreeSet<String>>,
    visited: HashSet<String>,
    path: Vec<String>,
}

impl<'a, R, S> DependencyMapBuilder<'a, R, S>
where
    R: TaxonomyReasoner + ?Sized,
    S: RestrictionSource + ?Sized,
{
    pub fn new(reasoner: &'a R, restrictions: &'a S) -> Self {
        Self {
            reasoner,
            restrictions,
        }
    }

    pub fn build(&self, root_id: &str, property_id: &str) -> Result<DependencyMap, TaxonomyError> {
        if !self.reasoner.contains_class(root_id) {
            return Err(TaxonomyError::UnknownDimensionRoot(root_id.to_string()));
        }

        let mut walk = Walk {
            property: property_id,
            relations: BTreeMap::new(),
            visited: HashSet::new(),
            path: Vec::new(),
        };
        self.explore(root_id, &BTreeSet::new(), &mut walk);

        tracing::debug!(
            root = root_id,
            property = property_id,
            sources = walk.relations.len(),
            "dependency map built"
        );
        Ok(DependencyMap {
            root: root_id.to_string(),
            property: property_id.to_string(),
            relations: walk.relations,
        })
    }

    fn explore(&self, class_id: &str, inherited: &BTreeSet<String>, walk: &mut Walk<'_>) {
        let mut effective = match self.restrictions.relation_targets(class_id, walk.property) {
            Ok(targets) => targets,
            Err(err) => {
                tracing::warn!(
                    class = class_id,
                    property = walk.property,
                    error = %err,
                    "restrictions unreadable, treating class as unrelated"
                );
                BTreeSet::new()
            }
        };
        effective.extend(inherited.iter().cloned());

        // A class reached again (DAG) only needs another pass when it brings
        // relations its subtree has not seen yet.
        if !walk.visited.insert(class_id.to_string()) {
            let known = walk.relations.get(class_id);
            let nothing_new = match known {
                Some(known) => effective.is_subset(known),
                None => effective.is_empty(),
            };
            if nothing_new {
                return;
            }
        }

        if !effective.is_empty() {
            walk.relations
                .entry(class_id.to_string())
                .or_default()
                .extend(effective.iter().cloned());
        }

        walk.path.push(class_id.to_string());
        for sub in self.reasoner.direct_subclasses(class_id) {
            if !self.reasoner.is_satisfiable(&sub) {
                continue;
            }
            if walk.path.contains(&sub) {
                tracing::warn!(
                    class = class_id,
                    subclass = sub.as_str(),
                    "cyclic subclass edge ignored"
                );
                continue;
            }
            self.explore(&sub, &effective, walk);
        }
        walk.path.pop();
    }
}
