//! Taxonomy reconstruction.
//!
//! A [`Taxonomy`] is an arena of [`TaxonomyNode`]s addressed by [`NodeId`].
//! One arena can hold several dimension forests (e.g. data types and data
//! formats), mirroring a single type registry shared by all data dimensions.
//! Node ids are unique across the whole arena.
//!
//! [`TaxonomyBuilder`] fills an arena by walking a reasoner's class hierarchy
//! from a dimension root:
//! - unsatisfiable classes (and everything below them) are pruned,
//! - a class reached along several paths is created once and gains one parent
//!   edge per path,
//! - subclass edges that would close a cycle are dropped,
//! - under strict annotation rules every node with children gets a synthetic
//!   `_plain` leaf standing for "the abstract concept itself".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::TaxonomyError;
use crate::iri::derive_label;
use crate::registry::DimensionRegistry;
use crate::source::TaxonomyReasoner;

/// Suffix of the synthesized plain-variant id.
pub const PLAIN_ID_SUFFIX: &str = "_plain";
/// Suffix of the synthesized plain-variant label.
pub const PLAIN_LABEL_SUFFIX: &str = "_p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Root,
    Abstract,
    Leaf,
    ArtificialLeaf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    id: String,
    label: String,
    dimension_root: String,
    kind: NodeKind,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
    plain_variant: Option<NodeId>,
}

impl TaxonomyNode {
    fn new(id: String, label: String, dimension_root: String, kind: NodeKind) -> Self {
        Self {
            id,
            label,
            dimension_root,
            kind,
            children: Vec::new(),
            parents: Vec::new(),
            plain_variant: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Id of the dimension root this node belongs to.
    pub fn dimension_root(&self) -> &str {
        &self.dimension_root
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Back-references to super concepts. Dimension roots have none.
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// The synthesized `_plain` leaf, present only under strict rules.
    pub fn plain_variant(&self) -> Option<NodeId> {
        self.plain_variant
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node counts per kind plus the deepest root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySummary {
    pub nodes: usize,
    pub roots: usize,
    pub abstract_nodes: usize,
    pub leaves: usize,
    pub artificial_leaves: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Taxonomy {
    nodes: Vec<TaxonomyNode>,
    #[serde(skip)]
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TaxonomyNode {
        &self.nodes[id.index()]
    }

    pub fn id_of(&self, class_id: &str) -> Option<NodeId> {
        self.index.get(class_id).copied()
    }

    pub fn get(&self, class_id: &str) -> Option<&TaxonomyNode> {
        self.id_of(class_id).map(|id| self.node(id))
    }

    pub fn contains(&self, class_id: &str) -> bool {
        self.index.contains_key(class_id)
    }

    pub fn label(&self, class_id: &str) -> Option<&str> {
        self.get(class_id).map(TaxonomyNode::label)
    }

    /// Roots of the dimensions built into this arena, in build order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TaxonomyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Nodes belonging to the dimension rooted at `root_id`.
    pub fn dimension<'a>(
        &'a self,
        root_id: &'a str,
    ) -> impl Iterator<Item = (NodeId, &'a TaxonomyNode)> + 'a {
        self.iter()
            .filter(move |(_, node)| node.dimension_root == root_id)
    }

    /// Length of the longest downward path from `id` to a leaf.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut memo = HashMap::new();
        self.depth_memo(id, &mut memo)
    }

    fn depth_memo(&self, id: NodeId, memo: &mut HashMap<NodeId, usize>) -> usize {
        if let Some(depth) = memo.get(&id) {
            return *depth;
        }
        let depth = self
            .node(id)
            .children
            .iter()
            .map(|child| self.depth_memo(*child, memo) + 1)
            .max()
            .unwrap_or(0);
        memo.insert(id, depth);
        depth
    }

    pub fn summary(&self) -> TaxonomySummary {
        let mut summary = TaxonomySummary {
            nodes: self.nodes.len(),
            ..TaxonomySummary::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Root => summary.roots += 1,
                NodeKind::Abstract => summary.abstract_nodes += 1,
                NodeKind::Leaf => summary.leaves += 1,
                NodeKind::ArtificialLeaf => summary.artificial_leaves += 1,
            }
        }
        summary.max_depth = self
            .roots
            .iter()
            .map(|root| self.depth(*root))
            .max()
            .unwrap_or(0);
        summary
    }

    fn insert(&mut self, node: TaxonomyNode) -> Result<NodeId, TaxonomyError> {
        if self.index.contains_key(&node.id) {
            return Err(TaxonomyError::DuplicateNode(node.id));
        }
        Ok(self.push(node))
    }

    /// Caller guarantees `node.id` is not indexed yet.
    fn push(&mut self, node: TaxonomyNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(node.id.clone(), id);
        self.nodes.push(node);
        id
    }

    /// Adds `child` below `parent`; the back-reference is skipped for roots.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes[parent.index()].children.contains(&child) {
            self.nodes[parent.index()].children.push(child);
        }
        let child_node = &mut self.nodes[child.index()];
        if child_node.dimension_root != child_node.id && !child_node.parents.contains(&parent) {
            child_node.parents.push(parent);
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Reconstructs dimension hierarchies from a [`TaxonomyReasoner`].
pub struct TaxonomyBuilder<'a, R: TaxonomyReasoner + ?Sized> {
    reasoner: &'a R,
    dimensions: &'a DimensionRegistry,
    strict: bool,
}

impl<'a, R: TaxonomyReasoner + ?Sized> TaxonomyBuilder<'a, R> {
    pub fn new(reasoner: &'a R, dimensions: &'a DimensionRegistry) -> Self {
        Self {
            reasoner,
            dimensions,
            strict: false,
        }
    }

    /// Synthesize plain-variant leaves below every node with children.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build the dimension rooted at `root_id` into a fresh arena.
    pub fn build(&self, root_id: &str) -> Result<Taxonomy, TaxonomyError> {
        let mut taxonomy = Taxonomy::new();
        self.build_dimension(&mut taxonomy, root_id)?;
        Ok(taxonomy)
    }

    /// Build the dimension rooted at `root_id` into `taxonomy` and return its root.
    ///
    /// Building a root that is already present (e.g. a dimension nested in one
    /// built earlier) returns the existing node.
    pub fn build_dimension(
        &self,
        taxonomy: &mut Taxonomy,
        root_id: &str,
    ) -> Result<NodeId, TaxonomyError> {
        if !self.reasoner.contains_class(root_id) {
            return Err(TaxonomyError::UnknownDimensionRoot(root_id.to_string()));
        }
        if let Some(existing) = taxonomy.id_of(root_id) {
            if !taxonomy.roots.contains(&existing) {
                taxonomy.roots.push(existing);
            }
            return Ok(existing);
        }

        let mut path = HashSet::new();
        let root = self.explore(taxonomy, root_id, None, root_id, &mut path);
        if !taxonomy.roots.contains(&root) {
            taxonomy.roots.push(root);
        }
        tracing::debug!(
            root = root_id,
            nodes = taxonomy.dimension(root_id).count(),
            strict = self.strict,
            "taxonomy dimension built"
        );
        Ok(root)
    }

    fn explore(
        &self,
        taxonomy: &mut Taxonomy,
        class_id: &str,
        parent: Option<NodeId>,
        dimension_root: &str,
        path: &mut HashSet<String>,
    ) -> NodeId {
        if let Some(existing) = taxonomy.id_of(class_id) {
            if let Some(parent) = parent {
                taxonomy.link(parent, existing);
            }
            return existing;
        }

        let is_root = self.dimensions.is_root(class_id) || parent.is_none();
        let (kind, dimension_root) = if is_root {
            (NodeKind::Root, class_id)
        } else {
            (NodeKind::Abstract, dimension_root)
        };
        let label = self
            .reasoner
            .class_label(class_id)
            .unwrap_or_else(|| derive_label(class_id));

        let node = TaxonomyNode::new(
            class_id.to_string(),
            label.clone(),
            dimension_root.to_string(),
            kind,
        );
        let current = taxonomy.push(node);
        if let Some(parent) = parent {
            taxonomy.link(parent, current);
        }

        path.insert(class_id.to_string());
        let subclasses: Vec<String> = self
            .reasoner
            .direct_subclasses(class_id)
            .into_iter()
            .filter(|sub| self.reasoner.is_satisfiable(sub))
            .collect();
        for sub in &subclasses {
            if path.contains(sub) {
                tracing::warn!(
                    class = class_id,
                    subclass = sub.as_str(),
                    "cyclic subclass edge ignored"
                );
                continue;
            }
            self.explore(taxonomy, sub, Some(current), dimension_root, path);
        }
        path.remove(class_id);

        if taxonomy.node(current).children.is_empty() {
            taxonomy.nodes[current.index()].kind = NodeKind::Leaf;
        } else if self.strict {
            self.add_plain_variant(taxonomy, current, &label, dimension_root);
        }
        current
    }

    fn add_plain_variant(
        &self,
        taxonomy: &mut Taxonomy,
        owner: NodeId,
        label: &str,
        dimension_root: &str,
    ) {
        let plain = TaxonomyNode::new(
            format!("{}{PLAIN_ID_SUFFIX}", taxonomy.node(owner).id),
            format!("{label}{PLAIN_LABEL_SUFFIX}"),
            dimension_root.to_string(),
            NodeKind::ArtificialLeaf,
        );
        match taxonomy.insert(plain) {
            Ok(plain) => {
                taxonomy.link(owner, plain);
                taxonomy.nodes[owner.index()].plain_variant = Some(plain);
            }
            Err(err) => {
                tracing::warn!(
                    class = taxonomy.node(owner).id.as_str(),
                    error = %err,
                    "artificial leaf was not created"
                );
            }
        }
    }
}

/// Group node ids by dimension root, in build order.
pub fn nodes_by_dimension(taxonomy: &Taxonomy) -> BTreeMap<&str, Vec<NodeId>> {
    let mut out: BTreeMap<&str, Vec<NodeId>> = BTreeMap::new();
    for (id, node) in taxonomy.iter() {
        out.entry(node.dimension_root()).or_default().push(id);
    }
    out
}
