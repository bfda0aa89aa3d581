//! In-memory documentation model.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;
use crate::model::{DocModel, TargetMatch};
use crate::node::{Node, NodeDetails, NodeId, NodeKind};

/// Serialized form: a flat node list whose first entry is the root.
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<Node>,
}

/// Arena of nodes with a qualified-name index.
#[derive(Debug)]
pub struct DocTree {
    nodes: Vec<Node>,
    index: HashMap<String, Vec<NodeId>>,
}

impl DocTree {
    /// Create a tree holding only the unnamed root namespace.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: vec![Node::new(NodeKind::Namespace, "")],
            index: HashMap::new(),
        };
        tree.index_node(NodeId(0));
        tree
    }

    /// Parse a tree from JSON.
    ///
    /// Children are rebuilt from the `parent` fields; every referenced id must
    /// exist.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: RawTree = serde_json::from_str(json)?;
        Self::from_nodes(raw.nodes)
    }

    /// Load a tree from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn from_nodes(mut nodes: Vec<Node>) -> Result<Self, ModelError> {
        if nodes.is_empty() {
            return Err(ModelError::Empty);
        }
        if nodes[0].parent.is_some() {
            return Err(ModelError::InvalidNode {
                index: 0,
                message: "root node cannot have a parent".to_owned(),
            });
        }
        let len = nodes.len();
        let check = |index: usize, id: NodeId, what: &str| {
            if id.0 >= len || id.0 == index {
                Err(ModelError::InvalidNode {
                    index,
                    message: format!("{what} {} is out of range", id.0),
                })
            } else {
                Ok(())
            }
        };
        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                check(index, parent, "parent")?;
            } else if index != 0 {
                return Err(ModelError::InvalidNode {
                    index,
                    message: format!("node '{}' has no parent", node.name),
                });
            }
            match &node.details {
                NodeDetails::Collection(info) => {
                    for member in &info.members {
                        check(index, *member, "collection member")?;
                    }
                }
                NodeDetails::SharedComment(info) => {
                    for member in &info.collective {
                        check(index, *member, "shared comment member")?;
                    }
                }
                NodeDetails::Enum(info) => {
                    if let Some(flags) = info.flags {
                        check(index, flags, "flags typedef")?;
                    }
                }
                NodeDetails::Typedef(info) => {
                    if let Some(associated) = info.associated_enum {
                        check(index, associated, "associated enum")?;
                    }
                }
                _ => {}
            }
        }
        check_parent_chains(&nodes)?;

        for node in &mut nodes {
            node.children.clear();
        }
        for index in 1..len {
            if let Some(parent) = nodes[index].parent {
                nodes[parent.0].children.push(NodeId(index));
            }
        }

        let mut tree = Self {
            nodes,
            index: HashMap::new(),
        };
        for index in 0..len {
            tree.index_node(NodeId(index));
        }
        Ok(tree)
    }

    /// Add `node` as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        self.index_node(id);
        id
    }

    /// Record `member` as belonging to the collection `collection`.
    ///
    /// Does nothing when `collection` is not a collection node.
    pub fn add_to_collection(&mut self, collection: NodeId, member: NodeId) {
        if let NodeDetails::Collection(info) = &mut self.nodes[collection.0].details {
            info.members.push(member);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn index_node(&mut self, id: NodeId) {
        let name = self.qualified_name(id);
        self.index.entry(name).or_default().push(id);
    }

    /// Look `name` up in the scope of `relative` and each of its ancestors.
    fn find_in_scope(
        &self,
        name: &str,
        relative: NodeId,
        accept: impl Fn(&Node) -> bool,
    ) -> Option<NodeId> {
        let mut scope = Some(relative);
        while let Some(id) = scope {
            let prefix = self.qualified_name(id);
            let candidate = if prefix.is_empty() || !self.node(id).kind.is_type() {
                name.to_owned()
            } else {
                format!("{prefix}::{name}")
            };
            if let Some(found) = self.lookup(&candidate, &accept) {
                return Some(found);
            }
            scope = self.parent(id);
        }
        self.lookup(name, &accept)
    }

    fn lookup(&self, name: &str, accept: &impl Fn(&Node) -> bool) -> Option<NodeId> {
        self.index
            .get(name)?
            .iter()
            .copied()
            .find(|id| accept(self.node(*id)))
    }

    /// Page, example or collection whose name or title is `name`.
    fn find_page(&self, name: &str) -> Option<NodeId> {
        let with_extension = format!("{name}.html");
        self.nodes.iter().position(|node| {
            (node.kind.is_page_like() && !node.kind.is_aggregate())
                && (node.name == name
                    || node.name == with_extension
                    || node.title.as_deref() == Some(name))
        })
        .map(NodeId)
    }

    /// Node declaring `name` as a `\target` or as a section title.
    fn find_anchor(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| {
                node.doc.targets.iter().any(|target| target == name)
                    || node.doc.body.section_titles().iter().any(|title| title == name)
            })
            .map(NodeId)
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocModel for DocTree {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).map(NodeId).collect()
    }

    fn find_node(&self, qualified_name: &str, kind: Option<NodeKind>) -> Option<NodeId> {
        self.lookup(qualified_name, &|node: &Node| {
            kind.is_none_or(|kind| node.kind == kind)
        })
    }

    fn find_target(&self, target: &str, relative: NodeId) -> Option<TargetMatch> {
        let (base, fragment) = match target.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment.to_owned())),
            None => (target, None),
        };
        if base.is_empty() {
            return Some(TargetMatch {
                node: relative,
                anchor: fragment,
            });
        }

        let symbol = base.strip_suffix("()").unwrap_or(base);
        let found = self
            .find_in_scope(symbol, relative, |node| node.kind != NodeKind::SharedComment)
            .or_else(|| self.find_page(base));
        if let Some(node) = found {
            return Some(TargetMatch {
                node,
                anchor: fragment,
            });
        }

        let node = self.find_anchor(base)?;
        Some(TargetMatch {
            node,
            anchor: Some(base.to_owned()),
        })
    }

    fn find_type(&self, name: &str, relative: NodeId) -> Option<NodeId> {
        self.find_in_scope(name, relative, |node| node.kind.is_type())
    }

    fn collection(&self, name: &str, kind: NodeKind) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.kind == kind && node.name == name)
            .map(NodeId)
    }
}

/// Reject parent chains that do not end at the root.
fn check_parent_chains(nodes: &[Node]) -> Result<(), ModelError> {
    let mut reaches_root = vec![false; nodes.len()];
    reaches_root[0] = true;
    let mut path = Vec::new();
    for start in 1..nodes.len() {
        let mut current = start;
        while !reaches_root[current] {
            if path.contains(&current) {
                return Err(ModelError::InvalidNode {
                    index: start,
                    message: "parent chain forms a cycle".to_owned(),
                });
            }
            path.push(current);
            // Ranges were checked, and only the root lacks a parent.
            current = nodes[current].parent.map_or(0, |parent| parent.0);
        }
        for visited in path.drain(..) {
            reaches_root[visited] = true;
        }
    }
    Ok(())
}
