//! Read interface of the documentation model.

use crate::node::{Node, NodeId, NodeKind};

/// A resolved link target: a node and optionally a named place inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetMatch {
    pub node: NodeId,
    /// Section title, `\target` name or explicit fragment inside `node`.
    pub anchor: Option<String>,
}

/// Queries the generator needs from the documentation model.
///
/// Implementations must return ids that are valid for [`node`](Self::node).
pub trait DocModel {
    /// The unnamed root namespace.
    fn root(&self) -> NodeId;

    fn node(&self, id: NodeId) -> &Node;

    /// Every node id, in model order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Find a node by qualified name, optionally restricted to one kind.
    fn find_node(&self, qualified_name: &str, kind: Option<NodeKind>) -> Option<NodeId>;

    /// Resolve a link target written relative to `relative`.
    fn find_target(&self, target: &str, relative: NodeId) -> Option<TargetMatch>;

    /// Resolve a type name used in a declaration of `relative`.
    fn find_type(&self, name: &str, relative: NodeId) -> Option<NodeId>;

    /// Find a group, module or QML module by name.
    fn collection(&self, name: &str, kind: NodeKind) -> Option<NodeId>;

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Name qualified by the enclosing namespaces, classes and QML types.
    fn qualified_name(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut parts = vec![node.name.as_str()];
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.node(parent_id);
            if parent.name.is_empty()
                || !(parent.kind.is_class_like()
                    || parent.kind.is_qml_type()
                    || parent.kind == NodeKind::Namespace)
            {
                break;
            }
            parts.push(parent.name.as_str());
            current = parent.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// All nodes of the given kinds, sorted case-insensitively by qualified name.
    fn nodes_of_kind(&self, kinds: &[NodeKind]) -> Vec<NodeId> {
        let mut ids: Vec<(String, NodeId)> = self
            .node_ids()
            .into_iter()
            .filter(|id| kinds.contains(&self.node(*id).kind))
            .map(|id| (self.qualified_name(id).to_lowercase(), id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Classes listing `class` among their direct bases.
    fn derived_classes(&self, class: NodeId) -> Vec<NodeId> {
        let name = self.qualified_name(class);
        self.nodes_of_kind(&[NodeKind::Class, NodeKind::Struct, NodeKind::Union])
            .into_iter()
            .filter(|id| {
                self.node(*id)
                    .class()
                    .is_some_and(|info| info.bases.iter().any(|base| *base == name))
            })
            .collect()
    }

    /// Members of a collection node, sorted by qualified name.
    fn collection_members(&self, collection: NodeId) -> Vec<NodeId> {
        let Some(info) = self.node(collection).collection() else {
            return Vec::new();
        };
        let mut ids: Vec<(String, NodeId)> = info
            .members
            .iter()
            .map(|id| (self.qualified_name(*id).to_lowercase(), *id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Nodes of `kinds` whose module is `module`.
    fn module_members(&self, module: &str, kinds: &[NodeKind]) -> Vec<NodeId> {
        self.nodes_of_kind(kinds)
            .into_iter()
            .filter(|id| self.node(*id).module.as_deref() == Some(module))
            .collect()
    }

    /// Whether `ancestor` encloses `id`.
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }
}
