//! Output file names, member anchors and cross-reference links.

use dbk_model::{Access, DocModel, Node, NodeId, NodeKind};

use crate::anchor::{canonical_title, clean_ref};

/// Extension of every generated document.
pub const FILE_EXTENSION: &str = "xml";

/// A link target resolved to an `xlink:href` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
    pub href: String,
    /// Node the link points at; `None` for external URLs.
    pub node: Option<NodeId>,
}

/// Maps nodes and link targets to file names, anchors and links.
#[derive(Clone, Copy)]
pub struct LinkResolver<'a> {
    model: &'a dyn DocModel,
    show_internal: bool,
}

impl<'a> LinkResolver<'a> {
    pub fn new(model: &'a dyn DocModel) -> Self {
        Self {
            model,
            show_internal: false,
        }
    }

    /// Also link to internal nodes.
    #[must_use]
    pub fn with_internal(mut self, show_internal: bool) -> Self {
        self.show_internal = show_internal;
        self
    }

    /// Base name of the document containing `id`, without extension.
    pub fn file_base(&self, id: NodeId) -> String {
        let node = self.model.node(id);
        let base = match node.kind {
            NodeKind::Page | NodeKind::Example | NodeKind::ExternalPage => node
                .name
                .rsplit_once('.')
                .filter(|(_, ext)| matches!(*ext, "html" | "htm" | "xml"))
                .map_or(node.name.as_str(), |(stem, _)| stem)
                .replace('/', "-"),
            NodeKind::Namespace | NodeKind::Class | NodeKind::Struct | NodeKind::Union => {
                if node.name.is_empty() {
                    "index".to_owned()
                } else {
                    self.model.qualified_name(id).replace("::", "-")
                }
            }
            NodeKind::HeaderFile => node.name.replace('.', "-"),
            NodeKind::QmlType | NodeKind::QmlBasicType => match &node.module {
                Some(module) => format!("qml-{module}-{}", node.name),
                None => format!("qml-{}", node.name),
            },
            NodeKind::Group => node.name.clone(),
            NodeKind::Module => format!("{}-module", node.name),
            NodeKind::QmlModule => format!("{}-qmlmodule", node.name),
            _ => match node.parent {
                Some(parent) => return self.file_base(parent),
                None => node.name.clone(),
            },
        };
        clean_ref(&base.to_lowercase())
    }

    /// File name of the document containing `id`; cached on the node.
    pub fn file_name(&self, id: NodeId) -> &'a str {
        let node: &'a Node = self.model.node(id);
        node.output_file(|| format!("{}.{FILE_EXTENSION}", self.file_base(id)))
    }

    /// Anchor of `id` inside its document; empty for page-like nodes.
    pub fn ref_for_node(&self, id: NodeId) -> String {
        let node = self.model.node(id);
        let name = node.name.as_str();
        let reference = match node.kind {
            NodeKind::Enum => format!("{name}-enum"),
            NodeKind::Typedef | NodeKind::TypeAlias => {
                match node.typedef().and_then(|info| info.associated_enum) {
                    Some(associated) => return self.ref_for_node(associated),
                    None => format!("{name}-typedef"),
                }
            }
            NodeKind::Function => match node.function().map_or(0, |info| info.overload_number) {
                0 | 1 => name.to_owned(),
                overload => format!("{name}-{overload}"),
            },
            NodeKind::Property => format!("{name}-prop"),
            NodeKind::QmlProperty => {
                if node.property().is_some_and(|info| info.is_attached) {
                    format!("{name}-attached-prop")
                } else {
                    format!("{name}-prop")
                }
            }
            NodeKind::QmlSignal => format!("{name}-signal"),
            NodeKind::QmlSignalHandler => format!("{name}-signal-handler"),
            NodeKind::QmlMethod => format!("{name}-method"),
            NodeKind::Variable => format!("{name}-var"),
            NodeKind::SharedComment => {
                return node
                    .shared_comment()
                    .and_then(|info| info.collective.first())
                    .map(|first| self.ref_for_node(*first))
                    .unwrap_or_default();
            }
            _ => return String::new(),
        };
        clean_ref(&reference)
    }

    /// Whether links to `id` may be generated at all.
    pub fn is_linkable(&self, id: NodeId) -> bool {
        let node = self.model.node(id);
        if node.is_internal() && !self.show_internal {
            return false;
        }
        if node.access == Access::Private && !node.kind.is_page_like() {
            return false;
        }
        node.kind != NodeKind::Namespace || !node.name.is_empty()
    }

    /// Link to `id` as seen from the document of `relative`.
    pub fn link_for_node(&self, id: NodeId, relative: Option<NodeId>) -> Option<String> {
        let node = self.model.node(id);
        if let Some(url) = &node.url {
            return Some(url.clone());
        }
        if !self.is_linkable(id) {
            return None;
        }
        let file = self.file_name(id);
        let reference = self.ref_for_node(id);
        Some(self.join(file, &reference, relative))
    }

    /// Resolve an explicit link target such as `Widget::show()`,
    /// `page.html#usage` or an absolute URL.
    pub fn resolve(&self, target: &str, relative: NodeId) -> Option<ResolvedLink> {
        if is_url(target) {
            return Some(ResolvedLink {
                href: target.to_owned(),
                node: None,
            });
        }
        let found = self.model.find_target(target, relative)?;
        let Some(anchor) = found.anchor else {
            let href = self.link_for_node(found.node, Some(relative))?;
            return Some(ResolvedLink {
                href,
                node: Some(found.node),
            });
        };
        if self.model.node(found.node).url.is_some() || !self.is_linkable(found.node) {
            return None;
        }
        let anchor = if target.contains('#') {
            anchor
        } else {
            canonical_title(&anchor)
        };
        Some(ResolvedLink {
            href: self.join(self.file_name(found.node), &anchor, Some(relative)),
            node: Some(found.node),
        })
    }

    /// Links to obsolete nodes are dropped unless the context is obsolete
    /// itself or is the target's parent.
    pub fn is_suppressed(&self, target: NodeId, relative: NodeId) -> bool {
        let target_node = self.model.node(target);
        target_node.is_obsolete()
            && target_node.parent != Some(relative)
            && !self.model.node(relative).is_obsolete()
    }

    /// `role` for a link to `target`: obsolete targets are marked when the
    /// context has a different status.
    pub fn link_role(&self, target: NodeId, relative: NodeId) -> Option<&'static str> {
        let target_node = self.model.node(target);
        (target_node.is_obsolete() && target_node.status != self.model.node(relative).status)
            .then_some("obsolete")
    }

    fn join(&self, file: &str, anchor: &str, relative: Option<NodeId>) -> String {
        let same_file = relative.is_some_and(|relative| self.file_name(relative) == file);
        match (anchor.is_empty(), same_file) {
            (true, _) => file.to_owned(),
            (false, true) => format!("#{anchor}"),
            (false, false) => format!("{file}#{anchor}"),
        }
    }
}

fn is_url(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}
