//! Page emitter and documentation driver.
//!
//! [`DocBookGenerator`] walks the model and renders one document per
//! page-like node. Each page kind has its own layout, built from the header,
//! requisites and member sections in `page` and `members`.

use dbk_model::{Access, DocModel, NodeId, NodeKind};

use crate::code::{CodeMarker, PlainCodeMarker};
use crate::config::GeneratorConfig;
use crate::document::{Document, RenderContext, RenderedDocument};
use crate::resolver::LinkResolver;

/// Renders documentation model nodes to DocBook documents.
pub struct DocBookGenerator<'a> {
    model: &'a dyn DocModel,
    config: &'a GeneratorConfig,
    marker: &'a dyn CodeMarker,
}

impl<'a> DocBookGenerator<'a> {
    pub fn new(model: &'a dyn DocModel, config: &'a GeneratorConfig) -> Self {
        Self {
            model,
            config,
            marker: &PlainCodeMarker,
        }
    }

    /// Use `marker` to turn code snippets into output text.
    #[must_use]
    pub fn with_code_marker(mut self, marker: &'a dyn CodeMarker) -> Self {
        self.marker = marker;
        self
    }

    fn context(&self) -> RenderContext<'a> {
        RenderContext {
            model: self.model,
            config: self.config,
            marker: self.marker,
            resolver: LinkResolver::new(self.model).with_internal(self.config.show_internal),
        }
    }

    /// Open the output document for `node`.
    pub fn open_document(&self, node: NodeId) -> Document<'a> {
        Document::open(self.context(), node)
    }

    /// Flush `document` and return its content and diagnostics.
    pub fn close_document(&self, document: Document<'a>) -> RenderedDocument {
        document.close()
    }

    /// Whether `node` gets a document of its own.
    pub fn should_generate(&self, node: NodeId) -> bool {
        let member = self.model.node(node);
        if member.url.is_some() || member.name.is_empty() {
            return false;
        }
        if member.is_internal() && !self.config.show_internal {
            return false;
        }
        if member.kind == NodeKind::ExternalPage || !member.kind.is_page_like() {
            return false;
        }
        !member
            .collection()
            .is_some_and(|info| info.undocumented)
    }

    /// Render the document for the page-like node `node`.
    pub fn generate_node(&self, node: NodeId) -> RenderedDocument {
        let mut document = self.open_document(node);
        match self.model.node(node).kind {
            NodeKind::Namespace
            | NodeKind::Class
            | NodeKind::Struct
            | NodeKind::Union
            | NodeKind::HeaderFile => document.render_cpp_reference_page(node),
            NodeKind::QmlType => document.render_qml_type_page(node),
            NodeKind::QmlBasicType => document.render_qml_basic_type_page(node),
            NodeKind::Group | NodeKind::Module | NodeKind::QmlModule => {
                document.render_collection_page(node);
            }
            _ => document.render_text_page(node),
        }
        self.close_document(document)
    }

    /// Render every document of the model, in tree order.
    pub fn generate_documentation(&self) -> Vec<RenderedDocument> {
        let mut documents = Vec::new();
        self.generate_children(self.model.root(), &mut documents);
        tracing::debug!(documents = documents.len(), "generated documentation");
        documents
    }

    fn generate_children(&self, parent: NodeId, documents: &mut Vec<RenderedDocument>) {
        for child in self.model.children(parent) {
            let node = self.model.node(*child);
            if node.url.is_some() || (node.is_internal() && !self.config.show_internal) {
                continue;
            }
            if self.should_generate(*child) {
                documents.push(self.generate_node(*child));
            }
            if node.kind.is_page_like() && node.access != Access::Private {
                self.generate_children(*child, documents);
            }
        }
    }
}

impl Document<'_> {
    /// Plain documentation page or example.
    pub(crate) fn render_text_page(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let page = model.node(node);
        self.render_header(page.title(), page.subtitle.as_deref(), node);
        self.render_body(node);
        self.render_also_list(node);
    }

    /// Class, namespace or header file reference page.
    pub(crate) fn render_cpp_reference_page(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let aggregate = model.node(node);
        let full_name = model.qualified_name(node);
        let title = match aggregate.kind {
            NodeKind::Namespace => format!("{full_name} Namespace"),
            NodeKind::Class => format!("{} Class", aggregate.name),
            NodeKind::Struct => format!("{} Struct", aggregate.name),
            NodeKind::Union => format!("{} Union", aggregate.name),
            _ => aggregate.title().to_owned(),
        };
        let subtitle = (aggregate.kind.is_class_like() && full_name != aggregate.name)
            .then_some(full_name.as_str());

        self.render_header(&title, subtitle, node);
        self.render_requisites(node);
        self.render_status(node);
        self.render_db_synopsis(node);

        if aggregate.has_doc() {
            let id = self.register_ref("details");
            self.start_section(&id, "Detailed Description");
            self.render_body(node);
            self.render_also_list(node);
            self.render_maintainer_list(node);
            self.end_section();
        }

        self.render_cpp_member_details(node);
        self.render_obsolete_members(node);
    }

    pub(crate) fn render_qml_type_page(&mut self, node: NodeId) {
        let title = format!("{} QML Type", self.ctx.model.node(node).title());
        self.render_header(&title, None, node);
        self.render_qml_requisites(node);
        self.render_db_synopsis(node);
        self.render_qml_details(node);
        self.render_qml_member_details(node);
        self.render_obsolete_members(node);
    }

    pub(crate) fn render_qml_basic_type_page(&mut self, node: NodeId) {
        let title = format!("{} QML Basic Type", self.ctx.model.node(node).title());
        self.render_header(&title, None, node);
        self.render_qml_details(node);
        self.render_qml_member_details(node);
    }

    fn render_qml_details(&mut self, node: NodeId) {
        if !self.ctx.model.node(node).has_doc() {
            return;
        }
        let id = self.register_ref("details");
        self.start_section(&id, "Detailed Description");
        self.render_body(node);
        self.render_also_list(node);
        self.end_section();
    }

    /// Group, module or QML module page.
    pub(crate) fn render_collection_page(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let collection = model.node(node);
        self.render_header(collection.title(), collection.subtitle.as_deref(), node);

        let is_module = collection.kind == NodeKind::Module;
        if is_module {
            self.render_brief(node);
            self.render_status(node);
            self.render_since(node);
            let module = collection.name.as_str();
            if !module.is_empty() {
                let namespaces: Vec<NodeId> = model
                    .module_members(module, &[NodeKind::Namespace])
                    .into_iter()
                    .filter(|id| self.is_listed(*id))
                    .collect();
                let classes: Vec<NodeId> = model
                    .module_members(module, &[NodeKind::Class, NodeKind::Struct, NodeKind::Union])
                    .into_iter()
                    .filter(|id| self.is_listed(*id))
                    .collect();
                for (title, nodes) in [("Namespaces", namespaces), ("Classes", classes)] {
                    if nodes.is_empty() {
                        continue;
                    }
                    let id = self.register_ref(&title.to_lowercase());
                    self.start_section(&id, title);
                    self.render_node_list(&nodes, node, "annotated");
                    self.end_section();
                }
            }
        }

        if collection.has_doc() {
            let id = self.register_ref("details");
            if is_module {
                self.start_section(&id, "Detailed Description");
            } else {
                self.writer.empty_element("anchor");
                self.writer.attribute("xml:id", &id);
                self.newline();
            }
            self.render_body(node);
            self.render_also_list(node);
            if is_module {
                self.end_section();
            }
        }

        if matches!(collection.kind, NodeKind::Group | NodeKind::QmlModule) {
            let members: Vec<NodeId> = model
                .collection_members(node)
                .into_iter()
                .filter(|id| self.is_listed(*id))
                .collect();
            self.render_node_list(&members, node, "annotated");
        }
    }
}
