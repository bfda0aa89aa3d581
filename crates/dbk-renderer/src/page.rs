//! Page furniture: the `info` header, requisites, status notes and the
//! paragraphs that surround a node's documentation body.

use dbk_model::{
    Access, Atom, AtomKind, FunctionInfo, Metaness, NavLink, Node, NodeId, NodeKind, Status,
    ThreadSafeness, Virtualness,
};

use crate::db_synopsis::function_signature;
use crate::document::Document;
use crate::synopsis::display_name;

/// One row of a requisites table.
enum Requisite {
    Text(&'static str, String),
    Names(&'static str, Vec<NodeId>),
    Link(&'static str, NodeId),
}

impl Document<'_> {
    /// Open a `section` with a plain title.
    pub(crate) fn start_section(&mut self, id: &str, title: &str) {
        self.start_section_begin(Some(id));
        self.writer.characters(title);
        self.start_section_end();
    }

    /// Open a `section` and its `title`, leaving the title open for markup.
    pub(crate) fn start_section_begin(&mut self, id: Option<&str>) {
        self.writer.start_element("section");
        if let Some(id) = id {
            self.writer.attribute("xml:id", id);
        }
        self.newline();
        self.writer.start_element("title");
    }

    pub(crate) fn start_section_end(&mut self) {
        self.writer.end_element_named("title");
        self.newline();
    }

    pub(crate) fn end_section(&mut self) {
        self.writer.end_element_named("section");
        self.newline();
    }

    /// Register `name` as a document-unique anchor and return it.
    pub(crate) fn register_ref(&mut self, name: &str) -> String {
        self.state.anchors.unique(name)
    }

    /// Write the `info` block: titles, product metadata, navigation links
    /// and an `abstract`.
    pub(crate) fn render_header(&mut self, title: &str, subtitle: Option<&str>, node: NodeId) {
        let model = self.ctx.model;
        let config = self.ctx.config;
        let member = model.node(node);

        self.writer.start_element("info");
        self.newline();
        self.writer.text_element("title", title);
        self.newline();
        if let Some(subtitle) = subtitle.filter(|subtitle| !subtitle.is_empty()) {
            self.writer.text_element("subtitle", subtitle);
            self.newline();
        }
        if !config.project.is_empty() {
            self.writer.text_element("productname", &config.project);
            self.newline();
        }
        if let Some(version) = config.build_version.as_deref().filter(|v| !v.is_empty()) {
            self.writer.text_element("edition", version);
            self.newline();
        }
        let description = config.description();
        self.writer.text_element("titleabbrev", &description);
        self.newline();

        let navigation = [
            ("prev", member.navigation.previous.as_ref()),
            ("next", member.navigation.next.as_ref()),
            ("start", member.navigation.start.as_ref()),
        ];
        for (role, link) in navigation {
            if let Some(link) = link {
                self.render_navigation_link(role, link, node);
            }
        }

        self.writer.start_element("abstract");
        self.newline();
        let mut generated = self.render_brief(node);
        generated |= self.render_status(node);
        generated |= self.render_since(node);
        generated |= self.render_thread_safeness(node);
        if !generated {
            self.writer.text_element("para", &format!("{description}."));
            self.newline();
        }
        self.writer.end_element_named("abstract");
        self.newline();

        self.writer.end_element_named("info");
        self.newline();
    }

    fn render_navigation_link(&mut self, role: &str, link: &NavLink, node: NodeId) {
        let to = self
            .ctx
            .resolver
            .resolve(&link.target, node)
            .map_or_else(|| link.target.clone(), |resolved| resolved.href);
        self.writer.start_element("extendedlink");
        self.writer.empty_element("link");
        self.writer.attribute("xlink:to", &to);
        self.writer.attribute("xlink:title", role);
        self.writer.attribute("xlink:label", &link.title);
        self.writer.end_element_named("extendedlink");
        self.newline();
    }

    /// Write the brief as a paragraph ending with a period.
    pub(crate) fn render_brief(&mut self, node: NodeId) -> bool {
        let model = self.ctx.model;
        let brief = &model.node(node).doc.brief;
        let Some(last) = brief.atoms().last() else {
            return false;
        };
        let mut brief = brief.clone();
        if !last.string().ends_with('.') {
            brief.push(Atom::with_string(AtomKind::String, "."));
        }
        self.writer.start_element("para");
        self.render_text(&brief, node);
        self.writer.end_element_named("para");
        self.newline();
        true
    }

    /// "This class was introduced in Acme 1.2."
    pub(crate) fn render_since(&mut self, node: NodeId) -> bool {
        let model = self.ctx.model;
        let member = model.node(node);
        let Some(since) = member.since.as_deref().filter(|since| !since.is_empty()) else {
            return false;
        };
        let modified = if member.kind == NodeKind::Enum {
            " or modified"
        } else {
            ""
        };
        let text = format!(
            "This {} was introduced{modified} in {}.",
            member.kind.type_word(),
            self.format_since(since)
        );
        self.writer.text_element("para", &text);
        self.newline();
        true
    }

    /// Write a paragraph describing a non-active status.
    pub(crate) fn render_status(&mut self, node: NodeId) -> bool {
        let model = self.ctx.model;
        let member = model.node(node);
        let word = member.kind.type_word();
        let bold = member.kind.is_aggregate();
        let (sentence, advice) = match member.status {
            Status::Preliminary => {
                self.writer.start_element("para");
                self.writer.start_element("emphasis");
                self.writer.attribute("role", "bold");
                self.writer.characters(&format!(
                    "This {word} is under development and is subject to change."
                ));
                self.writer.end_element_named("emphasis");
                self.writer.end_element_named("para");
                self.newline();
                return true;
            }
            Status::Deprecated => (format!("This {word} is deprecated."), None),
            Status::Obsolete => (
                format!("This {word} is obsolete."),
                Some(
                    " It is provided to keep old source code working. \
                     We strongly advise against using it in new code.",
                ),
            ),
            Status::Active | Status::Internal => return false,
        };

        self.writer.start_element("para");
        if bold {
            self.writer.start_element("emphasis");
            self.writer.attribute("role", "bold");
        }
        self.writer.characters(&sentence);
        if bold {
            self.writer.end_element_named("emphasis");
        }
        if let Some(advice) = advice {
            self.writer.characters(advice);
        }
        self.writer.end_element_named("para");
        self.newline();
        true
    }

    /// Write the reentrancy and thread-safety note of `node`.
    ///
    /// For aggregates, member functions whose level differs from the
    /// aggregate's are listed as exceptions.
    pub(crate) fn render_thread_safeness(&mut self, node: NodeId) -> bool {
        let model = self.ctx.model;
        let member = model.node(node);
        let word = member.kind.type_word();
        let reentrant = self.concept_link("reentrant", node);
        let thread_safe = self.concept_link("thread-safe", node);

        match member.thread_safeness {
            ThreadSafeness::Unspecified => false,
            ThreadSafeness::NonReentrant => {
                self.writer.start_element("warning");
                self.newline();
                self.writer.start_element("para");
                self.writer.characters(&format!("This {word} is not "));
                self.write_simple_link(reentrant.as_deref(), "reentrant");
                self.writer.characters(".");
                self.writer.end_element_named("para");
                self.newline();
                self.writer.end_element_named("warning");
                self.newline();
                true
            }
            safeness => {
                let (href, label) = if safeness == ThreadSafeness::ThreadSafe {
                    (thread_safe.as_deref(), "thread-safe")
                } else {
                    (reentrant.as_deref(), "reentrant")
                };
                self.writer.start_element("note");
                self.newline();
                self.writer.start_element("para");
                if !member.kind.is_aggregate() {
                    self.writer.characters(&format!("This {word} is "));
                    self.write_simple_link(href, label);
                    self.writer.characters(".");
                    self.writer.end_element_named("para");
                    self.newline();
                } else {
                    self.writer
                        .characters(&format!("All functions in this {word} are "));
                    self.write_simple_link(href, label);
                    let exceptions = ThreadSafetyExceptions::collect(self, node);
                    let only_also_thread_safe =
                        safeness == ThreadSafeness::Reentrant && !exceptions.thread_safe.is_empty();
                    if exceptions.is_empty() || only_also_thread_safe {
                        self.writer.characters(".");
                        self.writer.end_element_named("para");
                        self.newline();
                    } else {
                        self.writer.characters(" with the following exceptions:");
                        self.writer.end_element_named("para");
                        self.newline();
                        let not_reentrant = ("not", &reentrant, "reentrant");
                        let groups = if safeness == ThreadSafeness::Reentrant {
                            [
                                (not_reentrant, exceptions.non_reentrant),
                                (("also", &thread_safe, "thread-safe"), exceptions.thread_safe),
                            ]
                        } else {
                            [
                                (("only", &reentrant, "reentrant"), exceptions.reentrant),
                                (not_reentrant, exceptions.non_reentrant),
                            ]
                        };
                        for ((adverb, href, label), nodes) in groups {
                            if nodes.is_empty() {
                                continue;
                            }
                            self.writer.start_element("para");
                            self.writer
                                .characters(&format!("These functions are {adverb} "));
                            self.write_simple_link(href.as_deref(), label);
                            self.writer.characters(":");
                            self.writer.end_element_named("para");
                            self.newline();
                            self.render_signature_list(&nodes);
                        }
                    }
                }
                self.writer.end_element_named("note");
                self.newline();
                true
            }
        }
    }

    /// Link to the page explaining a threading term, if the model has one.
    fn concept_link(&self, term: &str, relative: NodeId) -> Option<String> {
        self.ctx
            .resolver
            .resolve(term, relative)
            .map(|resolved| resolved.href)
    }

    /// Itemized list of linked function signatures.
    fn render_signature_list(&mut self, nodes: &[NodeId]) {
        let model = self.ctx.model;
        self.writer.start_element("itemizedlist");
        self.newline();
        for node in nodes {
            let signature = call_signature(model.node(*node));
            let href = self.ctx.resolver.link_for_node(*node, None);
            self.writer.start_element("listitem");
            self.newline();
            self.writer.start_element("para");
            self.write_simple_link(href.as_deref(), &signature);
            self.writer.end_element_named("para");
            self.newline();
            self.writer.end_element_named("listitem");
            self.newline();
        }
        self.writer.end_element_named("itemizedlist");
        self.newline();
    }

    /// Write the documentation body of `node`.
    ///
    /// Undocumented special member functions get a stock sentence instead.
    pub(crate) fn render_body(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);
        if !member.has_doc() {
            let parent = member.parent.map_or("", |parent| display_name(model.node(parent)));
            if let Some(text) = member
                .function()
                .and_then(|function| default_body(function, parent))
            {
                self.writer.text_element("para", &text);
                self.newline();
            }
            return;
        }

        if let Some(function) = member.function()
            && function.reimplements.is_some()
        {
            self.render_reimplements_clause(node, function);
        }
        self.render_text(&member.doc.body, node);
    }

    /// "Reimplements: Base::f()." for a function overriding a documented one.
    pub(crate) fn render_reimplements_clause(&mut self, node: NodeId, function: &FunctionInfo) {
        let model = self.ctx.model;
        let Some(target) = function.reimplements.as_deref() else {
            return;
        };

        let overridden = model.find_node(target, Some(NodeKind::Function)).filter(|id| {
            let overridden = model.node(*id);
            let parent_private = overridden
                .parent
                .is_some_and(|parent| model.node(parent).access == Access::Private);
            overridden.access != Access::Private && !parent_private && overridden.has_doc()
        });
        if let Some(overridden) = overridden {
            let member = model.node(overridden);
            let scope = member.parent.map_or("", |parent| display_name(model.node(parent)));
            let signature = call_signature(member);
            let href = self.ctx.resolver.link_for_node(overridden, Some(node));
            self.writer.start_element("para");
            self.writer.characters("Reimplements: ");
            self.write_simple_link(href.as_deref(), &format!("{scope}::{signature}"));
            self.writer.characters(".");
            self.writer.end_element_named("para");
            self.newline();
            return;
        }

        let property = model
            .find_node(target, Some(NodeKind::Property))
            .filter(|id| model.node(*id).has_doc());
        if let Some(property) = property {
            let href = self.ctx.resolver.link_for_node(property, Some(node));
            self.writer.start_element("para");
            self.writer
                .characters("Reimplements an access function for property: ");
            self.write_simple_link(href.as_deref(), &model.qualified_name(property));
            self.writer.characters(".");
            self.writer.end_element_named("para");
            self.newline();
        }
    }

    /// "See also" list, one `member` per entry.
    pub(crate) fn render_also_list(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let also = &model.node(node).doc.also;
        if also.is_empty() {
            return;
        }
        self.writer.start_element("para");
        self.writer.text_element("emphasis", "See also ");
        self.newline();
        self.writer.start_element("simplelist");
        self.writer.attribute("type", "vert");
        self.writer.attribute("role", "see-also");
        for entry in also {
            self.writer.start_element("member");
            self.render_text(entry, node);
            self.writer.end_element_named("member");
            self.newline();
        }
        self.writer.end_element_named("simplelist");
        self.newline();
        self.writer.end_element_named("para");
        self.newline();
    }

    pub(crate) fn render_maintainer_list(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let maintainers = &model.node(node).doc.maintainers;
        if maintainers.is_empty() {
            return;
        }
        self.writer.start_element("para");
        self.writer.text_element("emphasis", "Maintained by: ");
        self.newline();
        self.writer.start_element("simplelist");
        self.writer.attribute("type", "vert");
        self.writer.attribute("role", "maintainer");
        for maintainer in maintainers {
            self.writer.text_element("member", maintainer);
            self.newline();
        }
        self.writer.end_element_named("simplelist");
        self.newline();
        self.writer.end_element_named("para");
        self.newline();
    }

    /// Header, since and inheritance table of a C++ aggregate.
    pub(crate) fn render_requisites(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);
        let mut rows = Vec::new();

        if let Some(include) = member.class().and_then(|info| info.include_file.clone()) {
            rows.push(Requisite::Text("Header", include));
        } else if member.kind == NodeKind::HeaderFile {
            rows.push(Requisite::Text("Header", member.name.clone()));
        }
        if let Some(since) = member.since.as_deref().filter(|since| !since.is_empty()) {
            rows.push(Requisite::Text("Since", self.format_since(since)));
        }
        if member.kind.is_class_like() {
            if let Some(qml) = self.instantiating_qml_type(node) {
                rows.push(Requisite::Link("Instantiated By", qml));
            }
            let bases = self.base_classes(node);
            if !bases.is_empty() {
                rows.push(Requisite::Names("Inherits", bases));
            }
            let mut derived: Vec<NodeId> = model
                .derived_classes(node)
                .into_iter()
                .filter(|id| {
                    let class = model.node(*id);
                    class.access == Access::Public
                        && !class.is_internal()
                        && class.has_doc()
                })
                .collect();
            derived.sort_by_key(|id| model.qualified_name(*id).to_lowercase());
            if !derived.is_empty() {
                rows.push(Requisite::Names("Inherited By", derived));
            }
        }
        self.render_requisite_rows(rows, node);
    }

    /// Import, since and inheritance table of a QML type.
    pub(crate) fn render_qml_requisites(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);
        let mut rows = Vec::new();

        let import = member
            .qml_type()
            .and_then(|info| info.import.clone())
            .or_else(|| member.module.clone());
        if let Some(import) = import {
            rows.push(Requisite::Text("Import Statement", format!("import {import}")));
        }
        if let Some(since) = member.since.as_deref().filter(|since| !since.is_empty()) {
            rows.push(Requisite::Text("Since:", self.format_since(since)));
        }
        let subtypes = self.qml_subtypes(node);
        if !subtypes.is_empty() {
            rows.push(Requisite::Names("Inherited By:", subtypes));
        }
        if let Some(base) = self.qml_base(node) {
            rows.push(Requisite::Link("Inherits:", base));
        }
        if let Some(class) = self.instantiated_class(node) {
            rows.push(Requisite::Link("Instantiates:", class));
        }
        self.render_requisite_rows(rows, node);
    }

    fn render_requisite_rows(&mut self, rows: Vec<Requisite>, relative: NodeId) {
        if rows.is_empty() {
            return;
        }
        self.writer.start_element("variablelist");
        self.newline();
        for row in rows {
            let term = match &row {
                Requisite::Text(term, _) | Requisite::Names(term, _) | Requisite::Link(term, _) => {
                    *term
                }
            };
            self.writer.start_element("varlistentry");
            self.newline();
            self.writer.text_element("term", term);
            self.newline();
            self.writer.start_element("listitem");
            self.newline();
            self.writer.start_element("para");
            match row {
                Requisite::Text(_, value) => self.writer.characters(&value),
                Requisite::Names(_, nodes) => self.render_name_list(&nodes, relative),
                Requisite::Link(_, target) => {
                    let href = self.ctx.resolver.link_for_node(target, Some(relative));
                    let name = display_name(self.ctx.model.node(target)).to_owned();
                    self.write_simple_link(href.as_deref(), &name);
                }
            }
            self.writer.end_element_named("para");
            self.newline();
            self.writer.end_element_named("listitem");
            self.newline();
            self.writer.end_element_named("varlistentry");
            self.newline();
        }
        self.writer.end_element_named("variablelist");
        self.newline();
    }
}

/// Member functions of an aggregate whose thread safety differs from it.
#[derive(Default)]
struct ThreadSafetyExceptions {
    reentrant: Vec<NodeId>,
    thread_safe: Vec<NodeId>,
    non_reentrant: Vec<NodeId>,
}

impl ThreadSafetyExceptions {
    fn collect(doc: &Document<'_>, aggregate: NodeId) -> Self {
        let model = doc.ctx.model;
        let level = model.node(aggregate).thread_safeness;
        let mut exceptions = Self::default();
        for child in model.children(aggregate) {
            let member = model.node(*child);
            if member.is_obsolete() || !member.kind.is_function_like() {
                continue;
            }
            if member.thread_safeness == level {
                continue;
            }
            match member.thread_safeness {
                ThreadSafeness::Unspecified => {}
                ThreadSafeness::NonReentrant => exceptions.non_reentrant.push(*child),
                ThreadSafeness::Reentrant => exceptions.reentrant.push(*child),
                ThreadSafeness::ThreadSafe => exceptions.thread_safe.push(*child),
            }
        }
        exceptions
    }

    fn is_empty(&self) -> bool {
        self.reentrant.is_empty() && self.thread_safe.is_empty() && self.non_reentrant.is_empty()
    }
}

/// Signature of a function without its return type.
fn call_signature(member: &Node) -> String {
    match member.function() {
        Some(function) => {
            let function = FunctionInfo {
                return_type: String::new(),
                ..function.clone()
            };
            function_signature(&member.name, &function)
        }
        None => member.name.clone(),
    }
}

/// Stock documentation for an undocumented special member function.
fn default_body(function: &FunctionInfo, class: &str) -> Option<String> {
    let text = match function.metaness {
        Metaness::Dtor => {
            let mut text = format!("Destroys the instance of {class}.");
            if function.virtualness != Virtualness::NonVirtual {
                text.push_str(" The destructor is virtual.");
            }
            text
        }
        Metaness::Ctor => format!("Default constructs an instance of {class}."),
        Metaness::CopyCtor => "Copy constructor.".to_owned(),
        Metaness::MoveCtor => "Move-copy constructor.".to_owned(),
        Metaness::CopyAssign => "Copy-assignment operator.".to_owned(),
        Metaness::MoveAssign => "Move-assignment operator.".to_owned(),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use dbk_model::{ClassInfo, DocModel, DocTree, Navigation, NodeDetails, QmlTypeInfo, Text};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::code::PlainCodeMarker;
    use crate::config::GeneratorConfig;
    use crate::document::RenderContext;
    use crate::resolver::LinkResolver;
    use crate::writer::check_well_formed;

    fn function(metaness: Metaness) -> NodeDetails {
        NodeDetails::Function(FunctionInfo {
            metaness,
            ..FunctionInfo::default()
        })
    }

    fn render(
        tree: &DocTree,
        config: &GeneratorConfig,
        node: NodeId,
        body: impl FnOnce(&mut Document<'_>),
    ) -> String {
        let ctx = RenderContext {
            model: tree,
            config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(tree),
        };
        let mut doc = Document::open(ctx, node);
        let prefix = doc.output().len();
        body(&mut doc);
        let output = doc.output()[prefix..].to_owned();
        let rendered = doc.close();
        assert!(rendered.balance.is_balanced());
        check_well_formed(&rendered.content).unwrap();
        output
    }

    #[test]
    fn test_header_with_brief_and_navigation() {
        let mut tree = DocTree::new();
        tree.add(tree.root(), Node::new(NodeKind::Page, "usage.html"));
        let mut page = Node::new(NodeKind::Page, "intro.html")
            .with_title("Introduction")
            .with_brief(Text::plain("Getting started"));
        page.navigation = Navigation {
            next: Some(NavLink {
                target: "usage.html".to_owned(),
                title: "Usage".to_owned(),
            }),
            ..Navigation::default()
        };
        let page = tree.add(tree.root(), page);
        let config = GeneratorConfig::new("Acme").with_build_version("1.2");

        let output = render(&tree, &config, page, |doc| {
            doc.render_header("Introduction", None, page);
        });
        assert_eq!(
            output,
            "<db:info>\n\
             <db:title>Introduction</db:title>\n\
             <db:productname>Acme</db:productname>\n\
             <db:edition>1.2</db:edition>\n\
             <db:titleabbrev>Acme Reference Documentation</db:titleabbrev>\n\
             <db:extendedlink><db:link xlink:to=\"usage.xml\" xlink:title=\"next\" \
             xlink:label=\"Usage\"/></db:extendedlink>\n\
             <db:abstract>\n\
             <db:para>Getting started.</db:para>\n\
             </db:abstract>\n\
             </db:info>\n"
        );
    }

    #[test]
    fn test_header_abstract_falls_back_to_description() {
        let mut tree = DocTree::new();
        let page = tree.add(tree.root(), Node::new(NodeKind::Page, "empty.html"));
        let config = GeneratorConfig::new("Acme").with_description("Acme API");
        let output = render(&tree, &config, page, |doc| {
            doc.render_header("Empty", Some("Nothing here"), page);
        });
        assert!(output.contains("<db:subtitle>Nothing here</db:subtitle>\n"));
        assert!(output.contains("<db:abstract>\n<db:para>Acme API.</db:para>\n</db:abstract>"));
    }

    #[test]
    fn test_since_and_status() {
        let mut tree = DocTree::new();
        let color = tree.add(
            tree.root(),
            Node::new(NodeKind::Enum, "Color")
                .with_since("5.2")
                .with_status(Status::Deprecated),
        );
        let widget = tree.add(
            tree.root(),
            Node::new(NodeKind::Class, "Widget").with_status(Status::Obsolete),
        );
        let config = GeneratorConfig::new("Acme");
        let output = render(&tree, &config, color, |doc| {
            assert!(doc.render_since(color));
            assert!(doc.render_status(color));
            assert!(doc.render_status(widget));
        });
        assert_eq!(
            output,
            "<db:para>This enum was introduced or modified in Acme 5.2.</db:para>\n\
             <db:para>This enum is deprecated.</db:para>\n\
             <db:para><db:emphasis role=\"bold\">This class is obsolete.</db:emphasis> \
             It is provided to keep old source code working. \
             We strongly advise against using it in new code.</db:para>\n"
        );
    }

    #[test]
    fn test_active_status_writes_nothing() {
        let mut tree = DocTree::new();
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, class, |doc| {
            assert!(!doc.render_status(class));
            assert!(!doc.render_since(class));
            assert!(!doc.render_thread_safeness(class));
        });
        assert_eq!(output, "");
    }

    #[test]
    fn test_thread_safeness_exceptions() {
        let mut tree = DocTree::new();
        let class = tree.add(
            tree.root(),
            Node::new(NodeKind::Class, "Widget").with_thread_safeness(ThreadSafeness::Reentrant),
        );
        tree.add(
            class,
            Node::new(NodeKind::Function, "paint")
                .with_thread_safeness(ThreadSafeness::NonReentrant)
                .with_details(NodeDetails::Function(FunctionInfo {
                    return_type: "void".to_owned(),
                    ..FunctionInfo::default()
                })),
        );
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, class, |doc| {
            assert!(doc.render_thread_safeness(class));
        });
        assert_eq!(
            output,
            "<db:note>\n\
             <db:para>All functions in this class are reentrant with the following exceptions:</db:para>\n\
             <db:para>These functions are not reentrant:</db:para>\n\
             <db:itemizedlist>\n<db:listitem>\n\
             <db:para><db:link xlink:href=\"widget.xml#paint\">paint()</db:link></db:para>\n\
             </db:listitem>\n</db:itemizedlist>\n\
             </db:note>\n"
        );
    }

    #[test]
    fn test_thread_safe_member() {
        let mut tree = DocTree::new();
        let function = tree.add(
            tree.root(),
            Node::new(NodeKind::Function, "qHash")
                .with_thread_safeness(ThreadSafeness::ThreadSafe)
                .with_details(function(Metaness::Plain)),
        );
        tree.add(tree.root(), Node::new(NodeKind::Page, "thread-safe"));
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, function, |doc| {
            doc.render_thread_safeness(function);
        });
        assert!(output.contains("<db:para>This function is "));
        assert!(output.contains(">thread-safe</db:link>.</db:para>"));
    }

    #[test]
    fn test_default_body_for_special_members() {
        let mut tree = DocTree::new();
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let dtor = tree.add(
            class,
            Node::new(NodeKind::Function, "~Widget").with_details(NodeDetails::Function(
                FunctionInfo {
                    metaness: Metaness::Dtor,
                    virtualness: Virtualness::Virtual,
                    ..FunctionInfo::default()
                },
            )),
        );
        let plain = tree.add(
            class,
            Node::new(NodeKind::Function, "show").with_details(function(Metaness::Plain)),
        );
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, class, |doc| {
            doc.render_body(dtor);
            doc.render_body(plain);
        });
        assert_eq!(
            output,
            "<db:para>Destroys the instance of Widget. The destructor is virtual.</db:para>\n"
        );
    }

    #[test]
    fn test_reimplements_clause() {
        let mut tree = DocTree::new();
        let base = tree.add(tree.root(), Node::new(NodeKind::Class, "Base"));
        tree.add(
            base,
            Node::new(NodeKind::Function, "event")
                .with_body(Text::plain("Handles events."))
                .with_details(NodeDetails::Function(FunctionInfo {
                    return_type: "bool".to_owned(),
                    ..FunctionInfo::default()
                })),
        );
        let widget = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let event = tree.add(
            widget,
            Node::new(NodeKind::Function, "event")
                .with_body(Text::plain("Reimplemented."))
                .with_details(NodeDetails::Function(FunctionInfo {
                    return_type: "bool".to_owned(),
                    reimplements: Some("Base::event".to_owned()),
                    ..FunctionInfo::default()
                })),
        );
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, widget, |doc| doc.render_body(event));
        assert_eq!(
            output,
            "<db:para>Reimplements: <db:link xlink:href=\"base.xml#event\">\
             Base::event()</db:link>.</db:para>\n\
             Reimplemented."
        );
    }

    #[test]
    fn test_also_and_maintainers() {
        let mut tree = DocTree::new();
        let mut node = Node::new(NodeKind::Class, "Widget")
            .with_also(vec![Text::plain("Frame"), Text::plain("Label")]);
        node.doc.maintainers = vec!["Jo".to_owned()];
        let class = tree.add(tree.root(), node);
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, class, |doc| {
            doc.render_also_list(class);
            doc.render_maintainer_list(class);
        });
        assert_eq!(
            output,
            "<db:para><db:emphasis>See also </db:emphasis>\n\
             <db:simplelist type=\"vert\" role=\"see-also\">\
             <db:member>Frame</db:member>\n<db:member>Label</db:member>\n\
             </db:simplelist>\n</db:para>\n\
             <db:para><db:emphasis>Maintained by: </db:emphasis>\n\
             <db:simplelist type=\"vert\" role=\"maintainer\">\
             <db:member>Jo</db:member>\n</db:simplelist>\n</db:para>\n"
        );
    }

    #[test]
    fn test_requisites() {
        let mut tree = DocTree::new();
        tree.add(
            tree.root(),
            Node::new(NodeKind::Class, "Object").with_body(Text::plain("Base.")),
        );
        let widget = tree.add(
            tree.root(),
            Node::new(NodeKind::Class, "Widget")
                .with_since("1.0")
                .with_body(Text::plain("A widget."))
                .with_details(NodeDetails::Class(ClassInfo {
                    include_file: Some("Widget".to_owned()),
                    bases: vec!["Object".to_owned()],
                })),
        );
        let config = GeneratorConfig::new("Acme");
        let output = render(&tree, &config, widget, |doc| doc.render_requisites(widget));
        assert_eq!(
            output,
            "<db:variablelist>\n\
             <db:varlistentry>\n<db:term>Header</db:term>\n<db:listitem>\n\
             <db:para>Widget</db:para>\n</db:listitem>\n</db:varlistentry>\n\
             <db:varlistentry>\n<db:term>Since</db:term>\n<db:listitem>\n\
             <db:para>Acme 1.0</db:para>\n</db:listitem>\n</db:varlistentry>\n\
             <db:varlistentry>\n<db:term>Inherits</db:term>\n<db:listitem>\n\
             <db:para><db:link xlink:href=\"object.xml\">Object</db:link></db:para>\n\
             </db:listitem>\n</db:varlistentry>\n\
             </db:variablelist>\n"
        );
    }

    #[test]
    fn test_qml_requisites() {
        let mut tree = DocTree::new();
        tree.add(tree.root(), Node::new(NodeKind::Class, "QQuickItem"));
        let item = tree.add(
            tree.root(),
            Node::new(NodeKind::QmlType, "Item").with_details(NodeDetails::QmlType(QmlTypeInfo {
                import: Some("QtQuick 2.15".to_owned()),
                instantiates: Some("QQuickItem".to_owned()),
                ..QmlTypeInfo::default()
            })),
        );
        tree.add(
            tree.root(),
            Node::new(NodeKind::QmlType, "Rectangle").with_details(NodeDetails::QmlType(
                QmlTypeInfo {
                    base: Some("Item".to_owned()),
                    ..QmlTypeInfo::default()
                },
            )),
        );
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, item, |doc| doc.render_qml_requisites(item));
        assert!(output.contains("<db:term>Import Statement</db:term>"));
        assert!(output.contains("<db:para>import QtQuick 2.15</db:para>"));
        assert!(output.contains("<db:term>Inherited By:</db:term>"));
        assert!(output.contains(">Rectangle</db:link>"));
        assert!(output.contains("<db:term>Instantiates:</db:term>"));
        assert!(output.contains(">QQuickItem</db:link>"));
    }

    #[test]
    fn test_empty_requisites_write_nothing() {
        let mut tree = DocTree::new();
        let ns = tree.add(tree.root(), Node::new(NodeKind::Namespace, "acme"));
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, ns, |doc| doc.render_requisites(ns));
        assert_eq!(output, "");
    }

    #[test]
    fn test_sections_register_anchors() {
        let mut tree = DocTree::new();
        let page = tree.add(tree.root(), Node::new(NodeKind::Page, "intro.html"));
        let config = GeneratorConfig::default();
        let output = render(&tree, &config, page, |doc| {
            let first = doc.register_ref("details");
            let second = doc.register_ref("details");
            assert_eq!(second, "detailsx");
            doc.start_section(&first, "Detailed Description");
            doc.end_section();
        });
        assert_eq!(
            output,
            "<db:section xml:id=\"details\">\n\
             <db:title>Detailed Description</db:title>\n\
             </db:section>\n"
        );
    }
}
