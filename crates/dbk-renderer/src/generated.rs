//! Lists generated from the model by `\generatelist` and `\annotatedlist`.

use std::collections::{BTreeMap, HashSet};

use dbk_model::{Access, NodeId, NodeKind, Status};

use crate::document::Document;
use crate::synopsis::display_name;

/// `0`-`9`, `a`-`z` and one bucket for everything else.
const COMPACT_BUCKETS: usize = 37;

const CLASS_KINDS: [NodeKind; 3] = [NodeKind::Class, NodeKind::Struct, NodeKind::Union];

/// How entries of a compact list link to their nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompactLink {
    /// Link to the node itself.
    Node,
    /// Entries are nodes with obsolete members; link to their document.
    Document,
}

/// Bucket of a compact list entry, keyed on its first character.
fn bucket(key: &str) -> usize {
    match key.chars().next() {
        Some(c @ '0'..='9') => c as usize - '0' as usize,
        Some(c @ 'a'..='z') => 10 + (c as usize - 'a' as usize),
        _ => COMPACT_BUCKETS - 1,
    }
}

impl Document<'_> {
    /// Handle `AnnotatedList`: the members of the group `group`.
    pub(crate) fn render_annotated_list(&mut self, group: &str, relative: NodeId) {
        let model = self.ctx.model;
        let Some(collection) = model.collection(group, NodeKind::Group) else {
            self.warn(relative, format!("Unknown group '{group}'"));
            return;
        };
        let members: Vec<NodeId> = model
            .collection_members(collection)
            .into_iter()
            .filter(|member| self.is_listed(*member))
            .collect();
        self.render_node_list(&members, relative, group);
    }

    /// Handle `GeneratedList`, whose payload names the list to generate.
    pub(crate) fn render_generated_list(&mut self, selector: &str, relative: NodeId) {
        let model = self.ctx.model;
        tracing::debug!(selector, "generating list");
        match selector {
            "annotatedclasses" => {
                let classes = self.listed_nodes(&CLASS_KINDS);
                self.render_node_list(&classes, relative, selector);
            }
            "namespaces" => {
                let namespaces: Vec<NodeId> = self
                    .listed_nodes(&[NodeKind::Namespace])
                    .into_iter()
                    .filter(|id| !model.node(*id).name.is_empty())
                    .collect();
                self.render_node_list(&namespaces, relative, selector);
            }
            "classes" => {
                let classes = self.listed_nodes(&CLASS_KINDS);
                self.render_compact_list(&classes, relative, "", selector, CompactLink::Node);
            }
            "qmltypes" => {
                let types = self.listed_nodes(&[NodeKind::QmlType]);
                self.render_compact_list(&types, relative, "", selector, CompactLink::Node);
            }
            "qmlbasictypes" => {
                let types = self.listed_nodes(&[NodeKind::QmlBasicType]);
                self.render_compact_list(&types, relative, "", selector, CompactLink::Node);
            }
            "classhierarchy" => self.render_class_hierarchy(relative),
            "obsoleteclasses" => {
                let classes = self.obsolete_nodes(&CLASS_KINDS);
                self.render_compact_list(&classes, relative, "", selector, CompactLink::Node);
            }
            "obsoleteqmltypes" => {
                let types = self.obsolete_nodes(&[NodeKind::QmlType]);
                self.render_compact_list(&types, relative, "", selector, CompactLink::Node);
            }
            "obsoletecppmembers" => {
                let classes = self.with_obsolete_members(&CLASS_KINDS);
                self.render_compact_list(&classes, relative, "", selector, CompactLink::Document);
            }
            "obsoleteqmlmembers" => {
                let types = self.with_obsolete_members(&[NodeKind::QmlType]);
                self.render_compact_list(&types, relative, "", selector, CompactLink::Document);
            }
            "functionindex" => self.render_function_index(relative),
            "overviews" | "cpp-modules" | "qml-modules" => {
                let kind = match selector {
                    "overviews" => NodeKind::Group,
                    "cpp-modules" => NodeKind::Module,
                    _ => NodeKind::QmlModule,
                };
                let collections: Vec<NodeId> = model
                    .nodes_of_kind(&[kind])
                    .into_iter()
                    .filter(|id| model.node(*id).collection().is_none_or(|info| !info.undocumented))
                    .collect();
                self.render_node_list(&collections, relative, selector);
            }
            "related" => {
                let members: Vec<NodeId> = model
                    .collection_members(relative)
                    .into_iter()
                    .filter(|member| self.is_listed(*member))
                    .collect();
                self.render_node_list(&members, relative, selector);
            }
            _ => {
                if let Some((kinds, module)) = selector.split_once("bymodule") {
                    self.render_module_list(kinds.trim(), module.trim(), relative, selector);
                } else if let Some(prefix) = selector.strip_prefix("classes ") {
                    let classes = self.listed_nodes(&CLASS_KINDS);
                    self.render_compact_list(
                        &classes,
                        relative,
                        prefix.trim(),
                        selector,
                        CompactLink::Node,
                    );
                } else if selector.starts_with("examplefiles")
                    || selector.starts_with("exampleimages")
                {
                    tracing::debug!(selector, "example file lists are not generated");
                } else {
                    self.warn(relative, format!("Unknown generated list '{selector}'"));
                }
            }
        }
    }

    /// `<kinds> bymodule <module>`: C++ classes of a module, or the members
    /// of a QML module.
    fn render_module_list(&mut self, kinds: &str, module: &str, relative: NodeId, role: &str) {
        let model = self.ctx.model;
        let members: Vec<NodeId> = if kinds.starts_with("qml") {
            match model.collection(module, NodeKind::QmlModule) {
                Some(collection) => model.collection_members(collection),
                None => model.module_members(module, &[NodeKind::QmlType]),
            }
        } else {
            model.module_members(module, &CLASS_KINDS)
        };
        let members: Vec<NodeId> = members
            .into_iter()
            .filter(|member| self.is_listed(*member))
            .collect();
        self.render_node_list(&members, relative, role);
    }

    /// Whether `node` appears in generated lists.
    pub(crate) fn is_listed(&self, node: NodeId) -> bool {
        let node = self.ctx.model.node(node);
        node.access != Access::Private
            && !node.is_obsolete()
            && (!node.is_internal() || self.ctx.config.show_internal)
    }

    fn listed_nodes(&self, kinds: &[NodeKind]) -> Vec<NodeId> {
        self.ctx
            .model
            .nodes_of_kind(kinds)
            .into_iter()
            .filter(|id| self.is_listed(*id))
            .collect()
    }

    fn obsolete_nodes(&self, kinds: &[NodeKind]) -> Vec<NodeId> {
        let model = self.ctx.model;
        model
            .nodes_of_kind(kinds)
            .into_iter()
            .filter(|id| model.node(*id).status == Status::Obsolete)
            .collect()
    }

    fn with_obsolete_members(&self, kinds: &[NodeKind]) -> Vec<NodeId> {
        let model = self.ctx.model;
        self.listed_nodes(kinds)
            .into_iter()
            .filter(|id| {
                model
                    .children(*id)
                    .iter()
                    .any(|child| model.node(*child).is_obsolete())
            })
            .collect()
    }

    /// A `variablelist` with the full name and brief of each node.
    pub(crate) fn render_node_list(&mut self, nodes: &[NodeId], relative: NodeId, role: &str) {
        if nodes.is_empty() {
            return;
        }
        self.close_open_para();
        self.writer.start_element("variablelist");
        self.writer.attribute("role", role);
        self.newline();
        for node in nodes {
            self.writer.start_element("varlistentry");
            self.newline();
            self.writer.start_element("term");
            self.render_full_name(*node, relative);
            self.writer.end_element_named("term");
            self.newline();
            self.writer.start_element("listitem");
            self.newline();
            let brief = self.ctx.model.node(*node).doc.brief.plain_text();
            self.writer.text_element("para", brief.trim());
            self.newline();
            self.writer.end_element_named("listitem");
            self.newline();
            self.writer.end_element_named("varlistentry");
            self.newline();
        }
        self.writer.end_element_named("variablelist");
        self.newline();
    }

    /// Names grouped under their initial letter, ignoring `common_prefix`.
    fn render_compact_list(
        &mut self,
        nodes: &[NodeId],
        relative: NodeId,
        common_prefix: &str,
        role: &str,
        link: CompactLink,
    ) {
        if nodes.is_empty() {
            return;
        }
        let model = self.ctx.model;

        let mut buckets: Vec<Vec<(String, NodeId)>> = vec![Vec::new(); COMPACT_BUCKETS];
        for node in nodes {
            let name = display_name(model.node(*node));
            let stripped = if !common_prefix.is_empty()
                && name.len() > common_prefix.len()
                && name[..common_prefix.len()].eq_ignore_ascii_case(common_prefix)
            {
                &name[common_prefix.len()..]
            } else {
                name
            };
            let key = stripped.to_lowercase();
            buckets[bucket(&key)].push((key, *node));
        }

        self.close_open_para();
        self.writer.start_element("variablelist");
        self.writer.attribute("role", role);
        self.newline();
        for entries in &mut buckets {
            if entries.is_empty() {
                continue;
            }
            entries.sort();
            let letter: String = entries[0]
                .0
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "_".to_owned());

            self.writer.start_element("varlistentry");
            self.newline();
            self.writer.start_element("term");
            self.writer.start_element("emphasis");
            self.writer.attribute("role", "bold");
            self.writer.characters(&letter);
            self.writer.end_element_named("term");
            self.newline();
            self.writer.start_element("listitem");
            self.newline();
            for (position, (_, node)) in entries.iter().enumerate() {
                let duplicated = entries
                    .iter()
                    .enumerate()
                    .any(|(other, (_, id))| {
                        other != position
                            && model.node(*id).kind.is_qml_type()
                            && display_name(model.node(*id)) == display_name(model.node(*node))
                    });
                self.render_compact_entry(*node, relative, link, duplicated);
            }
            self.writer.end_element_named("listitem");
            self.newline();
            self.writer.end_element_named("varlistentry");
            self.newline();
        }
        self.writer.end_element_named("variablelist");
        self.newline();
    }

    fn render_compact_entry(
        &mut self,
        node: NodeId,
        relative: NodeId,
        link: CompactLink,
        duplicated: bool,
    ) {
        let model = self.ctx.model;
        let entry = model.node(node);
        let href = match link {
            CompactLink::Node => self.ctx.resolver.link_for_node(node, Some(relative)),
            CompactLink::Document => Some(self.ctx.resolver.file_name(node).to_owned()),
        };

        self.writer.start_element("para");
        if entry.kind.is_qml_type() {
            let mut name = display_name(entry).to_owned();
            if duplicated && let Some(module) = &entry.module {
                name = format!("{name}: {module}");
            }
            self.write_simple_link(href.as_deref(), &name);
        } else {
            self.write_simple_link(href.as_deref(), &entry.name);
            let scope = entry
                .parent
                .filter(|parent| !model.node(*parent).name.is_empty())
                .filter(|parent| model.node(*parent).kind.is_aggregate());
            if let Some(scope) = scope {
                self.writer.characters(" (");
                self.render_full_name(scope, relative);
                self.writer.characters(")");
            }
        }
        self.writer.end_element_named("para");
        self.newline();
    }

    /// Nested lists of classes under their base classes.
    fn render_class_hierarchy(&mut self, relative: NodeId) {
        let model = self.ctx.model;
        let classes = self.listed_nodes(&CLASS_KINDS);
        let top_level: Vec<NodeId> = classes
            .iter()
            .copied()
            .filter(|id| {
                model.node(*id).class().is_none_or(|info| {
                    info.bases
                        .iter()
                        .all(|base| model.find_type(base, *id).is_none())
                })
            })
            .collect();
        if top_level.is_empty() {
            return;
        }
        self.close_open_para();
        let mut visited = HashSet::new();
        self.render_hierarchy_level(&top_level, relative, &mut visited);
    }

    fn render_hierarchy_level(
        &mut self,
        classes: &[NodeId],
        relative: NodeId,
        visited: &mut HashSet<NodeId>,
    ) {
        let model = self.ctx.model;
        self.writer.start_element("itemizedlist");
        self.newline();
        for class in classes {
            if !visited.insert(*class) {
                continue;
            }
            self.writer.start_element("listitem");
            self.newline();
            self.writer.start_element("para");
            self.render_full_name(*class, relative);
            self.writer.end_element_named("para");
            self.newline();

            let derived: Vec<NodeId> = model
                .derived_classes(*class)
                .into_iter()
                .filter(|id| self.is_listed(*id) && model.node(*id).has_doc())
                .filter(|id| !visited.contains(id))
                .collect();
            if !derived.is_empty() {
                self.render_hierarchy_level(&derived, relative, visited);
            }
            self.writer.end_element_named("listitem");
            self.newline();
        }
        self.writer.end_element_named("itemizedlist");
        self.newline();
    }

    /// Every member function name with the classes that declare it, behind
    /// a letter index.
    fn render_function_index(&mut self, relative: NodeId) {
        let model = self.ctx.model;
        let mut index: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for function in model.nodes_of_kind(&[NodeKind::Function]) {
            if !self.is_listed(function) {
                continue;
            }
            let Some(parent) = model.parent(function) else {
                continue;
            };
            if !model.node(parent).kind.is_class_like() {
                continue;
            }
            let scopes = index.entry(model.node(function).name.clone()).or_default();
            if !scopes.contains(&parent) {
                scopes.push(parent);
            }
        }

        self.close_open_para();
        self.writer.start_element("simplelist");
        self.writer.attribute("role", "functionIndex");
        self.newline();
        for letter in 'a'..='z' {
            self.writer.start_element("member");
            self.writer.start_element("link");
            self.writer.attribute("xlink:href", &format!("#{letter}"));
            self.writer.characters(&letter.to_ascii_uppercase().to_string());
            self.writer.end_element_named("member");
            self.newline();
        }
        self.writer.end_element_named("simplelist");
        self.newline();

        let mut next_letter = Some('a');
        self.writer.start_element("itemizedlist");
        self.newline();
        for (name, scopes) in index {
            self.writer.start_element("listitem");
            self.newline();
            self.writer.start_element("para");
            self.writer.characters(&format!("{name}:"));
            if let Some(first) = name.chars().next().filter(char::is_ascii_lowercase) {
                while let Some(letter) = next_letter.filter(|letter| *letter <= first) {
                    let id = letter.to_string();
                    self.state.anchors.register(&id);
                    self.writer.empty_element("anchor");
                    self.writer.attribute("xml:id", &id);
                    next_letter = char::from_u32(u32::from(letter) + 1);
                }
            }
            for scope in scopes {
                self.writer.characters(" ");
                self.render_full_name(scope, relative);
            }
            self.writer.end_element_named("para");
            self.newline();
            self.writer.end_element_named("listitem");
            self.newline();
        }
        self.writer.end_element_named("itemizedlist");
        self.newline();
    }

    /// Close a paragraph opened by `ParaLeft` before a block element.
    pub(crate) fn close_open_para(&mut self) {
        if self.state.in_para {
            self.writer.end_element_any(&["para", "blockquote"]);
            self.newline();
            self.state.in_para = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use dbk_model::{
        Atom, AtomKind, ClassInfo, CollectionInfo, DocModel, DocTree, Node, NodeDetails, Text,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::code::PlainCodeMarker;
    use crate::config::GeneratorConfig;
    use crate::document::RenderContext;
    use crate::resolver::LinkResolver;
    use crate::writer::check_well_formed;

    fn brief(text: &str) -> Text {
        Text::from(vec![Atom::with_string(AtomKind::String, text)])
    }

    fn class(name: &str, bases: &[&str]) -> Node {
        Node::new(NodeKind::Class, name)
            .with_brief(brief(&format!("The {name} class.")))
            .with_details(NodeDetails::Class(ClassInfo {
                include_file: None,
                bases: bases.iter().map(|base| (*base).to_owned()).collect(),
            }))
    }

    struct Fixture {
        tree: DocTree,
        page: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tree = DocTree::new();
            let page = tree.add(tree.root(), Node::new(NodeKind::Page, "overview.html"));
            Self { tree, page }
        }

        fn render(&self, kind: AtomKind, selector: &str) -> (String, Vec<String>) {
            let config = GeneratorConfig::new("Acme");
            let ctx = RenderContext {
                model: &self.tree,
                config: &config,
                marker: &PlainCodeMarker,
                resolver: LinkResolver::new(&self.tree),
            };
            let mut doc = Document::open(ctx, self.page);
            let prefix = doc.output().len();
            doc.render_text(&Text::from(vec![Atom::with_string(kind, selector)]), self.page);
            let body = doc.output()[prefix..].to_owned();
            let rendered = doc.close();
            assert!(rendered.balance.is_balanced(), "{:?}", rendered.balance.unbalanced());
            check_well_formed(&rendered.content).unwrap();
            let messages = rendered.diagnostics.into_iter().map(|d| d.message).collect();
            (body, messages)
        }
    }

    #[test]
    fn test_annotated_classes() {
        let mut f = Fixture::new();
        f.tree.add(f.tree.root(), class("Widget", &[]));
        f.tree
            .add(f.tree.root(), class("Hidden", &[]).with_status(Status::Internal));
        let (body, messages) = f.render(AtomKind::GeneratedList, "annotatedclasses");
        assert_eq!(
            body,
            "<db:variablelist role=\"annotatedclasses\">\n\
             <db:varlistentry>\n\
             <db:term><db:link xlink:href=\"widget.xml\">Widget</db:link></db:term>\n\
             <db:listitem>\n\
             <db:para>The Widget class.</db:para>\n\
             </db:listitem>\n\
             </db:varlistentry>\n\
             </db:variablelist>\n"
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let f = Fixture::new();
        let (body, _) = f.render(AtomKind::GeneratedList, "namespaces");
        assert_eq!(body, "");
    }

    #[test]
    fn test_group_members() {
        let mut f = Fixture::new();
        let widget = f.tree.add(f.tree.root(), class("Widget", &[]));
        let group = f.tree.add(
            f.tree.root(),
            Node::new(NodeKind::Group, "painting")
                .with_details(NodeDetails::Collection(CollectionInfo::default())),
        );
        f.tree.add_to_collection(group, widget);
        let (body, _) = f.render(AtomKind::AnnotatedList, "painting");
        assert!(body.starts_with("<db:variablelist role=\"painting\">"));
        assert!(body.contains(">Widget</db:link>"));

        let (body, messages) = f.render(AtomKind::AnnotatedList, "missing");
        assert_eq!(body, "");
        assert_eq!(messages, vec!["Unknown group 'missing'"]);
    }

    #[test]
    fn test_compact_list_buckets() {
        let mut f = Fixture::new();
        let ns = f.tree.add(f.tree.root(), Node::new(NodeKind::Namespace, "Gui"));
        f.tree.add(ns, class("Brush", &[]));
        f.tree.add(f.tree.root(), class("Button", &[]));
        f.tree.add(f.tree.root(), class("Area", &[]));
        let (body, _) = f.render(AtomKind::GeneratedList, "classes");
        assert_eq!(
            body,
            "<db:variablelist role=\"classes\">\n\
             <db:varlistentry>\n\
             <db:term><db:emphasis role=\"bold\">A</db:emphasis></db:term>\n\
             <db:listitem>\n\
             <db:para><db:link xlink:href=\"area.xml\">Area</db:link></db:para>\n\
             </db:listitem>\n\
             </db:varlistentry>\n\
             <db:varlistentry>\n\
             <db:term><db:emphasis role=\"bold\">B</db:emphasis></db:term>\n\
             <db:listitem>\n\
             <db:para><db:link xlink:href=\"gui-brush.xml\">Brush</db:link> \
             (<db:link xlink:href=\"gui.xml\">Gui</db:link>)</db:para>\n\
             <db:para><db:link xlink:href=\"button.xml\">Button</db:link></db:para>\n\
             </db:listitem>\n\
             </db:varlistentry>\n\
             </db:variablelist>\n"
        );
    }

    #[test]
    fn test_compact_list_common_prefix() {
        let mut f = Fixture::new();
        f.tree.add(f.tree.root(), class("QWidget", &[]));
        f.tree.add(f.tree.root(), class("QAction", &[]));
        let (body, _) = f.render(AtomKind::GeneratedList, "classes Q");
        let a = body.find(">A</db:emphasis>").unwrap();
        let w = body.find(">W</db:emphasis>").unwrap();
        assert!(a < w);
    }

    #[test]
    fn test_class_hierarchy_nests_derived() {
        let mut f = Fixture::new();
        f.tree.add(f.tree.root(), class("Object", &[]));
        f.tree.add(f.tree.root(), class("Widget", &["Object"]));
        let (body, _) = f.render(AtomKind::GeneratedList, "classhierarchy");
        assert_eq!(
            body,
            "<db:itemizedlist>\n<db:listitem>\n\
             <db:para><db:link xlink:href=\"object.xml\">Object</db:link></db:para>\n\
             <db:itemizedlist>\n<db:listitem>\n\
             <db:para><db:link xlink:href=\"widget.xml\">Widget</db:link></db:para>\n\
             </db:listitem>\n</db:itemizedlist>\n\
             </db:listitem>\n</db:itemizedlist>\n"
        );
    }

    #[test]
    fn test_obsolete_classes() {
        let mut f = Fixture::new();
        f.tree.add(f.tree.root(), class("Widget", &[]));
        f.tree
            .add(f.tree.root(), class("OldWidget", &[]).with_status(Status::Obsolete));
        let (body, _) = f.render(AtomKind::GeneratedList, "obsoleteclasses");
        assert!(body.contains("OldWidget"));
        assert!(!body.contains(">Widget<"));
    }

    #[test]
    fn test_modules_and_bymodule() {
        let mut f = Fixture::new();
        f.tree.add(
            f.tree.root(),
            Node::new(NodeKind::Module, "QtGui")
                .with_brief(brief("Graphics classes."))
                .with_details(NodeDetails::Collection(CollectionInfo::default())),
        );
        f.tree
            .add(f.tree.root(), class("Widget", &[]).with_module("QtGui"));
        f.tree.add(f.tree.root(), class("Socket", &[]).with_module("QtNetwork"));

        let (body, _) = f.render(AtomKind::GeneratedList, "cpp-modules");
        assert!(body.contains("<db:link xlink:href=\"qtgui-module.xml\">QtGui</db:link>"));
        assert!(body.contains("<db:para>Graphics classes.</db:para>"));

        let (body, _) = f.render(AtomKind::GeneratedList, "classes bymodule QtGui");
        assert!(body.starts_with("<db:variablelist role=\"classes bymodule QtGui\">"));
        assert!(body.contains("Widget"));
        assert!(!body.contains("Socket"));
    }

    #[test]
    fn test_function_index() {
        let mut f = Fixture::new();
        let widget = f.tree.add(f.tree.root(), class("Widget", &[]));
        f.tree.add(widget, Node::new(NodeKind::Function, "show"));
        let (body, _) = f.render(AtomKind::GeneratedList, "functionindex");
        assert!(body.starts_with("<db:simplelist role=\"functionIndex\">\n<db:member>"));
        assert!(body.contains(
            "<db:para>show:<db:anchor xml:id=\"a\"/>"
        ));
        assert!(body.contains("<db:anchor xml:id=\"s\"/> <db:link xlink:href=\"widget.xml\">Widget</db:link></db:para>"));
    }

    #[test]
    fn test_unknown_selector_warns() {
        let f = Fixture::new();
        let (body, messages) = f.render(AtomKind::GeneratedList, "everything");
        assert_eq!(body, "");
        assert_eq!(messages, vec!["Unknown generated list 'everything'"]);
    }

    #[test]
    fn test_bucket() {
        assert_eq!(bucket("3d"), 3);
        assert_eq!(bucket("action"), 10);
        assert_eq!(bucket("zoom"), 35);
        assert_eq!(bucket("_private"), 36);
        assert_eq!(bucket(""), 36);
    }
}
