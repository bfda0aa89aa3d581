//! DocBook synopsis elements.
//!
//! With extensions enabled, every declaration documented on a reference page
//! is also described by the matching DocBook synopsis element
//! (`classsynopsis`, `methodsynopsis`, `fieldsynopsis`, ...). Metadata that
//! DocBook has no element for goes into `synopsisinfo` with a `role`.

use dbk_model::{
    Access, FunctionInfo, Metaness, Node, NodeId, NodeKind, Status, ThreadSafeness, Virtualness,
};

use crate::document::Document;
use crate::synopsis::comma;

/// Synopsis element describing `node`, or `None` when it has none.
fn synopsis_tag(node: &Node) -> Option<&'static str> {
    let tag = match node.kind {
        NodeKind::Class
        | NodeKind::Struct
        | NodeKind::Union
        | NodeKind::QmlType
        | NodeKind::QmlBasicType => "classsynopsis",
        NodeKind::Namespace | NodeKind::HeaderFile => "packagesynopsis",
        NodeKind::Enum => "enumsynopsis",
        NodeKind::Typedef | NodeKind::TypeAlias => "typedefsynopsis",
        NodeKind::Function => match node.function().map(|info| info.metaness) {
            Some(Metaness::Ctor | Metaness::CopyCtor | Metaness::MoveCtor) => {
                "constructorsynopsis"
            }
            Some(Metaness::Dtor) => "destructorsynopsis",
            _ => "methodsynopsis",
        },
        NodeKind::QmlSignal | NodeKind::QmlSignalHandler | NodeKind::QmlMethod => {
            "methodsynopsis"
        }
        NodeKind::Property | NodeKind::Variable | NodeKind::QmlProperty => "fieldsynopsis",
        NodeKind::Page
        | NodeKind::ExternalPage
        | NodeKind::Example
        | NodeKind::Group
        | NodeKind::Module
        | NodeKind::QmlModule
        | NodeKind::SharedComment => return None,
    };
    Some(tag)
}

fn metaness_name(metaness: Metaness) -> &'static str {
    match metaness {
        Metaness::Plain => "plain",
        Metaness::Signal => "signal",
        Metaness::Slot => "slot",
        Metaness::Ctor => "constructor",
        Metaness::CopyCtor => "copy-constructor",
        Metaness::MoveCtor => "move-constructor",
        Metaness::Dtor => "destructor",
        Metaness::CopyAssign => "copy-assign",
        Metaness::MoveAssign => "move-assign",
        Metaness::MacroWithParams => "macrowithparams",
        Metaness::MacroWithoutParams => "macrowithoutparams",
    }
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Active => "active",
        Status::Preliminary => "preliminary",
        Status::Deprecated => "deprecated",
        Status::Obsolete => "obsolete",
        Status::Internal => "internal",
    }
}

fn thread_safeness_name(safeness: ThreadSafeness) -> &'static str {
    match safeness {
        ThreadSafeness::Unspecified => "unspecified",
        ThreadSafeness::NonReentrant => "non-reentrant",
        ThreadSafeness::Reentrant => "reentrant",
        ThreadSafeness::ThreadSafe => "thread safe",
    }
}

/// Full declaration of a function without default values.
pub(crate) fn function_signature(name: &str, function: &FunctionInfo) -> String {
    let mut signature = String::new();
    if !function.return_type.is_empty() {
        signature.push_str(&function.return_type);
        signature.push(' ');
    }
    signature.push_str(name);
    if function.metaness != Metaness::MacroWithoutParams {
        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|parameter| {
                let data_type = parameter.data_type.as_str();
                if parameter.name.is_empty() {
                    data_type.to_owned()
                } else if data_type.ends_with(['*', '&', ' ']) {
                    format!("{data_type}{}", parameter.name)
                } else {
                    format!("{data_type} {}", parameter.name)
                }
            })
            .collect();
        signature.push('(');
        signature.push_str(&parameters.join(", "));
        signature.push(')');
        if function.is_macro() {
            return signature;
        }
    }
    if function.is_const {
        signature.push_str(" const");
    }
    if function.is_ref {
        signature.push_str(" &");
    } else if function.is_rvalue_ref {
        signature.push_str(" &&");
    }
    signature
}

impl Document<'_> {
    /// Write the DocBook synopsis element of `node`.
    ///
    /// Does nothing unless extensions are enabled or when the node kind has
    /// no synopsis element.
    pub(crate) fn render_db_synopsis(&mut self, node: NodeId) {
        if !self.ctx.config.use_extensions {
            return;
        }
        let model = self.ctx.model;
        let member = model.node(node);
        let Some(tag) = synopsis_tag(member) else {
            return;
        };

        self.writer.start_element(tag);
        self.newline();
        self.render_synopsis_declaration(node, member);

        if !member.kind.is_page_like() {
            let access = match member.access {
                Access::Public => "public",
                Access::Protected => "protected",
                Access::Private => "private",
            };
            self.synopsis_info("access", access);
        }
        if self.is_abstract(node) {
            self.synopsis_info("abstract", "true");
        }
        self.synopsis_info("status", status_name(member.status));

        if member.kind.is_aggregate() {
            self.render_aggregate_info(node, member);
        }
        if member.kind == NodeKind::QmlType {
            self.render_qml_type_info(node, member);
        }

        self.synopsis_info("threadsafeness", thread_safeness_name(member.thread_safeness));
        if let Some(module) = &member.module {
            self.synopsis_info("module", module);
        }
        let groups = self.group_names(node);
        if !groups.is_empty() && (member.kind.is_class_like() || member.kind == NodeKind::QmlType) {
            self.synopsis_info("groups", &groups.join(","));
        }

        if let Some(property) = member.property() {
            let accessors = [
                ("getter", &property.getters),
                ("setter", &property.setters),
                ("resetter", &property.resetters),
                ("notifier", &property.notifiers),
            ];
            for (role, names) in accessors {
                for name in names {
                    self.synopsis_info(role, name);
                }
            }
        }

        self.writer.end_element_named(tag);
        self.newline();

        if let Some(flags) = member.enumeration().and_then(|info| info.flags) {
            self.writer.start_element("typedefsynopsis");
            self.newline();
            self.writer
                .text_element("typedefname", &model.qualified_name(flags));
            self.newline();
            self.writer.end_element_named("typedefsynopsis");
            self.newline();
        }
    }

    /// Name, types and parameters: the part of a synopsis DocBook models.
    fn render_synopsis_declaration(&mut self, node: NodeId, member: &Node) {
        match member.kind {
            NodeKind::Class
            | NodeKind::Struct
            | NodeKind::Union
            | NodeKind::QmlType
            | NodeKind::QmlBasicType => {
                self.writer.start_element("ooclass");
                self.writer
                    .text_element("classname", crate::synopsis::display_name(member));
                self.writer.end_element_named("ooclass");
                self.newline();
            }
            NodeKind::Namespace | NodeKind::HeaderFile => {
                self.text_line("package", &member.name);
            }
            NodeKind::Enum => {
                self.text_line("enumname", &member.name);
                let items = member.enumeration().map(|info| info.items.as_slice());
                for item in items.unwrap_or_default() {
                    self.writer.start_element("enumitem");
                    self.newline();
                    self.text_line("enumidentifier", &item.name);
                    if !item.value.is_empty() {
                        self.text_line("enumvalue", &item.value);
                    }
                    self.writer.end_element_named("enumitem");
                    self.newline();
                }
            }
            NodeKind::Typedef | NodeKind::TypeAlias => {
                self.text_line("typedefname", &member.name);
            }
            NodeKind::Property => {
                self.text_line("modifier", "(Qt property)");
                let data_type = member.property().map_or("", |info| info.data_type.as_str());
                self.text_line("type", data_type);
                self.text_line("varname", &member.name);
            }
            NodeKind::Variable => {
                let variable = member.variable();
                if variable.is_some_and(|info| info.is_static) {
                    self.text_line("modifier", "static");
                }
                let data_type = variable
                    .map(|info| format!("{}{}", info.left_type, info.right_type))
                    .unwrap_or_default();
                self.text_line("type", &data_type);
                self.text_line("varname", &member.name);
            }
            NodeKind::QmlProperty => {
                let info = member.property();
                let attached = info.is_some_and(|info| info.is_attached);
                let name = match member.parent {
                    Some(parent) if attached => {
                        format!("{}.{}", self.ctx.model.node(parent).name, member.name)
                    }
                    _ => member.name.clone(),
                };
                self.text_line("type", info.map_or("", |info| info.data_type.as_str()));
                self.text_line("varname", &name);
                if attached {
                    self.text_line("modifier", "attached");
                }
                if info.is_some_and(|info| info.is_read_only) {
                    self.text_line("modifier", "[read-only]");
                } else {
                    self.text_line("modifier", "writable");
                }
                if info.is_some_and(|info| info.is_default) {
                    self.text_line("modifier", "[default]");
                }
            }
            _ => match member.function() {
                Some(function) => self.render_method_declaration(node, member, function),
                None => {
                    self.warn(
                        node,
                        format!("Unexpected node type in synopsis: {}", member.kind.type_word()),
                    );
                }
            },
        }
    }

    fn render_method_declaration(&mut self, node: NodeId, member: &Node, function: &FunctionInfo) {
        if function.virtualness != Virtualness::NonVirtual {
            self.text_line("modifier", "virtual");
        }
        if function.is_const {
            self.text_line("modifier", "const");
        }
        if function.is_static {
            self.text_line("modifier", "static");
        }
        if !function.is_macro() && !function.is_special_member() {
            if function.return_type.is_empty() || function.return_type == "void" {
                self.writer.empty_element("void");
                self.newline();
            } else {
                self.text_line("type", &function.return_type);
            }
        }
        self.text_line("methodname", &member.name);

        if function.overload_number > 1 {
            self.text_line("modifier", "overload");
        }
        if function.is_default {
            self.text_line("modifier", "default");
        }
        if function.is_final {
            self.text_line("modifier", "final");
        }
        if function.is_override {
            self.text_line("modifier", "override");
        }

        if !function.is_macro() && function.parameters.is_empty() {
            self.writer.empty_element("void");
            self.newline();
        }
        for parameter in &function.parameters {
            self.writer.start_element("methodparam");
            self.newline();
            self.text_line("type", &parameter.data_type);
            self.text_line("parameter", &parameter.name);
            if !parameter.default_value.is_empty() {
                self.text_line("initializer", &parameter.default_value);
            }
            self.writer.end_element_named("methodparam");
            self.newline();
        }

        self.synopsis_info("meta", metaness_name(function.metaness));
        if function.overload_number > 1 {
            self.synopsis_info("overload-number", &function.overload_number.to_string());
        }
        if function.is_ref {
            self.synopsis_info("refness", "1");
        } else if function.is_rvalue_ref {
            self.synopsis_info("refness", "2");
        }
        let properties = self.associated_properties(node);
        if !properties.is_empty() {
            self.synopsis_info("associated-property", &properties.join(","));
        }

        let mut signature = function_signature(&member.name, function);
        if function.is_final {
            signature.push_str(" final");
        }
        if function.is_override {
            signature.push_str(" override");
        }
        if function.virtualness == Virtualness::PureVirtual {
            signature.push_str(" = 0");
        } else if function.is_default {
            signature.push_str(" = default");
        }
        self.synopsis_info("signature", &signature);
    }

    fn render_aggregate_info(&mut self, node: NodeId, member: &Node) {
        let model = self.ctx.model;
        if let Some(include) = member.class().and_then(|info| info.include_file.as_deref()) {
            self.synopsis_info("headers", include);
        }
        if let Some(since) = &member.since {
            let since = self.format_since(since);
            self.synopsis_info("since", &since);
        }
        if !member.kind.is_class_like() {
            return;
        }

        if let Some(qml) = self.instantiating_qml_type(node) {
            self.begin_synopsis_info("instantiatedBy");
            let href = self.ctx.resolver.link_for_node(qml, Some(node));
            self.write_simple_link(href.as_deref(), crate::synopsis::display_name(model.node(qml)));
            self.end_synopsis_info();
        }

        let bases = self.base_classes(node);
        if !bases.is_empty() {
            self.begin_synopsis_info("inherits");
            self.render_name_list(&bases, node);
            self.end_synopsis_info();
        }

        let derived = model.derived_classes(node);
        if !derived.is_empty() {
            self.begin_synopsis_info("inheritedBy");
            self.render_name_list(&derived, node);
            self.end_synopsis_info();
        }
    }

    fn render_qml_type_info(&mut self, node: NodeId, member: &Node) {
        let model = self.ctx.model;
        let info = member.qml_type();
        if let Some(import) = info.and_then(|info| info.import.as_deref()) {
            self.synopsis_info("import", &format!("import {import}"));
        }
        if let Some(since) = &member.since {
            let since = self.format_since(since);
            self.synopsis_info("since", &since);
        }

        let subtypes = self.qml_subtypes(node);
        if !subtypes.is_empty() {
            self.begin_synopsis_info("inheritedBy");
            self.render_name_list(&subtypes, node);
            self.end_synopsis_info();
        }

        if let Some(base) = self.qml_base(node) {
            self.begin_synopsis_info("inherits");
            let href = self.ctx.resolver.link_for_node(base, Some(node));
            self.write_simple_link(href.as_deref(), crate::synopsis::display_name(model.node(base)));
            self.end_synopsis_info();
        }

        if let Some(class) = self.instantiated_class(node) {
            self.begin_synopsis_info("instantiates");
            let href = self.ctx.resolver.link_for_node(class, Some(node));
            self.write_simple_link(href.as_deref(), &model.node(class).name);
            self.end_synopsis_info();
        }
    }

    /// QML types naming `node` as their base.
    pub(crate) fn qml_subtypes(&self, node: NodeId) -> Vec<NodeId> {
        let model = self.ctx.model;
        let name = &model.node(node).name;
        model
            .nodes_of_kind(&[NodeKind::QmlType])
            .into_iter()
            .filter(|id| {
                model
                    .node(*id)
                    .qml_type()
                    .and_then(|info| info.base.as_deref())
                    == Some(name.as_str())
            })
            .collect()
    }

    /// C++ class instantiated by the QML type `node`, unless it is internal.
    pub(crate) fn instantiated_class(&self, node: NodeId) -> Option<NodeId> {
        let model = self.ctx.model;
        model
            .node(node)
            .qml_type()
            .and_then(|info| info.instantiates.as_deref())
            .and_then(|name| model.find_type(name, node))
            .filter(|class| !model.node(*class).is_internal())
    }

    /// QML type instantiating the C++ class `class`, unless it is internal.
    pub(crate) fn instantiating_qml_type(&self, class: NodeId) -> Option<NodeId> {
        let model = self.ctx.model;
        let class_name = model.qualified_name(class);
        model
            .nodes_of_kind(&[NodeKind::QmlType])
            .into_iter()
            .find(|id| {
                let qml = model.node(*id);
                !qml.is_internal()
                    && qml
                        .qml_type()
                        .and_then(|info| info.instantiates.as_deref())
                        == Some(class_name.as_str())
            })
    }

    /// Direct base classes of `class` found in the model.
    pub(crate) fn base_classes(&self, class: NodeId) -> Vec<NodeId> {
        let model = self.ctx.model;
        model
            .node(class)
            .class()
            .map(|info| {
                info.bases
                    .iter()
                    .filter_map(|base| model.find_type(base, class))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First non-internal QML base type of `node`.
    pub(crate) fn qml_base(&self, node: NodeId) -> Option<NodeId> {
        let model = self.ctx.model;
        let mut current = node;
        // Bounded by the number of nodes to stay finite on cyclic bases.
        for _ in 0..model.node_ids().len() {
            let name = model.node(current).qml_type()?.base.as_deref()?;
            let base = model.find_node(name, Some(NodeKind::QmlType))?;
            if !model.node(base).is_internal() {
                return Some(base);
            }
            current = base;
        }
        None
    }

    /// Linked full names of `nodes`, separated as an English enumeration.
    pub(crate) fn render_name_list(&mut self, nodes: &[NodeId], relative: NodeId) {
        for (index, node) in nodes.iter().enumerate() {
            self.render_full_name(*node, relative);
            self.writer.characters(comma(index, nodes.len()));
        }
    }

    /// Names of the groups listing `node` as a member.
    pub(crate) fn group_names(&self, node: NodeId) -> Vec<String> {
        let model = self.ctx.model;
        model
            .nodes_of_kind(&[NodeKind::Group])
            .into_iter()
            .filter(|group| {
                model
                    .node(*group)
                    .collection()
                    .is_some_and(|info| info.members.contains(&node))
            })
            .map(|group| model.node(group).name.clone())
            .collect()
    }

    /// Sorted names of the properties that use `function` as an accessor.
    pub(crate) fn associated_properties(&self, function: NodeId) -> Vec<String> {
        let model = self.ctx.model;
        let name = &model.node(function).name;
        let Some(parent) = model.parent(function) else {
            return Vec::new();
        };
        let mut names: Vec<String> = model
            .children(parent)
            .iter()
            .map(|id| model.node(*id))
            .filter(|sibling| sibling.kind == NodeKind::Property)
            .filter(|sibling| {
                sibling.property().is_some_and(|info| {
                    info.getters
                        .iter()
                        .chain(&info.setters)
                        .chain(&info.resetters)
                        .chain(&info.notifiers)
                        .any(|accessor| accessor == name)
                })
            })
            .map(|sibling| sibling.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Whether `node` is a class with a pure virtual member function.
    fn is_abstract(&self, node: NodeId) -> bool {
        let model = self.ctx.model;
        model.node(node).kind.is_class_like()
            && model.children(node).iter().any(|child| {
                model
                    .node(*child)
                    .function()
                    .is_some_and(|info| info.virtualness == Virtualness::PureVirtual)
            })
    }

    fn text_line(&mut self, name: &str, text: &str) {
        self.writer.text_element(name, text);
        self.newline();
    }

    fn synopsis_info(&mut self, role: &str, value: &str) {
        self.begin_synopsis_info(role);
        self.writer.characters(value);
        self.end_synopsis_info();
    }

    fn begin_synopsis_info(&mut self, role: &str) {
        self.writer.start_element("synopsisinfo");
        self.writer.attribute("role", role);
    }

    fn end_synopsis_info(&mut self) {
        self.writer.end_element_named("synopsisinfo");
        self.newline();
    }
}

#[cfg(test)]
mod tests {
    use dbk_model::{
        ClassInfo, DocModel, DocTree, EnumInfo, EnumItem, NodeDetails, Parameter, PropertyInfo,
        QmlTypeInfo,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::code::PlainCodeMarker;
    use crate::config::GeneratorConfig;
    use crate::document::RenderContext;
    use crate::resolver::LinkResolver;
    use crate::writer::check_well_formed;

    fn synopsis(tree: &DocTree, config: &GeneratorConfig, node: NodeId) -> String {
        let ctx = RenderContext {
            model: tree,
            config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(tree),
        };
        let mut doc = Document::open(ctx, node);
        let prefix = doc.output().len();
        doc.render_db_synopsis(node);
        let body = doc.output()[prefix..].to_owned();
        let rendered = doc.close();
        assert!(check_well_formed(&rendered.content).is_ok());
        body
    }

    fn function(return_type: &str, parameters: Vec<Parameter>) -> NodeDetails {
        NodeDetails::Function(FunctionInfo {
            return_type: return_type.to_owned(),
            parameters,
            ..FunctionInfo::default()
        })
    }

    #[test]
    fn test_function_signature() {
        let info = FunctionInfo {
            return_type: "void".to_owned(),
            parameters: vec![
                Parameter::new("int", "w"),
                Parameter::new("const QString &", "text"),
            ],
            is_const: true,
            ..FunctionInfo::default()
        };
        assert_eq!(
            function_signature("resize", &info),
            "void resize(int w, const QString &text) const"
        );
    }

    #[test]
    fn test_method_synopsis() {
        let mut tree = DocTree::new();
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let show = tree.add(
            class,
            Node::new(NodeKind::Function, "setVisible")
                .with_details(function("void", vec![Parameter::new("bool", "visible")])),
        );
        tree.add(
            class,
            Node::new(NodeKind::Property, "visible").with_details(NodeDetails::Property(
                PropertyInfo {
                    data_type: "bool".to_owned(),
                    setters: vec!["setVisible".to_owned()],
                    ..PropertyInfo::default()
                },
            )),
        );
        let config = GeneratorConfig::new("Acme");
        assert_eq!(
            synopsis(&tree, &config, show),
            "<db:methodsynopsis>\n\
             <db:void/>\n\
             <db:methodname>setVisible</db:methodname>\n\
             <db:methodparam>\n\
             <db:type>bool</db:type>\n\
             <db:parameter>visible</db:parameter>\n\
             </db:methodparam>\n\
             <db:synopsisinfo role=\"meta\">plain</db:synopsisinfo>\n\
             <db:synopsisinfo role=\"associated-property\">visible</db:synopsisinfo>\n\
             <db:synopsisinfo role=\"signature\">void setVisible(bool visible)</db:synopsisinfo>\n\
             <db:synopsisinfo role=\"access\">public</db:synopsisinfo>\n\
             <db:synopsisinfo role=\"status\">active</db:synopsisinfo>\n\
             <db:synopsisinfo role=\"threadsafeness\">unspecified</db:synopsisinfo>\n\
             </db:methodsynopsis>\n"
        );
    }

    #[test]
    fn test_disabled_without_extensions() {
        let mut tree = DocTree::new();
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let config = GeneratorConfig::new("Acme").with_extensions(false);
        assert_eq!(synopsis(&tree, &config, class), "");
    }

    #[test]
    fn test_page_has_no_synopsis() {
        let mut tree = DocTree::new();
        let page = tree.add(tree.root(), Node::new(NodeKind::Page, "intro.html"));
        assert_eq!(synopsis(&tree, &GeneratorConfig::default(), page), "");
    }

    #[test]
    fn test_class_synopsis_inheritance() {
        let mut tree = DocTree::new();
        let base = tree.add(tree.root(), Node::new(NodeKind::Class, "Object"));
        let class = tree.add(
            tree.root(),
            Node::new(NodeKind::Class, "Widget")
                .with_since("6.2")
                .with_module("QtGui")
                .with_details(NodeDetails::Class(ClassInfo {
                    include_file: Some("Widget".to_owned()),
                    bases: vec!["Object".to_owned()],
                })),
        );
        tree.add(
            class,
            Node::new(NodeKind::Function, "paint").with_details(NodeDetails::Function(
                FunctionInfo {
                    virtualness: Virtualness::PureVirtual,
                    ..FunctionInfo::default()
                },
            )),
        );
        let config = GeneratorConfig::new("Acme");

        let body = synopsis(&tree, &config, class);
        assert!(body.starts_with(
            "<db:classsynopsis>\n<db:ooclass><db:classname>Widget</db:classname></db:ooclass>\n"
        ));
        assert!(body.contains("<db:synopsisinfo role=\"abstract\">true</db:synopsisinfo>"));
        assert!(body.contains("<db:synopsisinfo role=\"headers\">Widget</db:synopsisinfo>"));
        assert!(body.contains("<db:synopsisinfo role=\"since\">Acme 6.2</db:synopsisinfo>"));
        assert!(body.contains(
            "<db:synopsisinfo role=\"inherits\">\
             <db:link xlink:href=\"object.xml\">Object</db:link></db:synopsisinfo>"
        ));
        assert!(body.contains("<db:synopsisinfo role=\"module\">QtGui</db:synopsisinfo>"));

        let body = synopsis(&tree, &config, base);
        assert!(body.contains(
            "<db:synopsisinfo role=\"inheritedBy\">\
             <db:link xlink:href=\"widget.xml\">Widget</db:link></db:synopsisinfo>"
        ));
    }

    #[test]
    fn test_enum_synopsis_with_flags() {
        let mut tree = DocTree::new();
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "Widget"));
        let flags = tree.add(class, Node::new(NodeKind::Typedef, "Colors"));
        let color = tree.add(
            class,
            Node::new(NodeKind::Enum, "Color").with_details(NodeDetails::Enum(EnumInfo {
                items: vec![EnumItem {
                    name: "Red".to_owned(),
                    value: "0x1".to_owned(),
                    since: None,
                }],
                is_scoped: false,
                flags: Some(flags),
            })),
        );
        let body = synopsis(&tree, &GeneratorConfig::default(), color);
        assert!(body.starts_with(
            "<db:enumsynopsis>\n<db:enumname>Color</db:enumname>\n<db:enumitem>\n\
             <db:enumidentifier>Red</db:enumidentifier>\n<db:enumvalue>0x1</db:enumvalue>\n\
             </db:enumitem>\n"
        ));
        assert!(body.ends_with(
            "</db:enumsynopsis>\n<db:typedefsynopsis>\n\
             <db:typedefname>Widget::Colors</db:typedefname>\n</db:typedefsynopsis>\n"
        ));
    }

    #[test]
    fn test_qml_type_synopsis() {
        let mut tree = DocTree::new();
        let item = tree.add(
            tree.root(),
            Node::new(NodeKind::QmlType, "Item").with_module("QtQuick"),
        );
        let class = tree.add(tree.root(), Node::new(NodeKind::Class, "QQuickRectangle"));
        let rectangle = tree.add(
            tree.root(),
            Node::new(NodeKind::QmlType, "Rectangle")
                .with_module("QtQuick")
                .with_details(NodeDetails::QmlType(QmlTypeInfo {
                    import: Some("QtQuick 2.15".to_owned()),
                    base: Some("Item".to_owned()),
                    instantiates: Some("QQuickRectangle".to_owned()),
                })),
        );
        let config = GeneratorConfig::default();

        let body = synopsis(&tree, &config, rectangle);
        assert!(body.contains("<db:synopsisinfo role=\"import\">import QtQuick 2.15</db:synopsisinfo>"));
        assert!(body.contains(
            "<db:synopsisinfo role=\"inherits\">\
             <db:link xlink:href=\"qml-qtquick-item.xml\">Item</db:link></db:synopsisinfo>"
        ));
        assert!(body.contains(
            "<db:synopsisinfo role=\"instantiates\">\
             <db:link xlink:href=\"qquickrectangle.xml\">QQuickRectangle</db:link></db:synopsisinfo>"
        ));

        let body = synopsis(&tree, &config, item);
        assert!(body.contains("role=\"inheritedBy\""));
        let body = synopsis(&tree, &config, class);
        assert!(body.contains(
            "<db:synopsisinfo role=\"instantiatedBy\">\
             <db:link xlink:href=\"qml-qtquick-rectangle.xml\">Rectangle</db:link></db:synopsisinfo>"
        ));
    }
}
