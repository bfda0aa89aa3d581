//! Detailed member sections of reference pages.

use std::collections::{BTreeMap, HashSet};

use dbk_model::{Access, Node, NodeId, NodeKind};

use crate::document::Document;
use crate::synopsis::{SynopsisStyle, display_name};

/// Kinds of member sections, in page order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DetailGroup {
    Types,
    Properties,
    Functions,
    Variables,
    Macros,
    QmlProperties,
    QmlAttachedProperties,
    QmlSignals,
    QmlMethods,
}

impl DetailGroup {
    fn of(member: &Node) -> Option<Self> {
        let group = match member.kind {
            NodeKind::Enum
            | NodeKind::Typedef
            | NodeKind::TypeAlias
            | NodeKind::Class
            | NodeKind::Struct
            | NodeKind::Union => Self::Types,
            NodeKind::Property => Self::Properties,
            NodeKind::Function if member.function().is_some_and(|info| info.is_macro()) => {
                Self::Macros
            }
            NodeKind::Function => Self::Functions,
            NodeKind::Variable => Self::Variables,
            NodeKind::QmlProperty if member.property().is_some_and(|info| info.is_attached) => {
                Self::QmlAttachedProperties
            }
            NodeKind::QmlProperty => Self::QmlProperties,
            NodeKind::QmlSignal | NodeKind::QmlSignalHandler => Self::QmlSignals,
            NodeKind::QmlMethod => Self::QmlMethods,
            _ => return None,
        };
        Some(group)
    }

    /// Section title on a page for a node of kind `page`.
    fn title(self, page: NodeKind) -> &'static str {
        let class = page.is_class_like();
        match self {
            Self::Types if class => "Member Type Documentation",
            Self::Types => "Type Documentation",
            Self::Properties | Self::QmlProperties => "Property Documentation",
            Self::Functions if class => "Member Function Documentation",
            Self::Functions => "Function Documentation",
            Self::Variables if class => "Member Variable Documentation",
            Self::Variables => "Variable Documentation",
            Self::Macros => "Macro Documentation",
            Self::QmlAttachedProperties => "Attached Property Documentation",
            Self::QmlSignals => "Signal Documentation",
            Self::QmlMethods => "Method Documentation",
        }
    }
}

/// How a property uses one of its access functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AccessorRole {
    Getter,
    Setter,
    Resetter,
    Notifier,
}

impl AccessorRole {
    fn note(self) -> &'static str {
        match self {
            Self::Getter => "Getter function ",
            Self::Setter => "Setter function ",
            Self::Resetter => "Resetter function ",
            Self::Notifier => "Notifier signal ",
        }
    }
}

impl Document<'_> {
    /// Members of `aggregate` documented in detail, grouped by section.
    ///
    /// With `obsolete` set only obsolete members are returned, otherwise only
    /// current ones. Functions covered by a shared comment are represented
    /// by the comment, and flags typedefs by their enum.
    fn detail_groups(&self, aggregate: NodeId, obsolete: bool) -> BTreeMap<DetailGroup, Vec<NodeId>> {
        let model = self.ctx.model;
        let show_internal = self.ctx.config.show_internal;
        let shared: HashSet<NodeId> = model
            .children(aggregate)
            .iter()
            .filter_map(|child| model.node(*child).shared_comment())
            .flat_map(|info| info.collective.iter().copied())
            .collect();

        let mut members: Vec<NodeId> = model
            .children(aggregate)
            .iter()
            .copied()
            .filter(|child| !shared.contains(child))
            .filter(|child| {
                let member = model.node(*child);
                member.access != Access::Private
                    && (show_internal || !member.is_internal())
                    && member.is_obsolete() == obsolete
                    && !member
                        .typedef()
                        .is_some_and(|info| info.associated_enum.is_some())
                    && (member.has_doc()
                        || member.kind == NodeKind::SharedComment
                        || member
                            .function()
                            .is_some_and(dbk_model::FunctionInfo::is_special_member))
            })
            .collect();
        members.sort_by_key(|id| model.node(*id).name.to_lowercase());

        let mut groups: BTreeMap<DetailGroup, Vec<NodeId>> = BTreeMap::new();
        for id in members {
            let member = model.node(id);
            let representative = match member.shared_comment() {
                Some(info) => match info.collective.first() {
                    Some(first) => model.node(*first),
                    None => continue,
                },
                None => member,
            };
            if let Some(group) = DetailGroup::of(representative) {
                groups.entry(group).or_default().push(id);
            }
        }
        groups
    }

    /// Detailed sections of a C++ class, namespace or header page.
    pub(crate) fn render_cpp_member_details(&mut self, aggregate: NodeId) {
        let model = self.ctx.model;
        let page_kind = model.node(aggregate).kind;
        for (group, members) in self.detail_groups(aggregate, false) {
            let title = group.title(page_kind);
            let id = self.register_ref(&title.to_lowercase());
            self.start_section(&id, title);
            for member in members {
                self.render_cpp_member(member, aggregate);
            }
            self.end_section();
        }
    }

    fn render_cpp_member(&mut self, member: NodeId, aggregate: NodeId) {
        let model = self.ctx.model;
        let node = model.node(member);
        if node.kind.is_class_like() {
            self.start_section_begin(None);
            self.writer
                .characters(&format!("{} ", node.kind.type_word()));
            self.render_full_name(member, aggregate);
            self.start_section_end();
            self.render_brief(member);
            self.end_section();
        } else {
            self.render_detailed_member(member, aggregate);
        }
    }

    /// Detailed sections of a QML type page.
    pub(crate) fn render_qml_member_details(&mut self, qml_type: NodeId) {
        let page_kind = self.ctx.model.node(qml_type).kind;
        for (group, members) in self.detail_groups(qml_type, false) {
            let title = group.title(page_kind);
            let id = self.register_ref(&title.to_lowercase());
            self.start_section(&id, title);
            for member in members {
                self.render_detailed_qml_member(member, qml_type);
            }
            self.end_section();
        }
    }

    /// "Obsolete Members for X" section with the obsolete members of
    /// `aggregate`, grouped like the current ones.
    pub(crate) fn render_obsolete_members(&mut self, aggregate: NodeId) {
        let groups = self.detail_groups(aggregate, true);
        if groups.is_empty() {
            return;
        }
        let model = self.ctx.model;
        let page = model.node(aggregate);
        let name = display_name(page);
        let qml = page.kind.is_qml_type();

        let id = self.register_ref("obsolete");
        self.start_section(&id, &format!("Obsolete Members for {name}"));
        self.writer.start_element("para");
        self.writer.start_element("emphasis");
        self.writer.attribute("role", "bold");
        self.writer.characters(if qml {
            "The following members of QML type "
        } else {
            "The following members of class "
        });
        let href = self.ctx.resolver.link_for_node(aggregate, None);
        self.write_simple_link(href.as_deref(), name);
        self.writer.characters(" are obsolete.");
        self.writer.end_element_named("emphasis");
        self.writer.characters(
            " They are provided to keep old source code working. \
             We strongly advise against using them in new code.",
        );
        self.writer.end_element_named("para");
        self.newline();

        for (group, members) in groups {
            let title = group.title(page.kind);
            let id = self.register_ref(&format!("obsolete-{}", title.to_lowercase()));
            self.start_section(&id, title);
            for member in members {
                if qml {
                    self.render_detailed_qml_member(member, aggregate);
                } else {
                    self.render_cpp_member(member, aggregate);
                }
            }
            self.end_section();
        }
        self.end_section();
    }

    /// Section documenting one C++ member: synopsis title, body, notes and
    /// the "see also" list.
    pub(crate) fn render_detailed_member(&mut self, node: NodeId, relative: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);

        self.writer.start_element("section");
        if let Some(info) = member.shared_comment() {
            for (index, shared) in info.collective.iter().enumerate() {
                let id = self.ctx.resolver.ref_for_node(*shared);
                self.state.anchors.register(&id);
                if index == 0 {
                    self.writer.attribute("xml:id", &id);
                    self.newline();
                    self.writer.start_element("title");
                    self.render_synopsis(*shared, relative, SynopsisStyle::Details);
                    self.writer.end_element_named("title");
                } else {
                    self.writer.start_element("bridgehead");
                    self.writer.attribute("renderas", "sect2");
                    self.writer.attribute("xml:id", &id);
                    self.render_synopsis(*shared, relative, SynopsisStyle::Details);
                    self.writer.end_element_named("bridgehead");
                }
                self.newline();
            }
        } else {
            let id = self.ctx.resolver.ref_for_node(node);
            self.state.anchors.register(&id);
            self.writer.attribute("xml:id", &id);
            self.newline();
            self.writer.start_element("title");
            self.render_synopsis(node, relative, SynopsisStyle::Details);
            self.writer.end_element_named("title");
            self.newline();
            if let Some(flags) = member.enumeration().and_then(|info| info.flags) {
                self.writer.start_element("bridgehead");
                self.writer.attribute("renderas", "sect2");
                self.render_synopsis(flags, relative, SynopsisStyle::Details);
                self.writer.end_element_named("bridgehead");
                self.newline();
            }
        }

        self.render_db_synopsis(node);
        self.render_status(node);
        self.render_body(node);
        self.render_thread_safeness(node);
        self.render_since(node);

        if member.kind == NodeKind::Property {
            self.render_property_accessors(node);
        } else if let Some(function) = member.function() {
            if function.is_private_signal {
                self.render_private_signal_note();
            }
            if function.is_invokable {
                self.render_invokable_note(node);
            }
            self.render_associated_property_notes(node);
        } else if let Some(flags) = member.enumeration().and_then(|info| info.flags) {
            self.render_flags_note(node, flags);
        }

        self.render_also_list(node);
        self.end_section();
    }

    /// Section documenting one QML property, signal or method.
    pub(crate) fn render_detailed_qml_member(&mut self, node: NodeId, relative: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);
        let collective = member
            .shared_comment()
            .map(|info| info.collective.as_slice())
            .unwrap_or_default();
        let is_property_group = !collective.is_empty()
            && collective
                .iter()
                .all(|id| model.node(*id).kind == NodeKind::QmlProperty);

        if is_property_group {
            let first = self.ctx.resolver.ref_for_node(collective[0]);
            let (heading, group_id) = if member.name.is_empty() {
                (model.node(collective[0]).name.clone(), format!("{first}-group"))
            } else {
                (format!("{} group", member.name), format!("{}-group", member.name))
            };
            let id = self.register_ref(&group_id);
            self.start_section(&id, &heading);
            for property in collective {
                let id = self.ctx.resolver.ref_for_node(*property);
                self.state.anchors.register(&id);
                self.writer.start_element("bridgehead");
                self.writer.attribute("renderas", "sect2");
                self.writer.attribute("xml:id", &id);
                self.writer
                    .characters(&qml_property_title(model.node(*property), model.node(relative)));
                self.writer.end_element_named("bridgehead");
                self.newline();
                self.render_db_synopsis(*property);
            }
        } else if member.kind == NodeKind::QmlProperty {
            let id = self.ctx.resolver.ref_for_node(node);
            self.state.anchors.register(&id);
            self.start_section(&id, &qml_property_title(member, model.node(relative)));
            self.render_db_synopsis(node);
        } else if !collective.is_empty() {
            for (index, shared) in collective.iter().enumerate() {
                let id = self.ctx.resolver.ref_for_node(*shared);
                self.state.anchors.register(&id);
                if index == 0 {
                    self.start_section_begin(Some(&id));
                    self.render_qml_member_title(*shared, relative);
                    self.start_section_end();
                } else {
                    self.writer.start_element("bridgehead");
                    self.writer.attribute("renderas", "sect2");
                    self.writer.attribute("xml:id", &id);
                    self.render_qml_member_title(*shared, relative);
                    self.writer.end_element_named("bridgehead");
                    self.newline();
                }
                self.render_db_synopsis(*shared);
            }
        } else {
            let id = self.ctx.resolver.ref_for_node(node);
            self.state.anchors.register(&id);
            self.start_section_begin(Some(&id));
            self.render_synopsis(node, relative, SynopsisStyle::Details);
            self.start_section_end();
            self.render_db_synopsis(node);
        }

        self.render_status(node);
        self.render_body(node);
        self.render_thread_safeness(node);
        self.render_since(node);
        self.render_also_list(node);
        self.end_section();
    }

    fn render_qml_member_title(&mut self, node: NodeId, relative: NodeId) {
        let model = self.ctx.model;
        let member = model.node(node);
        if member.kind == NodeKind::QmlProperty {
            self.writer
                .characters(&qml_property_title(member, model.node(relative)));
        } else {
            self.render_synopsis(node, relative, SynopsisStyle::Details);
        }
    }

    /// Lists of the functions reading, writing, resetting and notifying
    /// the property `node`.
    fn render_property_accessors(&mut self, node: NodeId) {
        let model = self.ctx.model;
        let Some(info) = model.node(node).property() else {
            return;
        };
        let accessors: Vec<NodeId> = [&info.getters, &info.setters, &info.resetters]
            .into_iter()
            .flatten()
            .flat_map(|name| self.sibling_functions(node, name))
            .collect();
        if !accessors.is_empty() {
            self.render_bold_para("Access functions:");
            self.render_section_list(&accessors, node, SynopsisStyle::Accessors);
        }

        let notifiers: Vec<NodeId> = info
            .notifiers
            .iter()
            .flat_map(|name| self.sibling_functions(node, name))
            .collect();
        if !notifiers.is_empty() {
            self.render_bold_para("Notifier signal:");
            self.render_section_list(&notifiers, node, SynopsisStyle::Accessors);
        }
    }

    /// Functions named `name` declared next to `node`.
    fn sibling_functions(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        let model = self.ctx.model;
        let Some(parent) = model.parent(node) else {
            return Vec::new();
        };
        model
            .children(parent)
            .iter()
            .copied()
            .filter(|id| {
                let sibling = model.node(*id);
                sibling.kind.is_function_like() && sibling.name == name
            })
            .collect()
    }

    fn render_bold_para(&mut self, text: &str) {
        self.writer.start_element("para");
        self.writer.start_element("emphasis");
        self.writer.attribute("role", "bold");
        self.writer.characters(text);
        self.writer.end_element_named("emphasis");
        self.writer.end_element_named("para");
        self.newline();
    }

    /// Itemized list of member synopses, followed by the notes that apply
    /// to any of them.
    pub(crate) fn render_section_list(
        &mut self,
        members: &[NodeId],
        relative: NodeId,
        style: SynopsisStyle,
    ) {
        let model = self.ctx.model;
        let visible: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|id| model.node(*id).access != Access::Private)
            .collect();
        if visible.is_empty() {
            return;
        }

        let mut private_signals = false;
        let mut invokable = false;
        self.writer.start_element("itemizedlist");
        self.newline();
        for member in &visible {
            self.writer.start_element("listitem");
            self.newline();
            self.writer.start_element("para");
            self.render_synopsis(*member, relative, style);
            self.writer.end_element_named("para");
            self.newline();
            self.writer.end_element_named("listitem");
            self.newline();
            if let Some(function) = model.node(*member).function() {
                if function.is_private_signal {
                    private_signals = true;
                } else if function.is_invokable {
                    invokable = true;
                }
            }
        }
        self.writer.end_element_named("itemizedlist");
        self.newline();

        if private_signals {
            self.render_private_signal_note();
        }
        if invokable {
            self.render_invokable_note(relative);
        }
    }

    fn render_private_signal_note(&mut self) {
        self.writer.start_element("note");
        self.newline();
        self.writer.text_element(
            "para",
            "This is a private signal. It can be used in signal connections \
             but cannot be emitted by the user.",
        );
        self.newline();
        self.writer.end_element_named("note");
        self.newline();
    }

    fn render_invokable_note(&mut self, relative: NodeId) {
        let href = self
            .ctx
            .resolver
            .resolve("Q_INVOKABLE", relative)
            .map(|resolved| resolved.href);
        self.writer.start_element("note");
        self.newline();
        self.writer.start_element("para");
        self.writer.characters(
            "This function can be invoked via the meta-object system and from QML. See ",
        );
        self.write_simple_link(href.as_deref(), "Q_INVOKABLE");
        self.writer.characters(".");
        self.writer.end_element_named("para");
        self.newline();
        self.writer.end_element_named("note");
        self.newline();
    }

    /// "Getter function for property p." for each property using `function`.
    fn render_associated_property_notes(&mut self, function: NodeId) {
        let model = self.ctx.model;
        let name = &model.node(function).name;
        let Some(parent) = model.parent(function) else {
            return;
        };
        let mut properties: Vec<(NodeId, AccessorRole)> = model
            .children(parent)
            .iter()
            .filter_map(|id| {
                let info = model.node(*id).property()?;
                let role = if info.getters.contains(name) {
                    AccessorRole::Getter
                } else if info.setters.contains(name) {
                    AccessorRole::Setter
                } else if info.resetters.contains(name) {
                    AccessorRole::Resetter
                } else if info.notifiers.contains(name) {
                    AccessorRole::Notifier
                } else {
                    return None;
                };
                (model.node(*id).kind == NodeKind::Property).then_some((*id, role))
            })
            .collect();
        if properties.is_empty() {
            return;
        }
        properties.sort_by(|a, b| model.node(a.0).name.cmp(&model.node(b.0).name));

        self.writer.start_element("note");
        self.newline();
        self.writer.start_element("para");
        for (property, role) in properties {
            self.writer
                .characters(&format!("{}for property ", role.note()));
            let href = self.ctx.resolver.link_for_node(property, None);
            self.write_simple_link(href.as_deref(), &model.node(property).name);
            self.writer.characters(". ");
        }
        self.writer.end_element_named("para");
        self.newline();
        self.writer.end_element_named("note");
        self.newline();
    }

    /// Explain the `QFlags` typedef declared for an enum.
    fn render_flags_note(&mut self, enumeration: NodeId, flags: NodeId) {
        let model = self.ctx.model;
        let enum_name = &model.node(enumeration).name;
        let href = model
            .find_node("QFlags", None)
            .and_then(|qflags| self.ctx.resolver.link_for_node(qflags, None));
        self.writer.start_element("para");
        self.writer.characters(&format!(
            "The {} type is a typedef for ",
            model.node(flags).name
        ));
        self.write_simple_link(href.as_deref(), "QFlags");
        self.writer.characters(&format!(
            "<{enum_name}>. It stores an OR combination of {enum_name} values."
        ));
        self.writer.end_element_named("para");
        self.newline();
    }
}

/// "[read-only] [default] Type.name : type" title of a QML property.
fn qml_property_title(property: &Node, qml_type: &Node) -> String {
    let mut title = String::new();
    let info = property.property();
    if info.is_some_and(|info| info.is_read_only) {
        title.push_str("[read-only] ");
    }
    if info.is_some_and(|info| info.is_default) {
        title.push_str("[default] ");
    }
    if info.is_some_and(|info| info.is_attached) {
        title.push_str(display_name(qml_type));
        title.push('.');
    }
    title.push_str(&property.name);
    title.push_str(" : ");
    title.push_str(info.map_or("", |info| info.data_type.as_str()));
    title
}
