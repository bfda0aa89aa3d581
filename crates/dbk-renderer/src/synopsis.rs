//! Declaration summaries.
//!
//! A synopsis is the one-line declaration of a member as it appears in
//! member lists and in the title of its detailed section. Type names found in
//! the model are wrapped in `type` elements and linked.

use std::sync::LazyLock;

use dbk_model::{
    Access, FunctionInfo, Metaness, Node, NodeId, NodeKind, Parameter, Status, Virtualness,
};
use regex::Regex;

use crate::document::Document;

/// Enumerators shown in a summary synopsis before eliding.
const MAX_ENUM_VALUES: usize = 6;

/// Runs of characters that can make up a type name.
static TYPE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_:]+").expect("invalid type word regex"));

/// Parameter names such as `x_1` or `a_n`, written with a subscript.
static SUBSCRIPTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]+)_([0-9]+|n)").expect("invalid subscript regex"));

/// Where a synopsis is shown, which decides how much of it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynopsisStyle {
    /// Member summary lists: linked names, status and qualifiers.
    Summary,
    /// Title of a member's detailed section: qualified, unlinked name.
    Details,
    /// Flat list of all members: name and type only.
    AllMembers,
    /// Property access function lists.
    Accessors,
}

impl SynopsisStyle {
    fn generates_extra(self) -> bool {
        self != Self::AllMembers
    }

    fn generates_type(self) -> bool {
        self != Self::Details
    }

    fn links_name(self) -> bool {
        self != Self::Details
    }
}

impl Document<'_> {
    /// Write the synopsis of `node` as seen from `relative`.
    pub fn render_synopsis(&mut self, node: NodeId, relative: NodeId, style: SynopsisStyle) {
        let model = self.ctx.model;
        let member = model.node(node);
        let generate_extra = style.generates_extra();
        let generate_type = style.generates_type();
        let link = style.links_name();

        if generate_extra {
            if style == SynopsisStyle::Details
                && let Some(qualifiers) = detail_qualifiers(member)
            {
                self.writer.characters(&format!("[{qualifiers}] "));
            }
            if style == SynopsisStyle::Summary
                && let Some(extra) = status_prefix(member.status)
            {
                self.writer.characters(extra);
            }
        }

        let scope = if style == SynopsisStyle::Details {
            self.scope_prefix(member)
        } else {
            None
        };

        if member.kind.is_function_like()
            && let Some(function) = member.function()
        {
            self.render_function_synopsis(node, function, relative, style, scope.as_deref());
            return;
        }

        match member.kind {
            NodeKind::Namespace => {
                self.writer.characters("namespace ");
                self.render_scoped_name(scope.as_deref(), node, relative, link);
            }
            NodeKind::Class | NodeKind::Struct | NodeKind::Union => {
                self.writer.characters(member.kind.type_word());
                self.writer.characters(" ");
                self.render_scoped_name(scope.as_deref(), node, relative, link);
            }
            NodeKind::Enum => {
                self.writer.characters("enum ");
                self.render_scoped_name(scope.as_deref(), node, relative, link);
                if style == SynopsisStyle::Summary {
                    let names: Vec<&str> = member
                        .enumeration()
                        .map(|info| info.items.iter().map(|item| item.name.as_str()).collect())
                        .unwrap_or_default();
                    self.writer.characters(&enum_summary(&names));
                }
            }
            NodeKind::Typedef | NodeKind::TypeAlias => {
                let is_flags = member
                    .typedef()
                    .is_some_and(|info| info.associated_enum.is_some());
                self.writer
                    .characters(if is_flags { "flags " } else { "typedef " });
                self.render_scoped_name(scope.as_deref(), node, relative, link);
            }
            NodeKind::Property => {
                self.render_scoped_name(scope.as_deref(), node, relative, link);
                self.writer.characters(" : ");
                let data_type = member.property().map_or("", |info| info.data_type.as_str());
                self.render_typified(data_type, relative, false, generate_type);
            }
            NodeKind::Variable => {
                let (left, right) = member.variable().map_or(("", ""), |info| {
                    (info.left_type.as_str(), info.right_type.as_str())
                });
                if style == SynopsisStyle::AllMembers {
                    self.render_scoped_name(scope.as_deref(), node, relative, link);
                    self.writer.characters(" : ");
                    self.render_typified(&format!("{left}{right}"), relative, false, generate_type);
                } else {
                    self.render_typified(left, relative, false, generate_type);
                    self.writer.characters(" ");
                    self.render_scoped_name(scope.as_deref(), node, relative, link);
                    self.writer.characters(right);
                }
            }
            _ => self.render_scoped_name(scope.as_deref(), node, relative, link),
        }
    }

    fn render_function_synopsis(
        &mut self,
        node: NodeId,
        function: &FunctionInfo,
        relative: NodeId,
        style: SynopsisStyle,
        scope: Option<&str>,
    ) {
        let generate_extra = style.generates_extra();
        let generate_type = style.generates_type();
        let summary_like = matches!(style, SynopsisStyle::Summary | SynopsisStyle::Accessors);
        if summary_like && function.virtualness != Virtualness::NonVirtual {
            self.writer.characters("virtual ");
        }
        if style != SynopsisStyle::AllMembers && !function.return_type.is_empty() {
            self.render_typified(&function.return_type, relative, true, generate_type);
        }
        self.render_scoped_name(scope, node, relative, style.links_name());

        if function.metaness != Metaness::MacroWithoutParams {
            self.writer.characters("(");
            for (index, parameter) in function.parameters.iter().enumerate() {
                if index > 0 {
                    self.writer.characters(", ");
                }
                self.render_parameter(parameter, relative, generate_extra, generate_type);
            }
            self.writer.characters(")");
        }
        if function.is_const {
            self.writer.characters(" const");
        }

        let mut suffix = String::new();
        match style {
            SynopsisStyle::Summary | SynopsisStyle::Accessors => {
                if function.is_final {
                    suffix.push_str(" final");
                }
                if function.is_override {
                    suffix.push_str(" override");
                }
                if function.virtualness == Virtualness::PureVirtual {
                    suffix.push_str(" = 0");
                }
                suffix.push_str(ref_qualifier(function.is_ref, function.is_rvalue_ref));
            }
            SynopsisStyle::AllMembers => {
                if !function.return_type.is_empty() && function.return_type != "void" {
                    self.writer.characters(" : ");
                    self.render_typified(&function.return_type, relative, false, generate_type);
                }
            }
            SynopsisStyle::Details => {
                suffix.push_str(ref_qualifier(function.is_ref, function.is_rvalue_ref));
            }
        }
        if !suffix.is_empty() {
            self.writer.characters(&suffix);
        }
    }

    /// Write the name of `node`, as a bold link when `link` is set.
    pub(crate) fn render_synopsis_name(&mut self, node: NodeId, relative: NodeId, link: bool) {
        let name = display_name(self.ctx.model.node(node));
        if !link {
            self.writer.characters(name);
            return;
        }
        let href = self.ctx.resolver.link_for_node(node, Some(relative));
        self.writer.start_element("emphasis");
        self.writer.attribute("role", "bold");
        self.write_simple_link(href.as_deref(), name);
        self.writer.end_element_named("emphasis");
    }

    /// Write `text` inside a link to `href`, or as plain text without one.
    pub(crate) fn write_simple_link(&mut self, href: Option<&str>, text: &str) {
        match href {
            Some(href) => {
                self.writer.start_element("link");
                self.writer.attribute("xlink:href", href);
                self.writer.characters(text);
                self.writer.end_element_named("link");
            }
            None => self.writer.characters(text),
        }
    }

    /// Write the qualified name of `node` linked to its documentation.
    pub(crate) fn render_full_name(&mut self, node: NodeId, relative: NodeId) {
        let name = self.ctx.model.qualified_name(node);
        let href = self.ctx.resolver.link_for_node(node, Some(relative));
        self.write_simple_link(href.as_deref(), &name);
    }

    /// Write a declaration fragment, wrapping every type name in `type`.
    ///
    /// With `generate_type` unset the fragment is written as plain text.
    /// `trailing_space` adds a space unless the fragment ends in `*` or `&`.
    pub(crate) fn render_typified(
        &mut self,
        declaration: &str,
        relative: NodeId,
        trailing_space: bool,
        generate_type: bool,
    ) {
        let mut pending = String::new();
        let mut last = 0;
        for word in TYPE_WORD.find_iter(declaration) {
            pending.push_str(&declaration[last..word.start()]);
            last = word.end();
            if !generate_type || word.as_str() == "const" {
                pending.push_str(word.as_str());
                continue;
            }
            if !pending.is_empty() {
                self.writer.characters(&pending);
                pending.clear();
            }
            self.render_type_name(word.as_str(), relative);
        }
        pending.push_str(&declaration[last..]);

        if trailing_space && !declaration.is_empty() && !declaration.ends_with(['*', '&']) {
            pending.push(' ');
        }
        if !pending.is_empty() {
            self.writer.characters(&pending);
        }
    }

    fn render_type_name(&mut self, name: &str, relative: NodeId) {
        let model = self.ctx.model;
        let qml_context = is_qml_context(model.node(relative).kind);
        let href = model
            .find_type(name, relative)
            .filter(|found| model.node(*found).kind != NodeKind::QmlBasicType || qml_context)
            .and_then(|found| self.ctx.resolver.link_for_node(found, Some(relative)));
        self.writer.start_element("type");
        self.write_simple_link(href.as_deref(), name);
        self.writer.end_element_named("type");
    }

    fn render_parameter(
        &mut self,
        parameter: &Parameter,
        relative: NodeId,
        generate_extra: bool,
        generate_type: bool,
    ) {
        let name = if parameter.name.is_empty() {
            parameter.data_type.as_str()
        } else {
            self.render_typified(&parameter.data_type, relative, true, generate_type);
            parameter.name.as_str()
        };

        if generate_extra || parameter.name.is_empty() {
            self.writer.start_element("emphasis");
            match SUBSCRIPTED.captures(name) {
                Some(caps) => {
                    let whole = caps.get(0).map_or(0..0, |m| m.range());
                    self.writer.characters(&name[..whole.start]);
                    self.writer.characters(&caps[1]);
                    self.writer.text_element("subscript", &caps[2]);
                    self.writer.characters(&name[whole.end..]);
                }
                None => self.writer.characters(name),
            }
            self.writer.end_element_named("emphasis");
        }

        if generate_extra && !parameter.default_value.is_empty() {
            self.writer
                .characters(&format!(" = {}", parameter.default_value));
        }
    }

    fn render_scoped_name(
        &mut self,
        scope: Option<&str>,
        node: NodeId,
        relative: NodeId,
        link: bool,
    ) {
        if let Some(scope) = scope {
            self.writer.characters(scope);
            self.writer.characters("::");
        }
        self.render_synopsis_name(node, relative, link);
    }

    /// Name of the enclosing class or namespace written before a member in
    /// its detailed section.
    fn scope_prefix(&self, member: &Node) -> Option<String> {
        if member.kind == NodeKind::Property || is_qml_context(member.kind) {
            return None;
        }
        let parent = self.ctx.model.node(member.parent?);
        (!parent.name.is_empty() && parent.kind != NodeKind::HeaderFile)
            .then(|| display_name(parent).to_owned())
    }
}

/// Name shown for `node`; QML types drop their `QML:` prefix.
pub(crate) fn display_name(node: &Node) -> &str {
    if node.kind == NodeKind::QmlType {
        node.name.strip_prefix("QML:").unwrap_or(&node.name)
    } else {
        &node.name
    }
}

fn is_qml_context(kind: NodeKind) -> bool {
    kind.is_qml_type()
        || matches!(
            kind,
            NodeKind::QmlModule
                | NodeKind::QmlProperty
                | NodeKind::QmlSignal
                | NodeKind::QmlSignalHandler
                | NodeKind::QmlMethod
        )
}

/// Bracketed qualifiers shown in a function's detailed section, such as
/// `static` or `override virtual protected`.
fn detail_qualifiers(member: &Node) -> Option<String> {
    let function = member.function()?;
    let mut words = Vec::new();
    if function.is_static {
        words.push("static");
    } else if function.virtualness != Virtualness::NonVirtual {
        if function.is_final {
            words.push("final");
        }
        if function.is_override {
            words.push("override");
        }
        if function.virtualness == Virtualness::PureVirtual {
            words.push("pure");
        }
        words.push("virtual");
    }
    match member.access {
        Access::Protected => words.push("protected"),
        Access::Private => words.push("private"),
        Access::Public => {}
    }
    match function.metaness {
        Metaness::Signal => words.push("signal"),
        Metaness::Slot => words.push("slot"),
        _ => {}
    }
    if function.is_default {
        words.push("default");
    }
    if function.is_invokable {
        words.push("invokable");
    }
    (!words.is_empty()).then(|| words.join(" "))
}

fn status_prefix(status: Status) -> Option<&'static str> {
    match status {
        Status::Preliminary => Some("(preliminary) "),
        Status::Deprecated => Some("(deprecated) "),
        Status::Obsolete => Some("(obsolete) "),
        Status::Active | Status::Internal => None,
    }
}

fn ref_qualifier(is_ref: bool, is_rvalue_ref: bool) -> &'static str {
    if is_ref {
        " &"
    } else if is_rvalue_ref {
        " &&"
    } else {
        ""
    }
}

/// Separator written after word `index` of a `count`-word enumeration:
/// `A, B, and C` or `A and B`.
pub(crate) fn comma(index: usize, count: usize) -> &'static str {
    if index + 1 >= count {
        ""
    } else if count == 2 {
        " and "
    } else if index + 2 == count {
        ", and "
    } else {
        ", "
    }
}

/// ` { A, B, C }`, keeping the first and last enumerators of long enums.
fn enum_summary(names: &[&str]) -> String {
    let mut shown: Vec<&str> = names.to_vec();
    if shown.len() > MAX_ENUM_VALUES {
        let last = shown[shown.len() - 1];
        shown.truncate(MAX_ENUM_VALUES - 1);
        shown.push("\u{2026}");
        shown.push(last);
    }
    if shown.is_empty() {
        " { }".to_owned()
    } else {
        format!(" {{ {} }}", shown.join(", "))
    }
}
