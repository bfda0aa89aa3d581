//! Atom stream interpreter.
//!
//! Walks a [`Text`] by index and dispatches every atom to one handler. A
//! handler returns how many following atoms it consumed; the cursor skips
//! them. `FormatIf`/`FormatElse`/`FormatEndif` are handled here by
//! recursion and never reach a handler.

use std::sync::LazyLock;

use dbk_model::{Atom, AtomKind, NodeId, NodeKind, Text, formatting};
use regex::Regex;

use crate::anchor::canonical_title;
use crate::document::Document;

/// Output format name matched by conditional blocks.
pub const FORMAT: &str = "DocBook";

/// First opening parenthesis that follows a non-space character.
static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S(\()").expect("invalid function call regex"));

/// Where a call to [`Document::render_atoms`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomListOutcome {
    /// Index of the `FormatElse`/`FormatEndif` that ended the walk, or `None`
    /// when the text was exhausted.
    pub stop: Option<usize>,
    /// Atoms handled while emitting, including skipped ones.
    pub consumed: usize,
}

/// Words that start a property brief which reads better as a sentence.
const BRIEF_REWRITE_WORDS: [&str; 5] = ["the", "a", "an", "whether", "which"];

impl Document<'_> {
    /// Render `text` in the context of `relative`.
    ///
    /// Returns `false` without writing anything when the text is empty.
    /// Sections opened by the text are closed before returning.
    pub fn render_text(&mut self, text: &Text, relative: NodeId) -> bool {
        if text.is_empty() {
            return false;
        }
        self.state.start_text();
        let mut start = 0;
        while let Some(stop) = self.render_atoms(text, start, relative, true).stop {
            self.warn(relative, "Unmatched conditional block marker");
            start = stop + 1;
        }
        self.end_link();
        self.close_text_sections();
        true
    }

    /// Render atoms from `start` until the text ends or a `FormatElse` or
    /// `FormatEndif` is reached.
    ///
    /// With `emit` false the atoms are walked without producing output, which
    /// is how the branch of a conditional block for another format is skipped.
    pub fn render_atoms(
        &mut self,
        text: &Text,
        start: usize,
        relative: NodeId,
        emit: bool,
    ) -> AtomListOutcome {
        let atoms = text.atoms();
        let mut index = start;
        let mut consumed = 0;

        while index < atoms.len() {
            match atoms[index].kind {
                AtomKind::FormatIf => {
                    let matches = handles_format(atoms[index].string());
                    let branch = self.render_atoms(text, index + 1, relative, emit && matches);
                    let mut produced = branch.consumed;
                    let Some(mut stop) = branch.stop else {
                        return AtomListOutcome {
                            stop: None,
                            consumed: consumed + produced,
                        };
                    };

                    if atoms[stop].kind == AtomKind::FormatElse {
                        let branch = self.render_atoms(text, stop + 1, relative, emit && !matches);
                        produced += branch.consumed;
                        let Some(end) = branch.stop else {
                            return AtomListOutcome {
                                stop: None,
                                consumed: consumed + produced,
                            };
                        };
                        stop = end;
                    }

                    if atoms[stop].kind == AtomKind::FormatEndif {
                        if emit && produced == 0 {
                            produced += self.render_unhandled_format(relative);
                        }
                        index = stop + 1;
                    } else {
                        // A second FormatElse: hand it to the caller.
                        index = stop;
                    }
                    consumed += produced;
                }
                AtomKind::FormatElse | AtomKind::FormatEndif => {
                    return AtomListOutcome {
                        stop: Some(index),
                        consumed,
                    };
                }
                _ => {
                    let mut step = 1;
                    if emit {
                        step += self.render_atom(text, index, relative);
                        consumed += step;
                    }
                    index += step;
                }
            }
        }

        AtomListOutcome {
            stop: None,
            consumed,
        }
    }

    fn render_unhandled_format(&mut self, relative: NodeId) -> usize {
        self.warn(relative, format!("Output format {FORMAT} not handled"));
        let fallback = Text::from(vec![Atom::with_string(AtomKind::UnhandledFormat, FORMAT)]);
        self.render_atoms(&fallback, 0, relative, true).consumed
    }

    /// Render the atom at `index`, returning how many following atoms it
    /// consumed.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn render_atom(&mut self, text: &Text, index: usize, relative: NodeId) -> usize {
        let atoms = text.atoms();
        let atom = &atoms[index];
        let mut skip = 0;

        match atom.kind {
            AtomKind::AutoLink | AtomKind::NavAutoLink => self.render_auto_link(atom, relative),
            AtomKind::BriefLeft => skip = self.begin_brief(text, index, relative),
            AtomKind::BriefRight => {
                if shows_brief_in_body(self.ctx.model.node(relative).kind) {
                    self.writer.end_element_named("para");
                    self.newline();
                    self.state.in_para = false;
                }
            }
            AtomKind::C => {
                let code = self.ctx.marker.plain_code(atom.string());
                self.writer.text_element("code", &code);
            }
            AtomKind::CaptionLeft => self.writer.start_element("title"),
            AtomKind::CaptionRight => {
                self.end_link();
                self.writer.end_element_named("title");
                self.newline();
            }
            AtomKind::Code => self.render_code(atom, "cpp", None),
            AtomKind::CodeBad => self.render_code(atom, "cpp", Some("bad")),
            AtomKind::CodeNew => {
                self.writer.text_element("para", "you can rewrite it as");
                self.newline();
                self.render_code(atom, "cpp", Some("new"));
            }
            AtomKind::CodeOld => {
                self.writer
                    .text_element("para", "For example, if you have code like");
                self.newline();
                self.render_code(atom, "cpp", Some("bad"));
            }
            AtomKind::Qml => self.render_code(atom, "qml", None),
            AtomKind::JavaScript => self.render_code(atom, "js", None),
            // The enclosing paragraph stays open across the footnote.
            AtomKind::FootnoteLeft => {
                self.writer.start_element("footnote");
                self.newline();
                self.writer.start_element("para");
            }
            AtomKind::FootnoteRight => {
                self.writer.end_element_named("para");
                self.writer.end_element_named("footnote");
            }
            AtomKind::FormattingLeft => self.begin_formatting(atom.string()),
            AtomKind::FormattingRight => self.end_formatting(atom.string()),
            AtomKind::AnnotatedList => self.render_annotated_list(atom.string(), relative),
            AtomKind::GeneratedList => self.render_generated_list(atom.string(), relative),
            AtomKind::Image | AtomKind::InlineImage => {
                let alt = atoms
                    .get(index + 1)
                    .filter(|next| next.kind == AtomKind::ImageText)
                    .map(Atom::string);
                self.render_image(atom, alt, relative);
            }
            AtomKind::ImportantLeft | AtomKind::NoteLeft => {
                let tag = admonition_tag(atom.kind);
                self.writer.start_element(tag);
                self.newline();
                self.writer.start_element("para");
                self.state.in_para = true;
            }
            AtomKind::ImportantRight | AtomKind::NoteRight => {
                self.writer.end_element_named(admonition_tag(atom.kind));
                self.newline();
                self.state.in_para = false;
            }
            AtomKind::Link | AtomKind::NavLink => {
                self.begin_explicit_link(atom.string(), relative);
                skip = skip_link_formatting(text, index);
            }
            AtomKind::LinkNode => {
                self.begin_node_link(atom.string(), relative);
                skip = skip_link_formatting(text, index);
            }
            AtomKind::ListLeft => self.begin_list(text, index, relative),
            AtomKind::ListTagLeft => skip = self.begin_list_tag(text, index, relative),
            AtomKind::ListTagRight | AtomKind::SinceTagRight => self.end_list_tag(atom.string()),
            AtomKind::ListItemLeft => self.begin_list_item(text, index, relative),
            AtomKind::ListItemRight => self.end_list_item(atom.string()),
            AtomKind::ListRight => self.end_list(atom.string()),
            AtomKind::ParaLeft => {
                self.writer.start_element("para");
                self.state.in_para = true;
            }
            AtomKind::ParaRight => {
                self.end_link();
                if self.state.in_para {
                    self.writer.end_element_named("para");
                    self.newline();
                    self.state.in_para = false;
                }
            }
            AtomKind::QuotationLeft => self.writer.start_element("blockquote"),
            AtomKind::QuotationRight => {
                self.writer.end_element_named("blockquote");
                self.newline();
            }
            AtomKind::RawString => self.writer.characters(atom.string()),
            AtomKind::SectionLeft => {
                let declared = atom.string().trim().parse::<i32>().unwrap_or(1);
                let offset = self
                    .ctx
                    .config
                    .heading_offset(self.ctx.model.node(relative).kind);
                self.begin_section(text, index, declared + offset);
            }
            AtomKind::SectionHeadingLeft => self.begin_section_heading(),
            AtomKind::SectionHeadingRight => self.end_section_heading(),
            AtomKind::SidebarLeft => self.writer.start_element("sidebar"),
            AtomKind::SidebarRight => {
                self.writer.end_element_named("sidebar");
                self.newline();
            }
            AtomKind::String => {
                if self.state.link.is_open()
                    && !self.state.in_contents
                    && !self.state.in_section_heading
                {
                    self.render_link_text(atom.string());
                } else {
                    self.writer.characters(atom.string());
                }
            }
            AtomKind::TableLeft => self.begin_table(atom),
            AtomKind::TableRight => self.end_table(),
            AtomKind::TableHeaderLeft => skip = self.begin_table_header(text, index),
            AtomKind::TableHeaderRight => skip = self.end_table_header(text, index),
            AtomKind::TableRowLeft => skip = self.begin_table_row(text, index, relative),
            AtomKind::TableRowRight => self.end_table_row(),
            AtomKind::TableItemLeft => self.begin_table_item(atom),
            AtomKind::TableItemRight => self.end_table_item(),
            AtomKind::Target => {
                let id = canonical_title(atom.string());
                self.write_anchor(&id);
            }
            AtomKind::UnhandledFormat => {
                self.writer.start_element("emphasis");
                self.writer.attribute("role", "bold");
                self.writer.characters(&format!("<Missing {FORMAT}>"));
                self.writer.end_element_named("emphasis");
            }
            AtomKind::UnknownCommand => {
                self.writer.start_element("emphasis");
                self.writer.attribute("role", "bold");
                self.writer.characters("<Unknown command>");
                self.writer.text_element("code", atom.string());
                self.writer.end_element_named("emphasis");
            }
            AtomKind::ExampleFileLink | AtomKind::ExampleImageLink => {
                self.writer.text_element("filename", atom.string());
            }
            // Markers without DocBook output.
            AtomKind::BaseName
            | AtomKind::Br
            | AtomKind::Hr
            | AtomKind::LineBreak
            | AtomKind::CodeQuoteArgument
            | AtomKind::CodeQuoteCommand
            | AtomKind::DetailsLeft
            | AtomKind::DetailsRight
            | AtomKind::DivLeft
            | AtomKind::DivRight
            | AtomKind::EndQmlText
            | AtomKind::QmlText
            | AtomKind::ImageText
            | AtomKind::Keyword
            | AtomKind::LegaleseLeft
            | AtomKind::LegaleseRight
            | AtomKind::ListItemNumber
            | AtomKind::Nop
            | AtomKind::SectionRight
            | AtomKind::SinceList
            | AtomKind::SinceTagLeft
            | AtomKind::SnippetCommand
            | AtomKind::SnippetIdentifier
            | AtomKind::SnippetLocation
            | AtomKind::TableOfContents => {}
            // Handled by render_atoms.
            AtomKind::FormatIf | AtomKind::FormatElse | AtomKind::FormatEndif => {}
            AtomKind::Unknown => {
                if !self.state.unknown_reported {
                    self.state.unknown_reported = true;
                    self.error(relative, "Unknown atom type in documentation text");
                }
            }
        }
        skip
    }

    /// Write an empty `anchor` with `id` and register it.
    pub(crate) fn write_anchor(&mut self, id: &str) {
        self.state.anchors.register(id);
        self.writer.empty_element("anchor");
        self.writer.attribute("xml:id", id);
        self.newline();
    }

    /// Open a link to `href`. An open link is closed first.
    pub(crate) fn begin_link(&mut self, href: &str, target: Option<NodeId>, relative: NodeId) {
        self.end_link();
        self.writer.start_element("link");
        self.writer.attribute("xlink:href", href);
        if let Some(role) = target.and_then(|target| self.ctx.resolver.link_role(target, relative))
        {
            self.writer.attribute("role", role);
        }
        self.state.link.begin();
    }

    pub(crate) fn end_link(&mut self) {
        if self.state.link.end() {
            self.writer.end_element_named("link");
        }
    }

    /// Write link text, moving a trailing `(...)` outside the link.
    fn render_link_text(&mut self, text: &str) {
        match FUNCTION_CALL.captures(text).and_then(|caps| caps.get(1)) {
            Some(paren) => {
                self.writer.characters(&text[..paren.start()]);
                self.end_link();
                self.writer.characters(&text[paren.start()..]);
            }
            None => self.writer.characters(text),
        }
    }

    fn render_auto_link(&mut self, atom: &Atom, relative: NodeId) {
        let text = atom.string();
        if self.state.link.is_open() || self.state.in_contents || self.state.in_section_heading {
            self.writer.characters(text);
            return;
        }
        let resolved = self
            .ctx
            .resolver
            .resolve(text, relative)
            .filter(|link| {
                link.node
                    .is_none_or(|target| !self.ctx.resolver.is_suppressed(target, relative))
            });
        match resolved {
            Some(link) => {
                self.begin_link(&link.href, link.node, relative);
                self.render_link_text(text);
                self.end_link();
            }
            None => self.writer.characters(text),
        }
    }

    /// Open the link of a `Link` atom; closed by `FormattingRight(link)`.
    fn begin_explicit_link(&mut self, target: &str, relative: NodeId) {
        let Some(link) = self.ctx.resolver.resolve(target, relative) else {
            self.warn(relative, format!("Can't link to '{target}'"));
            return;
        };
        if let Some(node) = link.node
            && self.ctx.resolver.is_suppressed(node, relative)
        {
            tracing::debug!(link = target, "link to obsolete node rendered as text");
            return;
        }
        self.begin_link(&link.href, link.node, relative);
    }

    /// Open the link of a `LinkNode` atom, whose payload is a qualified name.
    fn begin_node_link(&mut self, qualified_name: &str, relative: NodeId) {
        let href = self
            .ctx
            .model
            .find_node(qualified_name, None)
            .filter(|target| !self.ctx.resolver.is_suppressed(*target, relative))
            .and_then(|target| {
                self.ctx
                    .resolver
                    .link_for_node(target, Some(relative))
                    .map(|href| (href, target))
            });
        match href {
            Some((href, target)) => self.begin_link(&href, Some(target), relative),
            None => self.warn(relative, format!("Can't link to '{qualified_name}'")),
        }
    }

    fn begin_brief(&mut self, text: &Text, index: usize, relative: NodeId) -> usize {
        let node = self.ctx.model.node(relative);
        if !shows_brief_in_body(node.kind) {
            return skip_atoms(text, index, AtomKind::BriefRight);
        }
        self.writer.start_element("para");
        self.state.in_para = true;

        let subject = match node.kind {
            NodeKind::Property => "property",
            NodeKind::Variable => "variable",
            _ => return 0,
        };
        let Some(next) = text.get(index + 1).filter(|next| next.kind == AtomKind::String) else {
            return 0;
        };
        let first_word = next
            .string()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if !BRIEF_REWRITE_WORDS.contains(&first_word.as_str()) {
            return 0;
        }
        let mut chars = next.string().chars();
        let lowered: String = chars
            .next()
            .map(|first| first.to_lowercase().chain(chars).collect())
            .unwrap_or_default();
        self.writer
            .characters(&format!("This {subject} holds {lowered}"));
        1
    }

    fn begin_formatting(&mut self, name: &str) {
        match name {
            formatting::BOLD => {
                self.writer.start_element("emphasis");
                self.writer.attribute("role", "bold");
            }
            formatting::ITALIC => self.writer.start_element("emphasis"),
            formatting::UNDERLINE => {
                self.writer.start_element("emphasis");
                self.writer.attribute("role", "underline");
            }
            formatting::SUBSCRIPT => self.writer.start_element("subscript"),
            formatting::SUPERSCRIPT => self.writer.start_element("superscript"),
            formatting::TELETYPE => self.writer.start_element("code"),
            formatting::PARAMETER => {
                self.writer.start_element("code");
                self.writer.attribute("role", "parameter");
            }
            formatting::UICONTROL => self.writer.start_element("guilabel"),
            _ => {}
        }
    }

    fn end_formatting(&mut self, name: &str) {
        match formatting_element(name) {
            Some(element) => {
                self.writer.end_element_named(element);
            }
            None if name == formatting::LINK => self.end_link(),
            None => {}
        }
    }

    fn render_code(&mut self, atom: &Atom, language: &str, role: Option<&str>) {
        let code = self.ctx.marker.plain_code(atom.string());
        self.writer.start_element("programlisting");
        self.writer.attribute("language", language);
        if let Some(role) = role {
            self.writer.attribute("role", role);
        }
        self.writer.characters(&code);
        self.writer.end_element_named("programlisting");
        self.newline();
    }

    fn render_image(&mut self, atom: &Atom, alt: Option<&str>, relative: NodeId) {
        let block = atom.kind == AtomKind::Image;
        let tag = if block {
            "mediaobject"
        } else {
            "inlinemediaobject"
        };
        self.writer.start_element(tag);
        self.newline();

        match self.locate_image(atom.string()) {
            Some(file_ref) => {
                if let Some(alt) = alt.filter(|alt| !alt.is_empty()) {
                    self.writer.text_element("alt", alt);
                }
                self.writer.start_element("imageobject");
                self.newline();
                self.writer.empty_element("imagedata");
                self.writer.attribute("fileref", &file_ref);
                self.newline();
                self.writer.end_element_named("imageobject");
                self.newline();
            }
            None => {
                self.warn(relative, format!("Missing image: {}", atom.string()));
                self.writer.start_element("textobject");
                self.newline();
                self.writer.start_element("para");
                self.writer
                    .text_element("emphasis", &format!("[Missing image {}]", atom.string()));
                self.writer.end_element_named("para");
                self.newline();
                self.writer.end_element_named("textobject");
                self.newline();
            }
        }

        self.writer.end_element_named(tag);
        if block {
            self.newline();
        }
    }

    /// Find `name` in the image directories, returning the `fileref` to
    /// write. Found files are recorded for copying.
    fn locate_image(&mut self, name: &str) -> Option<String> {
        if name.contains("://") {
            return Some(name.to_owned());
        }
        let path = self
            .ctx
            .config
            .image_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())?;
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        if !self.images.contains(&path) {
            self.images.push(path);
        }
        Some(format!("images/{file_name}"))
    }
}

/// Whether a conditional block for `format` applies to this generator.
pub(crate) fn handles_format(format: &str) -> bool {
    format.eq_ignore_ascii_case(FORMAT)
}

/// Brief markers render in the body unless the brief already went into the
/// document header.
fn shows_brief_in_body(kind: NodeKind) -> bool {
    !kind.is_page_like()
}

fn admonition_tag(kind: AtomKind) -> &'static str {
    match kind {
        AtomKind::ImportantLeft | AtomKind::ImportantRight => "important",
        _ => "note",
    }
}

fn formatting_element(name: &str) -> Option<&'static str> {
    match name {
        formatting::BOLD | formatting::ITALIC | formatting::UNDERLINE => Some("emphasis"),
        formatting::SUBSCRIPT => Some("subscript"),
        formatting::SUPERSCRIPT => Some("superscript"),
        formatting::TELETYPE | formatting::PARAMETER => Some("code"),
        formatting::UICONTROL => Some("guilabel"),
        _ => None,
    }
}

/// `Link` atoms are followed by the `FormattingLeft(link)` they open.
fn skip_link_formatting(text: &Text, index: usize) -> usize {
    usize::from(
        text.get(index + 1)
            .is_some_and(|next| next.is(AtomKind::FormattingLeft, formatting::LINK)),
    )
}

/// Whether the atom after `index` has `kind`.
pub(crate) fn match_ahead(text: &Text, index: usize, kind: AtomKind) -> bool {
    text.get(index + 1).is_some_and(|next| next.kind == kind)
}

/// Number of atoms between `index` and the next atom of `kind`.
///
/// The atom of `kind` itself is not skipped, so its handler still runs. When
/// there is none, everything up to the end is skipped.
pub(crate) fn skip_atoms(text: &Text, index: usize, kind: AtomKind) -> usize {
    let rest = &text.atoms()[index + 1..];
    rest.iter()
        .position(|atom| atom.kind == kind)
        .unwrap_or(rest.len())
}

#[cfg(test)]
mod tests {
    use dbk_model::{Atom, AtomKind, DocModel, DocTree, Node, NodeKind, Status};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::code::PlainCodeMarker;
    use crate::config::GeneratorConfig;
    use crate::document::RenderContext;
    use crate::resolver::LinkResolver;

    fn atom(kind: AtomKind) -> Atom {
        Atom::new(kind)
    }

    fn with(kind: AtomKind, string: &str) -> Atom {
        Atom::with_string(kind, string)
    }

    struct Fixture {
        tree: DocTree,
        config: GeneratorConfig,
        page: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tree = DocTree::new();
            let page = tree.add(tree.root(), Node::new(NodeKind::Page, "intro.html"));
            Self {
                tree,
                config: GeneratorConfig::new("Acme"),
                page,
            }
        }

        /// Render `atoms` for `relative` and return only the body output.
        fn render(&self, atoms: Vec<Atom>, relative: NodeId) -> (String, Vec<String>) {
            let ctx = RenderContext {
                model: &self.tree,
                config: &self.config,
                marker: &PlainCodeMarker,
                resolver: LinkResolver::new(&self.tree),
            };
            let mut doc = Document::open(ctx, relative);
            let prefix = doc.output().len();
            doc.render_text(&Text::from(atoms), relative);
            let body = doc.output()[prefix..].to_owned();
            let rendered = doc.close();
            assert!(rendered.balance.is_balanced(), "{:?}", rendered.balance.unbalanced());
            assert!(crate::writer::check_well_formed(&rendered.content).is_ok());
            let messages = rendered
                .diagnostics
                .iter()
                .map(|d| d.message.clone())
                .collect();
            (body, messages)
        }
    }

    #[test]
    fn test_paragraph_with_bold() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                atom(AtomKind::ParaLeft),
                with(AtomKind::String, "Hello "),
                with(AtomKind::FormattingLeft, formatting::BOLD),
                with(AtomKind::String, "world"),
                with(AtomKind::FormattingRight, formatting::BOLD),
                with(AtomKind::String, "."),
                atom(AtomKind::ParaRight),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:para>Hello <db:emphasis role=\"bold\">world</db:emphasis>.</db:para>\n"
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_footnote_inside_paragraph() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                atom(AtomKind::ParaLeft),
                with(AtomKind::String, "a"),
                atom(AtomKind::FootnoteLeft),
                with(AtomKind::String, "note"),
                atom(AtomKind::FootnoteRight),
                with(AtomKind::String, "b"),
                atom(AtomKind::ParaRight),
                atom(AtomKind::ParaLeft),
                with(AtomKind::String, "c"),
                atom(AtomKind::ParaRight),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:para>a<db:footnote>\n<db:para>note</db:para></db:footnote>b</db:para>\n\
             <db:para>c</db:para>\n"
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        let f = Fixture::new();
        let (body, _) = f.render(Vec::new(), f.page);
        assert_eq!(body, "");
    }

    #[test]
    fn test_conditional_matching_format() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                with(AtomKind::FormatIf, "DocBook"),
                with(AtomKind::RawString, "yes"),
                atom(AtomKind::FormatElse),
                with(AtomKind::RawString, "no"),
                atom(AtomKind::FormatEndif),
            ],
            f.page,
        );
        assert_eq!(body, "yes");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_conditional_other_format() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                with(AtomKind::FormatIf, "HTML"),
                with(AtomKind::RawString, "html only"),
                atom(AtomKind::FormatElse),
                with(AtomKind::RawString, "fallback"),
                atom(AtomKind::FormatEndif),
            ],
            f.page,
        );
        assert_eq!(body, "fallback");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_conditional_empty_branch_emits_one_marker() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                with(AtomKind::FormatIf, "docbook"),
                atom(AtomKind::FormatEndif),
                with(AtomKind::RawString, "after"),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:emphasis role=\"bold\">&lt;Missing DocBook&gt;</db:emphasis>after"
        );
        assert_eq!(messages, vec!["Output format DocBook not handled"]);
    }

    #[test]
    fn test_conditional_other_format_without_else_emits_marker() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![
                with(AtomKind::FormatIf, "HTML"),
                with(AtomKind::RawString, "html only"),
                atom(AtomKind::FormatEndif),
            ],
            f.page,
        );
        assert_eq!(body.matches("Missing DocBook").count(), 1);
        assert!(!body.contains("html only"));
    }

    #[test]
    fn test_nested_conditional_in_skipped_branch() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                with(AtomKind::FormatIf, "HTML"),
                with(AtomKind::FormatIf, "DocBook"),
                with(AtomKind::RawString, "inner"),
                atom(AtomKind::FormatEndif),
                atom(AtomKind::FormatElse),
                with(AtomKind::RawString, "outer else"),
                atom(AtomKind::FormatEndif),
            ],
            f.page,
        );
        assert_eq!(body, "outer else");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_render_atoms_reports_stop_and_count() {
        let f = Fixture::new();
        let ctx = RenderContext {
            model: &f.tree,
            config: &f.config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(&f.tree),
        };
        let mut doc = Document::open(ctx, f.page);
        let text = Text::from(vec![
            with(AtomKind::String, "a"),
            with(AtomKind::String, "b"),
            atom(AtomKind::FormatElse),
            with(AtomKind::String, "c"),
        ]);
        let outcome = doc.render_atoms(&text, 0, f.page, true);
        assert_eq!(
            outcome,
            AtomListOutcome {
                stop: Some(2),
                consumed: 2
            }
        );
        let outcome = doc.render_atoms(&text, 0, f.page, false);
        assert_eq!(outcome.consumed, 0);
    }

    #[test]
    fn test_unknown_atom_reported_once() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                atom(AtomKind::Unknown),
                with(AtomKind::String, "text"),
                atom(AtomKind::Unknown),
            ],
            f.page,
        );
        assert_eq!(body, "text");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_code_block() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![with(AtomKind::Code, "<@type>int</@type> x = a &lt; b;")],
            f.page,
        );
        assert_eq!(
            body,
            "<db:programlisting language=\"cpp\">int x = a &lt; b;</db:programlisting>\n"
        );
    }

    #[test]
    fn test_code_old_and_new() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![with(AtomKind::CodeOld, "a();"), with(AtomKind::CodeNew, "b();")],
            f.page,
        );
        assert_eq!(
            body,
            "<db:para>For example, if you have code like</db:para>\n\
             <db:programlisting language=\"cpp\" role=\"bad\">a();</db:programlisting>\n\
             <db:para>you can rewrite it as</db:para>\n\
             <db:programlisting language=\"cpp\" role=\"new\">b();</db:programlisting>\n"
        );
    }

    #[test]
    fn test_note_admonition() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![
                atom(AtomKind::NoteLeft),
                with(AtomKind::String, "Careful."),
                atom(AtomKind::NoteRight),
            ],
            f.page,
        );
        assert_eq!(body, "<db:note>\n<db:para>Careful.</db:para></db:note>\n");
    }

    #[test]
    fn test_link_to_function_moves_parentheses_out() {
        let mut f = Fixture::new();
        let class = f.tree.add(f.tree.root(), Node::new(NodeKind::Class, "Widget"));
        f.tree.add(class, Node::new(NodeKind::Function, "show"));
        let (body, _) = f.render(
            vec![
                with(AtomKind::Link, "Widget::show()"),
                with(AtomKind::FormattingLeft, formatting::LINK),
                with(AtomKind::String, "show()"),
                with(AtomKind::FormattingRight, formatting::LINK),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:link xlink:href=\"widget.xml#show\">show</db:link>()"
        );
    }

    #[test]
    fn test_unresolved_link_is_plain_text() {
        let f = Fixture::new();
        let (body, messages) = f.render(
            vec![
                with(AtomKind::Link, "Nowhere"),
                with(AtomKind::FormattingLeft, formatting::LINK),
                with(AtomKind::String, "nowhere"),
                with(AtomKind::FormattingRight, formatting::LINK),
            ],
            f.page,
        );
        assert_eq!(body, "nowhere");
        assert_eq!(messages, vec!["Can't link to 'Nowhere'"]);
    }

    #[test]
    fn test_obsolete_link_suppressed_from_unrelated_context() {
        let mut f = Fixture::new();
        f.tree.add(
            f.tree.root(),
            Node::new(NodeKind::Class, "OldThing").with_status(Status::Obsolete),
        );
        let atoms = vec![
            with(AtomKind::Link, "OldThing"),
            with(AtomKind::FormattingLeft, formatting::LINK),
            with(AtomKind::String, "OldThing"),
            with(AtomKind::FormattingRight, formatting::LINK),
        ];
        let (body, _) = f.render(atoms, f.page);
        assert_eq!(body, "OldThing");
    }

    #[test]
    fn test_obsolete_link_kept_from_obsolete_context() {
        let mut f = Fixture::new();
        f.tree.add(
            f.tree.root(),
            Node::new(NodeKind::Class, "OldThing").with_status(Status::Obsolete),
        );
        let old_page = f.tree.add(
            f.tree.root(),
            Node::new(NodeKind::Page, "legacy.html").with_status(Status::Obsolete),
        );
        let (body, _) = f.render(
            vec![with(AtomKind::AutoLink, "OldThing")],
            old_page,
        );
        assert_eq!(body, "<db:link xlink:href=\"oldthing.xml\">OldThing</db:link>");
    }

    #[test]
    fn test_obsolete_link_from_parent_carries_role() {
        let mut f = Fixture::new();
        let class = f.tree.add(f.tree.root(), Node::new(NodeKind::Class, "Widget"));
        f.tree.add(
            class,
            Node::new(NodeKind::Function, "repaint").with_status(Status::Obsolete),
        );
        let (body, _) = f.render(
            vec![
                with(AtomKind::Link, "repaint()"),
                with(AtomKind::FormattingLeft, formatting::LINK),
                with(AtomKind::String, "repaint"),
                with(AtomKind::FormattingRight, formatting::LINK),
            ],
            class,
        );
        assert_eq!(
            body,
            "<db:link xlink:href=\"#repaint\" role=\"obsolete\">repaint</db:link>"
        );
    }

    #[test]
    fn test_auto_link_inside_section_heading_is_text() {
        let mut f = Fixture::new();
        f.tree.add(f.tree.root(), Node::new(NodeKind::Class, "Widget"));
        let (body, _) = f.render(
            vec![
                with(AtomKind::SectionLeft, "1"),
                atom(AtomKind::SectionHeadingLeft),
                with(AtomKind::AutoLink, "Widget"),
                atom(AtomKind::SectionHeadingRight),
                atom(AtomKind::SectionRight),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:section xml:id=\"widget\">\n<db:title>Widget</db:title>\n</db:section>\n"
        );
    }

    #[test]
    fn test_duplicate_headings_register_twice() {
        let f = Fixture::new();
        let heading = |title: &str| {
            vec![
                with(AtomKind::SectionLeft, "1"),
                atom(AtomKind::SectionHeadingLeft),
                with(AtomKind::String, title),
                atom(AtomKind::SectionHeadingRight),
                atom(AtomKind::SectionRight),
            ]
        };
        let mut atoms = heading("Usage");
        atoms.extend(heading("Usage"));

        let ctx = RenderContext {
            model: &f.tree,
            config: &f.config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(&f.tree),
        };
        let mut doc = Document::open(ctx, f.page);
        doc.render_text(&Text::from(atoms), f.page);
        assert_eq!(doc.anchors().attempts(), &["usage", "usage"]);
        assert_eq!(doc.anchors().collisions(), vec!["usage"]);
        let rendered = doc.close();
        assert!(rendered.balance.is_balanced());
        assert_eq!(rendered.balance.opened("section"), 2);
    }

    #[test]
    fn test_sections_nest_and_close() {
        let f = Fixture::new();
        let section = |level: &str, title: &str| {
            vec![
                with(AtomKind::SectionLeft, level),
                atom(AtomKind::SectionHeadingLeft),
                with(AtomKind::String, title),
                atom(AtomKind::SectionHeadingRight),
                atom(AtomKind::SectionRight),
            ]
        };
        let mut atoms = section("1", "A");
        atoms.extend(section("2", "B"));
        atoms.extend(section("1", "C"));
        let (body, _) = f.render(atoms, f.page);
        assert_eq!(
            body,
            "<db:section xml:id=\"a\">\n<db:title>A</db:title>\n\
             <db:section xml:id=\"b\">\n<db:title>B</db:title>\n</db:section>\n</db:section>\n\
             <db:section xml:id=\"c\">\n<db:title>C</db:title>\n</db:section>\n"
        );
    }

    #[test]
    fn test_section_without_heading_has_no_id() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![
                with(AtomKind::SectionLeft, "1"),
                atom(AtomKind::SectionRight),
                with(AtomKind::SectionLeft, "1"),
                atom(AtomKind::SectionHeadingLeft),
                with(AtomKind::String, "B"),
                atom(AtomKind::SectionHeadingRight),
                atom(AtomKind::SectionRight),
            ],
            f.page,
        );
        assert_eq!(
            body,
            "<db:section>\n</db:section>\n\
             <db:section xml:id=\"b\">\n<db:title>B</db:title>\n</db:section>\n"
        );
    }

    #[test]
    fn test_missing_image() {
        let f = Fixture::new();
        let (body, messages) = f.render(vec![with(AtomKind::Image, "logo.png")], f.page);
        assert_eq!(
            body,
            "<db:mediaobject>\n<db:textobject>\n<db:para>\
             <db:emphasis>[Missing image logo.png]</db:emphasis></db:para>\n\
             </db:textobject>\n</db:mediaobject>\n"
        );
        assert_eq!(messages, vec!["Missing image: logo.png"]);
    }

    #[test]
    fn test_found_image_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"png").unwrap();
        let mut f = Fixture::new();
        f.config = GeneratorConfig::new("Acme").with_image_dirs(vec![dir.path().to_path_buf()]);
        let ctx = RenderContext {
            model: &f.tree,
            config: &f.config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(&f.tree),
        };
        let mut doc = Document::open(ctx, f.page);
        doc.render_text(
            &Text::from(vec![
                with(AtomKind::InlineImage, "logo.png"),
                with(AtomKind::ImageText, "Logo"),
            ]),
            f.page,
        );
        let rendered = doc.close();
        assert!(rendered.content.contains(
            "<db:inlinemediaobject>\n<db:alt>Logo</db:alt><db:imageobject>\n\
             <db:imagedata fileref=\"images/logo.png\"/>\n</db:imageobject>\n\
             </db:inlinemediaobject>"
        ));
        assert_eq!(rendered.images, vec![dir.path().join("logo.png")]);
    }

    #[test]
    fn test_brief_skipped_for_page() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![
                atom(AtomKind::BriefLeft),
                with(AtomKind::String, "Hidden"),
                atom(AtomKind::BriefRight),
                with(AtomKind::String, "shown"),
            ],
            f.page,
        );
        assert_eq!(body, "shown");
    }

    #[test]
    fn test_property_brief_rewritten() {
        let mut f = Fixture::new();
        let class = f.tree.add(f.tree.root(), Node::new(NodeKind::Class, "Widget"));
        let property = f.tree.add(class, Node::new(NodeKind::Property, "visible"));
        let (body, _) = f.render(
            vec![
                atom(AtomKind::BriefLeft),
                with(AtomKind::String, "Whether the widget is visible"),
                atom(AtomKind::BriefRight),
            ],
            property,
        );
        assert_eq!(
            body,
            "<db:para>This property holds whether the widget is visible</db:para>\n"
        );
    }

    #[test]
    fn test_unclosed_formatting_is_repaired() {
        let f = Fixture::new();
        let (body, _) = f.render(
            vec![
                atom(AtomKind::ParaLeft),
                with(AtomKind::FormattingLeft, formatting::ITALIC),
                with(AtomKind::String, "dangling"),
                atom(AtomKind::ParaRight),
            ],
            f.page,
        );
        assert_eq!(body, "<db:para><db:emphasis>dangling</db:emphasis></db:para>\n");
    }

    #[test]
    fn test_skip_atoms_and_match_ahead() {
        let text = Text::from(vec![
            atom(AtomKind::BriefLeft),
            with(AtomKind::String, "x"),
            with(AtomKind::String, "y"),
            atom(AtomKind::BriefRight),
        ]);
        assert_eq!(skip_atoms(&text, 0, AtomKind::BriefRight), 2);
        assert_eq!(skip_atoms(&text, 0, AtomKind::TableRight), 3);
        assert!(match_ahead(&text, 2, AtomKind::BriefRight));
        assert!(!match_ahead(&text, 3, AtomKind::BriefRight));
    }
}
