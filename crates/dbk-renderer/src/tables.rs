//! Tables.

use dbk_model::{Atom, AtomKind, NodeId, Text};

use crate::document::Document;
use crate::interpreter::match_ahead;

/// Style used when a table does not ask for `borderless`.
const DEFAULT_TABLE_STYLE: &str = "generic";

/// Width and style requested by a `TableLeft` atom.
///
/// A token containing `%` is the width and `borderless` is the style; later
/// tokens override earlier ones.
pub(crate) fn table_width_attr(atom: &Atom) -> (Option<&str>, &str) {
    let mut width = None;
    let mut style = DEFAULT_TABLE_STYLE;
    for token in atom.strings.iter().take(2).map(String::as_str) {
        if token == "borderless" {
            style = token;
        } else if token.contains('%') {
            width = Some(token);
        }
    }
    (width, style)
}

/// Split a row attribute string such as `class="odd" id="r1"` into pairs.
///
/// Returns the pairs and whether the string had an odd number of tokens.
pub(crate) fn parse_row_attributes(raw: &str) -> (Vec<(&str, &str)>, bool) {
    let tokens: Vec<&str> = raw.split('"').filter(|token| !token.is_empty()).collect();
    let pairs = tokens
        .chunks_exact(2)
        .filter_map(|pair| {
            let name = pair[0].trim();
            let name = name.strip_suffix('=').unwrap_or(name).trim();
            (!name.is_empty()).then_some((name, pair[1]))
        })
        .collect();
    (pairs, tokens.len() % 2 == 1)
}

/// Attributes of a table cell from its payload tokens: `colspan,rowspan`
/// pairs, where `1` is omitted, and `key=value` pairs.
pub(crate) fn cell_attributes(atom: &Atom) -> Vec<(&str, &str)> {
    let mut attributes = Vec::new();
    for token in &atom.strings {
        if let Some((key, value)) = token.split_once('=') {
            attributes.push((key, value));
        } else if let Some((colspan, rowspan)) = token.split_once(',') {
            if colspan != "1" {
                attributes.push(("colspan", colspan));
            }
            if rowspan != "1" {
                attributes.push(("rowspan", rowspan));
            }
        }
    }
    attributes
}

impl Document<'_> {
    /// Handle `TableLeft`.
    pub(crate) fn begin_table(&mut self, atom: &Atom) {
        if self.state.in_para {
            self.writer.end_element_any(&["para", "blockquote"]);
            self.newline();
            self.state.in_para = false;
        }
        let (width, style) = table_width_attr(atom);
        self.writer.start_element("informaltable");
        self.writer.attribute("style", style);
        if let Some(width) = width {
            self.writer.attribute("width", width);
        }
        self.newline();
        self.state.table.start();
    }

    /// Handle `TableRight`.
    pub(crate) fn end_table(&mut self) {
        self.writer.end_element_named("informaltable");
        self.newline();
        self.state.table.end_header();
    }

    /// Handle `TableHeaderLeft`; an empty header is skipped entirely.
    pub(crate) fn begin_table_header(&mut self, text: &Text, index: usize) -> usize {
        if match_ahead(text, index, AtomKind::TableHeaderRight) {
            return 1;
        }
        self.writer.start_element("thead");
        self.newline();
        self.writer.start_element("tr");
        self.newline();
        self.state.table.start_header();
        0
    }

    /// Handle `TableHeaderRight`. A header group directly followed by
    /// another one continues in a new row of the same `thead`.
    pub(crate) fn end_table_header(&mut self, text: &Text, index: usize) -> usize {
        self.writer.end_element_named("tr");
        self.newline();
        if match_ahead(text, index, AtomKind::TableHeaderLeft) {
            self.writer.start_element("tr");
            self.newline();
            return 1;
        }
        self.writer.end_element_named("thead");
        self.newline();
        self.state.table.end_header();
        0
    }

    /// Handle `TableRowLeft`; an empty row is skipped entirely.
    pub(crate) fn begin_table_row(&mut self, text: &Text, index: usize, relative: NodeId) -> usize {
        if match_ahead(text, index, AtomKind::TableRowRight) {
            return 1;
        }
        let raw = text.atoms()[index].string();
        self.writer.start_element("tr");
        if raw.is_empty() {
            self.writer.attribute("valign", "top");
        } else {
            let (pairs, malformed) = parse_row_attributes(raw);
            for (name, value) in pairs {
                self.writer.attribute(name, value);
            }
            if malformed {
                self.warn(
                    relative,
                    format!("Error when parsing attributes for the table: got \"{raw}\""),
                );
            }
        }
        self.newline();
        self.state.table.start_row();
        0
    }

    /// Handle `TableRowRight`.
    pub(crate) fn end_table_row(&mut self) {
        self.writer.end_element_named("tr");
        self.newline();
    }

    /// Handle `TableItemLeft`. The cell content brings its own paragraphs.
    pub(crate) fn begin_table_item(&mut self, atom: &Atom) {
        let tag = if self.state.table.is_in_header() {
            "th"
        } else {
            "td"
        };
        self.writer.start_element(tag);
        for (name, value) in cell_attributes(atom) {
            self.writer.attribute(name, value);
        }
        self.newline();
    }

    /// Handle `TableItemRight`.
    pub(crate) fn end_table_item(&mut self) {
        self.writer.end_element_any(&["th", "td"]);
        self.newline();
    }
}

#[cfg(test)]
mod tests {
    use dbk_model::{DocModel, DocTree, Node, NodeKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::code::PlainCodeMarker;
    use crate::config::GeneratorConfig;
    use crate::document::RenderContext;
    use crate::resolver::LinkResolver;
    use crate::writer::check_well_formed;

    fn atom(kind: AtomKind) -> Atom {
        Atom::new(kind)
    }

    fn with(kind: AtomKind, string: &str) -> Atom {
        Atom::with_string(kind, string)
    }

    fn render(atoms: Vec<Atom>) -> (String, Vec<String>) {
        let mut tree = DocTree::new();
        let page = tree.add(
            tree.root(),
            Node::new(NodeKind::Page, "tables.html").with_location("tables.qdoc", 3),
        );
        let config = GeneratorConfig::new("Acme");
        let ctx = RenderContext {
            model: &tree,
            config: &config,
            marker: &PlainCodeMarker,
            resolver: LinkResolver::new(&tree),
        };
        let mut doc = Document::open(ctx, page);
        let prefix = doc.output().len();
        doc.render_text(&Text::from(atoms), page);
        let body = doc.output()[prefix..].to_owned();
        let rendered = doc.close();
        assert!(rendered.balance.is_balanced());
        check_well_formed(&rendered.content).unwrap();
        let messages = rendered.diagnostics.into_iter().map(|d| d.message).collect();
        (body, messages)
    }

    fn cell(text: &str) -> Vec<Atom> {
        vec![
            atom(AtomKind::TableItemLeft),
            with(AtomKind::String, text),
            atom(AtomKind::TableItemRight),
        ]
    }

    #[test]
    fn test_width_attr() {
        let atom = Atom::with_strings(AtomKind::TableLeft, ["80%", "borderless"]);
        assert_eq!(table_width_attr(&atom), (Some("80%"), "borderless"));
        let atom = Atom::new(AtomKind::TableLeft);
        assert_eq!(table_width_attr(&atom), (None, "generic"));
    }

    #[test]
    fn test_parse_row_attributes() {
        let (pairs, malformed) = parse_row_attributes(r#"class="odd" id="r1""#);
        assert_eq!(pairs, vec![("class", "odd"), ("id", "r1")]);
        assert!(!malformed);
    }

    #[test]
    fn test_parse_row_attributes_odd_tokens() {
        let (pairs, malformed) = parse_row_attributes(r#"class="odd" stray"#);
        assert_eq!(pairs, vec![("class", "odd")]);
        assert!(malformed);
    }

    #[test]
    fn test_cell_attributes() {
        let atom = Atom::with_strings(AtomKind::TableItemLeft, ["2,1", "align=left"]);
        assert_eq!(
            cell_attributes(&atom),
            vec![("colspan", "2"), ("align", "left")]
        );
        let atom = Atom::with_strings(AtomKind::TableItemLeft, ["1,1"]);
        assert!(cell_attributes(&atom).is_empty());
    }

    #[test]
    fn test_simple_table() {
        let mut atoms = vec![
            with(AtomKind::TableLeft, "50%"),
            atom(AtomKind::TableHeaderLeft),
        ];
        atoms.extend(cell("Name"));
        atoms.push(atom(AtomKind::TableHeaderRight));
        atoms.push(atom(AtomKind::TableRowLeft));
        atoms.extend(cell("Widget"));
        atoms.push(atom(AtomKind::TableRowRight));
        atoms.push(atom(AtomKind::TableRight));

        let (body, messages) = render(atoms);
        assert_eq!(
            body,
            "<db:informaltable style=\"generic\" width=\"50%\">\n\
             <db:thead>\n<db:tr>\n<db:th>\nName</db:th>\n</db:tr>\n</db:thead>\n\
             <db:tr valign=\"top\">\n<db:td>\nWidget</db:td>\n</db:tr>\n\
             </db:informaltable>\n"
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_consecutive_headers_merge() {
        let mut atoms = vec![atom(AtomKind::TableLeft), atom(AtomKind::TableHeaderLeft)];
        atoms.extend(cell("A"));
        atoms.push(atom(AtomKind::TableHeaderRight));
        atoms.push(atom(AtomKind::TableHeaderLeft));
        atoms.extend(cell("B"));
        atoms.push(atom(AtomKind::TableHeaderRight));
        atoms.push(atom(AtomKind::TableRowLeft));
        atoms.extend(cell("c"));
        atoms.push(atom(AtomKind::TableRowRight));
        atoms.push(atom(AtomKind::TableRight));

        let (body, _) = render(atoms);
        assert_eq!(body.matches("<db:thead>").count(), 1);
        assert_eq!(body.matches("<db:th>").count(), 2);
        assert!(body.contains("<db:td>\nc</db:td>"));
    }

    #[test]
    fn test_empty_header_and_row_skipped() {
        let atoms = vec![
            atom(AtomKind::TableLeft),
            atom(AtomKind::TableHeaderLeft),
            atom(AtomKind::TableHeaderRight),
            atom(AtomKind::TableRowLeft),
            atom(AtomKind::TableRowRight),
            atom(AtomKind::TableRight),
        ];
        let (body, _) = render(atoms);
        assert_eq!(
            body,
            "<db:informaltable style=\"generic\">\n</db:informaltable>\n"
        );
    }

    #[test]
    fn test_malformed_row_attributes_warn() {
        let mut atoms = vec![
            atom(AtomKind::TableLeft),
            with(AtomKind::TableRowLeft, r#"class="odd" x"#),
        ];
        atoms.extend(cell("v"));
        atoms.push(atom(AtomKind::TableRowRight));
        atoms.push(atom(AtomKind::TableRight));
        let (body, messages) = render(atoms);
        assert!(body.contains("<db:tr class=\"odd\">"));
        assert_eq!(
            messages,
            vec![r#"Error when parsing attributes for the table: got "class="odd" x""#]
        );
    }

    #[test]
    fn test_table_closes_open_paragraph() {
        let atoms = vec![
            atom(AtomKind::ParaLeft),
            with(AtomKind::String, "See:"),
            atom(AtomKind::TableLeft),
            atom(AtomKind::TableRight),
            atom(AtomKind::ParaRight),
        ];
        let (body, _) = render(atoms);
        assert!(body.starts_with("<db:para>See:</db:para>\n<db:informaltable"));
    }
}
