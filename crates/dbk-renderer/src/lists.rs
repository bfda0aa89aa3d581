//! Bullet, numbered, definition and value lists.
//!
//! All list kinds share one family of atoms; the kind string on each atom
//! selects the markup. Value lists become tables whose column count is fixed
//! when the list starts, so every row is padded to the same number of cells.

use dbk_model::{AtomKind, NodeId, NodeKind, Text, list};

use crate::document::Document;
use crate::interpreter::match_ahead;

/// Container element for a list kind.
fn list_element(kind: &str) -> &'static str {
    match kind {
        list::BULLET => "itemizedlist",
        list::TAG => "variablelist",
        list::VALUE => "informaltable",
        _ => "orderedlist",
    }
}

/// DocBook `numeration` for an ordered list kind.
fn numeration(kind: &str) -> &'static str {
    match kind {
        list::UPPER_ALPHA => "upperalpha",
        list::LOWER_ALPHA => "loweralpha",
        list::UPPER_ROMAN => "upperroman",
        list::LOWER_ROMAN => "lowerroman",
        _ => "arabic",
    }
}

/// Whether the value list starting at `index` has a description for at
/// least one item.
pub(crate) fn is_three_column(text: &Text, index: usize) -> bool {
    let atoms = text.atoms();
    for (offset, atom) in atoms.iter().enumerate().skip(index + 1) {
        if atom.is(AtomKind::ListRight, list::VALUE) {
            return false;
        }
        if atom.kind == AtomKind::ListItemLeft
            && atoms
                .get(offset + 1)
                .is_some_and(|next| next.kind != AtomKind::ListItemRight)
        {
            return true;
        }
    }
    false
}

/// Label of the value list tag at `index` and the number of atoms it spans
/// after the tag itself.
///
/// The tag is followed by the constant name and `ListTagRight`, optionally
/// followed by `SinceTagLeft`, the version and `SinceTagRight`.
fn list_value<'t>(text: &'t Text, index: usize) -> (&'t str, Option<&'t str>, usize) {
    let atoms = text.atoms();
    let Some(name) = atoms.get(index + 1).filter(|atom| atom.kind == AtomKind::String) else {
        return ("", None, 0);
    };
    let has_since = atoms
        .get(index + 2)
        .is_some_and(|atom| atom.kind == AtomKind::ListTagRight)
        && atoms
            .get(index + 3)
            .is_some_and(|atom| atom.kind == AtomKind::SinceTagLeft)
        && atoms
            .get(index + 4)
            .is_some_and(|atom| atom.kind == AtomKind::String)
        && atoms
            .get(index + 5)
            .is_some_and(|atom| atom.kind == AtomKind::SinceTagRight);
    if has_since {
        (name.string(), Some(atoms[index + 4].string()), 4)
    } else {
        (name.string(), None, 1)
    }
}

impl Document<'_> {
    /// Handle `ListLeft` at `index`.
    pub(crate) fn begin_list(&mut self, text: &Text, index: usize, relative: NodeId) {
        if self.state.in_para {
            self.writer.end_element_named("para");
            self.newline();
            self.state.in_para = false;
        }

        let kind = text.atoms()[index].string();
        match kind {
            list::BULLET | list::TAG => {
                self.writer.start_element(list_element(kind));
                self.newline();
            }
            list::VALUE => {
                let is_enum = self.ctx.model.node(relative).kind == NodeKind::Enum;
                self.state
                    .value_list
                    .start(is_three_column(text, index), is_enum);
                self.writer.start_element("informaltable");
                self.newline();
                self.writer.start_element("thead");
                self.newline();
                self.writer.start_element("tr");
                self.newline();
                self.writer.text_element("th", "Constant");
                self.newline();
                if self.state.value_list.shows_value() {
                    self.writer.text_element("th", "Value");
                    self.newline();
                }
                self.writer.text_element("th", "Description");
                self.newline();
                self.writer.end_element_named("thead");
                self.newline();
            }
            _ => {
                self.writer.start_element("orderedlist");
                if let Some(start) = text
                    .get(index + 1)
                    .filter(|next| next.kind == AtomKind::ListItemNumber)
                    .map(|next| next.string().trim())
                    .filter(|start| start.parse::<i64>().is_ok_and(|n| n > 1))
                {
                    self.writer.attribute("startingnumber", start);
                }
                self.writer.attribute("numeration", numeration(kind));
                self.newline();
            }
        }
    }

    /// Handle `ListTagLeft` at `index`, returning the atoms it consumed.
    pub(crate) fn begin_list_tag(&mut self, text: &Text, index: usize, relative: NodeId) -> usize {
        if text.atoms()[index].string() != list::VALUE {
            self.writer.start_element("varlistentry");
            self.newline();
            self.writer.start_element("term");
            return 0;
        }

        let (name, since, skip) = list_value(text, index);
        let label = match since {
            Some(since) => format!("{name} (since {})", self.format_since(since)),
            None => name.to_owned(),
        };
        let value = self
            .ctx
            .model
            .node(relative)
            .enumeration()
            .and_then(|info| info.item_value(name))
            .map(str::to_owned);
        self.open_value_row(&label, value.as_deref(), relative);
        skip
    }

    /// Handle `ListTagRight` and `SinceTagRight`.
    pub(crate) fn end_list_tag(&mut self, kind: &str) {
        if kind == list::TAG {
            self.writer.end_element_named("term");
            self.newline();
        }
    }

    /// Handle `ListItemLeft` at `index`.
    pub(crate) fn begin_list_item(&mut self, text: &Text, index: usize, relative: NodeId) {
        match text.atoms()[index].string() {
            list::TAG => {
                self.writer.start_element("listitem");
                self.newline();
                // List items need a paragraph; open one unless the text does.
                if !match_ahead(text, index, AtomKind::ParaLeft) {
                    self.writer.start_element("para");
                    self.state.in_para = true;
                }
            }
            list::VALUE => {
                if !self.state.value_list.is_row_open() {
                    self.open_value_row("", None, relative);
                }
                if match_ahead(text, index, AtomKind::ListItemRight) {
                    self.writer.empty_element("td");
                    self.newline();
                    self.state.value_list.describe();
                } else {
                    self.writer.start_element("td");
                    self.newline();
                    self.state.value_list.open_cell();
                }
            }
            _ => {
                self.writer.start_element("listitem");
                self.newline();
            }
        }
    }

    /// Handle `ListItemRight`.
    pub(crate) fn end_list_item(&mut self, kind: &str) {
        match kind {
            list::TAG => {
                self.writer.end_element_named("varlistentry");
                self.newline();
                self.state.in_para = false;
            }
            list::VALUE => {
                if self.state.value_list.close_cell() {
                    self.writer.end_element_named("td");
                    self.newline();
                }
                self.close_value_row();
            }
            _ => {
                self.writer.end_element_named("listitem");
                self.newline();
            }
        }
    }

    /// Handle `ListRight`.
    pub(crate) fn end_list(&mut self, kind: &str) {
        if kind == list::VALUE {
            self.close_value_row();
        }
        self.writer.end_element_named(list_element(kind));
        self.newline();
    }

    /// Open a value table row with its constant and value cells.
    fn open_value_row(&mut self, label: &str, value: Option<&str>, relative: NodeId) {
        self.close_value_row();
        self.writer.start_element("tr");
        self.newline();
        self.writer.start_element("td");
        self.newline();
        self.writer.start_element("para");
        self.render_enum_value(label, relative);
        self.writer.end_element_named("para");
        self.newline();
        self.writer.end_element_named("td");
        self.newline();

        if self.state.value_list.shows_value() {
            self.writer.start_element("td");
            match value {
                Some(value) => self.writer.text_element("code", value),
                None => self.writer.characters("?"),
            }
            self.writer.end_element_named("td");
            self.newline();
        }
        self.state.value_list.open_row();
    }

    /// Close the open value row, adding an empty description cell if the
    /// row has none.
    fn close_value_row(&mut self) {
        let Some(described) = self.state.value_list.close_row() else {
            return;
        };
        if !described {
            self.writer.empty_element("td");
            self.newline();
        }
        self.writer.end_element_named("tr");
        self.newline();
    }

    /// Write an enum constant qualified by the scopes of its enum.
    fn render_enum_value(&mut self, value: &str, relative: NodeId) {
        let model = self.ctx.model;
        let node = model.node(relative);
        let Some(info) = node.enumeration() else {
            self.writer.characters(value);
            return;
        };

        let mut scopes = Vec::new();
        let mut current = node.parent;
        while let Some(id) = current {
            let scope = model.node(id);
            if scope.parent.is_none() || scope.name.is_empty() || scope.kind == NodeKind::HeaderFile
            {
                break;
            }
            scopes.push(id);
            current = scope.parent;
        }
        scopes.reverse();
        if info.is_scoped {
            scopes.push(relative);
        }

        self.writer.start_element("code");
        for scope in scopes {
            self.render_synopsis_name(scope, relative, true);
            self.writer.characters("::");
        }
        self.writer.characters(value);
        self.writer.end_element_named("code");
    }
}
