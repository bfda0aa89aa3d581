//! Per-document render state.
//!
//! One [`RenderState`] is created when a document is opened and dropped
//! with it, so flags never leak from one document into the next.

use crate::anchor::AnchorRegistry;
use crate::sections::SectionStack;

/// Tracks whether a link element is open. Links never nest.
#[derive(Debug, Default)]
pub struct LinkState {
    open: bool,
}

impl LinkState {
    pub fn begin(&mut self) {
        self.open = true;
    }

    /// Mark the link closed, returning whether one was open.
    pub fn end(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// State for tracking table rendering.
#[derive(Debug, Default)]
pub struct TableState {
    /// Whether cells are header cells.
    in_header: bool,
    /// Rows written in the current table.
    rows: usize,
}

impl TableState {
    pub fn start(&mut self) {
        self.in_header = false;
        self.rows = 0;
    }

    pub fn start_header(&mut self) {
        self.in_header = true;
    }

    pub fn end_header(&mut self) {
        self.in_header = false;
    }

    pub fn start_row(&mut self) {
        self.rows += 1;
    }

    pub fn is_in_header(&self) -> bool {
        self.in_header
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// State for value lists rendered as tables.
#[derive(Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValueListState {
    /// At least one item has a description.
    three_column: bool,
    /// The value column is shown (enum context and three-column).
    show_value: bool,
    /// A row was opened by a tag and not closed yet.
    row_open: bool,
    /// The open row already has its description cell.
    described: bool,
    /// A description cell is open.
    cell_open: bool,
}

impl ValueListState {
    pub fn start(&mut self, three_column: bool, is_enum: bool) {
        *self = Self {
            three_column,
            show_value: three_column && is_enum,
            ..Self::default()
        };
    }

    pub fn is_three_column(&self) -> bool {
        self.three_column
    }

    pub fn shows_value(&self) -> bool {
        self.show_value
    }

    pub fn open_row(&mut self) {
        self.row_open = true;
        self.described = false;
    }

    pub fn is_row_open(&self) -> bool {
        self.row_open
    }

    /// Record that the open row got its description cell.
    pub fn describe(&mut self) {
        self.described = true;
    }

    /// Mark the row closed. Returns `None` when no row was open, otherwise
    /// whether it already had a description cell.
    pub fn close_row(&mut self) -> Option<bool> {
        if !std::mem::replace(&mut self.row_open, false) {
            return None;
        }
        Some(std::mem::replace(&mut self.described, false))
    }

    pub fn open_cell(&mut self) {
        self.cell_open = true;
        self.described = true;
    }

    /// Mark the description cell closed, returning whether one was open.
    pub fn close_cell(&mut self) -> bool {
        std::mem::replace(&mut self.cell_open, false)
    }
}

/// Everything the interpreter mutates while rendering one document.
#[derive(Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderState {
    pub link: LinkState,
    pub table: TableState,
    pub value_list: ValueListState,
    pub sections: SectionStack,
    pub anchors: AnchorRegistry,
    /// Level of the last section opened; 1 is the document title.
    pub section_level: i32,
    /// A paragraph opened by `ParaLeft` is still open.
    pub in_para: bool,
    /// Rendering a table of contents entry.
    pub in_contents: bool,
    /// Rendering the title of a section.
    pub in_section_heading: bool,
    /// The unknown-atom diagnostic was already reported.
    pub unknown_reported: bool,
}

impl RenderState {
    /// Reset the inline flags before rendering a new text.
    ///
    /// Sections and anchors are document-wide and are left untouched.
    pub fn start_text(&mut self) {
        self.link = LinkState::default();
        self.table = TableState::default();
        self.value_list = ValueListState::default();
        self.in_contents = false;
        self.in_section_heading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_end_when_closed() {
        let mut link = LinkState::default();
        assert!(!link.end());
        link.begin();
        assert!(link.is_open());
        assert!(link.end());
        assert!(!link.is_open());
    }

    #[test]
    fn test_table_header_flag() {
        let mut table = TableState::default();
        table.start();
        table.start_header();
        assert!(table.is_in_header());
        table.end_header();
        assert!(!table.is_in_header());
        table.start_row();
        table.start_row();
        assert_eq!(table.rows(), 2);
        table.start();
        assert_eq!(table.rows(), 0);
    }

    #[test]
    fn test_value_column_needs_enum_and_descriptions() {
        let mut list = ValueListState::default();
        list.start(true, true);
        assert!(list.shows_value());
        list.start(true, false);
        assert!(!list.shows_value());
        list.start(false, true);
        assert!(!list.shows_value());
        assert!(!list.is_three_column());
    }

    #[test]
    fn test_value_cell_tracking() {
        let mut list = ValueListState::default();
        assert!(!list.close_cell());
        list.open_row();
        list.open_cell();
        assert!(list.close_cell());
        assert!(!list.close_cell());
        assert_eq!(list.close_row(), Some(true));
        assert_eq!(list.close_row(), None);
    }

    #[test]
    fn test_value_row_without_description() {
        let mut list = ValueListState::default();
        list.start(true, true);
        list.open_row();
        assert!(list.is_row_open());
        assert_eq!(list.close_row(), Some(false));
        list.open_row();
        list.describe();
        assert_eq!(list.close_row(), Some(true));
    }

    #[test]
    fn test_start_text_keeps_document_state() {
        let mut state = RenderState::default();
        state.link.begin();
        state.in_section_heading = true;
        state.anchors.register("intro");
        state.sections.enter(2);
        state.start_text();
        assert!(!state.link.is_open());
        assert!(!state.in_section_heading);
        assert!(state.anchors.contains("intro"));
        assert_eq!(state.sections.levels(), &[2]);
    }
}
