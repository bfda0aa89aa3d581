//! Section nesting.
//!
//! Sections carry no explicit end: a section at level `L` closes every open
//! section at level `L` or deeper, and whatever remains is closed when the
//! text or document ends. `SectionRight` atoms are ignored.

use dbk_model::Text;

use crate::anchor::canonical_title;
use crate::document::Document;

/// Stack of open section levels, strictly increasing from bottom to top.
#[derive(Debug, Default)]
pub struct SectionStack {
    levels: Vec<i32>,
}

impl SectionStack {
    /// Enter a section at `level`.
    ///
    /// Pops every level `>= level`, pushes `level` and returns the number of
    /// popped levels, i.e. the number of containers the caller must close.
    pub fn enter(&mut self, level: i32) -> usize {
        let mut popped = 0;
        while self.levels.last().is_some_and(|top| *top >= level) {
            self.levels.pop();
            popped += 1;
        }
        self.levels.push(level);
        popped
    }

    /// Pop everything, returning how many levels were open.
    pub fn drain(&mut self) -> usize {
        let count = self.levels.len();
        self.levels.clear();
        count
    }

    pub fn levels(&self) -> &[i32] {
        &self.levels
    }

    /// Innermost open level, or 1 for the document title.
    pub fn current_level(&self) -> i32 {
        self.levels.last().copied().unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Document<'_> {
    /// Handle `SectionLeft` at atom `index`; `level` includes the offset.
    ///
    /// Level 1 belongs to the document title and opens nothing.
    pub(crate) fn begin_section(&mut self, text: &Text, index: usize, level: i32) {
        self.state.in_section_heading = false;
        if level <= 1 {
            self.state.section_level = level;
            return;
        }
        self.state.section_level = level;
        let popped = self.state.sections.enter(level);
        for _ in 0..popped {
            self.close_section();
        }

        let heading = text.section_heading(index).plain_text();
        let id = canonical_title(&heading);
        self.writer.start_element("section");
        if !id.is_empty() {
            self.state.anchors.register(&id);
            self.writer.attribute("xml:id", &id);
        }
        self.writer.newline();
    }

    /// Handle `SectionHeadingLeft`.
    pub(crate) fn begin_section_heading(&mut self) {
        if self.state.section_level > 1 {
            self.writer.start_element("title");
            self.state.in_section_heading = true;
        }
    }

    /// Handle `SectionHeadingRight`.
    pub(crate) fn end_section_heading(&mut self) {
        if self.state.section_level > 1 && self.state.in_section_heading {
            self.writer.end_element_named("title");
            self.writer.newline();
        }
        self.state.in_section_heading = false;
    }

    /// Close every section opened by the body text.
    pub(crate) fn close_text_sections(&mut self) {
        for _ in 0..self.state.sections.drain() {
            self.close_section();
        }
    }

    fn close_section(&mut self) {
        if self.writer.end_element_named("section") {
            self.writer.newline();
        }
    }
}
