//! Streaming XML writer with manual newlines.
//!
//! Start tags stay open until the next content is written so that attributes
//! can be added after [`XmlWriter::start_element`]. Every element name is
//! counted on open and on close, which lets callers check that a document is
//! balanced once it has been flushed.

use std::collections::BTreeMap;

use quick_xml::errors::IllFormedError;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// DocBook namespace, bound to the `db` prefix.
pub const DOCBOOK_NAMESPACE: &str = "http://docbook.org/ns/docbook";
/// XLink namespace, bound to the `xlink` prefix.
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

const ELEMENT_PREFIX: &str = "db:";

/// Per-element open/close counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementBalance {
    opened: BTreeMap<String, usize>,
    closed: BTreeMap<String, usize>,
}

impl ElementBalance {
    fn open(&mut self, name: &str) {
        *self.opened.entry(name.to_owned()).or_default() += 1;
    }

    fn close(&mut self, name: &str) {
        *self.closed.entry(name.to_owned()).or_default() += 1;
    }

    /// Number of times `name` (without prefix) was opened.
    pub fn opened(&self, name: &str) -> usize {
        self.opened.get(name).copied().unwrap_or(0)
    }

    /// Number of times `name` (without prefix) was closed.
    pub fn closed(&self, name: &str) -> usize {
        self.closed.get(name).copied().unwrap_or(0)
    }

    pub fn is_balanced(&self) -> bool {
        self.unbalanced().is_empty()
    }

    /// Elements whose open and close counts differ, as `(name, opened, closed)`.
    pub fn unbalanced(&self) -> Vec<(String, usize, usize)> {
        self.opened
            .keys()
            .chain(self.closed.keys())
            .filter(|name| self.opened(name) != self.closed(name))
            .map(|name| (name.clone(), self.opened(name), self.closed(name)))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingTag {
    None,
    Start,
    Empty,
}

/// XML writer producing a DocBook document into a string buffer.
pub struct XmlWriter {
    out: String,
    stack: Vec<String>,
    pending: PendingTag,
    balance: ElementBalance,
}

impl XmlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(8192),
            stack: Vec::new(),
            pending: PendingTag::None,
            balance: ElementBalance::default(),
        }
    }

    /// Write the XML declaration.
    pub fn start_document(&mut self) {
        self.out
            .push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    }

    /// Open `name` in the DocBook namespace.
    pub fn start_element(&mut self, name: &str) {
        self.finish_pending();
        self.out.push('<');
        self.out.push_str(ELEMENT_PREFIX);
        self.out.push_str(name);
        self.stack.push(name.to_owned());
        self.balance.open(name);
        self.pending = PendingTag::Start;
    }

    /// Write `<name/>`; attributes may follow until the next content.
    pub fn empty_element(&mut self, name: &str) {
        self.finish_pending();
        self.out.push('<');
        self.out.push_str(ELEMENT_PREFIX);
        self.out.push_str(name);
        self.balance.open(name);
        self.balance.close(name);
        self.pending = PendingTag::Empty;
    }

    /// Add an attribute to the element just started.
    ///
    /// Ignored when the start tag has already been closed by content.
    pub fn attribute(&mut self, name: &str, value: &str) {
        if self.pending == PendingTag::None {
            tracing::debug!(attribute = name, "attribute written after element content");
            return;
        }
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape(value));
        self.out.push('"');
    }

    /// Declare a namespace prefix on the element just started.
    pub fn namespace(&mut self, prefix: &str, uri: &str) {
        self.attribute(&format!("xmlns:{prefix}"), uri);
    }

    /// Write escaped character data.
    pub fn characters(&mut self, text: &str) {
        self.finish_pending();
        self.out.push_str(&partial_escape(text));
    }

    /// Write `<name>text</name>`.
    pub fn text_element(&mut self, name: &str, text: &str) {
        self.start_element(name);
        self.characters(text);
        self.end_element();
    }

    pub fn newline(&mut self) {
        self.finish_pending();
        self.out.push('\n');
    }

    /// Close the innermost open element.
    ///
    /// Returns `false` without writing anything when no element is open.
    pub fn end_element(&mut self) -> bool {
        let Some(name) = self.stack.pop() else {
            tracing::debug!("end_element with no open element");
            return false;
        };
        if self.pending == PendingTag::Start {
            self.out.push_str("/>");
            self.pending = PendingTag::None;
        } else {
            self.finish_pending();
            self.out.push_str("</");
            self.out.push_str(ELEMENT_PREFIX);
            self.out.push_str(&name);
            self.out.push('>');
        }
        self.balance.close(&name);
        true
    }

    /// Close elements up to and including the innermost open `name`.
    ///
    /// Returns `false` without writing anything when `name` is not open.
    pub fn end_element_named(&mut self, name: &str) -> bool {
        let Some(position) = self.stack.iter().rposition(|open| open == name) else {
            tracing::debug!(element = name, "closing element that is not open");
            return false;
        };
        let forced = self.stack.len() - position - 1;
        if forced > 0 {
            tracing::debug!(element = name, forced, "closing unterminated inner elements");
        }
        while self.stack.len() > position {
            self.end_element();
        }
        true
    }

    /// Close up to the innermost open element whose name is in `names`.
    pub fn end_element_any(&mut self, names: &[&str]) -> bool {
        let innermost = self
            .stack
            .iter()
            .rev()
            .find(|open| names.contains(&open.as_str()))
            .cloned();
        match innermost {
            Some(name) => self.end_element_named(&name),
            None => false,
        }
    }

    /// Close every open element, returning how many were closed.
    pub fn close_all(&mut self) -> usize {
        let count = self.stack.len();
        while self.end_element() {}
        count
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.stack.iter().any(|open| open == name)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Innermost open element.
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn balance(&self) -> &ElementBalance {
        &self.balance
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the writer, returning the output and element counts.
    pub fn finish(mut self) -> (String, ElementBalance) {
        self.finish_pending();
        (self.out, self.balance)
    }

    fn finish_pending(&mut self) {
        match self.pending {
            PendingTag::None => {}
            PendingTag::Start => self.out.push('>'),
            PendingTag::Empty => self.out.push_str("/>"),
        }
        self.pending = PendingTag::None;
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `xml` and return its number of elements.
///
/// # Errors
///
/// Returns the parser error when the document is not well-formed.
pub fn check_well_formed(xml: &str) -> Result<usize, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut open = Vec::new();
    let mut elements = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                elements += 1;
            }
            Event::Empty(_) => elements += 1,
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    match open.pop() {
        Some(name) => Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name))),
        None => Ok(elements),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_attributes_after_start() {
        let mut w = XmlWriter::new();
        w.start_element("link");
        w.attribute("xlink:href", "a.xml#b");
        w.characters("text");
        w.end_element();
        assert_eq!(w.as_str(), r#"<db:link xlink:href="a.xml#b">text</db:link>"#);
    }

    #[test]
    fn test_empty_content_self_closes() {
        let mut w = XmlWriter::new();
        w.start_element("td");
        w.end_element();
        assert_eq!(w.as_str(), "<db:td/>");
    }

    #[test]
    fn test_empty_element_with_attribute() {
        let mut w = XmlWriter::new();
        w.empty_element("anchor");
        w.attribute("xml:id", "intro");
        w.newline();
        assert_eq!(w.as_str(), "<db:anchor xml:id=\"intro\"/>\n");
        assert!(w.balance().is_balanced());
    }

    #[test]
    fn test_escaping() {
        let mut w = XmlWriter::new();
        w.start_element("para");
        w.attribute("role", r#"a"b<c"#);
        w.characters("x < y && \"z\"");
        w.end_element();
        assert_eq!(
            w.as_str(),
            r#"<db:para role="a&quot;b&lt;c">x &lt; y &amp;&amp; "z"</db:para>"#
        );
    }

    #[test]
    fn test_attribute_after_content_is_ignored() {
        let mut w = XmlWriter::new();
        w.start_element("para");
        w.characters("x");
        w.attribute("role", "late");
        w.end_element();
        assert_eq!(w.as_str(), "<db:para>x</db:para>");
    }

    #[test]
    fn test_end_element_when_nothing_open() {
        let mut w = XmlWriter::new();
        assert!(!w.end_element());
        assert_eq!(w.as_str(), "");
    }

    #[test]
    fn test_end_element_named_closes_inner() {
        let mut w = XmlWriter::new();
        w.start_element("itemizedlist");
        w.start_element("listitem");
        w.start_element("para");
        w.characters("x");
        assert!(w.end_element_named("itemizedlist"));
        assert_eq!(
            w.as_str(),
            "<db:itemizedlist><db:listitem><db:para>x</db:para></db:listitem></db:itemizedlist>"
        );
        assert_eq!(w.depth(), 0);
        assert!(w.balance().is_balanced());
    }

    #[test]
    fn test_end_element_named_not_open() {
        let mut w = XmlWriter::new();
        w.start_element("para");
        assert!(!w.end_element_named("table"));
        assert_eq!(w.depth(), 1);
    }

    #[test]
    fn test_end_element_any_picks_innermost() {
        let mut w = XmlWriter::new();
        w.start_element("tr");
        w.start_element("th");
        w.start_element("para");
        assert!(w.end_element_any(&["td", "th"]));
        assert_eq!(w.current(), Some("tr"));
        assert!(!w.end_element_any(&["td", "th"]));
    }

    #[test]
    fn test_close_all_balances() {
        let mut w = XmlWriter::new();
        w.start_element("article");
        w.start_element("section");
        w.start_element("para");
        assert!(!w.balance().is_balanced());
        assert_eq!(w.close_all(), 3);
        let (xml, balance) = w.finish();
        assert!(balance.is_balanced());
        assert_eq!(balance.opened("section"), 1);
        assert_eq!(check_well_formed(&xml).unwrap(), 3);
    }

    #[test]
    fn test_unbalanced_report() {
        let mut w = XmlWriter::new();
        w.start_element("section");
        w.start_element("title");
        w.end_element();
        assert_eq!(w.balance().unbalanced(), vec![("section".to_owned(), 1, 0)]);
    }

    #[test]
    fn test_check_well_formed_rejects_mismatch() {
        assert!(check_well_formed("<a><b></a></b>").is_err());
        assert!(check_well_formed("<a><b/>").is_err());
        assert_eq!(check_well_formed("<a><b/></a>").unwrap(), 2);
    }
}
