//! Markup instructions produced by the comment parser.

use serde::{Deserialize, Serialize};

/// Kind of a single markup instruction.
///
/// Paired kinds (`*Left`/`*Right`) bracket a region of the atom stream.
/// The payload strings carried by an [`Atom`] depend on the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomKind {
    AnnotatedList,
    AutoLink,
    BaseName,
    #[serde(rename = "BR")]
    Br,
    BriefLeft,
    BriefRight,
    C,
    CaptionLeft,
    CaptionRight,
    Code,
    CodeBad,
    CodeNew,
    CodeOld,
    CodeQuoteArgument,
    CodeQuoteCommand,
    DetailsLeft,
    DetailsRight,
    DivLeft,
    DivRight,
    EndQmlText,
    ExampleFileLink,
    ExampleImageLink,
    FootnoteLeft,
    FootnoteRight,
    FormatElse,
    FormatEndif,
    FormatIf,
    FormattingLeft,
    FormattingRight,
    GeneratedList,
    #[serde(rename = "HR")]
    Hr,
    Image,
    ImageText,
    ImportantLeft,
    ImportantRight,
    InlineImage,
    JavaScript,
    Keyword,
    LegaleseLeft,
    LegaleseRight,
    LineBreak,
    Link,
    LinkNode,
    ListLeft,
    ListItemNumber,
    ListTagLeft,
    ListTagRight,
    ListItemLeft,
    ListItemRight,
    ListRight,
    NavAutoLink,
    NavLink,
    Nop,
    NoteLeft,
    NoteRight,
    ParaLeft,
    ParaRight,
    Qml,
    QmlText,
    QuotationLeft,
    QuotationRight,
    RawString,
    SectionLeft,
    SectionRight,
    SectionHeadingLeft,
    SectionHeadingRight,
    SidebarLeft,
    SidebarRight,
    SinceList,
    SinceTagLeft,
    SinceTagRight,
    SnippetCommand,
    SnippetIdentifier,
    SnippetLocation,
    String,
    TableLeft,
    TableRight,
    TableHeaderLeft,
    TableHeaderRight,
    TableRowLeft,
    TableRowRight,
    TableItemLeft,
    TableItemRight,
    TableOfContents,
    Target,
    UnhandledFormat,
    UnknownCommand,
    /// Any kind this version does not know about.
    #[serde(other)]
    Unknown,
}

/// Formatting names carried by `FormattingLeft`/`FormattingRight`.
pub mod formatting {
    pub const BOLD: &str = "bold";
    pub const INDEX: &str = "index";
    pub const ITALIC: &str = "italic";
    pub const LINK: &str = "link";
    pub const PARAMETER: &str = "parameter";
    pub const SUBSCRIPT: &str = "subscript";
    pub const SUPERSCRIPT: &str = "superscript";
    pub const TELETYPE: &str = "teletype";
    pub const UICONTROL: &str = "uicontrol";
    pub const UNDERLINE: &str = "underline";
}

/// List kinds carried by `ListLeft` and the list item atoms.
pub mod list {
    pub const BULLET: &str = "bullet";
    pub const TAG: &str = "tag";
    pub const VALUE: &str = "value";
    pub const LOWER_ALPHA: &str = "loweralpha";
    pub const LOWER_ROMAN: &str = "lowerroman";
    pub const NUMERIC: &str = "numeric";
    pub const UPPER_ALPHA: &str = "upperalpha";
    pub const UPPER_ROMAN: &str = "upperroman";
}

/// One instruction in a documentation [`Text`](crate::Text).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub kind: AtomKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strings: Vec<String>,
}

impl Atom {
    /// Create an atom without payload.
    #[must_use]
    pub fn new(kind: AtomKind) -> Self {
        Self {
            kind,
            strings: Vec::new(),
        }
    }

    /// Create an atom carrying one string.
    #[must_use]
    pub fn with_string(kind: AtomKind, string: impl Into<String>) -> Self {
        Self {
            kind,
            strings: vec![string.into()],
        }
    }

    /// Create an atom carrying several strings.
    #[must_use]
    pub fn with_strings<I, S>(kind: AtomKind, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// First payload string, or `""` when there is none.
    pub fn string(&self) -> &str {
        self.string_at(0)
    }

    /// Payload string at `index`, or `""` when out of range.
    pub fn string_at(&self, index: usize) -> &str {
        self.strings.get(index).map_or("", String::as_str)
    }

    /// Number of payload strings.
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Whether this atom has the given kind and first string.
    pub fn is(&self, kind: AtomKind, string: &str) -> bool {
        self.kind == kind && self.string() == string
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_defaults_to_empty() {
        let atom = Atom::new(AtomKind::ParaLeft);
        assert_eq!(atom.string(), "");
        assert_eq!(atom.string_at(3), "");
        assert_eq!(atom.count(), 0);
    }

    #[test]
    fn test_with_strings() {
        let atom = Atom::with_strings(AtomKind::TableLeft, ["80%", "borderless"]);
        assert_eq!(atom.string(), "80%");
        assert_eq!(atom.string_at(1), "borderless");
        assert_eq!(atom.count(), 2);
    }

    #[test]
    fn test_is() {
        let atom = Atom::with_string(AtomKind::FormattingLeft, formatting::BOLD);
        assert!(atom.is(AtomKind::FormattingLeft, "bold"));
        assert!(!atom.is(AtomKind::FormattingRight, "bold"));
        assert!(!atom.is(AtomKind::FormattingLeft, "italic"));
    }

    #[test]
    fn test_deserialize_known_kind() {
        let atom: Atom = serde_json::from_str(r#"{"kind":"String","strings":["Hello"]}"#).unwrap();
        assert_eq!(atom, Atom::with_string(AtomKind::String, "Hello"));
    }

    #[test]
    fn test_deserialize_short_names() {
        let atom: Atom = serde_json::from_str(r#"{"kind":"BR"}"#).unwrap();
        assert_eq!(atom.kind, AtomKind::Br);
    }

    #[test]
    fn test_deserialize_unknown_kind() {
        let atom: Atom = serde_json::from_str(r#"{"kind":"Teleport"}"#).unwrap();
        assert_eq!(atom.kind, AtomKind::Unknown);
    }
}
