//! Ordered atom sequences.

use serde::{Deserialize, Serialize};

use crate::atom::{Atom, AtomKind};

/// One documentation body, brief or see-also entry.
///
/// Atoms are addressed by index; renderers walk them with a cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text {
    atoms: Vec<Atom>,
}

impl Text {
    /// Create an empty text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text holding a single string atom.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            atoms: vec![Atom::with_string(AtomKind::String, text)],
        }
    }

    /// Append an atom.
    #[must_use]
    pub fn with(mut self, atom: Atom) -> Self {
        self.atoms.push(atom);
        self
    }

    /// Append an atom in place.
    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Concatenated strings of the textual atoms.
    ///
    /// Only `String`, `AutoLink` and `C` atoms contribute.
    pub fn plain_text(&self) -> String {
        self.atoms
            .iter()
            .filter(|atom| {
                matches!(
                    atom.kind,
                    AtomKind::String | AtomKind::AutoLink | AtomKind::C
                )
            })
            .map(Atom::string)
            .collect()
    }

    /// Atoms in `start..end`, clamped to the sequence.
    #[must_use]
    pub fn subtext(&self, start: usize, end: usize) -> Text {
        let end = end.min(self.atoms.len());
        let start = start.min(end);
        Text {
            atoms: self.atoms[start..end].to_vec(),
        }
    }

    /// Heading of the section opened at `section_left`.
    ///
    /// Returns the atoms between the next `SectionHeadingLeft` and its
    /// `SectionHeadingRight`. The text is empty when the heading is
    /// unterminated or the next section starts first.
    #[must_use]
    pub fn section_heading(&self, section_left: usize) -> Text {
        let from = (section_left + 1).min(self.atoms.len());
        let Some(offset) = self.atoms[from..]
            .iter()
            .take_while(|atom| atom.kind != AtomKind::SectionLeft)
            .position(|atom| atom.kind == AtomKind::SectionHeadingLeft)
        else {
            return Text::new();
        };
        let begin = from + offset + 1;
        match self.atoms[begin..]
            .iter()
            .position(|atom| atom.kind == AtomKind::SectionHeadingRight)
        {
            Some(len) => self.subtext(begin, begin + len),
            None => Text::new(),
        }
    }

    /// Plain text of every section heading in this text.
    pub fn section_titles(&self) -> Vec<String> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.kind == AtomKind::SectionLeft)
            .map(|(index, _)| self.section_heading(index).plain_text())
            .collect()
    }
}

impl From<Vec<Atom>> for Text {
    fn from(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }
}

impl FromIterator<Atom> for Text {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}
