//! Anchor identifiers and the per-document anchor registry.

use std::collections::HashMap;

/// Convert a title into an anchor identifier.
///
/// ASCII letters are lower-cased, letters and digits are kept, and every run
/// of other characters becomes a single `-`. Leading and trailing dashes are
/// dropped.
///
/// # Example
///
/// ```
/// use dbk_renderer::canonical_title;
///
/// assert_eq!(canonical_title("Getting Started!"), "getting-started");
/// assert_eq!(canonical_title("QWidget::show()"), "qwidget-show");
/// ```
pub fn canonical_title(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut dash_appended = false;
    let mut begun = false;
    let mut last_alnum = 0;

    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            result.push(c);
            dash_appended = false;
            begun = true;
            last_alnum = result.len();
        } else if !dash_appended {
            if begun {
                result.push('-');
            }
            dash_appended = true;
        }
    }
    result.truncate(last_alnum);
    result
}

/// Keep letters, digits, `-`, `_` and `.`; replace everything else by `-`.
pub(crate) fn clean_ref(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Anchors registered while rendering one document.
///
/// Registration is flat: a repeated identifier is recorded and reported but
/// not rewritten. [`unique`](Self::unique) is available for generated anchors
/// that must not collide.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    attempts: Vec<String>,
    counts: HashMap<String, usize>,
}

impl AnchorRegistry {
    /// Record `id`, returning `true` when it was not registered before.
    pub fn register(&mut self, id: &str) -> bool {
        self.attempts.push(id.to_owned());
        let count = self.counts.entry(id.to_owned()).or_default();
        *count += 1;
        if *count > 1 {
            tracing::warn!(anchor = id, "duplicate anchor in document");
        }
        *count == 1
    }

    /// Register a cleaned form of `name`, appending `x` until it is unused.
    pub fn unique(&mut self, name: &str) -> String {
        let mut id = clean_ref(name);
        while self.contains(&id) {
            id.push('x');
        }
        self.register(&id);
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.counts.contains_key(id)
    }

    /// Every registration, in order, including repeats.
    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    /// Identifiers registered more than once, sorted.
    pub fn collisions(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.attempts.clear();
        self.counts.clear();
    }
}
