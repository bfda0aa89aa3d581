//! Code snippet handling.

use std::sync::LazyLock;

use regex::Regex;

/// Highlighting markup such as `<@type>` and `</@type>`.
static CODE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?@[^>]*>").expect("invalid code markup regex"));

/// Turns marked-up code snippets into the text written to the output.
///
/// Snippets arrive already highlighted by the comment parser; DocBook output
/// only needs their plain text.
pub trait CodeMarker {
    /// Return `code` without highlighting markup.
    fn plain_code(&self, code: &str) -> String;
}

/// Strips `<@tag>` markup and decodes the basic entities.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCodeMarker;

impl CodeMarker for PlainCodeMarker {
    fn plain_code(&self, code: &str) -> String {
        CODE_MARKUP
            .replace_all(code, "")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_code_strips_markup() {
        let code = "<@type>int</@type> <@func target=\"x\">x</@func>();";
        assert_eq!(PlainCodeMarker.plain_code(code), "int x();");
    }

    #[test]
    fn test_plain_code_decodes_entities() {
        assert_eq!(
            PlainCodeMarker.plain_code("a &lt; b &amp;&amp; c &gt; d"),
            "a < b && c > d"
        );
    }

    #[test]
    fn test_plain_code_amp_decoded_last() {
        assert_eq!(PlainCodeMarker.plain_code("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_plain_code_unmarked() {
        assert_eq!(PlainCodeMarker.plain_code("x <= 1"), "x <= 1");
    }
}
