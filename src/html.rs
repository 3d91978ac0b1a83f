//! Small helpers for assembling escaped HTML fragments.
//!
//! Every `render` implementation goes through these so that ids, labels,
//! placeholders, and values are escaped exactly once.

use std::fmt::Write;

/// Escape text content (element bodies, labels).
pub(crate) fn text(input: &str) -> String {
    htmlize::escape_text(input).into_owned()
}

/// Append ` name="value"` with the value attribute-escaped.
pub(crate) fn attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, htmlize::escape_attribute(value));
}

/// Append ` name="value"` only when the value is non-empty.
pub(crate) fn attr_opt(out: &mut String, name: &str, value: &str) {
    if !value.is_empty() {
        attr(out, name, value);
    }
}

/// Append a bare boolean attribute (`required`, `checked`, ...) when set.
pub(crate) fn flag(out: &mut String, name: &str, on: bool) {
    if on {
        let _ = write!(out, " {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_escapes_quotes() {
        let mut out = String::new();
        attr(&mut out, "value", "a\"b");
        assert_eq!(out, " value=\"a&quot;b\"", "quotes must be escaped in attributes");
    }

    #[test]
    fn test_attr_opt_skips_empty() {
        let mut out = String::new();
        attr_opt(&mut out, "style", "");
        assert!(out.is_empty(), "empty attributes should not be emitted");
    }

    #[test]
    fn test_text_escapes_markup() {
        assert_eq!(text("<b>&"), "&lt;b&gt;&amp;");
    }
}
