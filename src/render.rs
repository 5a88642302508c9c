//! Markdown rendering and HTML sanitization.
//!
//! Rendering is done by comrak with the GitHub extensions enabled. Raw HTML in
//! the source is passed through by the renderer and left for ammonia to filter,
//! so the sanitizer is the only component deciding which markup survives.

use std::borrow::Cow;
use std::fmt;

use ammonia::Builder as AmmoniaBuilder;
use comrak::{markdown_to_html, Options};
use serde::Serialize;

/// An HTML fragment that has passed through [`sanitize`].
///
/// There is no public constructor: the only way to obtain one is to sanitize
/// markup, which lets the templater insert it without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn render_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;

    options.render.r#unsafe = true;

    options
}

/// Converts Markdown into unsanitized HTML.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so this
/// never fails.
pub fn render_markdown(input: &[u8]) -> String {
    let source = String::from_utf8_lossy(input);
    markdown_to_html(&source, &render_options())
}

fn ugc_policy() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    builder.add_tags(&["input"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.add_tag_attributes("code", &["class"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);

    builder.attribute_filter(|element, attribute, value| {
        match (element, attribute) {
            ("code", "class") => language_classes(value),
            ("input", "type") => (value == "checkbox").then_some(Cow::Borrowed(value)),
            _ => Some(Cow::Borrowed(value)),
        }
    });

    builder
}

// Only `language-*` classes survive on code blocks.
fn language_classes(value: &str) -> Option<Cow<'_, str>> {
    let kept: Vec<&str> = value
        .split_ascii_whitespace()
        .filter(|class| {
            class
                .strip_prefix("language-")
                .is_some_and(|lang| !lang.is_empty() && lang.chars().all(is_language_char))
        })
        .collect();

    match kept.len() {
        0 => None,
        _ if kept.join(" ") == value => Some(Cow::Borrowed(value)),
        _ => Some(Cow::Owned(kept.join(" "))),
    }
}

fn is_language_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.')
}

/// Strips active content from an HTML fragment using a user-generated-content
/// policy.
///
/// The result is deterministic, and sanitizing it again yields the same bytes.
pub fn sanitize(html: &str) -> SafeHtml {
    SafeHtml(ugc_policy().clean(html).to_string())
}

/// Renders Markdown and sanitizes the result in one step.
pub fn render_safe(input: &[u8]) -> SafeHtml {
    sanitize(&render_markdown(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    #[test]
    fn renders_heading_and_strong_emphasis() {
        let html = render_markdown(b"# Title\n\nHello **world**");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>world</strong>"));

        let safe = sanitize(&html);
        assert!(safe.as_str().contains("<h1>Title</h1>"));
        assert!(safe.as_str().contains("<strong>world</strong>"));
    }

    #[test]
    fn renders_gfm_tables_and_strikethrough() {
        let html = render_safe(b"| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n");
        assert!(html.as_str().contains("<table>"));
        assert!(html.as_str().contains("<td>1</td>"));
        assert!(html.as_str().contains("<del>gone</del>"));
    }

    #[test]
    fn invalid_utf8_does_not_fail() {
        let html = render_safe(b"# Caf\xe9\n");
        assert!(html.as_str().starts_with("<h1>Caf"));
    }

    #[rstest]
    #[case::script_tag("<script>alert(1)</script>\n\nafter", "<script")]
    #[case::script_body("<script>alert(1)</script>\n\nafter", "alert(1)")]
    #[case::event_handler("<p onclick=\"steal()\">click</p>", "onclick")]
    #[case::style_tag("<style>body { display: none }</style>\n\ntext", "<style")]
    #[case::javascript_url("[x](javascript:alert(1))", "javascript:")]
    #[case::iframe("<iframe src=\"https://example.com\"></iframe>", "<iframe")]
    fn strips_active_content(#[case] markdown: &str, #[case] forbidden: &str) {
        let html = render_safe(markdown.as_bytes());
        assert!(
            !html.as_str().contains(forbidden),
            "{forbidden:?} survived in {html}"
        );
    }

    #[test]
    fn links_are_kept_with_safe_rel() {
        let html = render_safe(b"[docs](https://example.com/docs)");
        assert!(html.as_str().contains("href=\"https://example.com/docs\""));
        assert!(html.as_str().contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn code_language_class_is_kept() {
        let html = render_safe(b"```rust\nfn main() {}\n```\n");
        assert!(html.as_str().contains("class=\"language-rust\""));
    }

    #[test]
    fn arbitrary_code_classes_are_dropped() {
        let html = sanitize("<pre><code class=\"evil language-rust\">x</code></pre>");
        assert_snapshot!(html.as_str(), @r#"<pre><code class="language-rust">x</code></pre>"#);

        let html = sanitize("<pre><code class=\"evil\">x</code></pre>");
        assert_snapshot!(html.as_str(), @"<pre><code>x</code></pre>");
    }

    #[test]
    fn rendering_is_deterministic() {
        let input = b"# Doc\n\n- one\n- [x] two\n\n<b onmouseover=\"x()\">bold</b>\n";
        assert_eq!(render_safe(input), render_safe(input));
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let input = b"# Doc\n\n[link](https://example.com) and `code`\n\n- [ ] task\n\n<div onclick=\"x\">raw</div>\n";
        let once = render_safe(input);
        let twice = sanitize(once.as_str());
        assert_eq!(once, twice);
    }
}
