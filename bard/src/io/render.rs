//! Markdown to HTML rendering for finished drafts.
//!
//! Rendering uses pulldown-cmark with tables, strikethrough and task lists
//! enabled. On top of the parser's event stream this module derives heading
//! ids, links bare URLs and email addresses, and turns soft breaks into hard
//! ones. Heading text is kept verbatim; there is no `{#id}` attribute syntax.

use std::sync::LazyLock;

use pulldown_cmark::{
    CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use regex::Regex;

use crate::core::slug::HeadingIds;
use crate::core::template::fill_template;
use crate::error::ConfigError;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://|www\.)[^\s<>]+|[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+",
    )
    .expect("valid autolink pattern")
});

/// Characters never treated as the last character of a bare URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '\'', '"', '*', '_', '~'];

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render a markdown document to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();
    let events = assign_heading_ids(events);
    let events = link_bare_urls(events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        events.into_iter().map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        }),
    );
    out
}

/// Render `markdown` and place it into the template's `%s` placeholder.
pub fn render_document(markdown: &str, template: &str) -> Result<String, ConfigError> {
    fill_template(template, &markdown_to_html(markdown))
}

/// Give every heading an id derived from its text.
fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut ids = HeadingIds::new();
    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { .. })) {
            continue;
        }
        let derived = ids.derive(&heading_text(&events[i + 1..]));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(derived));
        }
    }
    events
}

/// Plain text of a heading, up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Turn bare `http(s)://` and `www.` URLs and email addresses in text into
/// links. Text inside links, images and code blocks is left alone.
fn link_bare_urls(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut opaque_depth = 0usize;
    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                opaque_depth += 1;
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                opaque_depth = opaque_depth.saturating_sub(1);
            }
            Event::Text(text) if opaque_depth == 0 && URL_RE.is_match(text) => {
                split_urls(text, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_urls(text: &str, out: &mut Vec<Event<'_>>) {
    let mut cursor = 0;
    for found in URL_RE.find_iter(text) {
        let start = found.start();
        let url = trim_url(found.as_str());
        let Some((link_type, dest)) = link_target(url, &text[..start]) else {
            continue;
        };
        let end = start + url.len();
        if start > cursor {
            out.push(Event::Text(CowStr::from(text[cursor..start].to_string())));
        }
        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(TagEnd::Link));
        cursor = end;
    }
    if cursor < text.len() {
        out.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

/// Link type and destination for a trimmed candidate, or `None` when it is
/// not a link. `www.` hosts must start a word and get an `http://` scheme;
/// email addresses need a dotted domain (the HTML writer adds `mailto:`).
fn link_target(url: &str, preceding: &str) -> Option<(LinkType, String)> {
    if let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    {
        return (!rest.is_empty()).then(|| (LinkType::Autolink, url.to_string()));
    }
    if url.starts_with("www.") {
        let starts_word = preceding
            .chars()
            .next_back()
            .is_none_or(|ch| !ch.is_alphanumeric());
        return (starts_word && url.len() > "www.".len())
            .then(|| (LinkType::Autolink, format!("http://{url}")));
    }
    let (local, domain) = url.split_once('@')?;
    let domain_ok = domain.contains('.') && !domain.ends_with('.') && !domain.ends_with('-');
    (!local.is_empty() && domain_ok).then(|| (LinkType::Email, url.to_string()))
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    loop {
        let trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_get_derived_ids() {
        let html = markdown_to_html("# The Beginning\n\ntext\n\n## A `coded` Turn");
        assert!(html.contains("<h1 id=\"the-beginning\">The Beginning</h1>"));
        assert!(html.contains("<h2 id=\"a-coded-turn\">"));
    }

    #[test]
    fn repeated_headings_get_numbered_ids() {
        let html = markdown_to_html("# Chapter\n\n# Chapter\n");
        assert!(html.contains("<h1 id=\"chapter\">"));
        assert!(html.contains("<h1 id=\"chapter-1\">"));
    }

    #[test]
    fn braces_in_headings_are_kept_as_text() {
        let html = markdown_to_html("# The {Lost} Key {Found}\n\n# Intro {#start}\n");
        assert!(html.contains("<h1 id=\"the-lost-key-found\">The {Lost} Key {Found}</h1>"));
        assert!(html.contains("<h1 id=\"intro-start\">Intro {#start}</h1>"));
    }

    #[test]
    fn extensions_render() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n- [ ] todo\n";
        let html = markdown_to_html(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn bare_urls_become_links() {
        let html = markdown_to_html("See https://example.com/path. Then stop.");
        assert!(html.contains(
            "<a href=\"https://example.com/path\">https://example.com/path</a>. Then stop."
        ));
    }

    #[test]
    fn www_hosts_link_with_http_scheme() {
        let html = markdown_to_html("Visit www.example.com/maps, or not.");
        assert!(html.contains(
            "Visit <a href=\"http://www.example.com/maps\">www.example.com/maps</a>, or not."
        ));
        assert!(!markdown_to_html("awww.example.com").contains("<a "));
    }

    #[test]
    fn email_addresses_become_mailto_links() {
        let html = markdown_to_html("Visit www.example.com or mail bard@example.com today.");
        assert!(html.contains("<a href=\"http://www.example.com\">www.example.com</a>"));
        assert!(html.contains("<a href=\"mailto:bard@example.com\">bard@example.com</a> today."));
        assert!(!markdown_to_html("user@localhost is local").contains("<a "));
    }

    #[test]
    fn urls_in_links_and_code_are_untouched() {
        let html = markdown_to_html(
            "[site](https://example.com) and `https://code.example`\n\n```\nhttps://block.example\n```\n",
        );
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://code.example</code>"));
        assert!(html.contains("https://block.example\n</code></pre>"));
    }

    #[test]
    fn unbalanced_paren_is_not_part_of_url() {
        assert_eq!(trim_url("https://x.org/a)."), "https://x.org/a");
        assert_eq!(
            trim_url("https://en.wikipedia.org/wiki/Rust_(language)"),
            "https://en.wikipedia.org/wiki/Rust_(language)"
        );
    }

    #[test]
    fn soft_breaks_render_as_hard_breaks() {
        let html = markdown_to_html("line one\nline two");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn document_is_wrapped_by_template() {
        let doc = render_document("# Hi", "<html><body>%s</body></html>").expect("render");
        assert!(doc.starts_with("<html><body><h1 id=\"hi\">Hi</h1>"));
        assert!(doc.ends_with("</body></html>"));
    }
}
