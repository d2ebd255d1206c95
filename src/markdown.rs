//! Markdown to HTML conversion for document bodies. Parsing is delegated to
//! [`pulldown_cmark`]; the event stream is adjusted on the way through so
//! that headings carry anchor ids and links leaving the site open in a new
//! tab.

use std::ops::Range;

use pulldown_cmark_escape::{escape_href, escape_html};
use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd,
};

/// Converts a markdown body into HTML. The result is trusted markup: nothing
/// is sanitized, so raw HTML in the source passes straight through.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_DEFINITION_LIST);

    let parser = Parser::new_ext(markdown, options).into_offset_iter();
    let events = with_heading_ids(markdown, parser.collect());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter().map(open_external_links));
    out
}

/// Builds the same-page anchor for a heading: lower-cased, spaces become
/// hyphens, and anything outside `[a-z0-9-]` is dropped.
///
/// ```
/// assert_eq!(inkpost::markdown::anchor("Step 1: Go!"), "step-1-go");
/// ```
pub fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        .collect()
}

/// Returns the text of an ATX heading line: the opening `#`s and an optional
/// closing sequence (`## Intro ##`) are removed, as markdown does.
pub fn atx_heading_text(line: &str) -> &str {
    let content = line.trim().trim_start_matches('#').trim();
    let unclosed = content.trim_end_matches('#');
    match unclosed.is_empty() || unclosed.ends_with([' ', '\t']) {
        true => unclosed.trim_end(),
        false => content,
    }
}

/// Escapes text for use in HTML content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html(&mut out, text).unwrap_or(());
    out
}

// Headings get an id from `anchor`. For `#` headings it is derived from the
// source line, the same text `document::section_headings` sees, so the
// in-page navigation links always land on the heading.
fn with_heading_ids<'a>(source: &str, events: Vec<(Event<'a>, Range<usize>)>) -> Vec<Event<'a>> {
    let mut out: Vec<Event<'a>> = Vec::with_capacity(events.len());
    for (i, (event, range)) in events.iter().enumerate() {
        let text = match event {
            Event::Start(Tag::Heading { id: None, .. }) => {
                let line = source[range.clone()].lines().next().unwrap_or("").trim_start();
                match line.starts_with('#') {
                    true => atx_heading_text(line).to_owned(),
                    false => heading_text(events[i + 1..].iter().map(|(ev, _)| ev)),
                }
            }
            _ => {
                out.push(event.clone());
                continue;
            }
        };
        let id = anchor(&text);
        match (event.clone(), id.is_empty()) {
            (Event::Start(Tag::Heading { level, classes, attrs, .. }), false) => {
                out.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(id)),
                    classes,
                    attrs,
                }))
            }
            (event, _) => out.push(event),
        }
    }
    out
}

fn heading_text<'e, 'a: 'e>(events: impl Iterator<Item = &'e Event<'a>>) -> String {
    let mut text = String::new();
    for ev in events {
        match ev {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(s) | Event::Code(s) => text.push_str(s),
            _ => {}
        }
    }
    text
}

fn open_external_links(ev: Event<'_>) -> Event<'_> {
    match ev {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        }) if !matches!(link_type, LinkType::Email) && !is_relative_link(&dest_url) => {
            let mut open = String::from(r#"<a href=""#);
            escape_href(&mut open, &dest_url).unwrap_or(());
            open.push('"');
            if !title.is_empty() {
                open.push_str(r#" title=""#);
                escape_html(&mut open, &title).unwrap_or(());
                open.push('"');
            }
            open.push_str(r#" target="_blank">"#);
            Event::InlineHtml(CowStr::from(open))
        }
        _ => ev,
    }
}

fn is_relative_link(link: &str) -> bool {
    link.is_empty()
        || link.starts_with('#')
        || (link.starts_with('/') && !link.starts_with("//"))
        || link.starts_with("./")
        || link.starts_with("../")
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("Step 1: Go!"), "step-1-go");
        assert_eq!(anchor("Getting Started"), "getting-started");
        assert_eq!(anchor("Ünïcode & stuff"), "ncode--stuff");
        assert_eq!(anchor(""), "");
    }

    #[test]
    fn test_heading_ids() {
        let html = to_html("## Getting Started\n\ntext\n");
        assert!(
            html.contains(r#"<h2 id="getting-started">Getting Started</h2>"#),
            "{}",
            html
        );
    }

    #[test]
    fn test_heading_id_matches_anchor_with_inline_code() {
        let html = to_html("## Using `cargo` today\n");
        assert!(html.contains(&format!(r#"id="{}""#, anchor("Using cargo today"))), "{}", html);
    }

    #[test]
    fn test_closing_sequence_is_not_part_of_id() {
        let html = to_html("## Intro ##\n### C# ###\n");
        assert!(html.contains(r#"<h2 id="intro">Intro</h2>"#), "{}", html);
        assert!(html.contains(r#"<h3 id="c">C#</h3>"#), "{}", html);
    }

    #[test]
    fn test_attribute_syntax_is_plain_text() {
        let html = to_html("## Setup {#custom}\n");
        assert!(
            html.contains(&format!(r#"<h2 id="{}">Setup {{#custom}}</h2>"#, anchor("Setup {#custom}"))),
            "{}",
            html
        );
    }

    #[test]
    fn test_setext_heading_id_from_text() {
        let html = to_html("Getting *Started*\n---\n");
        assert!(html.contains(r#"<h2 id="getting-started">"#), "{}", html);
    }

    #[test]
    fn test_atx_heading_text() {
        assert_eq!(atx_heading_text("## Intro ##"), "Intro");
        assert_eq!(atx_heading_text("## Intro\t#  "), "Intro");
        assert_eq!(atx_heading_text("## C#"), "C#");
        assert_eq!(atx_heading_text("## ###"), "");
        assert_eq!(atx_heading_text("##   Spaced  "), "Spaced");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"A <b>"x"</b> & y"#), "A &lt;b&gt;&quot;x&quot;&lt;/b&gt; &amp; y");
    }

    #[test]
    fn test_external_links_open_in_new_tab() {
        let html = to_html("[out](https://example.com/a?b=1&c=2 \"A \\\"t\\\"\")\n");
        assert!(
            html.contains(
                r#"<a href="https://example.com/a?b=1&amp;c=2" title="A &quot;t&quot;" target="_blank">out</a>"#
            ),
            "{}",
            html
        );
    }

    #[test]
    fn test_external_and_relative_hrefs_encoded_alike() {
        let html = to_html("[a](https://example.com/caf\u{e9}) [b](/caf\u{e9})\n");
        assert!(html.contains(r#"href="https://example.com/caf%C3%A9""#), "{}", html);
        assert!(html.contains(r#"href="/caf%C3%A9""#), "{}", html);
    }

    #[test]
    fn test_relative_links_untouched() {
        for link in ["/about", "#intro", "./x", "../y"] {
            let html = to_html(&format!("[here]({})\n", link));
            assert!(!html.contains("target="), "{}: {}", link, html);
        }
        let html = to_html("[proto](//cdn.example.com/x)\n");
        assert!(html.contains(r#"target="_blank""#), "{}", html);
    }

    #[test]
    fn test_raw_html_passes_through() {
        let html = to_html("<div class=\"note\">hi</div>\n");
        assert!(html.contains(r#"<div class="note">hi</div>"#), "{}", html);
    }
}
