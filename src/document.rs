//! Defines the [`Document`] type and the logic for parsing one from the raw
//! contents of a source file. A source file looks like this:
//!
//! ```md
//! Title: Hello, world!
//! Slug: hello
//! Parent: Guides
//! Order: 2
//! ---
//! ## Intro
//!
//! Body goes here.
//! ```
//!
//! Everything above the `---` line is metadata (`Key: value` lines),
//! everything below it is the markdown body.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::markdown;

/// The `Order` used when a document doesn't declare one (or declares
/// something that isn't an integer). It pushes such documents to the end of
/// their category.
pub const ORDER_SENTINEL: i64 = 9999;

const DELIMITER: &str = "---";

static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\w+):[ \t]*(.*)$").unwrap());

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##[ \t]+.*$").unwrap());

/// A single page parsed from a source file. Every field is filled in by
/// [`Document::parse`] and never changes afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// The page title, also used for the navigation entry.
    pub title: String,

    /// The URL path segment the page is served at.
    pub slug: String,

    /// The name of the navigation category the page belongs to. Empty means
    /// the page has no navigation entry.
    pub parent: String,

    /// The body rendered as HTML.
    pub body: String,

    /// Short strap-line shown under the title.
    pub description: String,

    /// Sort position inside the category; [`ORDER_SENTINEL`] if absent.
    pub order: i64,

    /// The text of every level-2 heading in the body, in order.
    pub headings: Vec<String>,

    /// Description for search engines.
    pub meta_description: String,

    /// Title for social sharing.
    pub meta_property_title: String,

    /// Summary for social sharing.
    pub meta_property_description: String,

    /// Canonical URL for social sharing.
    pub meta_og_url: String,
}

impl Document {
    /// Parses a [`Document`] from the contents of a source file. Fails only
    /// when there is no `---` delimiter line; missing metadata keys become
    /// empty strings and a missing or malformed `Order` becomes
    /// [`ORDER_SENTINEL`].
    pub fn parse(input: &str) -> Result<Document, Error> {
        let input = input.replace('\r', "");
        let (metadata, body) = split(&input).ok_or(Error::MissingDelimiter)?;
        let fields = metadata_fields(metadata);
        let field = |key: &str| fields.get(key).map(|v| v.to_string()).unwrap_or_default();

        Ok(Document {
            title: field("Title"),
            slug: field("Slug"),
            parent: field("Parent"),
            body: markdown::to_html(body),
            description: field("Description"),
            order: parse_order(fields.get("Order").copied()),
            headings: section_headings(body),
            meta_description: field("MetaDescription"),
            meta_property_title: field("MetaPropertyTitle"),
            meta_property_description: field("MetaPropertyDescription"),
            meta_og_url: field("MetaOgURL"),
        })
    }
}

// Splits on the first line consisting of the delimiter alone. Returns the
// text before that line and the text after it.
fn split(input: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        if line.trim() == DELIMITER {
            return Some((&input[..offset], &input[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

// Later duplicates overwrite earlier ones.
fn metadata_fields(metadata: &str) -> HashMap<&str, &str> {
    METADATA_LINE
        .captures_iter(metadata)
        .filter_map(|c| {
            let key = c.get(1)?.as_str();
            let value = c.get(2)?.as_str().trim();
            Some((key, value))
        })
        .collect()
}

fn parse_order(value: Option<&str>) -> i64 {
    match value {
        None => ORDER_SENTINEL,
        Some(value) => match value.trim().parse::<i64>() {
            Ok(order) => order,
            Err(err) => {
                tracing::warn!(value, error = %err, "invalid Order, using {}", ORDER_SENTINEL);
                ORDER_SENTINEL
            }
        },
    }
}

/// Returns the text of every line of `body` that starts with `##` followed
/// by whitespace. `#`, `###` and `##Text` lines are not section headings. A
/// closing `#` sequence is not part of the text.
pub fn section_headings(body: &str) -> Vec<String> {
    SECTION_HEADING
        .find_iter(body)
        .map(|m| markdown::atx_heading_text(m.as_str()).to_owned())
        .collect()
}

/// Represents an error parsing a [`Document`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Returned when the source has no `---` line separating metadata from
    /// the body.
    #[error("invalid format: missing `{}` line between metadata and body", DELIMITER)]
    MissingDelimiter,
}
