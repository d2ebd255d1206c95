//! Converts documents and the navigation tree into template [`Value`]s.
//!
//! `gtmpl` doesn't escape anything, so escaping happens here: metadata
//! strings become HTML-escaped text, slugs become escaped URL paths, and
//! only `Content` and `SectionLinks` carry markup.

use std::collections::HashMap;

use gtmpl::Value;
use pulldown_cmark_escape::escape_href;

use crate::document::Document;
use crate::markdown::{anchor, escape};
use crate::navigation::{Category, Navigation};

/// A document about to be rendered through the layout, together with the
/// navigation tree every page shows.
pub struct Page<'a> {
    /// The document being rendered.
    pub document: &'a Document,

    /// The navigation tree, already converted with `Value::from(&Navigation)`.
    pub navigation: &'a Value,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value::Object`] with the fields the
    /// layout expects: `Title`, `Content`, `Navigation`, `Headings`,
    /// `Description`, `SectionLinks`, `CurrentSlug`, `MetaDescription`,
    /// `MetaPropertyTitle`, `MetaPropertyDescription` and `MetaOgURL`.
    pub fn to_value(&self) -> Value {
        let doc = self.document;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), text(&doc.title));
        m.insert("Content".to_owned(), Value::String(doc.body.clone()));
        m.insert("Navigation".to_owned(), self.navigation.clone());
        m.insert(
            "Headings".to_owned(),
            Value::Array(doc.headings.iter().map(|h| text(h)).collect()),
        );
        m.insert("Description".to_owned(), text(&doc.description));
        m.insert(
            "SectionLinks".to_owned(),
            Value::String(section_links(&doc.headings)),
        );
        m.insert("CurrentSlug".to_owned(), path(&doc.slug));
        m.insert("MetaDescription".to_owned(), text(&doc.meta_description));
        m.insert(
            "MetaPropertyTitle".to_owned(),
            text(&doc.meta_property_title),
        );
        m.insert(
            "MetaPropertyDescription".to_owned(),
            text(&doc.meta_property_description),
        );
        m.insert("MetaOgURL".to_owned(), text(&doc.meta_og_url));
        Value::Object(m)
    }
}

/// Builds the in-page navigation list: one `<li>` linking to each heading's
/// anchor.
pub fn section_links(headings: &[String]) -> String {
    headings
        .iter()
        .map(|heading| {
            format!(r##"<li><a href="#{}">{}</a></li>"##, anchor(heading), escape(heading))
        })
        .collect()
}

fn text(s: &str) -> Value {
    Value::String(escape(s))
}

// A slug as it appears in an `href`: percent-encoded and attribute-safe.
fn path(slug: &str) -> Value {
    let mut out = String::with_capacity(slug.len());
    escape_href(&mut out, slug).unwrap_or(());
    Value::String(out)
}

impl From<&Navigation> for Value {
    /// Converts the navigation tree into a [`Value::Array`] of categories.
    fn from(navigation: &Navigation) -> Value {
        Value::Array(navigation.iter().map(Value::from).collect())
    }
}

impl From<&Category> for Value {
    /// Converts a [`Category`] into an object with `Name`, `Order` and
    /// `Pages`.
    fn from(category: &Category) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Name".to_owned(), text(&category.name));
        m.insert("Order".to_owned(), Value::from(category.order));
        m.insert(
            "Pages".to_owned(),
            Value::Array(category.pages.iter().map(entry).collect()),
        );
        Value::Object(m)
    }
}

// A sidebar entry carries only what a link needs, not the rendered body.
fn entry(doc: &Document) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Title".to_owned(), text(&doc.title));
    m.insert("Slug".to_owned(), path(&doc.slug));
    m.insert("Description".to_owned(), text(&doc.description));
    m.insert("Order".to_owned(), Value::from(doc.order));
    Value::Object(m)
}
