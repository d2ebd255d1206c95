//! Resolves the landing page: the document the root path redirects to.
//!
//! The landing file is tried first; its `Slug` becomes the landing path. If
//! it can't be read or parsed, the fallback file is served under the fixed
//! fallback path instead. Resolution happens once at startup and is never
//! retried.

use std::path::Path;

use crate::document::Document;
use crate::loader::load_document;

/// Where the landing page's content came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    /// The landing file parsed successfully.
    Primary(Document),

    /// The landing file was unusable; the fallback file is served instead.
    Fallback(Document),

    /// Neither file was usable. Requests for the landing path fail.
    Unavailable,
}

/// The resolved landing page.
#[derive(Clone, Debug, PartialEq)]
pub struct Landing {
    path: String,
    source: Source,
}

impl Landing {
    /// Reads `landing_file` from `dir` and falls back to `fallback_file`
    /// when that fails. `fallback_slug` is the landing path whenever the
    /// landing file isn't used or declares a blank `Slug`.
    pub fn resolve(dir: &Path, landing_file: &str, fallback_file: &str, fallback_slug: &str) -> Landing {
        match load_document(&dir.join(landing_file)) {
            Ok(document) => {
                let slug = document.slug.trim().trim_start_matches('/');
                let path = match slug.is_empty() {
                    true => fallback_slug.to_owned(),
                    false => slug.to_owned(),
                };
                tracing::info!(file = landing_file, path = %path, "resolved landing page");
                return Landing {
                    path,
                    source: Source::Primary(document),
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "landing page unusable, falling back to `{}`", fallback_file);
            }
        }

        let source = match load_document(&dir.join(fallback_file)) {
            Ok(document) => Source::Fallback(document),
            Err(err) => {
                tracing::error!(error = %err, "fallback landing page unusable");
                Source::Unavailable
            }
        };
        Landing {
            path: fallback_slug.to_owned(),
            source,
        }
    }

    /// The path (without leading `/`) the root redirects to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The document to render at [`Landing::path`], if any.
    pub fn document(&self) -> Option<&Document> {
        match &self.source {
            Source::Primary(document) | Source::Fallback(document) => Some(document),
            Source::Unavailable => None,
        }
    }

    /// The landing document that takes part in navigation. Only a landing
    /// file that resolved normally gets a sidebar entry.
    pub fn navigation_document(&self) -> Option<&Document> {
        match &self.source {
            Source::Primary(document) => Some(document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn resolve(dir: &TempDir) -> Landing {
        Landing::resolve(dir.path(), "about.md", "index.md", "about")
    }

    #[test]
    fn test_primary_uses_declared_slug() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.md"), "Title: Me\nSlug: who-am-i \n---\n").unwrap();
        let landing = resolve(&dir);
        assert_eq!(landing.path(), "who-am-i");
        assert_eq!(landing.document().map(|d| d.title.as_str()), Some("Me"));
        assert!(landing.navigation_document().is_some());
    }

    #[test]
    fn test_primary_blank_slug_uses_fallback_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.md"), "Title: Me\nSlug:   \n---\n").unwrap();
        let landing = resolve(&dir);
        assert_eq!(landing.path(), "about");
        assert!(landing.navigation_document().is_some());
    }

    #[test]
    fn test_malformed_primary_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.md"), "Title: Me\nSlug: me\n").unwrap();
        fs::write(dir.path().join("index.md"), "Title: Home\nSlug: home\n---\nhi").unwrap();
        let landing = resolve(&dir);
        assert_eq!(landing.path(), "about");
        assert_eq!(landing.document().map(|d| d.title.as_str()), Some("Home"));
        assert!(landing.navigation_document().is_none());
    }

    #[test]
    fn test_missing_everything_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let landing = resolve(&dir);
        assert_eq!(landing.path(), "about");
        assert!(landing.navigation_document().is_none());
        assert!(landing.document().is_none());
    }
}
