//! Maps request paths to the documents served there. One generic handler
//! consults the table instead of registering a handler per document.

use std::collections::HashMap;

use crate::document::Document;
use crate::landing::Landing;

/// What a path resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// The document at this index of the slice the table was built from.
    Document(usize),

    /// The landing page.
    Landing,
}

/// Path to [`Route`] lookup table. Paths are stored without a leading `/`.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Registers every document at its slug and the landing page at its
    /// resolved path. Documents with a blank slug aren't reachable and are
    /// only logged. When two documents share a slug the later one replaces
    /// the earlier; the landing page replaces any document at its path.
    pub fn build(documents: &[Document], landing: &Landing) -> RouteTable {
        let mut routes = HashMap::with_capacity(documents.len() + 1);
        for (i, doc) in documents.iter().enumerate() {
            let path = normalize(&doc.slug);
            if path.is_empty() {
                tracing::warn!(
                    title = %doc.title,
                    "document has an empty slug and will not be accessible via a unique URL"
                );
                continue;
            }
            if let Some(Route::Document(previous)) = routes.insert(path.to_owned(), Route::Document(i)) {
                tracing::warn!(
                    path,
                    replaced = %documents[previous].title,
                    by = %doc.title,
                    "duplicate slug"
                );
            }
        }

        if let Some(Route::Document(previous)) = routes.insert(landing.path().to_owned(), Route::Landing) {
            tracing::warn!(
                path = landing.path(),
                replaced = %documents[previous].title,
                "document slug collides with the landing page"
            );
        }

        RouteTable { routes }
    }

    /// Looks up a request path. A single leading `/` is ignored.
    pub fn lookup(&self, path: &str) -> Option<Route> {
        self.routes.get(path.strip_prefix('/').unwrap_or(path)).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }
}

fn normalize(slug: &str) -> &str {
    slug.trim().trim_start_matches('/')
}
