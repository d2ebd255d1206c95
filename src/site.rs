//! Exports [`Site`], which stitches together the startup steps: loading the
//! documents ([`crate::loader`]), resolving the landing page
//! ([`crate::landing`]), building the navigation tree
//! ([`crate::navigation`]), registering routes ([`crate::routes`]) and
//! loading templates ([`crate::templates`]). Everything is built once and
//! only read afterwards, so a [`Site`] can be shared by concurrent requests
//! without locking.

use gtmpl::Value;

use crate::config::Config;
use crate::document::Document;
use crate::landing::Landing;
use crate::loader::{self, load_documents};
use crate::navigation::Navigation;
use crate::routes::{Route, RouteTable};
use crate::templates::{self, Templates};

/// The fully loaded site.
pub struct Site {
    documents: Vec<Document>,
    landing: Landing,
    navigation: Navigation,
    navigation_value: Value,
    routes: RouteTable,
    templates: Templates,
}

/// The outcome of rendering a request path.
#[derive(Debug, PartialEq)]
pub enum Rendered {
    /// A document page.
    Page(String),

    /// The not-found page; nothing is registered at the path.
    NotFound(String),
}

impl Site {
    /// Builds the site described by `config`. Any unreadable or malformed
    /// document or template is an error; the landing and fallback files are
    /// the exception and degrade as described in [`Landing::resolve`].
    pub fn build(config: &Config) -> Result<Site> {
        let documents = load_documents(
            &config.content_directory,
            &[config.landing_file.as_str(), config.fallback_file.as_str()],
        )?;
        let landing = Landing::resolve(
            &config.content_directory,
            &config.landing_file,
            &config.fallback_file,
            &config.fallback_slug,
        );

        // The landing page has its own route but still gets a sidebar entry.
        let navigation = Navigation::build(documents.iter().chain(landing.navigation_document()));
        let navigation_value = Value::from(&navigation);
        let routes = RouteTable::build(&documents, &landing);
        let templates = Templates::load(&config.templates_directory)?;

        tracing::info!(
            documents = documents.len(),
            categories = navigation.len(),
            routes = routes.len(),
            landing = landing.path(),
            "site loaded"
        );

        Ok(Site {
            documents,
            landing,
            navigation,
            navigation_value,
            routes,
            templates,
        })
    }

    /// The path (without leading `/`) the root redirects to.
    pub fn landing_path(&self) -> &str {
        self.landing.path()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// The regular documents, not including the landing page.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Renders the page registered at `path`, or the not-found page when
    /// there is none. Fails when templating fails or `path` is the landing
    /// path and no landing document could be loaded.
    pub fn render(&self, path: &str) -> Result<Rendered> {
        let document = match self.routes.lookup(path) {
            Some(Route::Document(i)) => &self.documents[i],
            Some(Route::Landing) => self
                .landing
                .document()
                .ok_or_else(|| Error::LandingUnavailable(self.landing.path().to_owned()))?,
            None => return Ok(Rendered::NotFound(self.render_not_found()?)),
        };
        Ok(Rendered::Page(
            self.templates.render_page(document, &self.navigation_value)?,
        ))
    }

    /// Renders the not-found page.
    pub fn render_not_found(&self) -> Result<String> {
        Ok(self.templates.render_not_found(&self.navigation_value)?)
    }
}

/// The result of a fallible site operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building and rendering a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors loading documents.
    #[error(transparent)]
    Load(#[from] loader::Error),

    /// Returned for errors loading or executing templates.
    #[error(transparent)]
    Template(#[from] templates::Error),

    /// Returned when the landing path is requested but neither the landing
    /// nor the fallback document could be loaded.
    #[error("landing page `/{0}` is unavailable")]
    LandingUnavailable(String),
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::templates::{LAYOUT_TEMPLATE, NOT_FOUND_TEMPLATE, POST_TEMPLATE};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Lays out a small site in a temporary directory: templates, a static
    /// file, and the given markdown files.
    pub(crate) fn fixture(files: &[(&str, &str)]) -> (TempDir, Config) {
        let root = TempDir::new().unwrap();
        let content = root.path().join("markdown");
        let templates = root.path().join("templates");
        let statics = root.path().join("static");
        for dir in [&content, &templates, &statics] {
            fs::create_dir(dir).unwrap();
        }
        fs::write(
            templates.join(LAYOUT_TEMPLATE),
            concat!(
                r#"<title>{{ .Title }}</title>{{ $current := .CurrentSlug }}"#,
                r#"<nav>{{ range .Navigation }}[{{ .Name }}:{{ range .Pages }}"#,
                r#"{{ if eq .Slug $current }}*{{ end }}{{ .Slug }};{{ end }}]{{ end }}</nav>"#,
                r#"<main>{{ template "content" . }}</main>"#,
            ),
        )
        .unwrap();
        fs::write(
            templates.join(POST_TEMPLATE),
            r#"{{ define "content" }}<ul>{{ .SectionLinks }}</ul>{{ .Content }}{{ end }}"#,
        )
        .unwrap();
        fs::write(
            templates.join(NOT_FOUND_TEMPLATE),
            r#"{{ define "content" }}<h1>{{ .Title }}</h1>{{ end }}"#,
        )
        .unwrap();
        fs::write(statics.join("style.css"), "body { margin: 0 }").unwrap();
        for (name, contents) in files {
            fs::write(content.join(name), contents).unwrap();
        }

        let config = Config::rooted_at(root.path());
        (root, config)
    }

    fn build(files: &[(&str, &str)]) -> (TempDir, Site) {
        let (root, config) = fixture(files);
        let site = Site::build(&config).unwrap();
        (root, site)
    }

    fn page(rendered: Rendered) -> String {
        match rendered {
            Rendered::Page(html) => html,
            Rendered::NotFound(html) => panic!("unexpected not-found page: {}", html),
        }
    }

    #[test]
    fn test_navigation_includes_landing_page() -> Result<()> {
        let (_root, site) = build(&[
            ("about.md", "Title: About\nSlug: about-me\nParent: Intro\nOrder: 0\n---\nHello"),
            ("b.md", "Title: Second\nSlug: second\nParent: Guides\nOrder: 2\n---\n"),
            ("a.md", "Title: First\nSlug: first\nParent: Guides\nOrder: 1\n---\n## Setup\n"),
        ]);
        assert_eq!(site.landing_path(), "about-me");
        assert_eq!(site.documents().len(), 2);

        let names: Vec<&str> = site.navigation().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Intro", "Guides"]);
        let guides = &site.navigation().categories()[1];
        assert_eq!(guides.order, 1);

        let html = page(site.render("/first")?);
        assert!(html.contains("<title>First</title>"), "{}", html);
        assert!(html.contains("<nav>[Intro:about-me;][Guides:*first;second;]</nav>"), "{}", html);
        assert!(html.contains(r##"<li><a href="#setup">Setup</a></li>"##), "{}", html);

        let html = page(site.render("/about-me")?);
        assert!(html.contains("[Intro:*about-me;]"), "{}", html);
        Ok(())
    }

    #[test]
    fn test_unknown_and_blank_slug_paths_are_not_found() -> Result<()> {
        let (_root, site) = build(&[
            ("about.md", "Title: About\nSlug: about\n---\n"),
            ("hidden.md", "Title: hidden\nSlug:\n---\n"),
        ]);
        for path in ["/hidden", "/nope", "/hidden.md"] {
            match site.render(path)? {
                Rendered::NotFound(html) => assert!(html.contains("<h1>Page Not Found</h1>")),
                Rendered::Page(html) => panic!("{} rendered a page: {}", path, html),
            }
        }
        Ok(())
    }

    #[test]
    fn test_fallback_landing_page() -> Result<()> {
        let (_root, site) = build(&[
            ("about.md", "Title: About\nno delimiter here"),
            ("index.md", "Title: Home\nSlug: home\nParent: Intro\n---\nWelcome"),
        ]);
        assert_eq!(site.landing_path(), "about");
        assert!(site.navigation().is_empty());
        let html = page(site.render("/about")?);
        assert!(html.contains("<title>Home</title>"), "{}", html);
        assert!(html.contains("Welcome"), "{}", html);
        Ok(())
    }

    #[test]
    fn test_unavailable_landing_page() {
        let (_root, site) = build(&[]);
        assert_eq!(site.landing_path(), "about");
        assert!(matches!(
            site.render("/about"),
            Err(Error::LandingUnavailable(path)) if path == "about"
        ));
    }

    #[test]
    fn test_bad_document_fails_build() {
        let (_root, config) = fixture(&[("broken.md", "Title: Broken\n")]);
        assert!(matches!(Site::build(&config), Err(Error::Load(_))));
    }

    #[test]
    fn test_missing_templates_fail_build() {
        let (root, mut config) = fixture(&[]);
        config.templates_directory = Path::new(root.path()).join("elsewhere");
        assert!(matches!(Site::build(&config), Err(Error::Template(_))));
    }
}
