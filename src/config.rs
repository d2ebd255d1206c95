//! Process configuration. Defaults can be overridden by an optional
//! `inkpost.yaml` project file, and the binary applies command-line and
//! environment overrides (notably `PORT`) on top of that.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "inkpost.yaml";

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    content_directory: Option<PathBuf>,
    templates_directory: Option<PathBuf>,
    static_directory: Option<PathBuf>,
    static_url_prefix: Option<String>,
    landing_file: Option<String>,
    fallback_file: Option<String>,
    fallback_slug: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The directory holding the markdown documents.
    pub content_directory: PathBuf,

    /// The directory holding `layout.html`, `post.html` and `404.html`.
    pub templates_directory: PathBuf,

    /// The directory served under [`Config::static_url_prefix`].
    pub static_directory: PathBuf,

    /// URL prefix for static assets, e.g. `/static`.
    pub static_url_prefix: String,

    /// File name of the landing page inside the content directory.
    pub landing_file: String,

    /// File name of the page served when the landing file is unusable.
    pub fallback_file: String,

    /// Landing path used when the landing file is unusable or has a blank
    /// `Slug`.
    pub fallback_slug: String,

    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config::rooted_at(Path::new("."))
    }
}

impl Config {
    /// The default configuration with every directory relative to `root`.
    pub fn rooted_at(root: &Path) -> Config {
        Config {
            content_directory: root.join("markdown"),
            templates_directory: root.join("templates"),
            static_directory: root.join("static"),
            static_url_prefix: String::from("/static"),
            landing_file: String::from("about.md"),
            fallback_file: String::from("index.md"),
            fallback_slug: String::from("about"),
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }

    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    /// The first one found is loaded; with none found, the defaults relative
    /// to `dir` are used.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        match find_project_file(dir) {
            Some(path) => Config::from_project_file(&path),
            None => Ok(Config::rooted_at(dir)),
        }
    }

    /// Loads a project file. Relative paths in it are resolved against the
    /// directory containing the file.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Config::from_project(project, root)
    }

    fn from_project(project: Project, root: &Path) -> Result<Config> {
        let defaults = Config::rooted_at(root);
        let config = Config {
            content_directory: project
                .content_directory
                .map_or(defaults.content_directory, |p| root.join(p)),
            templates_directory: project
                .templates_directory
                .map_or(defaults.templates_directory, |p| root.join(p)),
            static_directory: project
                .static_directory
                .map_or(defaults.static_directory, |p| root.join(p)),
            static_url_prefix: project.static_url_prefix.unwrap_or(defaults.static_url_prefix),
            landing_file: project.landing_file.unwrap_or(defaults.landing_file),
            fallback_file: project.fallback_file.unwrap_or(defaults.fallback_file),
            fallback_slug: project.fallback_slug.unwrap_or(defaults.fallback_slug),
            host: project.host.unwrap_or(defaults.host),
            port: project.port.unwrap_or(defaults.port),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that would otherwise only fail once the server
    /// is running.
    pub fn validate(&self) -> Result<()> {
        if self.fallback_slug.trim().trim_start_matches('/').is_empty() {
            return Err(Error::Invalid(String::from("fallback_slug must not be empty")));
        }
        let prefix = self.static_url_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.contains('{') {
            return Err(Error::Invalid(format!(
                "static_url_prefix must be a path such as `/static`, got `{}`",
                self.static_url_prefix
            )));
        }
        Ok(())
    }
}

fn find_project_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|path| path.is_file())
}

/// The result of a fallible configuration operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the project file can't be opened.
    #[error("opening project file `{}`: {err}", .path.display())]
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML for a project.
    #[error("loading project file `{}`: {err}", .path.display())]
    Yaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned for settings that can't work.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
