//! Loads the site's templates and renders pages through them.
//!
//! Templates use Go's `text/template` syntax (via [`gtmpl`]). The templates
//! directory holds a shared `layout.html`, which pulls the page body in with
//! `{{ template "content" . }}`, plus one file per page kind that defines
//! `content`: `post.html` for documents and `404.html` for unknown paths.
//! Each page kind is parsed from the layout followed by its own file.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use gtmpl::{Context, Template, Value};

use crate::document::Document;
use crate::page::Page;

pub const LAYOUT_TEMPLATE: &str = "layout.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

/// Title given to the not-found page.
pub const NOT_FOUND_TITLE: &str = "Page Not Found";

/// The parsed templates for every page kind.
pub struct Templates {
    post: Template,
    not_found: Template,
}

impl Templates {
    /// Loads and parses the templates in `dir`. Fails if any file is missing
    /// or malformed.
    pub fn load(dir: &Path) -> Result<Templates> {
        let layout = dir.join(LAYOUT_TEMPLATE);
        Ok(Templates {
            post: parse_template([&layout, &dir.join(POST_TEMPLATE)].iter())?,
            not_found: parse_template([&layout, &dir.join(NOT_FOUND_TEMPLATE)].iter())?,
        })
    }

    /// Renders a document through the post template.
    pub fn render_page(&self, document: &Document, navigation: &Value) -> Result<String> {
        render(&self.post, Page { document, navigation }.to_value())
    }

    /// Renders the not-found page. It goes through the same layout as
    /// documents, so the sidebar is still shown.
    pub fn render_not_found(&self, navigation: &Value) -> Result<String> {
        let document = Document {
            title: NOT_FOUND_TITLE.to_owned(),
            ..Document::default()
        };
        render(&self.not_found, Page { document: &document, navigation }.to_value())
    }
}

fn render(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value).map_err(Error::Execute)?;
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &context).map_err(Error::Execute)?;
    Ok(String::from_utf8(out)?)
}

// Loads the template file contents, concatenates them, and parses the result
// into a template with the `dict` function available.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|err| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err,
            })?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.add_func("dict", dict);
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Template function turning alternating key/value arguments into an
/// object, e.g. `{{ template "entry" dict "Page" . "Current" $current }}`.
pub fn dict(args: &[Value]) -> std::result::Result<Value, String> {
    if args.len() % 2 != 0 {
        return Err(format!("dict: odd number of arguments ({})", args.len()));
    }
    let mut m: HashMap<String, Value> = HashMap::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        match &pair[0] {
            Value::String(key) => {
                m.insert(key.clone(), pair[1].clone());
            }
            other => return Err(format!("dict: keys must be strings, got {:?}", other)),
        }
    }
    Ok(Value::Object(m))
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while reading template files.
    #[error("opening template file '{}': {err}", .path.display())]
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    #[error("parsing template: {0}")]
    ParseTemplate(String),

    /// Returned for errors while executing a template.
    #[error("executing template: {0}")]
    Execute(String),

    /// Returned when a template produced invalid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}
