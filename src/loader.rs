//! Reads every document in a content directory.

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use crate::document::{self, Document};

/// Source files are recognized by this extension.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Searches `dir` for document files (extension = `.md`) and parses each of
/// them, skipping the file names listed in `excluded`. The first file that
/// can't be read or parsed aborts the whole load. The result follows the
/// directory listing order, which is unspecified; callers sort as needed.
pub fn load_documents(dir: &Path, excluded: &[&str]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let entries = read_dir(dir).map_err(|err| Error::ReadDirectory {
        path: dir.to_owned(),
        err,
    })?;

    for result in entries {
        let entry = result.map_err(|err| Error::ReadDirectory {
            path: dir.to_owned(),
            err,
        })?;
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if !file_name.ends_with(MARKDOWN_EXTENSION) || excluded.iter().any(|name| *name == file_name) {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        documents.push(load_document(&entry.path())?);
    }

    tracing::debug!(directory = %dir.display(), count = documents.len(), "loaded documents");
    Ok(documents)
}

/// Reads and parses a single document file.
pub fn load_document(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::ReadFile {
        path: path.to_owned(),
        err,
    })?;
    Document::parse(&contents).map_err(|err| Error::Parse {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading documents from disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the content directory can't be listed.
    #[error("reading directory `{}`: {err}", .path.display())]
    ReadDirectory { path: PathBuf, err: std::io::Error },

    /// Returned when a document file can't be read.
    #[error("reading `{}`: {err}", .path.display())]
    ReadFile { path: PathBuf, err: std::io::Error },

    /// Returned when a document file is malformed.
    #[error("parsing `{}`: {err}", .path.display())]
    Parse { path: PathBuf, err: document::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_load_documents_skips_special_and_foreign_files() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write(&dir, "one.md", "Title: One\nSlug: one\n---\nbody");
        write(&dir, "two.md", "Title: Two\nSlug: two\n---\nbody");
        write(&dir, "about.md", "Title: About\n---\n");
        write(&dir, "index.md", "no delimiter, but never parsed");
        write(&dir, "notes.txt", "not a document");
        fs::create_dir(dir.path().join("drafts.md")).unwrap();

        let mut titles: Vec<String> = load_documents(dir.path(), &["about.md", "index.md"])?
            .into_iter()
            .map(|d| d.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["One", "Two"]);
        Ok(())
    }

    #[test]
    fn test_load_documents_fails_fast_on_bad_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "good.md", "Title: Good\n---\n");
        write(&dir, "bad.md", "Title: Bad\n");

        match load_documents(dir.path(), &[]) {
            Err(Error::Parse { path, err }) => {
                assert!(path.ends_with("bad.md"));
                assert_eq!(err, document::Error::MissingDelimiter);
            }
            other => panic!("expected parse error, got {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn test_load_documents_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_documents(&missing, &[]),
            Err(Error::ReadDirectory { .. })
        ));
    }
}
