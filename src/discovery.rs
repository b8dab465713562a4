use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use walkdir::WalkDir;

/// Extension of schema fragment files.
pub const SCHEMA_EXTENSION: &str = "graphql";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Failed to read schema file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to walk schema directory '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("No .graphql files found under '{}'", path.display())]
    NoFragments { path: PathBuf },
}

/// Where schema text comes from: one file, or a directory of fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File(PathBuf),
    Directory(PathBuf),
}

/// Schema text ready for extraction, with the files it was assembled from.
#[derive(Debug, Clone)]
pub struct AssembledSchema {
    /// Display name used for diagnostics.
    pub name: String,
    pub text: String,
    pub fragments: Vec<PathBuf>,
}

impl SchemaSource {
    /// Classifies `path` by what is on disk: directories assemble, anything else is read.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            SchemaSource::Directory(path)
        } else {
            SchemaSource::File(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SchemaSource::File(path) | SchemaSource::Directory(path) => path,
        }
    }

    pub fn load(&self) -> Result<AssembledSchema, AssemblyError> {
        match self {
            SchemaSource::File(path) => Ok(AssembledSchema {
                name: path.display().to_string(),
                text: read_fragment(path)?,
                fragments: vec![path.clone()],
            }),
            SchemaSource::Directory(root) => assemble_directory(root),
        }
    }
}

/// Recursively scans a directory for `.graphql` files.
///
/// The returned list is sorted so that fragments always merge in the same order.
pub fn discover_schema_files(root: &Path) -> Result<Vec<PathBuf>, AssemblyError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| AssemblyError::Walk {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() || !is_schema_file(entry.path()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Merges every fragment under `root` into one SDL text, separated by blank lines.
pub fn assemble_directory(root: &Path) -> Result<AssembledSchema, AssemblyError> {
    let fragments = discover_schema_files(root)?;
    if fragments.is_empty() {
        return Err(AssemblyError::NoFragments {
            path: root.to_path_buf(),
        });
    }

    let mut text = String::new();
    for fragment in &fragments {
        tracing::debug!(fragment = %fragment.display(), "merging schema fragment");
        let content = read_fragment(fragment)?;
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(content.trim_end());
    }
    text.push('\n');

    Ok(AssembledSchema {
        name: root.display().to_string(),
        text,
        fragments,
    })
}

fn is_schema_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SCHEMA_EXTENSION)
}

fn read_fragment(path: &Path) -> Result<String, AssemblyError> {
    fs::read_to_string(path).map_err(|source| AssemblyError::Read {
        path: path.to_path_buf(),
        source,
    })
}
