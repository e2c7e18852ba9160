use crate::annotation::Annotation;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid annotations in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a document and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Load annotations stored as a JSON array
pub fn load_annotations(path: &Path) -> Result<Vec<Annotation>, IoError> {
    let content = read_file(path)?;
    parse_annotations(&content).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_annotations(json: &str) -> Result<Vec<Annotation>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Write annotations as a pretty-printed JSON array
pub fn save_annotations(path: &Path, annotations: &[Annotation]) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    let json = serde_json::to_string_pretty(annotations).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(IoError::Io)
}
