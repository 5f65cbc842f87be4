//! lf-project: schematic snapshot format, canvas access and run configuration.

pub mod canvas;
pub mod config;
pub mod schema;
pub mod validate;

pub use canvas::{DocumentCanvas, SchematicCanvas};
pub use config::{Compiler, InitMode, MaxIteration, RunConfig};
pub use schema::*;
pub use validate::{ValidationError, validate_schematic};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown component id {id}")]
    UnknownComponent { id: u64 },

    #[error("Schematic build failed: {what}")]
    Build { what: String },

    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<SchematicDoc> {
    let content = std::fs::read_to_string(path)?;
    let doc: SchematicDoc = serde_yaml::from_str(&content)?;
    validate_schematic(&doc)?;
    Ok(doc)
}

pub fn save_yaml(path: &std::path::Path, doc: &SchematicDoc) -> ProjectResult<()> {
    validate_schematic(doc)?;
    let content = serde_yaml::to_string(doc)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<SchematicDoc> {
    let content = std::fs::read_to_string(path)?;
    let doc: SchematicDoc = serde_json::from_str(&content)?;
    validate_schematic(&doc)?;
    Ok(doc)
}

pub fn save_json(path: &std::path::Path, doc: &SchematicDoc) -> ProjectResult<()> {
    validate_schematic(doc)?;
    let content = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a schematic snapshot, choosing the format from the file extension.
pub fn load_schematic(path: &std::path::Path) -> ProjectResult<SchematicDoc> {
    match SnapshotFormat::from_path(path)? {
        SnapshotFormat::Yaml => load_yaml(path),
        SnapshotFormat::Json => load_json(path),
    }
}

/// Save a schematic snapshot, choosing the format from the file extension.
pub fn save_schematic(path: &std::path::Path, doc: &SchematicDoc) -> ProjectResult<()> {
    match SnapshotFormat::from_path(path)? {
        SnapshotFormat::Yaml => save_yaml(path, doc),
        SnapshotFormat::Json => save_json(path, doc),
    }
}

pub fn load_config(path: &std::path::Path) -> ProjectResult<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn save_config(path: &std::path::Path, config: &RunConfig) -> ProjectResult<()> {
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    fn from_path(path: &std::path::Path) -> ProjectResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ProjectError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}
