//! Access to a schematic canvas.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::schema::{Definition, SchematicComponent, SchematicDoc};
use crate::{ProjectError, ProjectResult, load_schematic, save_schematic};

/// Automation surface of the schematic tool.
///
/// The load-flow pipeline only reads components by definition, writes
/// parameters back, triggers a project build and saves.
pub trait SchematicCanvas {
    /// Project name, used to locate the build folder.
    fn project_name(&self) -> &str;

    /// Directory holding the project and its build folders.
    fn project_dir(&self) -> &Path;

    /// All components with the given definition, in canvas order.
    fn components(&self, definition: Definition) -> Vec<&SchematicComponent>;

    fn component(&self, id: u64) -> Option<&SchematicComponent>;

    /// Overwrite (or add) parameters on one component.
    fn set_parameters(&mut self, id: u64, values: &[(&str, String)]) -> ProjectResult<()>;

    /// Build the project so solver-side text outputs are up to date.
    fn build(&mut self) -> ProjectResult<()>;

    fn save(&mut self) -> ProjectResult<()>;
}

/// Canvas backed by a YAML/JSON snapshot on disk.
///
/// `build()` runs an optional external command in the project directory.
#[derive(Debug, Clone)]
pub struct DocumentCanvas {
    path: PathBuf,
    dir: PathBuf,
    doc: SchematicDoc,
    build_command: Option<Vec<String>>,
}

impl DocumentCanvas {
    /// Load a snapshot file.
    pub fn open(path: impl Into<PathBuf>) -> ProjectResult<Self> {
        let path = path.into();
        let doc = load_schematic(&path)?;
        Ok(Self::from_doc(path, doc))
    }

    /// Wrap an in-memory snapshot that will be saved to `path`.
    pub fn from_doc(path: impl Into<PathBuf>, doc: SchematicDoc) -> Self {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path,
            dir,
            doc,
            build_command: None,
        }
    }

    /// Program and arguments to run on `build()`.
    pub fn with_build_command(mut self, command: Vec<String>) -> Self {
        self.build_command = (!command.is_empty()).then_some(command);
        self
    }

    pub fn doc(&self) -> &SchematicDoc {
        &self.doc
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchematicCanvas for DocumentCanvas {
    fn project_name(&self) -> &str {
        &self.doc.name
    }

    fn project_dir(&self) -> &Path {
        &self.dir
    }

    fn components(&self, definition: Definition) -> Vec<&SchematicComponent> {
        self.doc
            .components
            .iter()
            .filter(|c| c.definition == definition)
            .collect()
    }

    fn component(&self, id: u64) -> Option<&SchematicComponent> {
        self.doc.components.iter().find(|c| c.id == id)
    }

    fn set_parameters(&mut self, id: u64, values: &[(&str, String)]) -> ProjectResult<()> {
        let comp = self
            .doc
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ProjectError::UnknownComponent { id })?;
        for (key, value) in values {
            comp.parameters.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn build(&mut self) -> ProjectResult<()> {
        let Some((program, args)) = self.build_command.as_ref().and_then(|c| c.split_first())
        else {
            warn!(project = %self.doc.name, "no build command configured, using existing build output");
            return Ok(());
        };

        info!(%program, project = %self.doc.name, "building schematic project");
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| ProjectError::Build {
                what: format!("failed to start '{program}': {e}"),
            })?;

        if !output.status.success() {
            return Err(ProjectError::Build {
                what: format!(
                    "'{program}' exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }

    fn save(&mut self) -> ProjectResult<()> {
        save_schematic(&self.path, &self.doc)?;
        info!(path = %self.path.display(), "schematic saved");
        Ok(())
    }
}
