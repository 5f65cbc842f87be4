//! Manual override workbook template.

use std::path::PathBuf;

use lf_components::{TemplateNames, write_template};
use lf_project::{Definition, RunConfig, SchematicCanvas};
use tracing::info;

use crate::error::AppResult;

/// Component names for each template sheet, in canvas order.
pub fn template_names(canvas: &dyn SchematicCanvas) -> TemplateNames {
    let names = |definitions: &[Definition]| -> Vec<String> {
        definitions
            .iter()
            .flat_map(|d| canvas.components(*d))
            .map(|c| c.display_name())
            .collect()
    };

    TemplateNames {
        trafo: names(&[Definition::Transformer]),
        gens: names(&[Definition::Source3, Definition::Source3Pu]),
        line: names(&[Definition::TLine, Definition::Cable]),
        load: names(&[Definition::FixedLoad]),
        cap_bank: names(&[Definition::Capacitor]),
    }
}

/// Write an empty override workbook into the configured override directory.
pub fn create_template(canvas: &dyn SchematicCanvas, config: &RunConfig) -> AppResult<Vec<PathBuf>> {
    let dir = canvas.project_dir().join(&config.override_dir);
    let written = write_template(&dir, &template_names(canvas))?;
    info!(dir = %dir.display(), sheets = written.len(), "override template created");
    Ok(written)
}
