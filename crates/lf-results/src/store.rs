//! Result workbook storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lf_solver::{Network, PowerFlowResults};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::types::{ExportManifest, ExportStage};
use crate::{ResultsError, ResultsResult};

pub const RESULT_DIR: &str = "loadflow_result";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct ResultStore {
    root_dir: PathBuf,
}

impl ResultStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Workbook directory next to the schematic file.
    pub fn for_schematic(schematic_path: &Path) -> ResultsResult<Self> {
        let dir = schematic_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "schematic path has no parent directory".to_string(),
            })?;
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        Self::new(dir.join(RESULT_DIR))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root_dir.join(format!("{table}.csv"))
    }

    /// Write every network table and, after a solve, every result table.
    ///
    /// Result tables from an earlier export are removed when the network
    /// carries no results, so a failed re-run never shows stale values.
    pub fn export(&self, network: &Network, stage: ExportStage) -> ResultsResult<ExportManifest> {
        let mut tables = BTreeMap::new();

        self.write_table("bus", &network.bus, &mut tables)?;
        self.write_table("line", &network.line, &mut tables)?;
        self.write_table("trafo", &network.trafo, &mut tables)?;
        self.write_table("load", &network.load, &mut tables)?;
        self.write_table("gen", &network.gens, &mut tables)?;
        self.write_table("ext_grid", &network.ext_grid, &mut tables)?;
        self.write_table("shunt", &network.shunt, &mut tables)?;

        match &network.results {
            Some(results) => self.write_results(results, &mut tables)?,
            None => self.clear_results()?,
        }

        let manifest = ExportManifest {
            stage,
            timestamp: chrono::Utc::now().to_rfc3339(),
            f_hz: network.f_hz,
            sn_mva: network.sn_mva,
            tables,
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(self.root_dir.join(MANIFEST_FILE), json)?;

        info!(
            dir = %self.root_dir.display(),
            stage = ?stage,
            tables = manifest.tables.len(),
            "result workbook written"
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self) -> ResultsResult<ExportManifest> {
        let path = self.root_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(ResultsError::NotExported {
                dir: self.root_dir.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read one exported table back into typed rows.
    pub fn read_table<T: DeserializeOwned>(&self, table: &str) -> ResultsResult<Vec<T>> {
        let csv_error = |source| ResultsError::Csv {
            table: table.to_string(),
            source,
        };
        let mut reader = csv::Reader::from_path(self.table_path(table)).map_err(csv_error)?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(csv_error)
    }

    fn write_results(
        &self,
        results: &PowerFlowResults,
        tables: &mut BTreeMap<String, usize>,
    ) -> ResultsResult<()> {
        self.write_table("res_bus", &results.res_bus, tables)?;
        self.write_table("res_line", &results.res_line, tables)?;
        self.write_table("res_trafo", &results.res_trafo, tables)?;
        self.write_table("res_load", &results.res_load, tables)?;
        self.write_table("res_gen", &results.res_gen, tables)?;
        self.write_table("res_ext_grid", &results.res_ext_grid, tables)?;
        self.write_table("res_shunt", &results.res_shunt, tables)?;
        Ok(())
    }

    fn clear_results(&self) -> ResultsResult<()> {
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            let is_result = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("res_") && n.ends_with(".csv"));
            if is_result {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn write_table<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        tables: &mut BTreeMap<String, usize>,
    ) -> ResultsResult<()> {
        let csv_error = |source| ResultsError::Csv {
            table: table.to_string(),
            source,
        };
        let mut writer = csv::Writer::from_path(self.table_path(table)).map_err(csv_error)?;
        for row in rows {
            writer.serialize(row).map_err(csv_error)?;
        }
        writer.flush()?;
        tables.insert(table.to_string(), rows.len());
        Ok(())
    }
}
