//! Manual override workbook.
//!
//! The workbook is a directory with one CSV sheet per component type:
//! `trafo.csv`, `gen.csv`, `line.csv`, `load.csv` and `cap_bank.csv`. Each
//! sheet has a `Name` column keyed by component name; every other cell is
//! optional. Missing sheets, rows and empty cells never fail a run; they fall
//! back to the values derived from the schematic.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ComponentError, ComponentResult};

/// One row type of the workbook.
pub trait OverrideRow: Serialize + DeserializeOwned {
    /// Sheet (file stem) name.
    const SHEET: &'static str;
    /// Column headers, in template order.
    const HEADERS: &'static [&'static str];

    fn name(&self) -> &str;

    /// A row carrying only the component name.
    fn blank(name: &str) -> Self;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafoOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(default)]
    pub hv_bus: Option<String>,
    #[serde(default)]
    pub lv_bus: Option<String>,
    #[serde(default)]
    pub tap_step_percent: Option<f64>,
    #[serde(default)]
    pub tap_step_degree: Option<f64>,
    #[serde(default)]
    pub tap_pos: Option<f64>,
    #[serde(default)]
    pub tap_neutral: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bus", default)]
    pub bus: Option<String>,
    #[serde(default)]
    pub max_q_mvar: Option<f64>,
    #[serde(default)]
    pub min_q_mvar: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(default)]
    pub max_i_ka: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bus", default)]
    pub bus: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapBankOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bus", default)]
    pub bus: Option<String>,
}

impl OverrideRow for TrafoOverride {
    const SHEET: &'static str = "trafo";
    const HEADERS: &'static [&'static str] = &[
        "Name",
        "hv_bus",
        "lv_bus",
        "tap_step_percent",
        "tap_step_degree",
        "tap_pos",
        "tap_neutral",
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl OverrideRow for GenOverride {
    const SHEET: &'static str = "gen";
    const HEADERS: &'static [&'static str] = &["Name", "Bus", "max_q_mvar", "min_q_mvar"];

    fn name(&self) -> &str {
        &self.name
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl OverrideRow for LineOverride {
    const SHEET: &'static str = "line";
    const HEADERS: &'static [&'static str] = &["Name", "max_i_ka"];

    fn name(&self) -> &str {
        &self.name
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl OverrideRow for LoadOverride {
    const SHEET: &'static str = "load";
    const HEADERS: &'static [&'static str] = &["Name", "Bus"];

    fn name(&self) -> &str {
        &self.name
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl OverrideRow for CapBankOverride {
    const SHEET: &'static str = "cap_bank";
    const HEADERS: &'static [&'static str] = &["Name", "Bus"];

    fn name(&self) -> &str {
        &self.name
    }

    fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Rows of one sheet keyed by component name.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideTable<T> {
    rows: BTreeMap<String, T>,
}

impl<T> Default for OverrideTable<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: OverrideRow> OverrideTable<T> {
    pub fn from_rows(rows: impl IntoIterator<Item = T>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.insert(row);
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.rows.get(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn insert(&mut self, row: T) {
        let name = row.name().trim().to_string();
        if name.is_empty() {
            return;
        }
        if self.rows.contains_key(&name) {
            warn!(sheet = T::SHEET, %name, "duplicate override row ignored");
            return;
        }
        self.rows.insert(name, row);
    }

    /// Read `<dir>/<sheet>.csv`; an absent file is an empty table.
    pub fn load(dir: &Path) -> ComponentResult<Self> {
        let path = sheet_path::<T>(dir);
        if !path.exists() {
            debug!(path = %path.display(), "override sheet absent");
            return Ok(Self::default());
        }

        let sheet_error = |e: csv::Error| ComponentError::Overrides {
            path: path.clone(),
            message: e.to_string(),
        };
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(&path)
            .map_err(sheet_error)?;

        let mut table = Self::default();
        for row in reader.deserialize::<T>() {
            table.insert(row.map_err(sheet_error)?);
        }
        debug!(sheet = T::SHEET, rows = table.len(), "override sheet loaded");
        Ok(table)
    }
}

/// Manual overrides for every component type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideBook {
    pub trafo: OverrideTable<TrafoOverride>,
    pub gens: OverrideTable<GenOverride>,
    pub line: OverrideTable<LineOverride>,
    pub load: OverrideTable<LoadOverride>,
    pub cap_bank: OverrideTable<CapBankOverride>,
}

impl OverrideBook {
    /// Load every sheet present in `dir`. A missing directory is an empty book.
    pub fn load(dir: &Path) -> ComponentResult<Self> {
        Ok(Self {
            trafo: OverrideTable::load(dir)?,
            gens: OverrideTable::load(dir)?,
            line: OverrideTable::load(dir)?,
            load: OverrideTable::load(dir)?,
            cap_bank: OverrideTable::load(dir)?,
        })
    }
}

/// Component names pre-filled into each template sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateNames {
    pub trafo: Vec<String>,
    pub gens: Vec<String>,
    pub line: Vec<String>,
    pub load: Vec<String>,
    pub cap_bank: Vec<String>,
}

/// Write an empty override workbook with one row per named component.
///
/// Returns the paths of the written sheets.
pub fn write_template(dir: &Path, names: &TemplateNames) -> ComponentResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| ComponentError::io(dir, e))?;
    Ok(vec![
        write_sheet::<TrafoOverride>(dir, &names.trafo)?,
        write_sheet::<GenOverride>(dir, &names.gens)?,
        write_sheet::<LineOverride>(dir, &names.line)?,
        write_sheet::<LoadOverride>(dir, &names.load)?,
        write_sheet::<CapBankOverride>(dir, &names.cap_bank)?,
    ])
}

fn write_sheet<T: OverrideRow>(dir: &Path, names: &[String]) -> ComponentResult<PathBuf> {
    let path = sheet_path::<T>(dir);
    let sheet_error = |e: csv::Error| ComponentError::Overrides {
        path: path.clone(),
        message: e.to_string(),
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(sheet_error)?;
    writer.write_record(T::HEADERS).map_err(sheet_error)?;
    for name in names {
        writer.serialize(T::blank(name)).map_err(sheet_error)?;
    }
    writer.flush().map_err(|e| ComponentError::io(&path, e))?;
    Ok(path)
}

fn sheet_path<T: OverrideRow>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", T::SHEET))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_directory_is_empty_book() {
        let book = OverrideBook::load(Path::new("/nonexistent/lf/overrides")).unwrap();
        assert_eq!(book, OverrideBook::default());
    }

    #[test]
    fn empty_cells_are_none() {
        let dir = scratch("lf_overrides_empty_cells");
        std::fs::write(
            dir.join("trafo.csv"),
            "Name,hv_bus,lv_bus,tap_step_percent,tap_step_degree,tap_pos,tap_neutral\n\
             T1,,Bus4,1.25,,0,\n\
             ,,,,,,\n",
        )
        .unwrap();

        let table = OverrideTable::<TrafoOverride>::load(&dir).unwrap();
        assert_eq!(table.len(), 1);
        let t1 = table.get("T1").unwrap();
        assert_eq!(t1.hv_bus, None);
        assert_eq!(t1.lv_bus.as_deref(), Some("Bus4"));
        assert_eq!(t1.tap_step_percent, Some(1.25));
        assert_eq!(t1.tap_pos, Some(0.0));
        assert_eq!(t1.tap_neutral, None);
    }

    #[test]
    fn missing_columns_default_to_none() {
        let dir = scratch("lf_overrides_missing_columns");
        std::fs::write(dir.join("gen.csv"), "Name,max_q_mvar\nG1, 5.0\n").unwrap();
        let table = OverrideTable::<GenOverride>::load(&dir).unwrap();
        let g1 = table.get("G1").unwrap();
        assert_eq!(g1.bus, None);
        assert_eq!(g1.max_q_mvar, Some(5.0));
        assert_eq!(g1.min_q_mvar, None);
    }

    #[test]
    fn malformed_cell_is_an_error() {
        let dir = scratch("lf_overrides_malformed");
        std::fs::write(dir.join("line.csv"), "Name,max_i_ka\nTL1,lots\n").unwrap();
        let err = OverrideTable::<LineOverride>::load(&dir).unwrap_err();
        assert!(matches!(err, ComponentError::Overrides { .. }));
    }

    #[test]
    fn template_round_trips_as_blank_rows() {
        let dir = scratch("lf_overrides_template");
        let names = TemplateNames {
            trafo: vec!["T1".into(), "17".into()],
            load: vec!["42".into()],
            ..TemplateNames::default()
        };
        let written = write_template(&dir, &names).unwrap();
        assert_eq!(written.len(), 5);

        let header = std::fs::read_to_string(dir.join("cap_bank.csv")).unwrap();
        assert_eq!(header.trim(), "Name,Bus");

        let book = OverrideBook::load(&dir).unwrap();
        assert_eq!(book.trafo.len(), 2);
        assert_eq!(book.trafo.get("17"), Some(&TrafoOverride::blank("17")));
        assert_eq!(book.load.get("42"), Some(&LoadOverride::blank("42")));
        assert!(book.gens.is_empty());
    }
}
