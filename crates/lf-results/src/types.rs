//! Workbook manifest types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Point of the run at which the workbook was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    /// Network inputs only.
    BeforeSolve,
    /// Inputs plus result tables.
    AfterSolve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub stage: ExportStage,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub f_hz: f64,
    pub sn_mva: f64,
    /// Row count per written table.
    pub tables: BTreeMap<String, usize>,
}
