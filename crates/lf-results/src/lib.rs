//! lf-results: load-flow result workbook.
//!
//! The workbook is a directory (`loadflow_result/` next to the schematic)
//! holding one CSV file per network table and a `manifest.json`. It is
//! written once before the solve, so inputs can be inspected when the solve
//! fails, and again afterwards with the result tables added.

pub mod store;
pub mod types;

pub use store::{RESULT_DIR, ResultStore};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error in table {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("No exported workbook in {dir}")]
    NotExported { dir: String },
}
