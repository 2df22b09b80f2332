//! Report rendering.
//!
//! Turns tabular rows (an ordered list of JSON objects) into a PDF table or
//! an Excel workbook on disk. Headers are the union of the rows' columns,
//! first row first; empty input writes nothing.

pub mod pdf;
pub mod rows;
pub mod xlsx;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::RenderError;

pub use rows::{Cell, Table};

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// PDF table.
    Pdf,
    /// Excel workbook.
    Xlsx,
}

impl ReportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether `name` can be used as a report file name: a single path
/// component with no traversal or hidden-file form.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

/// Renders `rows` to `path` in `format`.
///
/// Empty `rows` is a no-op: no file and no directory are created. The parent
/// directory is created when missing and an existing file is overwritten.
///
/// # Errors
///
/// Returns I/O or encoder errors.
pub fn render(
    rows: &[Map<String, Value>],
    path: &Path,
    format: ReportFormat,
) -> Result<(), RenderError> {
    if rows.is_empty() {
        debug!(path = %path.display(), "no rows, skipping report");
        return Ok(());
    }

    let table = Table::from_rows(rows)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        ReportFormat::Pdf => pdf::write(&table, path)?,
        ReportFormat::Xlsx => xlsx::write(&table, path)?,
    }

    debug!(
        path = %path.display(),
        %format,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "report written"
    );
    Ok(())
}
