//! Options for opening and creating workbooks.
//!
//! [`ExcelOptions`] picks the header source, the sheets to work on, and the worker count
//! for batch scans. It can be kept next to the data as a YAML or JSON file.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHEET_PREFIX: &str = "Sheet";

/// Caller-supplied settings for opening or creating a workbook.
///
/// Loadable from YAML (`.yml`/`.yaml`) or JSON (`.json`); absent keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcelOptions {
    /// Number of plain header rows. `0` reads the header from merged ranges instead.
    pub header_rows: usize,
    /// Sheets created by [`Excel::from_records`](crate::excel::Excel::from_records).
    pub sheet_count: usize,
    pub sheet_prefix: String,
    /// Sheets to work on; empty means every sheet in the workbook.
    pub active_sheets: Vec<String>,
    /// Worker threads for batch scans; unset uses the available parallelism.
    pub scan_workers: Option<usize>,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            header_rows: 0,
            sheet_count: 1,
            sheet_prefix: DEFAULT_SHEET_PREFIX.to_string(),
            active_sheets: Vec::new(),
            scan_workers: None,
        }
    }
}

impl ExcelOptions {
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_sheet_count(mut self, sheet_count: usize) -> Self {
        self.sheet_count = sheet_count;
        self
    }

    pub fn with_sheet_prefix(mut self, sheet_prefix: impl Into<String>) -> Self {
        self.sheet_prefix = sheet_prefix.into();
        self
    }

    pub fn with_active_sheets<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_sheets.extend(sheets.into_iter().map(Into::into));
        self
    }

    pub fn with_scan_workers(mut self, workers: usize) -> Self {
        self.scan_workers = Some(workers);
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening options file {path:?}"))?;
        let reader = BufReader::new(file);
        let options = match Format::of(path)? {
            Format::Yaml => serde_yaml::from_reader(reader).context("Parsing options YAML")?,
            Format::Json => serde_json::from_reader(reader).context("Parsing options JSON")?,
        };
        Ok(options)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating options file {path:?}"))?;
        match Format::of(path)? {
            Format::Yaml => serde_yaml::to_writer(file, self).context("Writing options YAML"),
            Format::Json => {
                serde_json::to_writer_pretty(file, self).context("Writing options JSON")
            }
        }
    }
}

enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Ok(Format::Yaml)
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            _ => bail!("Unsupported options file {path:?}; expected .yml, .yaml or .json"),
        }
    }
}
