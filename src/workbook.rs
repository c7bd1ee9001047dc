//! The spreadsheet engine seen by the header core.
//!
//! [`Workbook`] is the narrow collaborator interface: list merged ranges, read rows as
//! string grids, set values, merge ranges, and apply styles. [`MemoryWorkbook`] is a
//! complete in-memory implementation that can also be loaded from and saved to CSV.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use encoding_rs::Encoding;
use log::debug;

use crate::{
    coords::{cell_name_to_coordinates, coordinates_to_cell_name},
    error::{Error, Result},
    io_utils,
};

/// A merged range and the text displayed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCell {
    start_axis: String,
    end_axis: String,
    value: String,
}

impl MergeCell {
    pub fn new(
        start_axis: impl Into<String>,
        end_axis: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            start_axis: start_axis.into(),
            end_axis: end_axis.into(),
            value: value.into(),
        }
    }

    pub fn start_axis(&self) -> &str {
        &self.start_axis
    }

    pub fn end_axis(&self) -> &str {
        &self.end_axis
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn range(&self) -> String {
        format!("{}:{}", self.start_axis, self.end_axis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    General,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub horizontal: Alignment,
    pub vertical: Alignment,
    pub shrink_to_fit: bool,
}

impl CellStyle {
    /// Centered, shrink-to-fit style used for merged header ranges.
    pub fn header() -> Self {
        Self {
            horizontal: Alignment::Center,
            vertical: Alignment::Center,
            shrink_to_fit: true,
        }
    }
}

pub type StyleId = usize;

pub trait Workbook {
    fn sheet_names(&self) -> Vec<String>;

    fn add_sheet(&mut self, name: &str);

    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|s| s == name)
    }

    /// Number of columns in use on the sheet.
    fn column_count(&self, sheet: &str) -> Result<usize>;

    fn merge_cells(&self, sheet: &str) -> Result<Vec<MergeCell>>;

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    fn set_cell_value(&mut self, sheet: &str, axis: &str, value: &str) -> Result<()>;

    fn merge_range(&mut self, sheet: &str, start_axis: &str, end_axis: &str) -> Result<()>;

    fn add_style(&mut self, style: CellStyle) -> StyleId;

    fn set_cell_style(
        &mut self,
        sheet: &str,
        start_axis: &str,
        end_axis: &str,
        style: StyleId,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    col_start: usize,
    row_start: usize,
    col_end: usize,
    row_end: usize,
}

impl Range {
    fn parse(start_axis: &str, end_axis: &str) -> Result<Self> {
        let (col_start, row_start) = cell_name_to_coordinates(start_axis)?;
        let (col_end, row_end) = cell_name_to_coordinates(end_axis)?;
        if col_end < col_start || row_end < row_start {
            return Err(Error::InvalidSpan {
                start: start_axis.to_string(),
                end: end_axis.to_string(),
                reason: "end precedes start",
            });
        }
        Ok(Self {
            col_start,
            row_start,
            col_end,
            row_end,
        })
    }

    fn overlaps(&self, other: &Range) -> bool {
        self.col_start <= other.col_end
            && other.col_start <= self.col_end
            && self.row_start <= other.row_end
            && other.row_start <= self.row_end
    }
}

#[derive(Debug, Clone, Default)]
struct Sheet {
    name: String,
    grid: Vec<Vec<String>>,
    merges: Vec<Range>,
    styles: BTreeMap<(usize, usize), StyleId>,
}

impl Sheet {
    fn value(&self, col: usize, row: usize) -> &str {
        self.grid
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn set_value(&mut self, col: usize, row: usize, value: &str) {
        if self.grid.len() < row {
            self.grid.resize_with(row, Vec::new);
        }
        let cells = &mut self.grid[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
    }

    fn column_count(&self) -> usize {
        let from_grid = self.grid.iter().map(Vec::len).max().unwrap_or(0);
        let from_merges = self.merges.iter().map(|m| m.col_end).max().unwrap_or(0);
        from_grid.max(from_merges)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
    styles: Vec<CellStyle>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(name: &str) -> Self {
        let mut workbook = Self::new();
        workbook.add_sheet(name);
        workbook
    }

    /// Adds a sheet holding `rows`, replacing any sheet of the same name.
    pub fn insert_rows(&mut self, name: &str, rows: Vec<Vec<String>>) {
        self.add_sheet(name);
        if let Some(sheet) = self.sheets.iter_mut().find(|s| s.name == name) {
            sheet.grid = rows;
        }
    }

    /// Loads a CSV file as a sheet. Every record becomes one row; no header row is implied.
    pub fn from_csv(
        path: &Path,
        sheet: &str,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
    ) -> anyhow::Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
        let rows = io_utils::read_csv_rows(path, delimiter, encoding)
            .with_context(|| format!("Loading sheet '{sheet}' from {path:?}"))?;
        debug!("Loaded {} row(s) into sheet '{}' from {:?}", rows.len(), sheet, path);
        let mut workbook = Self::new();
        workbook.insert_rows(sheet, rows);
        Ok(workbook)
    }

    /// Writes a sheet's grid as CSV. Merged ranges and styles are not representable and are
    /// dropped.
    pub fn save_csv(
        &self,
        sheet: &str,
        path: &Path,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
    ) -> anyhow::Result<()> {
        let rows = self.rows(sheet)?;
        let delimiter = io_utils::resolve_output_delimiter(path, delimiter);
        io_utils::write_csv_rows(path, &rows, delimiter, encoding)
            .with_context(|| format!("Saving sheet '{sheet}' to {path:?}"))
    }

    pub fn cell_value(&self, sheet: &str, axis: &str) -> Result<String> {
        let (col, row) = cell_name_to_coordinates(axis)?;
        Ok(self.sheet(sheet)?.value(col, row).to_string())
    }

    pub fn cell_style(&self, sheet: &str, axis: &str) -> Result<Option<&CellStyle>> {
        let (col, row) = cell_name_to_coordinates(axis)?;
        let id = self.sheet(sheet)?.styles.get(&(col, row)).copied();
        Ok(id.and_then(|id| self.styles.get(id)))
    }

    fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn add_sheet(&mut self, name: &str) {
        if !self.has_sheet(name) {
            self.sheets.push(Sheet {
                name: name.to_string(),
                ..Sheet::default()
            });
        }
    }

    fn column_count(&self, sheet: &str) -> Result<usize> {
        Ok(self.sheet(sheet)?.column_count())
    }

    fn merge_cells(&self, sheet: &str) -> Result<Vec<MergeCell>> {
        let sheet = self.sheet(sheet)?;
        sheet
            .merges
            .iter()
            .map(|range| {
                Ok(MergeCell::new(
                    coordinates_to_cell_name(range.col_start, range.row_start)?,
                    coordinates_to_cell_name(range.col_end, range.row_end)?,
                    sheet.value(range.col_start, range.row_start),
                ))
            })
            .collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.sheet(sheet)?.grid.clone())
    }

    fn set_cell_value(&mut self, sheet: &str, axis: &str, value: &str) -> Result<()> {
        let (col, row) = cell_name_to_coordinates(axis)?;
        self.sheet_mut(sheet)?.set_value(col, row, value);
        Ok(())
    }

    fn merge_range(&mut self, sheet: &str, start_axis: &str, end_axis: &str) -> Result<()> {
        let range = Range::parse(start_axis, end_axis)?;
        let sheet = self.sheet_mut(sheet)?;
        // a new merge replaces every range it overlaps
        sheet.merges.retain(|existing| !existing.overlaps(&range));
        sheet.merges.push(range);
        Ok(())
    }

    fn add_style(&mut self, style: CellStyle) -> StyleId {
        if let Some(id) = self.styles.iter().position(|s| *s == style) {
            return id;
        }
        self.styles.push(style);
        self.styles.len() - 1
    }

    fn set_cell_style(
        &mut self,
        sheet: &str,
        start_axis: &str,
        end_axis: &str,
        style: StyleId,
    ) -> Result<()> {
        let range = Range::parse(start_axis, end_axis)?;
        let sheet = self.sheet_mut(sheet)?;
        for row in range.row_start..=range.row_end {
            for col in range.col_start..=range.col_end {
                sheet.styles.insert((col, row), style);
            }
        }
        Ok(())
    }
}
