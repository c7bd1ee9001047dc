//! Workbook facade tying header trees, scanning, and writing together.
//!
//! [`Excel`] resolves the active sheets of a [`Workbook`], builds one [`HeaderTree`] per
//! active sheet, and scans rows against the first active sheet's tree.

use std::sync::{Arc, mpsc::Receiver};

use itertools::Itertools;
use log::{debug, info};

use crate::{
    error::{CellError, Error, Result},
    header::HeaderTree,
    options::ExcelOptions,
    pool::{RowResult, ScanPool},
    record::Record,
    scan::RowScanner,
    workbook::{CellStyle, MemoryWorkbook, StyleId, Workbook},
    writer::{HeaderLayout, write_header, write_records},
};

#[derive(Debug)]
pub struct Excel<W: Workbook = MemoryWorkbook> {
    workbook: W,
    options: ExcelOptions,
    active_sheets: Vec<String>,
    trees: Vec<Arc<HeaderTree>>,
    header_style: StyleId,
}

impl<W: Workbook> Excel<W> {
    /// Opens an existing workbook and reads the header of every active sheet.
    pub fn open(mut workbook: W, options: ExcelOptions) -> Result<Self> {
        let active_sheets = resolve_active_sheets(&workbook, &options)?;
        let header_style = workbook.add_style(CellStyle::header());
        let trees = active_sheets
            .iter()
            .map(|sheet| build_tree(&workbook, sheet, options.header_rows).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        info!("Read header trees for sheet(s) {}", active_sheets.iter().join(", "));
        Ok(Self {
            workbook,
            options,
            active_sheets,
            trees,
            header_style,
        })
    }

    pub fn workbook(&self) -> &W {
        &self.workbook
    }

    pub fn into_workbook(self) -> W {
        self.workbook
    }

    pub fn options(&self) -> &ExcelOptions {
        &self.options
    }

    pub fn active_sheets(&self) -> &[String] {
        &self.active_sheets
    }

    pub fn header_style(&self) -> StyleId {
        self.header_style
    }

    pub fn tree(&self, sheet: &str) -> Option<&HeaderTree> {
        self.active_sheets
            .iter()
            .position(|name| name == sheet)
            .map(|idx| self.trees[idx].as_ref())
    }

    /// Tree of the first active sheet, which row scans are matched against.
    pub fn primary_tree(&self) -> &HeaderTree {
        &self.trees[0]
    }

    /// All rows of `sheet` below its header region.
    pub fn rows_without_header(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let tree = self
            .tree(sheet)
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))?;
        let skip = tree.rows_begin_index().max(self.options.header_rows);
        Ok(self.workbook.rows(sheet)?.into_iter().skip(skip).collect())
    }

    pub fn scan_row<R: Record>(
        &self,
        row: &[String],
        target: &mut R,
    ) -> std::result::Result<(), CellError> {
        RowScanner::new(self.primary_tree()).scan(row, target)
    }

    pub fn is_header_consistent<R: Record>(&self) -> bool {
        RowScanner::new(self.primary_tree()).is_header_consistent::<R>()
    }

    /// Scans `rows` on a pool built for this batch; the pool shuts down once every row
    /// has been reported.
    pub fn scan_rows<R: Record>(&self, rows: Vec<Vec<String>>) -> Result<Receiver<RowResult<R>>> {
        let pool = ScanPool::new(self.options.scan_workers)?;
        Ok(self.scan_rows_with(&pool, rows))
    }

    pub fn scan_rows_with<R: Record>(
        &self,
        pool: &ScanPool,
        rows: Vec<Vec<String>>,
    ) -> Receiver<RowResult<R>> {
        pool.scan_rows(Arc::clone(&self.trees[0]), rows)
    }
}

impl<W: Workbook + Default> Excel<W> {
    /// Creates `sheet_count` sheets named `{sheet_prefix}{n}`, writes the record type's
    /// merged header to each and spreads `records` across them.
    pub fn from_records<R: Record>(records: &[R], options: ExcelOptions) -> Result<Self> {
        let mut workbook = W::default();
        for idx in 1..=options.sheet_count {
            workbook.add_sheet(&format!("{}{}", options.sheet_prefix, idx));
        }
        let active_sheets = resolve_active_sheets(&workbook, &options)?;
        let header_style = workbook.add_style(CellStyle::header());

        let layout = HeaderLayout::for_record::<R>()?;
        let trees: Vec<Arc<HeaderTree>> = active_sheets
            .iter()
            .map(|sheet| Arc::new(layout.to_tree(sheet)))
            .collect();
        let depth = write_header(&mut workbook, &active_sheets, &trees[0], header_style)?;
        write_records(&mut workbook, &active_sheets, &trees[0], records, depth + 1)?;
        info!(
            "Created {} sheet(s) with {} record(s) below {} header row(s)",
            active_sheets.len(),
            records.len(),
            depth
        );
        Ok(Self {
            workbook,
            options,
            active_sheets,
            trees,
            header_style,
        })
    }
}

fn resolve_active_sheets<W: Workbook>(workbook: &W, options: &ExcelOptions) -> Result<Vec<String>> {
    let sheets = if options.active_sheets.is_empty() {
        workbook.sheet_names()
    } else {
        for name in &options.active_sheets {
            if !workbook.has_sheet(name) {
                return Err(Error::SheetNotFound(name.clone()));
            }
        }
        options.active_sheets.clone()
    };
    if sheets.is_empty() {
        return Err(Error::NoSheets);
    }
    Ok(sheets)
}

fn build_tree<W: Workbook>(workbook: &W, sheet: &str, header_rows: usize) -> Result<HeaderTree> {
    let column_count = workbook.column_count(sheet)?;
    if header_rows == 0 {
        let cells = workbook.merge_cells(sheet)?;
        debug!("Sheet '{}' has {} merged range(s)", sheet, cells.len());
        HeaderTree::from_merge_cells(sheet, column_count, &cells)
    } else {
        let rows: Vec<Vec<String>> = workbook.rows(sheet)?.into_iter().take(header_rows).collect();
        Ok(HeaderTree::from_header_rows(sheet, &rows, column_count))
    }
}
