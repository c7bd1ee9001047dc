//! Error types shared by header construction, scanning, and writing.
//!
//! [`Error`] is the crate-wide structural error. Cell-level failures are reported as a
//! [`CellError`] that wraps the codec's [`DecodeError`] together with the header path and
//! the physical position of the offending cell.

use std::{
    fmt,
    num::{ParseFloatError, ParseIntError},
};

use thiserror::Error;

use crate::{field::FieldKind, path::PATH_SEPARATOR};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed cell reference '{0}'")]
    InvalidCellName(String),
    #[error("cell coordinates ({col}, {row}) are out of range")]
    InvalidCoordinates { col: usize, row: usize },
    #[error("merged range {start}:{end} is malformed: {reason}")]
    InvalidSpan {
        start: String,
        end: String,
        reason: &'static str,
    },
    #[error(
        "declared path depth is not the same: '{first}' has {expected} segment(s) \
         but '{path}' has {found}"
    )]
    PathDepthMismatch {
        first: String,
        expected: usize,
        path: String,
        found: usize,
    },
    #[error("no sheet exists")]
    NoSheets,
    #[error("sheet name {0} is invalid or doesn't exist")]
    SheetNotFound(String),
    #[error("{rows} data row(s) is smaller than sheet count {sheets}")]
    TooFewRows { rows: usize, sheets: usize },
    #[error(transparent)]
    Cell(#[from] CellError),
    #[error("failed to build scan worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("'{raw}' is not a valid integer")]
    Integer {
        raw: String,
        #[source]
        source: ParseIntError,
    },
    #[error("'{raw}' is not a valid number")]
    Float {
        raw: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("'{raw}' is not a date in YYYY-MM-DD form")]
    Date {
        raw: String,
        /// Unset when the text is not laid out as `YYYY-MM-DD` at all.
        #[source]
        source: Option<chrono::ParseError>,
    },
    #[error("'{raw}' does not exist in the local time zone")]
    LocalTime { raw: String },
    /// A [`CellCodec`](crate::field::CellCodec) implementation whose `from_cell` rejects
    /// values of its own `KIND`.
    #[error("decoded a {found} value for a {expected} field")]
    KindMismatch { expected: FieldKind, found: FieldKind },
}

/// A cell that failed to decode, located by header path and position.
///
/// `col_index` is the physical (1-based) sheet column of the matched leaf and
/// `field_index` the position of the field in the record's declaration order.
/// `row_index` is only known to callers that scan a batch of rows.
#[derive(Debug)]
pub struct CellError {
    pub row_index: Option<usize>,
    pub col_index: usize,
    pub field_index: usize,
    pub paths: Vec<String>,
    pub source: DecodeError,
}

impl CellError {
    pub fn new(
        field_index: usize,
        col_index: usize,
        paths: Vec<String>,
        source: DecodeError,
    ) -> Self {
        Self {
            row_index: None,
            col_index,
            field_index,
            paths,
            source,
        }
    }

    pub fn at_row(mut self, row_index: usize) -> Self {
        self.row_index = Some(row_index);
        self
    }

    pub fn header(&self) -> String {
        self.paths.join(PATH_SEPARATOR)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_index {
            Some(row) => write!(
                f,
                "invalid cell value under header '{}' at (row {}, column {}): {}",
                self.header(),
                row,
                self.col_index,
                self.source
            ),
            None => write!(
                f,
                "invalid cell value under header '{}' at (field {}, column {}): {}",
                self.header(),
                self.field_index,
                self.col_index,
                self.source
            ),
        }
    }
}

impl std::error::Error for CellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
