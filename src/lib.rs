//! Map spreadsheet rows under multi-level merged-cell headers to typed records and back.
//!
//! The header region of a sheet is rebuilt into a [`HeaderTree`](header::HeaderTree)
//! whose leaves are the data columns. Record types list their fields with a
//! `|`-separated header path ([`Record`](record::Record)); a field binds to the first leaf
//! whose path ends with the declared one. Rows are decoded with [`RowScanner`](scan::RowScanner)
//! one at a time or concurrently through a [`ScanPool`](pool::ScanPool), and
//! [`writer`] emits the merged header and data for a record type.

pub mod coords;
pub mod error;
pub mod excel;
pub mod field;
pub mod header;
pub mod io_utils;
pub mod options;
pub mod path;
pub mod pool;
pub mod record;
pub mod scan;
pub mod workbook;
pub mod writer;

use std::{env, sync::OnceLock};

use log::LevelFilter;

pub use error::{CellError, DecodeError, Error, Result};
pub use excel::Excel;
pub use field::{FieldKind, FieldValue, Located};
pub use header::{HeaderNode, HeaderTree};
pub use options::ExcelOptions;
pub use path::DeclaredPath;
pub use pool::{RowResult, ScanPool};
pub use record::{Field, Record};
pub use scan::RowScanner;
pub use workbook::{MemoryWorkbook, MergeCell, Workbook};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Installs an `env_logger` backend once; `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_headers", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().is_test(cfg!(test)).try_init();
    });
}
