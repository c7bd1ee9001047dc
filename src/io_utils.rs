//! CSV plumbing behind [`MemoryWorkbook`](crate::workbook::MemoryWorkbook).
//!
//! - **Delimiter resolution**: extension-based detection (`.tsv` → tab, otherwise comma)
//!   with manual override.
//! - **Encoding**: input is decoded and output transcoded with `encoding_rs`, defaulting
//!   to UTF-8.
//! - **Ragged rows**: readers are flexible, so header rows with fewer trailing cells load
//!   as shorter rows instead of failing.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Some(DEFAULT_TSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(DEFAULT_CSV_DELIMITER),
        _ => None,
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided
        .or_else(|| delimiter_for_extension(path))
        .unwrap_or(DEFAULT_CSV_DELIMITER)
}

pub fn resolve_output_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    resolve_input_delimiter(path, provided)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn read_csv_rows(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<Vec<String>>> {
    let bytes = fs::read(path).with_context(|| format!("Opening input file {path:?}"))?;
    let text = decode_bytes(&bytes, encoding)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub fn write_csv_rows(
    path: &Path,
    rows: &[Vec<String>],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))?;
    let text = String::from_utf8(buffer).context("CSV output is not valid UTF-8")?;

    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(anyhow!("Failed to encode text using {}", encoding.name()));
    }
    let mut file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    file.write_all(encoded.as_ref())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_follows_extension_unless_overridden() {
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.txt"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(resolve_encoding(Some("not-a-charset")).is_err());
        assert_eq!(resolve_encoding(Some("gbk")).unwrap().name(), "GBK");
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
    }
}
