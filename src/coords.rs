//! Conversion between A1-style cell names and 1-based `(column, row)` coordinates.

use crate::error::{Error, Result};

pub const MAX_COLUMNS: usize = 16_384;
pub const MAX_ROWS: usize = 1_048_576;

pub fn column_number_to_name(col: usize) -> Result<String> {
    if col == 0 || col > MAX_COLUMNS {
        return Err(Error::InvalidCoordinates { col, row: 1 });
    }
    let mut letters = Vec::with_capacity(3);
    let mut remaining = col;
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(b'A' + rem as u8);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    Ok(letters.into_iter().map(char::from).collect())
}

pub fn column_name_to_number(name: &str) -> Result<usize> {
    if name.is_empty() {
        return Err(Error::InvalidCellName(name.to_string()));
    }
    let mut col = 0usize;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::InvalidCellName(name.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        col = col * 26 + digit;
        if col > MAX_COLUMNS {
            return Err(Error::InvalidCellName(name.to_string()));
        }
    }
    Ok(col)
}

pub fn coordinates_to_cell_name(col: usize, row: usize) -> Result<String> {
    if row == 0 || row > MAX_ROWS {
        return Err(Error::InvalidCoordinates { col, row });
    }
    let letters = column_number_to_name(col).map_err(|_| Error::InvalidCoordinates { col, row })?;
    Ok(format!("{letters}{row}"))
}

pub fn cell_name_to_coordinates(axis: &str) -> Result<(usize, usize)> {
    let trimmed = axis.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| Error::InvalidCellName(axis.to_string()))?;
    let (letters, digits) = trimmed.split_at(split);
    let col = column_name_to_number(letters).map_err(|_| Error::InvalidCellName(axis.to_string()))?;
    let row: usize = digits
        .parse()
        .map_err(|_| Error::InvalidCellName(axis.to_string()))?;
    if row == 0 || row > MAX_ROWS {
        return Err(Error::InvalidCellName(axis.to_string()));
    }
    Ok((col, row))
}
