//! Typed cell codecs.
//!
//! Every record field is backed by one [`FieldKind`]. Decoding turns the raw cell text into
//! a [`FieldValue`]; encoding renders a value back into the text written to a cell. Empty
//! cells decode to the kind's zero value and never fail.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

use crate::error::DecodeError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// The only text that decodes to `true` for a boolean field.
pub const TRUE_TOKEN: &str = "是";
pub const FALSE_TOKEN: &str = "否";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int,
    Int64,
    String,
    Float,
    Bool,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Int => "integer",
            FieldKind::Int64 => "64-bit integer",
            FieldKind::String => "string",
            FieldKind::Float => "float",
            FieldKind::Bool => "boolean",
            FieldKind::Date => "date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Int64(i64),
    String(String),
    Float(f64),
    Bool(bool),
    /// `None` is the zero date.
    Date(Option<DateTime<Local>>),
}

impl FieldKind {
    pub fn zero(self) -> FieldValue {
        match self {
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Int64 => FieldValue::Int64(0),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Date => FieldValue::Date(None),
        }
    }

    pub fn decode(self, raw: &str) -> Result<FieldValue, DecodeError> {
        if raw.is_empty() {
            return Ok(self.zero());
        }
        let value = match self {
            FieldKind::Int => FieldValue::Int(raw.parse().map_err(|source| DecodeError::Integer {
                raw: raw.to_string(),
                source,
            })?),
            FieldKind::Int64 => {
                FieldValue::Int64(raw.parse().map_err(|source| DecodeError::Integer {
                    raw: raw.to_string(),
                    source,
                })?)
            }
            FieldKind::String => FieldValue::String(raw.to_string()),
            FieldKind::Float => FieldValue::Float(raw.parse().map_err(|source| DecodeError::Float {
                raw: raw.to_string(),
                source,
            })?),
            FieldKind::Bool => FieldValue::Bool(raw == TRUE_TOKEN),
            FieldKind::Date => FieldValue::Date(Some(parse_local_date(raw)?)),
        };
        Ok(value)
    }
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    /// Cell text for this value; decoding it with [`FieldKind::decode`] yields the value again.
    pub fn encode(&self) -> String {
        match self {
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Int64(i) => i.to_string(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(true) => TRUE_TOKEN.to_string(),
            FieldValue::Bool(false) => FALSE_TOKEN.to_string(),
            FieldValue::Date(Some(d)) => d.format(DATE_FORMAT).to_string(),
            FieldValue::Date(None) => String::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Parses a `YYYY-MM-DD` date at local midnight.
///
/// The layout is fixed: four-digit year, two-digit month and day, `-` separators and
/// nothing else. Signs, padding and single-digit fields are rejected.
pub fn parse_local_date(raw: &str) -> Result<DateTime<Local>, DecodeError> {
    if !has_date_layout(raw) {
        return Err(DecodeError::Date {
            raw: raw.to_string(),
            source: None,
        });
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|source| DecodeError::Date {
        raw: raw.to_string(),
        source: Some(source),
    })?;
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| DecodeError::LocalTime {
            raw: raw.to_string(),
        })
}

fn has_date_layout(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// A decoded value together with the sheet column it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCell {
    pub value: FieldValue,
    pub col_index: usize,
}

/// Rust types that can back a record field.
pub trait CellCodec: Sized {
    const KIND: FieldKind;

    fn from_cell(cell: DecodedCell) -> Option<Self>;

    fn to_value(&self) -> FieldValue;
}

impl CellCodec for i32 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::Int(i) => Some(i),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Int(*self)
    }
}

impl CellCodec for i64 {
    const KIND: FieldKind = FieldKind::Int64;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::Int64(i) => Some(i),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Int64(*self)
    }
}

impl CellCodec for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }
}

impl CellCodec for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::Float(f) => Some(f),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl CellCodec for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl CellCodec for Option<DateTime<Local>> {
    const KIND: FieldKind = FieldKind::Date;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        match cell.value {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }
}

/// Field wrapper that also records the column the value was read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Located<T> {
    pub value: T,
    pub col_index: usize,
}

impl<T> Located<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            col_index: 0,
        }
    }
}

impl<T: CellCodec> CellCodec for Located<T> {
    const KIND: FieldKind = T::KIND;

    fn from_cell(cell: DecodedCell) -> Option<Self> {
        let col_index = cell.col_index;
        T::from_cell(cell).map(|value| Located { value, col_index })
    }

    fn to_value(&self) -> FieldValue {
        self.value.to_value()
    }
}
