#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sheet_headers::field::parse_local_date;
use sheet_headers::workbook::{MemoryWorkbook, Workbook};
use sheet_headers::{Field, Record};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn date(raw: &str) -> Option<DateTime<Local>> {
    Some(parse_local_date(raw).expect("valid date"))
}

/// Five columns under one "字段" group, one per codec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub field1: String,
    pub field2: i32,
    pub field3: bool,
    pub field4: Option<DateTime<Local>>,
    pub field5: f64,
}

impl Record for Sample {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("字段|字段1", |r: &Self| r.field1.clone(), |r: &mut Self, v| r.field1 = v),
            Field::new("字段|字段2", |r: &Self| r.field2, |r: &mut Self, v| r.field2 = v),
            Field::new("字段|字段3", |r: &Self| r.field3, |r: &mut Self, v| r.field3 = v),
            Field::new("字段|字段4", |r: &Self| r.field4, |r: &mut Self, v| r.field4 = v),
            Field::new("字段|字段5", |r: &Self| r.field5, |r: &mut Self, v| r.field5 = v),
        ]
    }
}

/// Order header with a vertically merged id column next to two groups.
///
/// ```text
/// | 编号 | 客户        | 金额          |
/// |      | 姓名 | 电话 | 数量 | 单价   |
/// ```
pub fn order_workbook() -> MemoryWorkbook {
    let mut workbook = MemoryWorkbook::with_sheet("订单");
    let labels = [
        ("A1", "A2", "编号"),
        ("B1", "C1", "客户"),
        ("D1", "E1", "金额"),
        ("B2", "B2", "姓名"),
        ("C2", "C2", "电话"),
        ("D2", "D2", "数量"),
        ("E2", "E2", "单价"),
    ];
    for (start, end, label) in labels {
        workbook.set_cell_value("订单", start, label).expect("label");
        workbook.merge_range("订单", start, end).expect("merge");
    }
    let data = [
        ["1001", "张三", "13800000000", "2", "9.5"],
        ["1002", "李四", "", "1", "120"],
    ];
    for (offset, cells) in data.iter().enumerate() {
        let row = offset + 3;
        for (col, value) in cells.iter().enumerate() {
            let axis = sheet_headers::coords::coordinates_to_cell_name(col + 1, row).expect("axis");
            workbook.set_cell_value("订单", &axis, value).expect("cell");
        }
    }
    workbook
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub quantity: i32,
    pub price: f64,
}

impl Record for Order {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("编号", |r: &Self| r.id, |r: &mut Self, v| r.id = v),
            Field::new("客户|姓名", |r: &Self| r.name.clone(), |r: &mut Self, v| r.name = v),
            Field::new("客户|电话", |r: &Self| r.phone.clone(), |r: &mut Self, v| r.phone = v),
            Field::new("金额|数量", |r: &Self| r.quantity, |r: &mut Self, v| r.quantity = v),
            Field::new("金额|单价", |r: &Self| r.price, |r: &mut Self, v| r.price = v),
        ]
    }
}
