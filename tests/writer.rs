mod common;

use chrono::{DateTime, Local};
use common::{Sample, TestWorkspace, date};
use sheet_headers::io_utils::resolve_encoding;
use sheet_headers::workbook::{Alignment, Workbook};
use sheet_headers::{Error, Excel, ExcelOptions, Field, MemoryWorkbook, Record, RowScanner};

fn samples(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|idx| Sample {
            field1: format!("行{idx}"),
            field2: idx as i32 * 10,
            field3: idx % 2 == 1,
            field4: if idx == 0 { None } else { date("2023-12-31") },
            field5: idx as f64 + 0.25,
        })
        .collect()
}

fn scan_sheet(excel: &Excel, sheet: &str) -> Vec<Sample> {
    let tree = excel.tree(sheet).unwrap();
    let scanner = RowScanner::new(tree);
    excel
        .rows_without_header(sheet)
        .unwrap()
        .iter()
        .map(|row| {
            let mut sample = Sample::default();
            scanner.scan(row, &mut sample).unwrap();
            sample
        })
        .collect()
}

#[test]
fn writes_merged_styled_header_on_every_sheet() {
    let options = ExcelOptions::default().with_sheet_count(2);
    let excel: Excel = Excel::from_records(&samples(5), options).unwrap();
    let workbook = excel.workbook();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Sheet2"]);

    for sheet in ["Sheet1", "Sheet2"] {
        let merges = workbook.merge_cells(sheet).unwrap();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].range(), "A1:E1");
        assert_eq!(merges[0].value(), "字段");

        let style = workbook.cell_style(sheet, "C1").unwrap().unwrap();
        assert_eq!(style.horizontal, Alignment::Center);
        assert!(style.shrink_to_fit);
        assert!(workbook.cell_style(sheet, "C2").unwrap().is_none());

        assert_eq!(workbook.cell_value(sheet, "A2").unwrap(), "字段1");
        assert_eq!(workbook.cell_value(sheet, "E2").unwrap(), "字段5");
    }

    let tree = excel.primary_tree();
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.rows_begin_index(), 2);
    assert_eq!(excel.active_sheets(), ["Sheet1", "Sheet2"]);
}

#[test]
fn rows_split_evenly_with_remainder_on_last_sheet() {
    let records = samples(5);
    let options = ExcelOptions::default().with_sheet_count(2);
    let excel: Excel = Excel::from_records(&records, options).unwrap();

    let first = scan_sheet(&excel, "Sheet1");
    let second = scan_sheet(&excel, "Sheet2");
    assert_eq!(first, records[..2]);
    assert_eq!(second, records[2..]);
    assert_eq!(excel.workbook().cell_value("Sheet2", "B5").unwrap(), "40");
    assert_eq!(excel.workbook().cell_value("Sheet2", "C3").unwrap(), "否");
    assert_eq!(excel.workbook().cell_value("Sheet1", "C4").unwrap(), "是");
}

#[test]
fn written_workbook_reopens_with_plain_header_rows() {
    let records = samples(3);
    let excel: Excel = Excel::from_records(&records, ExcelOptions::default()).unwrap();
    let reopened =
        Excel::open(excel.into_workbook(), ExcelOptions::default().with_header_rows(2)).unwrap();

    assert!(reopened.is_header_consistent::<Sample>());
    assert_eq!(scan_sheet(&reopened, "Sheet1"), records);
    // zero values survive as empty cells
    assert_eq!(reopened.workbook().cell_value("Sheet1", "D3").unwrap(), "");
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Ledger {
    entry: i64,
    line: i32,
    memo: String,
    amount: f64,
    settled: bool,
    booked_on: Option<DateTime<Local>>,
}

impl Record for Ledger {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("账目|编号", |r: &Self| r.entry, |r: &mut Self, v| r.entry = v),
            Field::new("账目|行号", |r: &Self| r.line, |r: &mut Self, v| r.line = v),
            Field::new("明细|备注", |r: &Self| r.memo.clone(), |r: &mut Self, v| r.memo = v),
            Field::new("明细|金额", |r: &Self| r.amount, |r: &mut Self, v| r.amount = v),
            Field::new("明细|结清", |r: &Self| r.settled, |r: &mut Self, v| r.settled = v),
            Field::new("明细|日期", |r: &Self| r.booked_on, |r: &mut Self, v| r.booked_on = v),
        ]
    }
}

#[test]
fn every_codec_survives_write_then_scan() {
    let records = vec![
        Ledger {
            entry: 9_000_000_000,
            line: -3,
            memo: "首付".to_string(),
            amount: 1234.5,
            settled: true,
            booked_on: date("2024-02-29"),
        },
        Ledger::default(),
        Ledger {
            entry: i64::MIN,
            line: i32::MAX,
            memo: "含,逗号".to_string(),
            amount: -0.125,
            settled: false,
            booked_on: date("1999-12-31"),
        },
    ];
    let excel: Excel = Excel::from_records(&records, ExcelOptions::default()).unwrap();
    assert_eq!(excel.workbook().cell_value("Sheet1", "A3").unwrap(), "9000000000");

    let reopened =
        Excel::open(excel.into_workbook(), ExcelOptions::default().with_header_rows(2)).unwrap();
    assert!(reopened.is_header_consistent::<Ledger>());
    let tree = reopened.primary_tree();
    let scanner = RowScanner::new(tree);
    let scanned: Vec<Ledger> = reopened
        .rows_without_header("Sheet1")
        .unwrap()
        .iter()
        .map(|row| {
            let mut ledger = Ledger::default();
            scanner.scan(row, &mut ledger).unwrap();
            ledger
        })
        .collect();
    assert_eq!(scanned, records);
}

#[test]
fn custom_prefix_names_sheets() {
    let options = ExcelOptions::default()
        .with_sheet_count(3)
        .with_sheet_prefix("数据");
    let excel: Excel = Excel::from_records(&samples(3), options).unwrap();
    assert_eq!(excel.workbook().sheet_names(), vec!["数据1", "数据2", "数据3"]);
}

#[test]
fn fewer_records_than_sheets_is_an_error() {
    let options = ExcelOptions::default().with_sheet_count(2);
    let err = Excel::<MemoryWorkbook>::from_records(&samples(1), options).unwrap_err();
    assert!(matches!(err, Error::TooFewRows { rows: 1, sheets: 2 }));
}

#[derive(Debug, Default)]
struct Ragged {
    grouped: String,
    flat: String,
}

impl Record for Ragged {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("组|甲", |r: &Self| r.grouped.clone(), |r: &mut Self, v| r.grouped = v),
            Field::new("乙", |r: &Self| r.flat.clone(), |r: &mut Self, v| r.flat = v),
        ]
    }
}

#[test]
fn mixed_path_depths_are_rejected() {
    let err = Excel::<MemoryWorkbook>::from_records(&[Ragged::default()], ExcelOptions::default())
        .unwrap_err();
    match err {
        Error::PathDepthMismatch {
            expected, found, path, ..
        } => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
            assert_eq!(path, "乙");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn csv_round_trip_keeps_rows() {
    let workspace = TestWorkspace::new();
    let records = samples(4);
    let excel: Excel = Excel::from_records(&records, ExcelOptions::default()).unwrap();

    for (name, encoding) in [("utf8.csv", None), ("gbk.tsv", Some("gbk"))] {
        let encoding = resolve_encoding(encoding).unwrap();
        let path = workspace.path().join(name);
        excel.workbook().save_csv("Sheet1", &path, None, encoding).unwrap();

        let loaded = MemoryWorkbook::from_csv(&path, "导入", None, encoding).unwrap();
        let reopened = Excel::open(loaded, ExcelOptions::default().with_header_rows(2)).unwrap();
        assert_eq!(scan_sheet(&reopened, "导入"), records);
    }
}

#[test]
fn hand_written_csv_loads() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "input.csv",
        "字段,,,,\n字段1,字段2,字段3,字段4,字段5\nabc,5,是,2020-02-29,1.5\n",
    );
    let encoding = resolve_encoding(None).unwrap();
    let workbook = MemoryWorkbook::from_csv(&path, "Sheet1", None, encoding).unwrap();
    let excel = Excel::open(workbook, ExcelOptions::default().with_header_rows(2)).unwrap();
    let rows = scan_sheet(&excel, "Sheet1");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field1, "abc");
    assert_eq!(rows[0].field4, date("2020-02-29"));
}

#[test]
fn options_round_trip_through_yaml_and_json() {
    let workspace = TestWorkspace::new();
    let options = ExcelOptions::default()
        .with_header_rows(2)
        .with_sheet_count(4)
        .with_sheet_prefix("页")
        .with_active_sheets(["页1", "页2"])
        .with_scan_workers(8);

    for name in ["options.yml", "options.yaml", "options.json"] {
        let path = workspace.path().join(name);
        options.save(&path).unwrap();
        assert_eq!(ExcelOptions::load(&path).unwrap(), options);
    }

    let partial = workspace.write("partial.json", r#"{"sheet_count": 3}"#);
    let loaded = ExcelOptions::load(&partial).unwrap();
    assert_eq!(loaded.sheet_count, 3);
    assert_eq!(loaded.sheet_prefix, "Sheet");

    let unsupported = workspace.write("options.toml", "header_rows = 1\n");
    let err = ExcelOptions::load(&unsupported).unwrap_err();
    assert!(err.to_string().contains("Unsupported options file"));
}
