use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use report_escalation::ingest::excel::read_workbook_from_path;
use report_escalation::ingest::{ingest_from_path, IngestOptions};
use report_escalation::types::Value;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("report-escalation-{name}-{nanos}.xlsx"))
}

fn write_issues_xlsx(path: &PathBuf, leading_blank_row: bool) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Report").unwrap();

    let header_row: u32 = if leading_blank_row { 1 } else { 0 };
    ws.write_string(header_row, 0, "Key").unwrap();
    ws.write_string(header_row, 1, "Summary").unwrap();
    ws.write_string(header_row, 2, "Created").unwrap();
    ws.write_string(header_row, 3, "Story Points").unwrap();
    ws.write_string(header_row, 4, "Blocked").unwrap();

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let created = ExcelDateTime::from_ymd(2023, 1, 5).unwrap();

    ws.write_string(header_row + 1, 0, "OPS-101").unwrap();
    ws.write_string(header_row + 1, 1, "Database connection pool exhausted")
        .unwrap();
    ws.write_datetime_with_format(header_row + 1, 2, &created, &date_format)
        .unwrap();
    ws.write_number(header_row + 1, 3, 5).unwrap();
    ws.write_boolean(header_row + 1, 4, true).unwrap();

    ws.write_string(header_row + 2, 0, "OPS-102").unwrap();
    ws.write_string(header_row + 2, 1, "Cleanup stale feature flags")
        .unwrap();
    // Created and Blocked left empty for this row.
    ws.write_number(header_row + 2, 3, 2.5).unwrap();

    wb.save(path).unwrap();
}

#[test]
fn ingest_excel_happy_path() {
    let path = tmp_file("issues");
    write_issues_xlsx(&path, false);

    let table = ingest_from_path(&path, &IngestOptions::default()).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["Key", "Summary", "Created", "Story Points", "Blocked"]
    );
    assert_eq!(
        table.column("Key").unwrap().values[0],
        Value::Utf8("OPS-101".to_string())
    );
    assert_eq!(table.column("Blocked").unwrap().values[0], Value::Bool(true));
    assert_eq!(
        table.column("Story Points").unwrap().values[1],
        Value::Float64(2.5)
    );
    assert_eq!(table.column("Created").unwrap().values[1], Value::Null);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_maps_date_cells_to_datetime_values() {
    let path = tmp_file("dates");
    write_issues_xlsx(&path, false);

    let table = read_workbook_from_path(&path).unwrap();
    let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        table.column("Created").unwrap().values[0],
        Value::DateTime(expected)
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_skips_leading_blank_rows_for_the_header() {
    let path = tmp_file("blank-row");
    write_issues_xlsx(&path, true);

    let table = read_workbook_from_path(&path).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_names().next(), Some("Key"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn ingest_excel_rejects_workbooks_with_no_content() {
    let path = tmp_file("empty");
    let mut wb = Workbook::new();
    wb.add_worksheet();
    wb.save(&path).unwrap();

    let err = read_workbook_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("no non-empty rows") || err.to_string().contains("empty"));

    let _ = std::fs::remove_file(&path);
}
