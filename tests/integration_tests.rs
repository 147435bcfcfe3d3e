//! Integration tests for order export, import and the database store.
//!
//! These go through real `.xlsx` files in a scratch directory and check the
//! behaviour an operator sees: what lands in the sheet, what comes back on
//! import, and what repeated sends do to the database store.

use order_intake::codec::CellValue;
use order_intake::config::DEFAULT_DATE_FORMAT;
use order_intake::{
    compute_totals, export_order_file, import_order_file, read_sheet, send_order, write_sheet,
    AppConfig, DatabaseStore, LineItem, OrderError, OrderForm, OrderRecord, PhonePolicy,
    SerialStrategy, Sheet, SheetLayout,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

// ==================== Fixtures ====================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_order() -> OrderRecord {
    let mut record = OrderRecord {
        serial_base: "2000".to_string(),
        company: "Caspian Build".to_string(),
        responsible: "Aysel Mammadova".to_string(),
        phone: "+7 (912) 345-67-89".to_string(),
        start_date: "01.03.2026".to_string(),
        end_date: "15.03.2026".to_string(),
        address: "Baku, Nizami 10".to_string(),
        lines: Vec::new(),
    };
    record.add_line(LineItem::new("Panel", "pcs", "3", "150.50", "tempered"));
    record.add_line(LineItem::new("Door", "pcs", "1", "999.99", ""));
    record
}

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        database_path: dir.join("database.xlsx"),
        images_dir: dir.join("images"),
        ..Default::default()
    }
}

fn serial_column(sheet: &Sheet) -> Vec<String> {
    (1..sheet.used_row_count())
        .map(|row| sheet.text(row, 0))
        .collect()
}

// ==================== Totals ====================

#[test]
fn test_worked_example_total() {
    let totals = compute_totals(&sample_order().lines, 15).unwrap();
    assert_eq!(totals.line_sums, vec![dec("451.50"), dec("999.99")]);
    assert_eq!(totals.grand_total, dec("1669.21"));
}

// ==================== Export / import ====================

#[test]
fn test_export_then_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let record = sample_order();

    let serials = export_order_file(&record, &path, &config_in(dir.path())).unwrap();
    assert_eq!(serials, vec!["2000", "2000-1"]);

    let imported =
        import_order_file(&path, SheetLayout::Denormalized, DEFAULT_DATE_FORMAT).unwrap();
    assert_eq!(imported, record);
}

#[test]
fn test_export_writes_schema_and_serials() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");

    export_order_file(&sample_order(), &path, &config_in(dir.path())).unwrap();

    let sheet = read_sheet(&path).unwrap();
    let header: Vec<String> = (0..13).map(|col| sheet.text(0, col)).collect();
    assert_eq!(
        header,
        vec![
            "Serial",
            "Фирма",
            "Ответственное лицо",
            "Телефон",
            "Дата начала",
            "Дата окончания",
            "Адрес",
            "Название продукта",
            "Ед. изм.",
            "Кол-во",
            "Цена",
            "Сумма",
            "Примечание",
        ]
    );
    assert_eq!(serial_column(&sheet), vec!["2000", "2000-1"]);
    assert_eq!(sheet.text(2, 1), "Caspian Build");
    assert_eq!(sheet.text(1, 11), "451.50");
}

#[test]
fn test_empty_serial_uses_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let mut record = sample_order();
    record.serial_base.clear();

    let serials = export_order_file(&record, &path, &config_in(dir.path())).unwrap();
    assert_eq!(serials, vec!["1111", "1111-1"]);
}

#[test]
fn test_export_empty_order_is_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let mut record = sample_order();
    record.lines.clear();

    let serials = export_order_file(&record, &path, &config_in(dir.path())).unwrap();
    assert!(serials.is_empty());
    assert_eq!(read_sheet(&path).unwrap().used_row_count(), 1);
}

#[test]
fn test_import_foreign_sheet_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other.xlsx");
    write_sheet(
        &path,
        &Sheet::from_text_rows(vec![vec!["Name", "Qty"], vec!["Panel", "3"]]),
        false,
    )
    .unwrap();

    let err = import_order_file(&path, SheetLayout::Denormalized, DEFAULT_DATE_FORMAT).unwrap_err();
    assert!(matches!(err, OrderError::SheetLayoutMismatch { .. }));
}

#[test]
fn test_import_legacy_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.xlsx");
    write_sheet(
        &path,
        &Sheet::from_text_rows(vec![
            vec!["Caspian Build"],
            vec!["Panel", "pcs", "3", "150.50", "451.50", "tempered"],
        ]),
        false,
    )
    .unwrap();

    let record = import_order_file(&path, SheetLayout::Legacy, DEFAULT_DATE_FORMAT).unwrap();
    assert_eq!(record.company, "Caspian Build");
    assert_eq!(record.lines.len(), 1);
    assert_eq!(record.lines[0].sum, dec("451.50"));
}

// ==================== Phone policy ====================

#[test]
fn test_invalid_phone_is_saved_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let mut record = sample_order();
    record.phone = "+79123456789".to_string();

    export_order_file(&record, &path, &config_in(dir.path())).unwrap();
    let imported =
        import_order_file(&path, SheetLayout::Denormalized, DEFAULT_DATE_FORMAT).unwrap();
    assert_eq!(imported.phone, "+79123456789");
}

#[test]
fn test_invalid_phone_blocks_when_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let mut record = sample_order();
    record.phone = "+7(912)345-67-89".to_string();
    let config = AppConfig {
        phone_policy: PhonePolicy::EnforceOnSubmit,
        ..config_in(dir.path())
    };

    let err = export_order_file(&record, &path, &config).unwrap_err();
    assert!(matches!(err, OrderError::InvalidPhone { .. }));
    assert!(!path.exists());

    let err = send_order(&record, &config).unwrap_err();
    assert!(matches!(err, OrderError::InvalidPhone { .. }));
    assert!(!config.database_path.exists());
}

// ==================== Database store ====================

#[test]
fn test_send_appends_after_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let store = DatabaseStore::new(&config.database_path);

    let first = send_order(&sample_order(), &config).unwrap();
    assert!(first.created);
    assert_eq!(first.first_row, 1);
    let before = store.load().unwrap();
    assert_eq!(before.used_row_count(), 3);

    let mut second = sample_order();
    second.serial_base = "3000".to_string();
    second.lines = vec![
        LineItem::new("Seal", "m", "4", "2", ""),
        LineItem::new("Frame", "pcs", "1", "80", ""),
    ];
    let outcome = send_order(&second, &config).unwrap();
    assert_eq!(outcome.first_row, 3);
    assert_eq!(outcome.rows_written, 2);

    let after = store.load().unwrap();
    assert_eq!(&after.rows()[..3], before.rows());
    assert_eq!(
        serial_column(&after),
        vec!["2000", "2000-1", "3000", "3000-1"]
    );
}

#[test]
fn test_repeated_sends_repeat_serials() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    send_order(&sample_order(), &config).unwrap();
    send_order(&sample_order(), &config).unwrap();

    let sheet = DatabaseStore::new(&config.database_path).load().unwrap();
    assert_eq!(
        serial_column(&sheet),
        vec!["2000", "2000-1", "2000", "2000-1"]
    );
}

#[test]
fn test_seeded_sends_keep_serials_unique() {
    let dir = tempfile::tempdir().unwrap();
    for strategy in [SerialStrategy::UniformSuffix, SerialStrategy::RepeatCollapse] {
        let config = AppConfig {
            database_path: dir.path().join(format!("{}.xlsx", strategy)),
            seed_serials_from_database: true,
            serial_strategy: strategy,
            ..config_in(dir.path())
        };

        send_order(&sample_order(), &config).unwrap();
        send_order(&sample_order(), &config).unwrap();

        let sheet = DatabaseStore::new(&config.database_path).load().unwrap();
        assert_eq!(
            serial_column(&sheet),
            vec!["2000", "2000-1", "2000-2", "2000-3"]
        );
    }
}

#[test]
fn test_store_with_foreign_header_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut foreign = Sheet::new();
    foreign.set(0, 0, CellValue::text("Invoice"));
    foreign.set(1, 0, CellValue::Number(42.0));
    write_sheet(&config.database_path, &foreign, false).unwrap();

    let err = send_order(&sample_order(), &config).unwrap_err();
    assert!(matches!(err, OrderError::SheetLayoutMismatch { .. }));
    assert_eq!(read_sheet(&config.database_path).unwrap(), foreign);
}

// ==================== Form session ====================

#[test]
fn test_form_save_load_send() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");
    let config = AppConfig {
        atomic_writes: true,
        ..config_in(dir.path())
    };

    let mut form = OrderForm::new(config.clone()).unwrap();
    form.edit_header(|r| {
        r.serial_base = "2000".to_string();
        r.company = "Caspian Build".to_string();
        r.phone = "+7 (912) 345-67-89".to_string();
    });
    form.add_line(LineItem::new("Panel", "pcs", "3", "150.50", ""));
    form.add_line(LineItem::new("Door", "pcs", "1", "999.99", ""));
    assert_eq!(form.totals().grand_total, dec("1669.21"));

    form.save_to_file(&path).unwrap();
    form.send().unwrap();

    let mut restored = OrderForm::new(config).unwrap();
    restored
        .load_from_file(&path, SheetLayout::Denormalized)
        .unwrap();
    assert_eq!(restored.record(), form.record());
    assert_eq!(restored.totals(), form.totals());

    let sheet = DatabaseStore::new(dir.path().join("database.xlsx"))
        .load()
        .unwrap();
    assert_eq!(sheet.used_row_count(), 3);
}
