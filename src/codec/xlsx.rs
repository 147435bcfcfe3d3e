//! `.xlsx` reading and writing.

use super::sheet::{CellValue, Sheet};
use crate::config::{HEADER_COLUMN_COUNT, HEADER_FILL_RGB};
use crate::error::{OrderError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet, XlsxError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read the first worksheet of `path`.
///
/// Cell coordinates are absolute: a sheet whose data starts at `B3` still
/// has its first value at `(2, 1)`. Formula cells keep their formula next to
/// the cached result.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    if !path.exists() {
        return Err(OrderError::file_access(path, "file not found"));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| OrderError::file_access(path, e))?;
    let first_name = workbook.sheet_names().first().cloned();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| OrderError::SheetLayoutMismatch {
            message: format!("{} has no worksheets", path.display()),
        })?
        .map_err(|e| OrderError::file_access(path, e))?;

    let mut sheet = Sheet::new();
    if let Some((row0, col0)) = range.start() {
        for (row, col, value) in range.used_cells() {
            sheet.set(
                row0 as usize + row,
                col0 as usize + col,
                cell_value(value),
            );
        }
    }

    if let Some(name) = first_name {
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| OrderError::file_access(path, e))?;
        if let Some((row0, col0)) = formulas.start() {
            for (row, col, formula) in formulas.used_cells() {
                if formula.is_empty() {
                    continue;
                }
                let (row, col) = (row0 as usize + row, col0 as usize + col);
                let result = Box::new(sheet.cell(row, col).clone());
                sheet.set(
                    row,
                    col,
                    CellValue::Formula {
                        formula: formula.clone(),
                        result,
                    },
                );
            }
        }
    }

    debug!("Read {} row(s) from {}", sheet.row_count(), path.display());
    Ok(sheet)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::String(v) => CellValue::text(v.as_str()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) if v.is_duration() => CellValue::Duration(v.as_f64()),
        Data::DateTime(v) => CellValue::DateTime(v.as_f64()),
        Data::DateTimeIso(v) => CellValue::text(v.as_str()),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(v) => CellValue::Error(v.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// Write `sheet` to `path` as a single-worksheet workbook.
///
/// Row 0 gets the header style (bold white on `#4F81BD`, centered). The
/// order header columns of every other row are centered with thin borders.
/// With `atomic` the file is written next to `path` and renamed into place.
pub fn write_sheet(path: &Path, sheet: &Sheet, atomic: bool) -> Result<()> {
    let buffer = render(sheet).map_err(|e| OrderError::file_access(path, e))?;

    if atomic {
        let tmp = temp_path(path);
        fs::write(&tmp, &buffer).map_err(|e| OrderError::file_access(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(OrderError::file_access(path, e));
        }
    } else {
        fs::write(path, &buffer).map_err(|e| OrderError::file_access(path, e))?;
    }

    debug!("Wrote {} row(s) to {}", sheet.row_count(), path.display());
    Ok(())
}

fn render(sheet: &Sheet) -> std::result::Result<Vec<u8>, XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL_RGB))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let order_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_idx, row) in sheet.rows().iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let format = if row_idx == 0 {
                Some(&header_format)
            } else if col_idx < HEADER_COLUMN_COUNT {
                Some(&order_format)
            } else {
                None
            };
            write_cell(worksheet, row_idx as u32, col_idx as u16, value, format)?;
        }
    }

    workbook.save_to_buffer()
}

/// Number format that makes a reader see the value as a date or duration.
fn number_format(value: &CellValue) -> Option<&'static str> {
    match value {
        CellValue::DateTime(n) if n.fract() == 0.0 => Some("dd.mm.yyyy"),
        CellValue::DateTime(_) => Some("dd.mm.yyyy hh:mm:ss"),
        CellValue::Duration(_) => Some("[h]:mm:ss"),
        CellValue::Formula { result, .. } => number_format(result),
        _ => None,
    }
}

/// Cached formula result as stored in the file.
fn result_text(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) | CellValue::DateTime(n) | CellValue::Duration(n) => n.to_string(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        other => other.as_text(),
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> std::result::Result<(), XlsxError> {
    let dated;
    let format = match number_format(value) {
        Some(num_format) => {
            let base = format.cloned().unwrap_or_default();
            dated = base.set_num_format(num_format);
            Some(&dated)
        }
        None => format,
    };

    match (value, format) {
        (CellValue::Empty, Some(f)) => {
            worksheet.write_blank(row, col, f)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Text(s) | CellValue::Error(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s, f)?;
        }
        (CellValue::Text(s) | CellValue::Error(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Number(n) | CellValue::DateTime(n) | CellValue::Duration(n), Some(f)) => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (CellValue::Number(n) | CellValue::DateTime(n) | CellValue::Duration(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, f)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Formula { formula, result }, format) => {
            let formula = Formula::new(formula).set_result(result_text(result));
            match format {
                Some(f) => worksheet.write_formula_with_format(row, col, formula, f)?,
                None => worksheet.write_formula(row, col, formula)?,
            };
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
