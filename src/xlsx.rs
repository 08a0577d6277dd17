use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use std::path::{Path, PathBuf};

use crate::{
    order::{Cell, OrderReport},
    Error, Result,
};

/// Writes `report` to `<dir>/<report.file_name()>`, replacing any existing
/// file, and returns the path written.
///
/// The sheet has a bold header row followed by the rows from
/// [`OrderReport::rows`], with no index column. The workbook's creation
/// time is pinned to `run_date`, so writing the same report twice on the
/// same day produces identical bytes.
///
/// # Errors
///
/// Returns [`Error::RunDate`] if `run_date` is outside the range Excel can
/// record, and [`Error::Xlsx`] if the workbook cannot be built or saved.
pub fn write_report(report: &OrderReport, dir: &Path, run_date: NaiveDate) -> Result<PathBuf> {
    let created = excel_date(run_date).ok_or(Error::RunDate(run_date))?;
    let path = dir.join(report.file_name());
    build(report, &created)
        .and_then(|mut workbook| workbook.save(&path))
        .map_err(|source| Error::Xlsx {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn build(report: &OrderReport, created: &ExcelDateTime) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_creation_datetime(created));
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet().set_name(report.sheet_name())?;
    for (col, column) in report.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(col)?, column.name(), &header)?;
    }
    for (row, cells) in report.rows().iter().enumerate() {
        let row = u32::try_from(row + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row, col_index(col)?, cell)?;
        }
    }
    worksheet.autofit();
    Ok(workbook)
}

fn excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok()?;
    let month = u8::try_from(date.month()).ok()?;
    let day = u8::try_from(date.day()).ok()?;
    ExcelDateTime::from_ymd(year, month, day).ok()
}

fn col_index(col: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

#[allow(clippy::cast_precision_loss)]
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Blank => {}
        Cell::Integer(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        Cell::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}
