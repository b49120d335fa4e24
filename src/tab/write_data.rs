// Writers for the structured table and its data dictionary.

use rust_xlsxwriter::{Format, Workbook};
use snafu::prelude::*;

use survey_coding::{Datum, StructuredTable, DATA_DICTIONARY};

use crate::tab::*;

/// Writes the structured table: one header row, one respondent per row,
/// missing values as blank cells.
pub fn write_structured(table: &StructuredTable, path: &str) -> TabResult<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, column) in table.columns.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_with_format(0, col, column.name.as_str(), &header_format)
            .context(WritingExcelSnafu { path })?;
        for (row, datum) in column.data.iter().enumerate() {
            let row = row as u32 + 1;
            match datum {
                Datum::Int(x) => {
                    sheet
                        .write(row, col, *x as f64)
                        .context(WritingExcelSnafu { path })?;
                }
                Datum::Float(x) => {
                    sheet
                        .write(row, col, *x)
                        .context(WritingExcelSnafu { path })?;
                }
                Datum::Missing => {}
            }
        }
    }

    workbook.save(path).context(WritingExcelSnafu { path })?;
    Ok(())
}

/// Writes the data dictionary: the literal three-column table documenting
/// the fixed fields of the structured dataset.
pub fn write_dictionary(path: &str) -> TabResult<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in ["变量名", "变量含义", "编码说明"].iter().enumerate() {
        sheet
            .write_with_format(0, col as u16, *name, &header_format)
            .context(WritingExcelSnafu { path })?;
    }
    for (row, (name, meaning, coding)) in DATA_DICTIONARY.iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write(row, 0, *name).context(WritingExcelSnafu { path })?;
        sheet
            .write(row, 1, *meaning)
            .context(WritingExcelSnafu { path })?;
        sheet
            .write(row, 2, *coding)
            .context(WritingExcelSnafu { path })?;
    }
    sheet.set_column_width(0, 14).ok();
    sheet.set_column_width(1, 26).ok();
    sheet.set_column_width(2, 64).ok();

    workbook.save(path).context(WritingExcelSnafu { path })?;
    Ok(())
}
