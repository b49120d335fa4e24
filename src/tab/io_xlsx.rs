// Spreadsheet ingestion for both pipelines. The raw questionnaire export
// is read positionally; the structured table is read back by header name.

use std::collections::HashMap;

use calamine::{open_workbook_auto, DataType, Reader};
use log::debug;
use snafu::prelude::*;

use survey_coding::CellValue;

use crate::tab::*;

fn read_first_range(path: &str) -> TabResult<calamine::Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })
}

fn to_cell_value(dt: &DataType) -> CellValue {
    match dt {
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(format!("{}", other)),
    }
}

/// Reads the raw questionnaire export: every row after the header row, as
/// positional cells.
pub fn read_raw_rows(path: &str) -> TabResult<Vec<Vec<CellValue>>> {
    let wrange = read_first_range(path)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("read_raw_rows: header: {:?}", header);

    let mut res: Vec<Vec<CellValue>> = Vec::new();
    for row in iter {
        res.push(row.iter().map(to_cell_value).collect());
    }
    Ok(res)
}

/// Reads the structured table back as named columns of optional numbers.
/// On this side the header names, not the positions, are the contract.
pub fn read_structured_columns(path: &str) -> TabResult<HashMap<String, Vec<Option<f64>>>> {
    let wrange = read_first_range(path)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;

    let named: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, dt)| match dt {
            DataType::String(s) => Some((idx, s.clone())),
            _ => None,
        })
        .collect();
    debug!("read_structured_columns: header: {:?}", named);

    let mut columns: HashMap<String, Vec<Option<f64>>> = named
        .iter()
        .map(|(_, name)| (name.clone(), Vec::new()))
        .collect();
    for row in iter {
        for (idx, name) in &named {
            let value = row
                .get(*idx)
                .map(to_cell_value)
                .and_then(|c| c.to_number());
            if let Some(col) = columns.get_mut(name) {
                col.push(value);
            }
        }
    }
    Ok(columns)
}
