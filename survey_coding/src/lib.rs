//! Core routines for turning a fixed-layout questionnaire export into a
//! structured, numerically coded dataset, and for describing that dataset.
//!
//! The crate is deliberately free of file I/O: callers hand in rows of
//! [`CellValue`] and get back a [`StructuredTable`]. Reading and writing
//! spreadsheets is the binary's job.
//!
//! Decoding is silent by design: an unmapped category or a failed numeric
//! coercion becomes [`Datum::Missing`], never an error. Callers that need
//! strict inputs must validate upstream.

mod codes;
pub mod multiselect;
pub mod stats;

use log::debug;

pub use crate::codes::*;

// **** Raw side ****

/// A single raw cell, decoupled from any particular spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Lenient numeric coercion. Failures are reported as `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(x) => Some(*x),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        }
    }
}

// **** Structured side ****

/// One cell of the structured table.
///
/// `Missing` is the explicit encoding of "no value": unmapped categorical
/// strings and failed numeric coercions end up here, and writers emit it
/// as a blank cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datum {
    Int(i64),
    Float(f64),
    Missing,
}

impl Datum {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(x) => Some(*x as f64),
            Datum::Float(x) => Some(*x),
            Datum::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: Vec<Datum>,
}

/// Column-major table, one [`Datum`] per respondent per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredTable {
    pub columns: Vec<Column>,
}

impl StructuredTable {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn push(&mut self, name: impl Into<String>, data: Vec<Datum>) {
        self.columns.push(Column {
            name: name.into(),
            data,
        });
    }
}

// **** Schema ****

pub type CodeDict = &'static [(&'static str, i64)];

#[derive(Debug, Clone, Copy)]
pub enum Decode {
    /// Exact match against a literal string-to-code dictionary. Unmapped
    /// or non-text cells decode to `Missing`.
    Categorical(CodeDict),
    /// Lenient numeric coercion, failures become `Missing`.
    Numeric,
    /// Numeric coercion with blanks and failures filled with zero.
    NumericZeroFill,
}

/// One entry of the positional contract with the questionnaire export.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Zero-based position in the raw row. Positions, not headers, are the
    /// input contract; a shifted column produces wrong or missing codes
    /// rather than an error.
    pub index: usize,
    pub name: &'static str,
    pub decode: Decode,
    /// Skipped entirely when the input sheet is narrower than `index + 1`.
    pub optional: bool,
}

fn decode_cell(cell: &CellValue, decode: Decode) -> Datum {
    match decode {
        Decode::Categorical(dict) => match cell.as_text() {
            Some(s) => {
                let t = s.trim();
                dict.iter()
                    .find(|(label, _)| *label == t)
                    .map(|(_, code)| Datum::Int(*code))
                    .unwrap_or(Datum::Missing)
            }
            None => Datum::Missing,
        },
        Decode::Numeric => cell.to_number().map(Datum::Float).unwrap_or(Datum::Missing),
        Decode::NumericZeroFill => Datum::Float(cell.to_number().unwrap_or(0.0)),
    }
}

fn ln_datum(d: &Datum) -> Datum {
    match d.as_f64() {
        Some(x) if x > 0.0 => Datum::Float(x.ln()),
        _ => Datum::Missing,
    }
}

fn training_yes_datum(d: &Datum) -> Datum {
    match d {
        Datum::Int(1..=3) => Datum::Int(1),
        Datum::Int(4) => Datum::Int(0),
        _ => Datum::Missing,
    }
}

/// Recodes raw survey rows into the structured table.
///
/// The output carries the fixed fields in schema order with `ln_income`
/// and `training_yes` derived in place, then one 0/1 indicator column per
/// multi-select item discovered in the data. Optional trailing columns
/// are dropped when the input is narrower than the full questionnaire.
pub fn recode_rows(rows: &[Vec<CellValue>]) -> StructuredTable {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let n = rows.len();
    let mut table = StructuredTable::default();

    table.push("ID", (1..=n as i64).map(Datum::Int).collect());

    for spec in FIXED_SCHEMA {
        if spec.optional && width <= spec.index {
            debug!(
                "recode_rows: input is {} columns wide, skipping {:?}",
                width, spec.name
            );
            continue;
        }
        let data: Vec<Datum> = rows
            .iter()
            .map(|row| decode_cell(row.get(spec.index).unwrap_or(&CellValue::Empty), spec.decode))
            .collect();
        let derived: Option<(&str, Vec<Datum>)> = match spec.name {
            "income" => Some(("ln_income", data.iter().map(ln_datum).collect())),
            "training" => Some(("training_yes", data.iter().map(training_yes_datum).collect())),
            _ => None,
        };
        table.push(spec.name, data);
        if let Some((dname, ddata)) = derived {
            table.push(dname, ddata);
        }
    }

    if width > MULTI_SELECT_INDEX {
        let cells: Vec<String> = rows
            .iter()
            .map(|row| {
                multiselect::normalize_cell(row.get(MULTI_SELECT_INDEX).unwrap_or(&CellValue::Empty))
            })
            .collect();
        let vocab = multiselect::discover_vocabulary(&cells);
        for (name, values) in multiselect::expand_indicators(&vocab, &cells) {
            table.push(name, values.into_iter().map(Datum::Int).collect());
        }
    } else {
        debug!(
            "recode_rows: input is {} columns wide, no multi-select column",
            width
        );
    }

    table
}
