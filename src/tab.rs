use std::path::Path;

use log::info;
use snafu::{prelude::*, Snafu};

pub mod io_xlsx;
pub mod report;
pub mod write_data;

#[derive(Debug, Snafu)]
pub enum TabError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Spreadsheet {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Input file {path} does not exist"))]
    MissingInput { path: String },
    #[snafu(display("Column {name} is missing from the structured table"))]
    MissingColumn { name: String },
    #[snafu(display("Error writing workbook {path}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error writing summary {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing summary"))]
    SerializingSummary { source: serde_json::Error },
}

pub type TabResult<T> = Result<T, TabError>;

// The input existence check runs once, before any processing. Everything
// downstream of it follows the silent-missing policy instead of erroring.
fn ensure_input_exists(path: &str) -> TabResult<()> {
    ensure!(Path::new(path).exists(), MissingInputSnafu { path });
    Ok(())
}

/// The recoding pipeline: raw questionnaire export in, structured table
/// and data dictionary out.
pub fn run_recode(input: &str, output: &str, dictionary: &str) -> TabResult<()> {
    ensure_input_exists(input)?;

    info!("Reading raw survey data from {:?}", input);
    let rows = io_xlsx::read_raw_rows(input)?;
    info!("Read {} response rows", rows.len());

    let table = survey_coding::recode_rows(&rows);
    info!(
        "Recoded {} rows into {} columns",
        table.num_rows(),
        table.columns.len()
    );

    write_data::write_structured(&table, output)?;
    info!("Structured data written to {:?}", output);

    write_data::write_dictionary(dictionary)?;
    info!("Data dictionary written to {:?}", dictionary);

    Ok(())
}

/// The reporting pipeline: structured table in, multi-sheet descriptive
/// statistics workbook (and optional JSON summary) out.
pub fn run_report(input: &str, output: &str, summary_out: Option<&str>) -> TabResult<()> {
    ensure_input_exists(input)?;

    info!("Reading structured data from {:?}", input);
    let columns = io_xlsx::read_structured_columns(input)?;

    let summary = report::write_report(&columns, output)?;
    info!("Report written to {:?}", output);

    if let Some(p) = summary_out {
        let js = serde_json::to_string_pretty(&summary).context(SerializingSummarySnafu {})?;
        std::fs::write(p, js).context(WritingSummarySnafu { path: p })?;
        info!("JSON summary written to {:?}", p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use survey_coding::{CellValue, Datum};

    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn respondent(
        gender: &str,
        income: f64,
        participate: &str,
        problems: &str,
    ) -> Vec<CellValue> {
        let mut row = vec![CellValue::Empty; 23];
        row[1] = text(gender);
        row[2] = text("36-45岁");
        row[3] = text("初中/中专");
        row[4] = CellValue::Number(4.0);
        row[5] = CellValue::Number(3.0);
        row[6] = CellValue::Number(2.0);
        row[7] = CellValue::Number(1.0);
        row[8] = CellValue::Number(income);
        row[9] = text(participate);
        row[11] = CellValue::Number(1.5);
        row[12] = text("(跳过)");
        row[14] = text("否");
        row[16] = text("6-10亩");
        row[17] = text("一般");
        row[18] = text("较强");
        row[19] = text("较差");
        row[20] = text("极强");
        row[21] = text("适合");
        row[22] = text(problems);
        row
    }

    #[test]
    fn structured_table_round_trips_through_xlsx() {
        let rows = vec![
            respondent("男", 10.0, "是", "缺乏资金┋缺乏技术"),
            respondent("女", 6.0, "否", "缺乏资金"),
            respondent("男", 8.0, "是", "其他（请注明）〖土地贫瘠〗"),
        ];
        let table = survey_coding::recode_rows(&rows);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structured.xlsx");
        let path_s = path.to_str().unwrap().to_string();
        write_data::write_structured(&table, &path_s).unwrap();

        let columns = io_xlsx::read_structured_columns(&path_s).unwrap();
        assert_eq!(columns["ID"], vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(columns["gender"], vec![Some(0.0), Some(1.0), Some(0.0)]);
        assert_eq!(
            columns["participate"],
            vec![Some(1.0), Some(0.0), Some(1.0)]
        );
        // The skipped dividend cell was zero-filled by the recoder.
        assert_eq!(
            columns["dividend"],
            vec![Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(
            columns["缺乏资金"],
            vec![Some(1.0), Some(1.0), Some(0.0)]
        );
        assert_eq!(
            columns["其他_土地贫瘠"],
            vec![Some(0.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn missing_values_come_back_as_blanks() {
        let mut row = respondent("男", 10.0, "是", "");
        row[3] = text("not a level");
        let table = survey_coding::recode_rows(&[row]);
        assert_eq!(table.column("edu").unwrap().data, vec![Datum::Missing]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structured.xlsx");
        let path_s = path.to_str().unwrap().to_string();
        write_data::write_structured(&table, &path_s).unwrap();

        let columns = io_xlsx::read_structured_columns(&path_s).unwrap();
        assert_eq!(columns["edu"], vec![None]);
    }

    #[test]
    fn report_writes_all_sheets() {
        let rows = vec![
            respondent("男", 10.0, "是", "缺乏资金"),
            respondent("女", 6.0, "否", ""),
            respondent("男", 8.0, "是", "缺乏技术"),
            respondent("女", 4.0, "否", "缺乏资金"),
        ];
        let table = survey_coding::recode_rows(&rows);

        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("structured.xlsx");
        let data_s = data_path.to_str().unwrap().to_string();
        write_data::write_structured(&table, &data_s).unwrap();

        let columns = io_xlsx::read_structured_columns(&data_s).unwrap();
        let report_path = dir.path().join("report.xlsx");
        let report_s = report_path.to_str().unwrap().to_string();
        let summary = report::write_report(&columns, &report_s).unwrap();
        assert_eq!(summary.sample_size, 4);
        let groups = summary.ln_income_by_participation.unwrap();
        assert!(groups.t_statistic < 0.0); // non-participants earn less

        use calamine::Reader;
        let workbook = calamine::open_workbook_auto(&report_s).unwrap();
        let names = workbook.sheet_names().to_vec();
        for expected in [
            "1_样本规模",
            "2_个体特征_性别",
            "2_个体特征_年龄",
            "2_个体特征_教育",
            "3_家庭结构特征",
            "4_经济特征_收入",
            "5_产业参与特征",
            "6_主观感知",
            "7_政策支持",
            "8_培训情况",
            "0_综合汇总",
        ] {
            assert!(names.iter().any(|n| n == expected), "{:?}", expected);
        }
    }

    #[test]
    fn missing_input_is_reported_before_processing() {
        let res = run_recode("no_such_file.xlsx", "out.xlsx", "dict.xlsx");
        match res {
            Err(TabError::MissingInput { path }) => assert_eq!(path, "no_such_file.xlsx"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
