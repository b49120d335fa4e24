// Builds the multi-sheet descriptive-statistics workbook from the
// structured table. Sheet names, table layouts and number formats follow
// the questionnaire report conventions: frequencies as plain numbers,
// percentages and moments as strings with a fixed number of decimals.

use std::collections::HashMap;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use snafu::prelude::*;

use survey_coding::stats;
use survey_coding::{AGE_CAT, EDU};

use crate::tab::*;

type Columns = HashMap<String, Vec<Option<f64>>>;

const HOUSEHOLD_VARS: &[(&str, &str)] = &[
    ("f_size", "家庭总人口"),
    ("up15_size", "15周岁以上人口数"),
    ("l_size", "劳动力人口数"),
    ("migrant", "外出务工人数"),
];

const PERCEPTION_VARS: &[(&str, &str)] = &[
    ("transport", "交通通畅程度"),
    ("info", "信息化建设程度"),
    ("attraction", "旅游吸引力"),
    ("env", "环境卫生条件"),
];

/// Key figures of a report run, for the optional JSON summary output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub sample_size: usize,
    pub ln_income_by_participation: Option<GroupComparison>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupComparison {
    pub non_participant_mean: f64,
    pub participant_mean: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub significance: String,
}

enum Cell {
    Text(String),
    Number(f64),
}

fn text(s: impl Into<String>) -> Cell {
    Cell::Text(s.into())
}

fn num(x: f64) -> Cell {
    Cell::Number(x)
}

/// Writes one bold header row followed by the data rows, starting at
/// `start_row`.
fn write_table(
    sheet: &mut Worksheet,
    start_row: u32,
    headers: &[&str],
    rows: &[Vec<Cell>],
    header_format: &Format,
    path: &str,
) -> TabResult<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_with_format(start_row, col as u16, *header, header_format)
            .context(WritingExcelSnafu { path })?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (start_row + 1 + r as u32, c as u16);
            match cell {
                Cell::Text(s) => {
                    sheet
                        .write(r, c, s.as_str())
                        .context(WritingExcelSnafu { path })?;
                }
                Cell::Number(x) => {
                    sheet.write(r, c, *x).context(WritingExcelSnafu { path })?;
                }
            }
        }
    }
    Ok(())
}

fn named_sheet<'a>(
    workbook: &'a mut Workbook,
    name: &str,
    path: &str,
) -> TabResult<&'a mut Worksheet> {
    workbook
        .add_worksheet()
        .set_name(name)
        .context(WritingExcelSnafu { path })
}

fn required<'a>(columns: &'a Columns, name: &str) -> TabResult<&'a [Option<f64>]> {
    columns
        .get(name)
        .map(|v| v.as_slice())
        .context(MissingColumnSnafu { name })
}

/// Writes the full report workbook and returns the key figures.
pub fn write_report(columns: &Columns, path: &str) -> TabResult<ReportSummary> {
    let total_n = columns.values().map(|v| v.len()).max().unwrap_or(0);

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    sheet_sample_size(&mut workbook, total_n, &header_format, path)?;
    sheet_gender(&mut workbook, columns, total_n, &header_format, path)?;
    sheet_age(&mut workbook, columns, total_n, &header_format, path)?;
    sheet_edu(&mut workbook, columns, total_n, &header_format, path)?;
    sheet_household(&mut workbook, columns, &header_format, path)?;
    let comparison = sheet_economic(&mut workbook, columns, &header_format, path)?;
    sheet_participation(&mut workbook, columns, total_n, &header_format, path)?;
    sheet_perception(&mut workbook, columns, &header_format, path)?;
    sheet_policy(&mut workbook, columns, &header_format, path)?;
    sheet_training(&mut workbook, columns, total_n, &header_format, path)?;
    sheet_summary(
        &mut workbook,
        columns,
        total_n,
        comparison.as_ref(),
        &header_format,
        path,
    )?;

    workbook.save(path).context(WritingExcelSnafu { path })?;
    Ok(ReportSummary {
        sample_size: total_n,
        ln_income_by_participation: comparison,
    })
}

fn sheet_sample_size(
    workbook: &mut Workbook,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let sheet = named_sheet(workbook, "1_样本规模", path)?;
    let rows = vec![vec![text("样本总数"), num(total_n as f64)]];
    write_table(sheet, 0, &["统计项", "数量(n)"], &rows, fmt, path)
}

fn sheet_gender(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let gender = required(columns, "gender")?;
    let male = stats::code_count(gender, 0);
    let female = stats::code_count(gender, 1);

    let sheet = named_sheet(workbook, "2_个体特征_性别", path)?;
    let rows = vec![
        vec![
            text("男"),
            num(male as f64),
            text(stats::percent(male, total_n)),
        ],
        vec![
            text("女"),
            num(female as f64),
            text(stats::percent(female, total_n)),
        ],
        vec![
            text("合计"),
            num((male + female) as f64),
            text("100.00"),
        ],
    ];
    write_table(sheet, 0, &["类别", "频数", "百分比(%)"], &rows, fmt, path)
}

fn sheet_age(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let age = required(columns, "age_cat")?;
    let sheet = named_sheet(workbook, "2_个体特征_年龄", path)?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut cum = 0.0;
    for (label, code) in AGE_CAT {
        let count = stats::code_count(age, *code);
        let pct = stats::percent_value(count, total_n);
        cum += pct;
        rows.push(vec![
            text(*label),
            num(count as f64),
            text(format!("{:.2}", pct)),
            text(format!("{:.2}", cum)),
        ]);
    }
    rows.push(vec![
        text("合计"),
        num(total_n as f64),
        text("100.00"),
        text("100.00"),
    ]);
    write_table(
        sheet,
        0,
        &["类别", "频数", "百分比(%)", "累计百分比(%)"],
        &rows,
        fmt,
        path,
    )
}

fn sheet_edu(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let edu = required(columns, "edu")?;
    let sheet = named_sheet(workbook, "2_个体特征_教育", path)?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut cum = 0.0;
    for (label, code) in EDU {
        let count = stats::code_count(edu, *code);
        let pct = stats::percent_value(count, total_n);
        cum += pct;
        rows.push(vec![
            text(*label),
            num(*code as f64),
            num(count as f64),
            text(format!("{:.2}", pct)),
            text(format!("{:.2}", cum)),
        ]);
    }
    rows.push(vec![
        text("合计"),
        text(""),
        num(total_n as f64),
        text("100.00"),
        text("100.00"),
    ]);
    write_table(
        sheet,
        0,
        &["类别", "编码", "频数", "百分比(%)", "累计百分比(%)"],
        &rows,
        fmt,
        path,
    )?;

    // Mean and standard deviation of the level codes, two blank rows
    // below the frequency table.
    if let Some(s) = stats::summarize(edu) {
        let mini = vec![
            vec![text("均值"), text(format!("{:.2}", s.mean))],
            vec![text("标准差"), text(format!("{:.2}", s.std))],
        ];
        write_table(
            sheet,
            rows.len() as u32 + 3,
            &["统计量", "数值"],
            &mini,
            fmt,
            path,
        )?;
    }
    Ok(())
}

fn sheet_household(
    workbook: &mut Workbook,
    columns: &Columns,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let sheet = named_sheet(workbook, "3_家庭结构特征", path)?;
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (var, name) in HOUSEHOLD_VARS {
        let summary = columns.get(*var).and_then(|v| stats::summarize(v));
        if let Some(s) = summary {
            rows.push(vec![
                text(*name),
                text(format!("{:.2}", s.mean)),
                text(format!("{:.2}", s.std)),
                text(format!("{:.0}", s.min)),
                text(format!("{:.0}", s.max)),
                num(s.n_valid as f64),
            ]);
        }
    }
    write_table(
        sheet,
        0,
        &["变量", "均值", "标准差", "最小值", "最大值", "有效样本数"],
        &rows,
        fmt,
        path,
    )
}

fn group_row(label: &str, values: &[f64]) -> Vec<Cell> {
    match stats::summarize_values(values) {
        Some(s) => vec![
            text(label),
            text(format!("{:.4}", s.mean)),
            text(format!("{:.4}", s.std)),
            num(s.n_valid as f64),
        ],
        None => vec![text(label), text(""), text(""), num(0.0)],
    }
}

/// The economic sheet stacks four tables: income moments, log-income
/// moments, grouped log-income, and the mean-comparison t-test.
fn sheet_economic(
    workbook: &mut Workbook,
    columns: &Columns,
    fmt: &Format,
    path: &str,
) -> TabResult<Option<GroupComparison>> {
    let income = required(columns, "income")?;
    let ln_income = required(columns, "ln_income")?;
    let participate = required(columns, "participate")?;

    let sheet = named_sheet(workbook, "4_经济特征_收入", path)?;

    let income_rows: Vec<Vec<Cell>> = match stats::summarize(income) {
        Some(s) => vec![
            vec![text("均值"), text(format!("{:.2}", s.mean))],
            vec![text("标准差"), text(format!("{:.2}", s.std))],
            vec![text("最小值"), text(format!("{:.2}", s.min))],
            vec![text("最大值"), text(format!("{:.2}", s.max))],
            vec![text("中位数"), text(format!("{:.2}", s.median))],
            vec![text("有效样本数"), num(s.n_valid as f64)],
        ],
        None => Vec::new(),
    };
    write_table(
        sheet,
        0,
        &["统计量", "家庭年收入(万元)"],
        &income_rows,
        fmt,
        path,
    )?;

    let ln_rows: Vec<Vec<Cell>> = match stats::summarize(ln_income) {
        Some(s) => vec![
            vec![text("均值"), text(format!("{:.4}", s.mean))],
            vec![text("标准差"), text(format!("{:.4}", s.std))],
            vec![text("最小值"), text(format!("{:.4}", s.min))],
            vec![text("最大值"), text(format!("{:.4}", s.max))],
            vec![text("有效样本数"), num(s.n_valid as f64)],
        ],
        None => Vec::new(),
    };
    let ln_start = income_rows.len() as u32 + 2;
    write_table(sheet, ln_start, &["统计量", "ln(收入)"], &ln_rows, fmt, path)?;

    let group0 = stats::group_by_code(ln_income, participate, 0);
    let group1 = stats::group_by_code(ln_income, participate, 1);
    let cmp_rows = vec![
        group_row("未参与农文旅(0)", &group0),
        group_row("参与农文旅(1)", &group1),
    ];
    let cmp_start = (income_rows.len() + ln_rows.len() + 5) as u32;
    write_table(
        sheet,
        cmp_start,
        &["组别", "均值", "标准差", "样本数"],
        &cmp_rows,
        fmt,
        path,
    )?;

    let ttest = stats::two_sample_t_test(&group0, &group1);
    if let Some(tt) = &ttest {
        let rows = vec![
            vec![text("t统计量"), text(format!("{:.4}", tt.statistic))],
            vec![text("p值"), text(format!("{:.4}", tt.p_value))],
            vec![
                text("显著性"),
                text(stats::significance_stars(tt.p_value)),
            ],
        ];
        let ttest_start = (income_rows.len() + ln_rows.len() + cmp_rows.len() + 8) as u32;
        write_table(sheet, ttest_start, &["检验项", "数值"], &rows, fmt, path)?;
    }

    let comparison = match (
        &ttest,
        stats::summarize_values(&group0),
        stats::summarize_values(&group1),
    ) {
        (Some(tt), Some(s0), Some(s1)) => Some(GroupComparison {
            non_participant_mean: s0.mean,
            participant_mean: s1.mean,
            t_statistic: tt.statistic,
            p_value: tt.p_value,
            significance: stats::significance_stars(tt.p_value).to_string(),
        }),
        _ => None,
    };
    Ok(comparison)
}

fn sheet_participation(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let participate = required(columns, "participate")?;
    let no = stats::code_count(participate, 0);
    let yes = stats::code_count(participate, 1);

    let sheet = named_sheet(workbook, "5_产业参与特征", path)?;
    let rows = vec![
        vec![
            text("未参与"),
            num(no as f64),
            text(stats::percent(no, total_n)),
        ],
        vec![
            text("参与"),
            num(yes as f64),
            text(stats::percent(yes, total_n)),
        ],
        vec![text("合计"), num(total_n as f64), text("100.00")],
    ];
    write_table(sheet, 0, &["类别", "频数", "百分比(%)"], &rows, fmt, path)
}

fn perception_rows(columns: &Columns, vars: &[(&str, &str)]) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (var, name) in vars {
        let summary = columns.get(*var).and_then(|v| stats::summarize(v));
        if let Some(s) = summary {
            rows.push(vec![
                text(*name),
                text(format!("{:.2}", s.mean)),
                text(format!("{:.2}", s.std)),
                num(s.min),
                num(s.max),
                text(format!("{:.2}", s.median)),
                num(s.n_valid as f64),
            ]);
        }
    }
    rows
}

const PERCEPTION_HEADERS: &[&str] = &[
    "变量",
    "均值",
    "标准差",
    "最小值",
    "最大值",
    "中位数",
    "有效样本数",
];

fn sheet_perception(
    workbook: &mut Workbook,
    columns: &Columns,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let sheet = named_sheet(workbook, "6_主观感知", path)?;
    let rows = perception_rows(columns, PERCEPTION_VARS);
    write_table(sheet, 0, PERCEPTION_HEADERS, &rows, fmt, path)
}

fn sheet_policy(
    workbook: &mut Workbook,
    columns: &Columns,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let sheet = named_sheet(workbook, "7_政策支持", path)?;
    let rows = perception_rows(columns, &[("policy", "政策扶持力度")]);
    write_table(sheet, 0, PERCEPTION_HEADERS, &rows, fmt, path)
}

fn sheet_training(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let sheet = named_sheet(workbook, "8_培训情况", path)?;
    let rows = match columns.get("training_yes") {
        Some(training) => {
            let no = stats::code_count(training, 0);
            let yes = stats::code_count(training, 1);
            vec![
                vec![
                    text("未参加培训"),
                    num(no as f64),
                    text(stats::percent(no, total_n)),
                ],
                vec![
                    text("参加培训"),
                    num(yes as f64),
                    text(stats::percent(yes, total_n)),
                ],
                vec![text("合计"), num(total_n as f64), text("100.00")],
            ]
        }
        None => Vec::new(),
    };
    write_table(sheet, 0, &["类别", "频数", "百分比(%)"], &rows, fmt, path)
}

fn mean_std_result(columns: &Columns, var: &str) -> Option<String> {
    columns
        .get(var)
        .and_then(|v| stats::summarize(v))
        .map(|s| format!("{:.2} ± {:.2}", s.mean, s.std))
}

/// One row per variable across all the groups, written last so the
/// detailed sheets keep their numbered order.
fn sheet_summary(
    workbook: &mut Workbook,
    columns: &Columns,
    total_n: usize,
    comparison: Option<&GroupComparison>,
    fmt: &Format,
    path: &str,
) -> TabResult<()> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    rows.push(vec![
        text("样本规模"),
        text("n"),
        text(total_n.to_string()),
        text("样本总数"),
    ]);

    if let Some(gender) = columns.get("gender") {
        let male = stats::code_count(gender, 0);
        let female = stats::code_count(gender, 1);
        rows.push(vec![
            text("个体特征"),
            text("gender"),
            text(format!(
                "男: {} ({}%); 女: {} ({}%)",
                male,
                stats::percent(male, total_n),
                female,
                stats::percent(female, total_n)
            )),
            text("性别分布"),
        ]);
    }
    rows.push(vec![
        text("个体特征"),
        text("age_cat"),
        text("详见年龄分层表"),
        text("年龄分层"),
    ]);
    if let Some(result) = mean_std_result(columns, "edu") {
        rows.push(vec![
            text("个体特征"),
            text("edu"),
            text(result),
            text("教育程度(均值±标准差)"),
        ]);
    }

    for (var, name) in HOUSEHOLD_VARS {
        if let Some(result) = mean_std_result(columns, var) {
            rows.push(vec![text("家庭结构"), text(*var), text(result), text(*name)]);
        }
    }

    if let Some(result) = mean_std_result(columns, "income") {
        rows.push(vec![
            text("经济特征"),
            text("income"),
            text(result),
            text("家庭年收入(万元)"),
        ]);
    }
    if let Some(c) = comparison {
        rows.push(vec![
            text("经济特征"),
            text("ln_income"),
            text(format!(
                "未参与: {:.4}; 参与: {:.4}; t={:.4}, p={:.4}",
                c.non_participant_mean, c.participant_mean, c.t_statistic, c.p_value
            )),
            text("ln(收入)按参与状态对比"),
        ]);
    }

    if let Some(participate) = columns.get("participate") {
        let no = stats::code_count(participate, 0);
        let yes = stats::code_count(participate, 1);
        rows.push(vec![
            text("产业参与"),
            text("participate"),
            text(format!(
                "未参与: {} ({}%); 参与: {} ({}%)",
                no,
                stats::percent(no, total_n),
                yes,
                stats::percent(yes, total_n)
            )),
            text("是否参与农文旅"),
        ]);
    }

    for (var, name) in PERCEPTION_VARS {
        if let Some(result) = mean_std_result(columns, var) {
            rows.push(vec![text("主观感知"), text(*var), text(result), text(*name)]);
        }
    }
    if let Some(result) = mean_std_result(columns, "policy") {
        rows.push(vec![
            text("政策支持"),
            text("policy"),
            text(result),
            text("政策扶持力度"),
        ]);
    }

    if let Some(training) = columns.get("training_yes") {
        let no = stats::code_count(training, 0);
        let yes = stats::code_count(training, 1);
        rows.push(vec![
            text("培训"),
            text("training_yes"),
            text(format!(
                "未培训: {} ({}%); 培训: {} ({}%)",
                no,
                stats::percent(no, total_n),
                yes,
                stats::percent(yes, total_n)
            )),
            text("是否接受培训"),
        ]);
    }

    let sheet = named_sheet(workbook, "0_综合汇总", path)?;
    sheet.set_column_width(0, 12).ok();
    sheet.set_column_width(1, 14).ok();
    sheet.set_column_width(2, 48).ok();
    sheet.set_column_width(3, 26).ok();
    write_table(sheet, 0, &["类别", "变量", "统计结果", "说明"], &rows, fmt, path)
}
