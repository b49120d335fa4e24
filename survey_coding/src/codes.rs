// ********* Coding dictionaries ***********

// The literal category-to-code mappings for the questionnaire. The strings
// must match the raw answers exactly; anything else decodes to missing.

use crate::{CodeDict, ColumnSpec, Decode};

/// 0=男; 1=女
pub const GENDER: CodeDict = &[("男", 0), ("女", 1)];

pub const AGE_CAT: CodeDict = &[
    ("35岁及以下", 1),
    ("36-45岁", 2),
    ("46-55岁", 3),
    ("56-65岁", 4),
    ("66岁及以上", 5),
];

pub const EDU: CodeDict = &[
    ("小学及以下", 1),
    ("初中/中专", 2),
    ("高中", 3),
    ("大专", 4),
    ("本科", 5),
];

/// 1=是; 0=否
pub const YES_NO: CodeDict = &[("是", 1), ("否", 0)];

/// The questionnaire uses two wording families for its 1-5 scales
/// (完善-type and 强弱-type). Both map onto the same codes.
pub const LIKERT: CodeDict = &[
    ("极差", 1),
    ("较差", 2),
    ("一般", 3),
    ("较高", 4),
    ("非常完善", 5),
    ("极弱", 1),
    ("较弱", 2),
    ("较强", 4),
    ("极强", 5),
];

pub const TRAINING: CodeDict = &[
    ("是，政府组织", 1),
    ("是，企业培训", 2),
    ("是，在学校学习过", 3),
    ("否", 4),
];

pub const LAND_CAT: CodeDict = &[
    ("无", 0),
    ("1-5亩", 1),
    ("6-10亩", 2),
    ("11-15亩", 3),
    ("16-20亩", 4),
    ("21亩及以上", 5),
];

pub const ENV: CodeDict = &[
    ("完全不适合", 1),
    ("适合但需要改进", 2),
    ("适合需要加大投入建设", 3),
    ("适合", 4),
    ("非常适合", 5),
];

// ********* Positional schema ***********

/// The positional contract with the questionnaire export, in output order.
/// Zero-based column indices. `optional` entries are dropped when the
/// sheet is narrower than the full questionnaire.
pub const FIXED_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec { index: 1, name: "gender", decode: Decode::Categorical(GENDER), optional: false },
    ColumnSpec { index: 2, name: "age_cat", decode: Decode::Categorical(AGE_CAT), optional: false },
    ColumnSpec { index: 3, name: "edu", decode: Decode::Categorical(EDU), optional: false },
    ColumnSpec { index: 4, name: "f_size", decode: Decode::Numeric, optional: false },
    ColumnSpec { index: 5, name: "up15_size", decode: Decode::Numeric, optional: false },
    ColumnSpec { index: 6, name: "l_size", decode: Decode::Numeric, optional: false },
    ColumnSpec { index: 7, name: "migrant", decode: Decode::Numeric, optional: false },
    ColumnSpec { index: 8, name: "income", decode: Decode::Numeric, optional: false },
    ColumnSpec { index: 9, name: "participate", decode: Decode::Categorical(YES_NO), optional: false },
    ColumnSpec { index: 11, name: "agri_income", decode: Decode::NumericZeroFill, optional: false },
    ColumnSpec { index: 12, name: "dividend", decode: Decode::NumericZeroFill, optional: false },
    ColumnSpec { index: 14, name: "training", decode: Decode::Categorical(TRAINING), optional: true },
    ColumnSpec { index: 16, name: "land_cat", decode: Decode::Categorical(LAND_CAT), optional: true },
    ColumnSpec { index: 17, name: "transport", decode: Decode::Categorical(LIKERT), optional: true },
    ColumnSpec { index: 18, name: "policy", decode: Decode::Categorical(LIKERT), optional: true },
    ColumnSpec { index: 19, name: "info", decode: Decode::Categorical(LIKERT), optional: true },
    ColumnSpec { index: 20, name: "attraction", decode: Decode::Categorical(LIKERT), optional: true },
    ColumnSpec { index: 21, name: "env", decode: Decode::Categorical(ENV), optional: true },
];

/// Zero-based position of the free-text multi-select question
/// (main problems faced by the household).
pub const MULTI_SELECT_INDEX: usize = 22;

// ********* Data dictionary ***********

/// The human-readable documentation of the structured table's fixed
/// fields: (variable name, meaning, coding scheme). Authored as a literal
/// table, not derived from data.
pub const DATA_DICTIONARY: &[(&str, &str, &str)] = &[
    ("ID", "样本唯一编号", "1,2,3,..."),
    ("gender", "受访者性别", "0=男; 1=女"),
    ("age_cat", "年龄分层", "1=35岁及以下; 2=36-45岁; 3=46-55岁; 4=56-65岁; 5=66岁及以上"),
    ("edu", "受教育程度", "1=小学及以下; 2=初中/中专; 3=高中; 4=大专; 5=本科"),
    ("f_size", "家庭总人口", "数值"),
    ("up15_size", "15周岁以上人口数", "数值"),
    ("l_size", "家庭劳动人口数", "数值"),
    ("migrant", "常年外出务工人数", "数值"),
    ("income", "家庭年总收入(万元)", "数值"),
    ("ln_income", "收入的自然对数", "ln(income)"),
    ("participate", "决策变量(处理组)", "1=是; 0=否"),
    ("agri_income", "农文旅收入(万元)", "数值"),
    ("dividend", "分红收入(万元)", "数值"),
    ("training", "技能培训", "1=政府组织; 2=企业培训; 3=在学校学习过; 4=否"),
    ("training_yes", "是否培训(二分)", "1=是; 0=否"),
    ("land_cat", "耕地面积分层", "0=无; 1=1-5亩; 2=6-10亩; 3=11-15亩; 4=16-20亩; 5=21亩及以上"),
    ("transport", "交通通畅程度", "1=极差; 2=较差; 3=一般; 4=较高; 5=非常完善"),
    ("policy", "政策扶持力度", "1=极弱; 2=较弱; 3=一般; 4=较强; 5=极强"),
    ("info", "信息化建设程度", "1=极差; 2=较差; 3=一般; 4=较高; 5=非常完善"),
    ("attraction", "旅游吸引力", "1=极弱; 2=较弱; 3=一般; 4=较强; 5=极强"),
    ("env", "环境卫生条件", "1=完全不适合; 2=适合但需要改进; 3=适合需要加大投入建设; 4=适合; 5=非常适合"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_indices_are_strictly_increasing() {
        let mut last = 0;
        for spec in FIXED_SCHEMA {
            assert!(spec.index > last, "{:?}", spec.name);
            last = spec.index;
        }
        assert!(MULTI_SELECT_INDEX > last);
    }

    #[test]
    fn dictionary_covers_every_schema_field() {
        let documented: Vec<&str> = DATA_DICTIONARY.iter().map(|(n, _, _)| *n).collect();
        for spec in FIXED_SCHEMA {
            assert!(documented.contains(&spec.name), "{:?}", spec.name);
        }
        for derived in ["ID", "ln_income", "training_yes"] {
            assert!(documented.contains(&derived));
        }
    }
}
