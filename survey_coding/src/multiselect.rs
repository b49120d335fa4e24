//! Multi-select indicator expansion.
//!
//! A multi-select answer arrives as one free-text cell holding the
//! selected items concatenated with [`DELIMITER`]. The "other (please
//! specify)" option embeds its free text between 〖 and 〗 after a fixed
//! marker phrase.
//!
//! The expansion is a two-phase process: [`discover_vocabulary`] computes
//! the set of distinct items from the input, then [`expand_indicators`]
//! materializes one 0/1 column per item. Keeping the phases separate keeps
//! "what columns exist" testable independently of "what values they hold".
//!
//! No validation happens anywhere here: malformed cells (unbalanced
//! brackets, stray delimiters) degrade to fewer or garbled vocabulary
//! entries rather than an error.

use std::collections::HashMap;

use log::debug;
use regex::Regex;

use crate::CellValue;

/// Separator between selected items inside one cell.
pub const DELIMITER: char = '┋';
/// Placeholder the survey tool writes when the question was skipped.
pub const SKIP_MARKER: &str = "(跳过)";
/// Prefix marking synthesized "other" items in the vocabulary.
pub const OTHER_PREFIX: &str = "其他_";

const OTHER_PATTERN: &str = "其他（请注明）〖(.*?)〗";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabItem {
    /// A literal item label, matched by substring containment. Labels do
    /// not contain the delimiter or bracket characters, so containment is
    /// safe here.
    Literal(String),
    /// The free-text elaboration of an "other" selection, matched inside
    /// its bracket markers.
    Other(String),
}

impl VocabItem {
    /// The raw identifier of this item, before column-name sanitization.
    pub fn identifier(&self) -> String {
        match self {
            VocabItem::Literal(s) => s.clone(),
            VocabItem::Other(s) => format!("{}{}", OTHER_PREFIX, s),
        }
    }

    fn selects(&self, cell: &str) -> bool {
        match self {
            VocabItem::Literal(s) => cell.contains(s.as_str()),
            VocabItem::Other(s) => cell.contains(&format!("〖{}〗", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    pub items: Vec<VocabItem>,
}

/// Maps a raw cell to the text used for tokenization and membership
/// tests. The skip placeholder and empty cells count as an empty answer.
pub fn normalize_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) if s == SKIP_MARKER => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(x) => x.to_string(),
        CellValue::Empty => String::new(),
    }
}

/// Discovers the distinct items selected across all cells.
///
/// Literal items are ordered by descending frequency of their token
/// across the whole input; ties keep first-discovery order. The
/// deduplicated "other" elaborations follow, in lexicographic order.
pub fn discover_vocabulary(cells: &[String]) -> Vocabulary {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut discovery: Vec<String> = Vec::new();
    for cell in cells {
        for token in cell.split(DELIMITER) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if !counts.contains_key(token) {
                discovery.push(token.to_string());
            }
            *counts.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(usize, String)> = discovery.into_iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| counts[b].cmp(&counts[a]).then(ia.cmp(ib)));
    let mut items: Vec<VocabItem> = ranked
        .into_iter()
        .map(|(_, s)| VocabItem::Literal(s))
        .collect();

    let re = Regex::new(OTHER_PATTERN).expect("valid pattern");
    let mut others: Vec<String> = Vec::new();
    for cell in cells {
        for cap in re.captures_iter(cell) {
            let text = cap[1].to_string();
            if !others.contains(&text) {
                others.push(text);
            }
        }
    }
    others.sort();
    items.extend(others.into_iter().map(VocabItem::Other));

    debug!("discover_vocabulary: {} items", items.len());
    Vocabulary { items }
}

/// Expands the vocabulary into 0/1 indicator columns, one per item, in
/// vocabulary order and with the same length as the input.
///
/// Column names are sanitized; when two distinct items collapse to the
/// same sanitized name, later ones get a `_2`, `_3`, ... suffix instead of
/// silently overwriting the earlier column.
pub fn expand_indicators(vocab: &Vocabulary, cells: &[String]) -> Vec<(String, Vec<i64>)> {
    let mut used: Vec<String> = Vec::new();
    let mut res: Vec<(String, Vec<i64>)> = Vec::with_capacity(vocab.items.len());
    for item in &vocab.items {
        let base = sanitize_name(&item.identifier());
        let mut name = base.clone();
        let mut k = 2;
        while used.contains(&name) {
            name = format!("{}_{}", base, k);
            k += 1;
        }
        used.push(name.clone());
        let values: Vec<i64> = cells.iter().map(|c| i64::from(item.selects(c))).collect();
        res.push((name, values));
    }
    res
}

/// Collapses every run of non-word characters into a single underscore to
/// form a safe column name.
pub fn sanitize_name(raw: &str) -> String {
    let re = Regex::new(r"\W+").expect("valid pattern");
    re.replace_all(raw, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn indicator<'a>(
        expanded: &'a [(String, Vec<i64>)],
        name: &str,
    ) -> &'a Vec<i64> {
        &expanded
            .iter()
            .find(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("no column {:?}", name))
            .1
    }

    #[test]
    fn tokenization_sets_one_indicator_per_item() {
        let cells = strings(&["缺乏资金┋缺乏技术", "缺乏资金", ""]);
        let vocab = discover_vocabulary(&cells);
        let expanded = expand_indicators(&vocab, &cells);

        assert_eq!(indicator(&expanded, "缺乏资金"), &vec![1, 1, 0]);
        assert_eq!(indicator(&expanded, "缺乏技术"), &vec![1, 0, 0]);
    }

    #[test]
    fn vocabulary_ranked_by_frequency_then_discovery() {
        let cells = strings(&["b┋a", "a", "a┋c", "b"]);
        let vocab = discover_vocabulary(&cells);
        let ids: Vec<String> = vocab.items.iter().map(|i| i.identifier()).collect();
        // a appears 3 times, b twice, c once. b was discovered before a but
        // frequency wins; ties would keep discovery order.
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn frequency_ties_keep_discovery_order() {
        let cells = strings(&["y┋x", "x┋y"]);
        let vocab = discover_vocabulary(&cells);
        let ids: Vec<String> = vocab.items.iter().map(|i| i.identifier()).collect();
        assert_eq!(ids, vec!["y", "x"]);
    }

    #[test]
    fn other_elaboration_becomes_its_own_item() {
        let cells = strings(&["其他（请注明）〖土地贫瘠〗", "缺乏资金"]);
        let vocab = discover_vocabulary(&cells);
        let ids: Vec<String> = vocab.items.iter().map(|i| i.identifier()).collect();
        // The raw "other" token stays a literal item; the captured text is
        // appended as a synthesized identifier.
        assert!(ids.contains(&"其他_土地贫瘠".to_string()));

        let expanded = expand_indicators(&vocab, &cells);
        assert_eq!(indicator(&expanded, "其他_土地贫瘠"), &vec![1, 0]);
    }

    #[test]
    fn other_membership_requires_the_bracket_markers() {
        let vocab = Vocabulary {
            items: vec![VocabItem::Other("土地贫瘠".to_string())],
        };
        // Plain mention of the text does not count as a selection.
        let cells = strings(&["土地贫瘠", "其他（请注明）〖土地贫瘠〗"]);
        let expanded = expand_indicators(&vocab, &cells);
        assert_eq!(expanded[0].1, vec![0, 1]);
    }

    #[test]
    fn skip_marker_and_empty_select_nothing() {
        let raw = vec![
            CellValue::Text("(跳过)".to_string()),
            CellValue::Empty,
            CellValue::Text("缺乏资金".to_string()),
        ];
        let cells: Vec<String> = raw.iter().map(normalize_cell).collect();
        let vocab = discover_vocabulary(&cells);
        let expanded = expand_indicators(&vocab, &cells);
        // The skipped rows still contribute a 0 to every indicator.
        assert_eq!(indicator(&expanded, "缺乏资金"), &vec![0, 0, 1]);
    }

    #[test]
    fn repeated_item_in_one_cell_counts_once() {
        let cells = strings(&["缺乏资金┋缺乏资金"]);
        let vocab = discover_vocabulary(&cells);
        let expanded = expand_indicators(&vocab, &cells);
        assert_eq!(indicator(&expanded, "缺乏资金"), &vec![1]);
    }

    #[test]
    fn positive_counts_match_raw_containment() {
        let cells = strings(&["缺乏资金┋缺乏技术", "缺乏技术", "", "缺乏资金"]);
        let vocab = discover_vocabulary(&cells);
        for (_, values) in expand_indicators(&vocab, &cells) {
            for v in &values {
                assert!(*v == 0 || *v == 1);
            }
        }
        let expanded = expand_indicators(&vocab, &cells);
        let total: i64 = indicator(&expanded, "缺乏技术").iter().sum();
        assert_eq!(
            total,
            cells.iter().filter(|c| c.contains("缺乏技术")).count() as i64
        );
    }

    #[test]
    fn sanitize_collapses_non_word_runs() {
        assert_eq!(sanitize_name("其他（请注明）〖土地贫瘠〗"), "其他_请注明_土地贫瘠_");
        assert_eq!(sanitize_name("缺乏资金"), "缺乏资金");
        assert_eq!(sanitize_name("a - b"), "a_b");
    }

    #[test]
    fn sanitization_collisions_get_a_suffix() {
        let vocab = Vocabulary {
            items: vec![
                VocabItem::Literal("a b".to_string()),
                VocabItem::Literal("a-b".to_string()),
            ],
        };
        let cells = strings(&["a b┋a-b"]);
        let names: Vec<String> = expand_indicators(&vocab, &cells)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["a_b", "a_b_2"]);
    }
}
