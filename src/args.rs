use clap::{Parser, Subcommand};

/// Recodes a fixed-layout questionnaire export into a structured,
/// numerically coded data table and tabulates descriptive statistics
/// over it.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recodes the raw questionnaire export into the structured data table
    /// and its data dictionary.
    Recode {
        /// (file path) The raw questionnaire spreadsheet. Column positions,
        /// not headers, are the input contract.
        #[clap(short, long, value_parser)]
        input: String,

        /// (file path) Where the structured data table is written.
        #[clap(short, long, value_parser, default_value = "structured_data.xlsx")]
        output: String,

        /// (file path) Where the data dictionary is written.
        #[clap(long, value_parser, default_value = "structured_data_数据字典.xlsx")]
        dictionary: String,
    },
    /// Computes the descriptive-statistics workbook from the structured
    /// data table.
    Report {
        /// (file path) The structured data table produced by `recode`.
        #[clap(short, long, value_parser, default_value = "structured_data.xlsx")]
        input: String,

        /// (file path) Where the multi-sheet report is written.
        #[clap(
            short,
            long,
            value_parser,
            default_value = "comprehensive_descriptive_stats.xlsx"
        )]
        output: String,

        /// (file path or empty) If specified, a JSON summary of the key
        /// statistics will be written to the given location.
        #[clap(long, value_parser)]
        out: Option<String>,
    },
}
