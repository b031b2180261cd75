use clap::Parser;

/// This is a survey structure extraction program: it turns survey spreadsheets into
/// hierarchical survey definitions in JSON.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON, listing the files to process and
    /// the extraction settings. For more information about the file format, read the documentation
    /// of the `survey_structure::manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the expected extraction output in JSON format.
    /// If provided, surveyx will check that the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the extracted surveys will be written in JSON
    /// format to the given location. Setting this option overrides the path that may be specified
    /// with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The spreadsheet to process. Setting this option overrides the files
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (excel or csv, default from the file extension) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default all the worksheets) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default the file name) The title of the survey, when the spreadsheet does not provide one.
    #[clap(long, value_parser)]
    pub title: Option<String>,

    /// (survey_balance, survey_diagnostic or survey_program) The target schema. If not specified,
    /// it is guessed from the file name.
    #[clap(long, value_parser)]
    pub schema_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
