use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "schemaName")]
    pub schema_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserSettings {
    #[serde(rename = "detectionRowWindow")]
    pub detection_row_window: Option<JSValue>,
    #[serde(rename = "minimumMarkerTypes")]
    pub minimum_marker_types: Option<JSValue>,
    #[serde(rename = "maxPathSegmentLength")]
    pub max_path_segment_length: Option<JSValue>,
    #[serde(rename = "minimumQuestionLength")]
    pub minimum_question_length: Option<JSValue>,
}

impl ParserSettings {
    /// Overlays the configured values on the default settings.
    pub fn to_settings(&self) -> SurveyResult<ExtractionSettings> {
        let mut settings = ExtractionSettings::DEFAULT_SETTINGS;
        if let Some(x) = read_js_int(&self.detection_row_window, "detectionRowWindow")? {
            settings.detection_row_window = x;
        }
        if let Some(x) = read_js_int(&self.minimum_marker_types, "minimumMarkerTypes")? {
            ensure!(
                x >= 1,
                InvalidConfigValueSnafu {
                    field: "minimumMarkerTypes",
                    value: x.to_string()
                }
            );
            settings.min_marker_types = x;
        }
        if let Some(x) = read_js_int(&self.max_path_segment_length, "maxPathSegmentLength")? {
            ensure!(
                x >= 3,
                InvalidConfigValueSnafu {
                    field: "maxPathSegmentLength",
                    value: x.to_string()
                }
            );
            // Keeps the default 60 / 40 proportion.
            settings.max_segment_chars = x;
            settings.min_break_chars = x * 2 / 3;
        }
        if let Some(x) = read_js_int(&self.minimum_question_length, "minimumQuestionLength")? {
            settings.min_question_chars = x;
        }
        Ok(settings)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "fileSources", default)]
    pub file_sources: Vec<FileSource>,
    #[serde(rename = "parserSettings")]
    pub parser_settings: Option<ParserSettings>,
}

pub fn read_config(path: &str) -> SurveyResult<ExtractConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ExtractConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_reference(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Reads an optional non-negative integer, given either as a number or as a string.
fn read_js_int(x: &Option<JSValue>, field: &str) -> SurveyResult<Option<usize>> {
    let parsed = match x {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        Some(_) => None,
    };
    parsed.map(Some).context(InvalidConfigValueSnafu {
        field,
        value: format!("{:?}", x),
    })
}
