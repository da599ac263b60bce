use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// The delimiter placed between fields unless configured otherwise.
pub const DEFAULT_DELIMITER: &str = ";";

/// Format descriptions that can be passed to `with_date_format`.
pub mod date_format {
    /// Short date, e.g. January 5th 2021 is written as `05/01/2021`.
    pub const SHORT_DATE: &str = "[day]/[month]/[year]";

    /// Short time, e.g. 2021-06-15T13:45:30 is written as `13:45`.
    pub const SHORT_TIME: &str = "[hour]:[minute]";

    /// Month and year, e.g. January 5th 2021 is written as `01/2021`.
    pub const YEAR_MONTH: &str = "[month]/[year]";

    /// Universal sortable date-time, e.g. `2021-06-15 13:45:30Z`.
    pub const UNIVERSAL: &str = "[year]-[month]-[day] [hour]:[minute]:[second]Z";
}

/// When fields are wrapped in quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    /// Fields are written verbatim.
    #[default]
    Never,
    /// Only fields containing the delimiter, a quote or a line break.
    Necessary,
    Always,
    NonNumeric,
}

impl From<QuoteMode> for csv::QuoteStyle {
    fn from(mode: QuoteMode) -> Self {
        match mode {
            QuoteMode::Necessary => csv::QuoteStyle::Necessary,
            QuoteMode::Always => csv::QuoteStyle::Always,
            QuoteMode::Never => csv::QuoteStyle::Never,
            QuoteMode::NonNumeric => csv::QuoteStyle::NonNumeric,
        }
    }
}

/// Output settings shared by every export of a service.
///
/// Output is always UTF-8 without byte-order mark.
///
/// ```
/// use csv_export_engine::settings::{ExportSettings, QuoteMode};
///
/// let settings = ExportSettings::from_json(r#"{ "delimiter": "," }"#).unwrap();
/// assert_eq!(settings.delimiter, ",");
/// assert_eq!(settings.quote_mode, QuoteMode::Never);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub delimiter: String,
    pub quote_mode: QuoteMode,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            delimiter: DEFAULT_DELIMITER.to_string(),
            quote_mode: QuoteMode::default(),
        }
    }
}

impl ExportSettings {
    pub fn from_json(json: &str) -> ExportResult<Self> {
        serde_json::from_str(json).map_err(|error| {
            ExportError::InvalidArgument(format!("Invalid export settings: {}", error))
        })
    }
}
