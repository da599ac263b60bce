use std::{
    any::type_name,
    borrow::Cow,
    io::{BufWriter, Write},
};

use csv::{Terminator, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        configuration::WriterConfiguration,
        field::FieldValue,
        mapping::{FieldDescriptor, ValueTransform},
    },
    error::{ExportError, ExportResult},
    settings::QuoteMode,
};

/// Caller-supplied options of one write.
///
/// `columns` restricts and reorders the exported fields; `ignore_headers`
/// overrides the header setting of the class map.
///
/// ```
/// use csv_export_engine::item::csv::csv_writer::ExportOptions;
///
/// let options = ExportOptions::from_json(r#"{ "columns": ["Age"], "ignore_headers": true }"#).unwrap();
/// assert_eq!(options, ExportOptions::columns(["Age"]).ignore_headers(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub columns: Option<Vec<String>>,
    pub ignore_headers: Option<bool>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExportOptions {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            ignore_headers: None,
        }
    }

    pub fn ignore_headers(mut self, yes: bool) -> Self {
        self.ignore_headers = Some(yes);
        self
    }

    pub fn from_json(json: &str) -> ExportResult<Self> {
        serde_json::from_str(json).map_err(|error| {
            ExportError::InvalidArgument(format!("Invalid export options: {}", error))
        })
    }
}

/// Renders items of registered classes as delimited text into a sink.
///
/// Each write resolves the class map of the item type, optionally
/// reconciles it with the requested columns, writes the header unless it is
/// suppressed, then one line per item, and flushes the sink.
///
/// Values are written verbatim unless a quote mode other than
/// [`QuoteMode::Never`] is configured.
///
/// # Examples
///
/// ```
/// use csv_export_engine::{
///     core::{configuration::WriterConfiguration, mapping::ClassMap},
///     item::csv::csv_writer::CsvWriter,
/// };
///
/// struct Person { name: String, age: u8 }
///
/// # fn main() -> Result<(), csv_export_engine::ExportError> {
/// let mut map = ClassMap::new();
/// map.map("Name", |p: &Person| p.name.clone())?;
/// map.map("Age", |p: &Person| p.age)?;
///
/// let mut configuration = WriterConfiguration::new();
/// configuration.register(map)?;
///
/// let mut writer = CsvWriter::new(configuration, vec![]);
/// writer.write(&[Person { name: "Tom Tailor".to_string(), age: 15 }])?;
///
/// let data = String::from_utf8(writer.into_inner()?).unwrap();
/// assert_eq!(data, "Name;Age\nTom Tailor;15\n");
/// # Ok(())
/// # }
/// ```
pub struct CsvWriter<W: Write> {
    configuration: WriterConfiguration,
    encoder: WriterBuilder,
    sink: BufWriter<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(configuration: WriterConfiguration, sink: W) -> Self {
        // Unused for multi-byte delimiters, see `Lines::write_joined`.
        let mut encoder = WriterBuilder::new();
        encoder
            .flexible(true)
            .has_headers(false)
            .delimiter(configuration.delimiter_byte().unwrap_or(b';'))
            .terminator(Terminator::Any(b'\n'))
            .quote_style(configuration.quote_mode().into());

        CsvWriter {
            configuration,
            encoder,
            sink: BufWriter::new(sink),
        }
    }

    pub fn configuration(&self) -> &WriterConfiguration {
        &self.configuration
    }

    /// Writes the header and one line per item with the class map as registered.
    ///
    /// Returns the number of lines written after the header.
    pub fn write<'a, T, I>(&mut self, items: I) -> ExportResult<usize>
    where
        T: 'static,
        I: IntoIterator<Item = &'a T>,
    {
        self.write_with(items, &ExportOptions::default())
    }

    /// Writes `items` restricted to `columns`, in that order.
    pub fn write_columns<'a, T, I, S>(
        &mut self,
        items: I,
        columns: &[S],
        ignore_headers: bool,
    ) -> ExportResult<usize>
    where
        T: 'static,
        I: IntoIterator<Item = &'a T>,
        S: AsRef<str>,
    {
        let options = ExportOptions::columns(columns.iter().map(|column| column.as_ref()))
            .ignore_headers(ignore_headers);
        self.write_with(items, &options)
    }

    pub fn write_with<'a, T, I>(&mut self, items: I, options: &ExportOptions) -> ExportResult<usize>
    where
        T: 'static,
        I: IntoIterator<Item = &'a T>,
    {
        debug!("Start of csv export for {}", type_name::<T>());
        self.prepare::<T>(options)?;

        let count = self.emit::<T, I>(Some(items))?;
        self.flush()?;

        debug!("End of csv export for {}: {} line(s)", type_name::<T>(), count);
        Ok(count)
    }

    /// Writes only the header line, e.g. as a template of the column layout.
    pub fn write_header_only<T: 'static>(&mut self, options: &ExportOptions) -> ExportResult<()> {
        debug!("Start of csv header export for {}", type_name::<T>());
        self.prepare::<T>(options)?;

        self.emit::<T, Vec<&T>>(None)?;
        self.flush()
    }

    /// Writes each group as its own block of header and lines.
    pub fn write_groups<'a, T, G, I>(&mut self, groups: G) -> ExportResult<usize>
    where
        T: 'static,
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a T>,
    {
        let mut count = 0;
        for group in groups {
            count += self.write(group)?;
        }
        Ok(count)
    }

    /// Flush the contents of the internal buffer to the underlying sink.
    pub fn flush(&mut self) -> ExportResult<()> {
        self.sink.flush().map_err(sink_error)
    }

    pub fn into_inner(self) -> ExportResult<W> {
        self.sink
            .into_inner()
            .map_err(|error| sink_error(error.error()))
    }

    fn prepare<T: 'static>(&mut self, options: &ExportOptions) -> ExportResult<()> {
        let map = self
            .configuration
            .resolve_mut::<T>()
            .ok_or_else(|| ExportError::MappingNotFound(type_name::<T>().to_owned()))?;

        if let Some(columns) = &options.columns {
            map.validate_columns(columns.as_slice())?;
            map.reconcile(columns.as_slice());
        }

        if let Some(ignore_headers) = options.ignore_headers {
            map.ignore_headers(ignore_headers);
        }

        Ok(())
    }

    fn emit<'a, T, I>(&mut self, items: Option<I>) -> ExportResult<usize>
    where
        T: 'static,
        I: IntoIterator<Item = &'a T>,
    {
        let map = self
            .configuration
            .resolve::<T>()
            .ok_or_else(|| ExportError::MappingNotFound(type_name::<T>().to_owned()))?;

        let mut lines = Lines {
            encoder: &self.encoder,
            sink: &mut self.sink,
            configuration: &self.configuration,
            fields: map.get_ordered_fields(),
        };

        if !map.headers_suppressed() {
            lines.header()?;
        }

        let mut count = 0;
        for item in items.into_iter().flatten() {
            lines.row(item)?;
            count += 1;
        }
        Ok(count)
    }
}

struct Lines<'w, W: Write, T> {
    encoder: &'w WriterBuilder,
    sink: &'w mut BufWriter<W>,
    configuration: &'w WriterConfiguration,
    fields: Vec<&'w FieldDescriptor<T>>,
}

impl<W: Write, T> Lines<'_, W, T> {
    fn header(&mut self) -> ExportResult<()> {
        let record: Vec<String> = self
            .fields
            .iter()
            .map(|field| self.header_text(field))
            .collect();
        self.write_record(&record)
    }

    fn row(&mut self, item: &T) -> ExportResult<()> {
        let record = self
            .fields
            .iter()
            .map(|field| {
                let value = field.resolve(item)?;
                self.format_value(field, value)
            })
            .collect::<ExportResult<Vec<String>>>()?;
        self.write_record(&record)
    }

    fn write_record(&mut self, record: &[String]) -> ExportResult<()> {
        // csv quotes a lone empty field so it can't be read back as a blank line.
        let lone_empty = matches!(record, [field] if field.is_empty());

        match self.configuration.delimiter_byte() {
            Some(_) if !lone_empty => self.write_encoded(record),
            _ => self.write_joined(record),
        }
    }

    fn write_encoded(&mut self, record: &[String]) -> ExportResult<()> {
        let mut encoder = self.encoder.from_writer(Vec::new());
        encoder.write_record(record).map_err(sink_error)?;
        let line = encoder
            .into_inner()
            .map_err(|error| sink_error(error.error()))?;

        self.sink.write_all(&line).map_err(sink_error)
    }

    fn write_joined(&mut self, record: &[String]) -> ExportResult<()> {
        let delimiter = self.configuration.delimiter();
        let quote_mode = self.configuration.quote_mode();

        let mut line = record
            .iter()
            .map(|field| quote_field(field, delimiter, quote_mode))
            .collect::<Vec<_>>()
            .join(delimiter);
        line.push('\n');

        self.sink.write_all(line.as_bytes()).map_err(sink_error)
    }

    fn header_text(&self, field: &FieldDescriptor<T>) -> String {
        match (field.header_translation_key(), field.header_label()) {
            (Some(key), _) => self.configuration.translate(key),
            (None, Some(label)) => label.to_owned(),
            (None, None) => field.name().to_owned(),
        }
    }

    fn format_value(&self, field: &FieldDescriptor<T>, value: FieldValue) -> ExportResult<String> {
        match value {
            FieldValue::Empty => Ok(String::new()),
            FieldValue::Decimal(number) => {
                let number = match field.transform() {
                    ValueTransform::Rounded => self.configuration.round(number),
                    _ => number,
                };
                Ok(number.to_string())
            }
            FieldValue::Temporal(temporal) => {
                let formatted = match field.transform() {
                    ValueTransform::DateFormat { format, .. } => temporal.format_with(format),
                    _ => temporal.format_default(),
                };
                formatted.map_err(|error| ExportError::ValueFormat {
                    field: field.name().to_owned(),
                    message: error.to_string(),
                })
            }
            FieldValue::Text(text) => Ok(match field.transform() {
                ValueTransform::Translatable { key, key_fn } => {
                    let key = match (key, key_fn) {
                        (Some(key), _) => key.clone(),
                        (None, Some(key_fn)) => key_fn(text.as_str()),
                        (None, None) => text,
                    };
                    self.configuration.translate(&key)
                }
                _ => text,
            }),
            FieldValue::Other(text) => Ok(text),
        }
    }
}

fn quote_field<'f>(field: &'f str, delimiter: &str, quote_mode: QuoteMode) -> Cow<'f, str> {
    let quoted = match quote_mode {
        QuoteMode::Never => false,
        QuoteMode::Always => true,
        QuoteMode::Necessary => field.contains(delimiter) || field.contains(['"', '\n', '\r']),
        QuoteMode::NonNumeric => field.parse::<f64>().is_err(),
    };

    if quoted {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn sink_error(error: impl ToString) -> ExportError {
    ExportError::Sink(error.to_string())
}
