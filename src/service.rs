//! Collaborator-facing entry points.
//!
//! Each call builds a fresh [`WriterConfiguration`] and class map, writes
//! into an in-memory buffer and hands the bytes back. Nothing is shared
//! between calls except the [`ExportSettings`].

use std::any::type_name;

use log::info;

use crate::{
    core::{
        configuration::{default_rounding, ValidationResult, WriterConfiguration},
        mapping::CsvMap,
    },
    error::ExportResult,
    item::csv::csv_writer::{CsvWriter, ExportOptions},
    settings::ExportSettings,
};

/// Renders collections of mapped classes into CSV bytes.
///
/// # Examples
///
/// ```
/// use csv_export_engine::{
///     core::mapping::{ClassMap, CsvMap},
///     service::ExportService,
///     ExportResult,
/// };
///
/// struct Person { name: String, age: u8 }
///
/// struct PersonMap;
///
/// impl CsvMap for PersonMap {
///     type Item = Person;
///
///     fn configure(map: &mut ClassMap<Person>) -> ExportResult<()> {
///         map.map("Name", |p: &Person| p.name.clone())?;
///         map.map("Age", |p: &Person| p.age)?;
///         Ok(())
///     }
/// }
///
/// let people = vec![Person { name: "Jimmy Bob".to_string(), age: 22 }];
/// let bytes = ExportService::new()
///     .generate::<PersonMap, _>(&people, |key| key.to_string())
///     .unwrap();
///
/// assert_eq!(bytes, b"Name;Age\nJimmy Bob;22\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExportService {
    settings: ExportSettings,
}

impl ExportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ExportSettings) -> Self {
        ExportService { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Checks whether `columns` could be exported with the map `M`.
    ///
    /// The list must be non-empty, name only mapped fields and name each
    /// field at most once; a repeated name is reported as invalid. Failures
    /// are reported through the result instead of an error.
    pub fn validate<M: CsvMap, S: AsRef<str>>(&self, columns: &[S]) -> ValidationResult {
        let mut configuration = WriterConfiguration::new();
        if let Err(error) = configuration.register_map::<M>() {
            return ValidationResult::invalid(error.to_string());
        }
        configuration.validate::<M::Item, S>(columns)
    }

    /// Exports every field of `data` as mapped, header included.
    pub fn generate<M, F>(&self, data: &[M::Item], translate: F) -> ExportResult<Vec<u8>>
    where
        M: CsvMap,
        F: Fn(&str) -> String + 'static,
    {
        self.generate_with::<M, F>(data, &ExportOptions::default(), translate)
    }

    /// Exports `data` restricted to the columns and header setting of `options`.
    pub fn generate_with<M, F>(
        &self,
        data: &[M::Item],
        options: &ExportOptions,
        translate: F,
    ) -> ExportResult<Vec<u8>>
    where
        M: CsvMap,
        F: Fn(&str) -> String + 'static,
    {
        let mut writer = CsvWriter::new(self.configuration::<M, F>(translate)?, Vec::new());
        let count = writer.write_with(data, options)?;
        let bytes = writer.into_inner()?;

        info!(
            "Exported {} line(s) of {} ({} bytes)",
            count,
            type_name::<M::Item>(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Exports only the header line, as a template of the column layout.
    pub fn generate_header_only<M, F>(
        &self,
        options: &ExportOptions,
        translate: F,
    ) -> ExportResult<Vec<u8>>
    where
        M: CsvMap,
        F: Fn(&str) -> String + 'static,
    {
        let mut writer = CsvWriter::new(self.configuration::<M, F>(translate)?, Vec::new());
        writer.write_header_only::<M::Item>(options)?;
        let bytes = writer.into_inner()?;

        info!(
            "Exported header of {} ({} bytes)",
            type_name::<M::Item>(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn configuration<M, F>(&self, translate: F) -> ExportResult<WriterConfiguration>
    where
        M: CsvMap,
        F: Fn(&str) -> String + 'static,
    {
        let mut configuration = WriterConfiguration::new();
        configuration.set_delimiter(&self.settings.delimiter)?;
        configuration.set_quote_mode(self.settings.quote_mode);
        configuration.set_rounding_function(default_rounding);
        configuration.set_translation_function(translate);
        configuration.register_map::<M>()?;
        Ok(configuration)
    }
}
