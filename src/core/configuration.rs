use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
};

use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{
    error::{ExportError, ExportResult},
    settings::{QuoteMode, DEFAULT_DELIMITER},
};

use super::mapping::{ClassMap, CsvMap};

/// Rounds decimal values of fields marked as rounded.
pub type RoundingFn = Box<dyn Fn(Decimal) -> Decimal>;

/// Translates header keys and translatable text values.
pub type TranslationFn = Box<dyn Fn(&str) -> String>;

/// Rounds to the nearest integer, ties to even (banker's rounding).
pub fn default_rounding(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Outcome category of a [`ValidationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Ok,
    NotFound,
    Invalid,
}

/// Result of a speculative column-set check, reported as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    kind: ValidationKind,
    message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult {
            kind: ValidationKind::Ok,
            message: String::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ValidationResult {
            kind: ValidationKind::NotFound,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationResult {
            kind: ValidationKind::Invalid,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ValidationKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.kind == ValidationKind::Ok
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

/// Everything a [`CsvWriter`](crate::item::csv::csv_writer::CsvWriter) needs
/// for one export: the registered class maps, the delimiter, the quoting
/// rule and the rounding and translation functions.
pub struct WriterConfiguration {
    maps: HashMap<TypeId, Box<dyn Any>>,
    delimiter: String,
    quote_mode: QuoteMode,
    rounding: RoundingFn,
    translation: TranslationFn,
}

impl WriterConfiguration {
    pub fn new() -> Self {
        WriterConfiguration {
            maps: HashMap::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            quote_mode: QuoteMode::default(),
            rounding: Box::new(default_rounding),
            translation: Box::new(|value: &str| value.to_owned()),
        }
    }

    /// Registers the class map of `T`, replacing any previous one.
    ///
    /// Fails with [`ExportError::EmptyMapping`] when no field would be exported.
    pub fn register<T: 'static>(&mut self, map: ClassMap<T>) -> ExportResult<()> {
        if map.get_ordered_fields().is_empty() {
            return Err(ExportError::EmptyMapping(type_name::<T>().to_owned()));
        }

        if self.maps.insert(TypeId::of::<T>(), Box::new(map)).is_some() {
            debug!("Replaced class map of {}", type_name::<T>());
        }
        Ok(())
    }

    /// Builds a fresh class map from `M` and registers it.
    pub fn register_map<M: CsvMap>(&mut self) -> ExportResult<()> {
        self.register(M::build()?)
    }

    pub fn resolve<T: 'static>(&self) -> Option<&ClassMap<T>> {
        self.maps
            .get(&TypeId::of::<T>())
            .and_then(|map| map.downcast_ref::<ClassMap<T>>())
    }

    pub fn resolve_mut<T: 'static>(&mut self) -> Option<&mut ClassMap<T>> {
        self.maps
            .get_mut(&TypeId::of::<T>())
            .and_then(|map| map.downcast_mut::<ClassMap<T>>())
    }

    /// Sets the text placed between fields, e.g. `;`, `||` or `, `.
    pub fn set_delimiter(&mut self, delimiter: &str) -> ExportResult<()> {
        if delimiter.is_empty() {
            return Err(ExportError::InvalidArgument(
                "Delimiter cannot be empty".to_string(),
            ));
        }
        self.delimiter = delimiter.to_owned();
        Ok(())
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The delimiter as a single byte, when the `csv` writer can use it directly.
    pub fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r') => Some(*byte),
            _ => None,
        }
    }

    pub fn set_quote_mode(&mut self, quote_mode: QuoteMode) {
        self.quote_mode = quote_mode;
    }

    pub fn quote_mode(&self) -> QuoteMode {
        self.quote_mode
    }

    pub fn set_rounding_function<F>(&mut self, rounding: F)
    where
        F: Fn(Decimal) -> Decimal + 'static,
    {
        self.rounding = Box::new(rounding);
    }

    pub fn set_translation_function<F>(&mut self, translation: F)
    where
        F: Fn(&str) -> String + 'static,
    {
        self.translation = Box::new(translation);
    }

    pub fn round(&self, value: Decimal) -> Decimal {
        (self.rounding)(value)
    }

    /// Translates `value`, falling back to `value` itself when the
    /// translation function has nothing (or only whitespace) for it.
    pub fn translate(&self, value: &str) -> String {
        let translated = (self.translation)(value);
        if translated.trim().is_empty() {
            value.to_owned()
        } else {
            translated
        }
    }

    /// Checks `columns` against the registered class map of `T` without
    /// touching it.
    pub fn validate<T: 'static, S: AsRef<str>>(&self, columns: &[S]) -> ValidationResult {
        match self.resolve::<T>() {
            None => ValidationResult::not_found(format!(
                "Csv configuration map was not found for {}",
                type_name::<T>()
            )),
            Some(map) => match map.validate_columns(columns) {
                Ok(()) => ValidationResult::ok(),
                Err(error) => ValidationResult::invalid(error.to_string()),
            },
        }
    }
}

impl Default for WriterConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WriterConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterConfiguration")
            .field("maps", &self.maps.len())
            .field("delimiter", &self.delimiter)
            .field("quote_mode", &self.quote_mode)
            .finish()
    }
}
