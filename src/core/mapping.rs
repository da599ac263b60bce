use std::{any::type_name, collections::HashSet, fmt, marker::PhantomData};

use log::debug;
use time::format_description::{self, OwnedFormatItem};

use crate::error::{ExportError, ExportResult};

use super::{
    accessor::Accessor,
    field::{DecimalField, FieldKind, FieldType, FieldValue, TemporalField, TextField},
};

type ValueGetter<T> = Box<dyn Fn(&T) -> ExportResult<FieldValue>>;

/// Derives a translation key from a raw text value.
pub type KeyFn = Box<dyn Fn(&str) -> String>;

/// Per-field formatting rule applied before a value is rendered.
pub enum ValueTransform {
    None,
    /// Decimal values go through the configured rounding function.
    Rounded,
    /// Date/time values are rendered with `format`, parsed from `pattern`.
    DateFormat {
        pattern: String,
        format: OwnedFormatItem,
    },
    /// Text values are looked up through the configured translation function.
    Translatable {
        key: Option<String>,
        key_fn: Option<KeyFn>,
    },
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTransform::None => f.write_str("None"),
            ValueTransform::Rounded => f.write_str("Rounded"),
            ValueTransform::DateFormat { pattern, .. } => {
                f.debug_tuple("DateFormat").field(pattern).finish()
            }
            ValueTransform::Translatable { key, key_fn } => f
                .debug_struct("Translatable")
                .field("key", key)
                .field("key_fn", &key_fn.is_some())
                .finish(),
        }
    }
}

/// Export metadata of a single column of `T`.
pub struct FieldDescriptor<T> {
    name: String,
    path: String,
    kind: FieldKind,
    position: i32,
    header_label: Option<String>,
    header_translation_key: Option<String>,
    ignored: bool,
    transform: ValueTransform,
    getter: ValueGetter<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted member path the field was mapped through.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Column order of the field. `-1` once reconciliation has dropped it.
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn header_label(&self) -> Option<&str> {
        self.header_label.as_deref()
    }

    pub fn header_translation_key(&self) -> Option<&str> {
        self.header_translation_key.as_deref()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn transform(&self) -> &ValueTransform {
        &self.transform
    }

    /// Reads the current value of the field off `item`.
    pub fn resolve(&self, item: &T) -> ExportResult<FieldValue> {
        (self.getter)(item)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("header_label", &self.header_label)
            .field("header_translation_key", &self.header_translation_key)
            .field("ignored", &self.ignored)
            .field("transform", &self.transform)
            .finish()
    }
}

fn non_blank<'s>(value: &'s str, what: &str) -> ExportResult<&'s str> {
    if value.trim().is_empty() {
        return Err(ExportError::InvalidArgument(format!("{} cannot be empty", what)));
    }
    Ok(value)
}

/// Fluent handle on a freshly mapped field, typed by the field's value type.
///
/// Transforms are only offered when `M` matches them: `rounded` for decimal
/// fields, `with_date_format` for date/time fields and `translatable*` for
/// text fields.
pub struct FieldMap<'a, T, M> {
    field: &'a mut FieldDescriptor<T>,
    _value: PhantomData<fn() -> M>,
}

impl<T, M> FieldMap<'_, T, M> {
    /// Translation key of the header. The translated text replaces the field name.
    pub fn with_header_translation(self, key: &str) -> ExportResult<Self> {
        let key = non_blank(key, "Translation key")?;
        self.field.header_translation_key = Some(key.to_owned());
        Ok(self)
    }

    /// Literal header text, used as-is when no translation key is set.
    pub fn with_header(self, label: &str) -> ExportResult<Self> {
        let label = non_blank(label, "Header label")?;
        self.field.header_label = Some(label.to_owned());
        Ok(self)
    }

    /// Column position of the field.
    pub fn with_index(self, index: i32) -> ExportResult<Self> {
        if index < 0 {
            return Err(ExportError::InvalidArgument(format!(
                "Index of field '{}' cannot be less than zero",
                self.field.name
            )));
        }
        self.field.position = index;
        Ok(self)
    }

    /// Excludes the field from both the header and the rows.
    pub fn ignored(self, ignore: bool) -> Self {
        self.field.ignored = ignore;
        self
    }

    pub fn descriptor(&self) -> &FieldDescriptor<T> {
        &*self.field
    }
}

impl<T, M: DecimalField> FieldMap<'_, T, M> {
    /// Rounds the value with the configured rounding function.
    pub fn rounded(self) -> Self {
        self.field.transform = ValueTransform::Rounded;
        self
    }
}

impl<T, M: TemporalField> FieldMap<'_, T, M> {
    /// Renders the value with a `time` format description, e.g. `[day]/[month]/[year]`.
    pub fn with_date_format(self, pattern: &str) -> ExportResult<Self> {
        let pattern = non_blank(pattern, "Date format")?;
        let format = format_description::parse_owned::<2>(pattern).map_err(|error| {
            ExportError::InvalidArgument(format!("Invalid date format '{}': {}", pattern, error))
        })?;

        self.field.transform = ValueTransform::DateFormat {
            pattern: pattern.to_owned(),
            format,
        };
        Ok(self)
    }
}

impl<T, M: TextField> FieldMap<'_, T, M> {
    /// Translates the raw value itself.
    pub fn translatable(self) -> Self {
        if !matches!(self.field.transform, ValueTransform::Translatable { .. }) {
            self.field.transform = ValueTransform::Translatable {
                key: None,
                key_fn: None,
            };
        }
        self
    }

    /// Translates a fixed resource key instead of the raw value.
    pub fn translatable_with_key(self, key: &str) -> ExportResult<Self> {
        let key = non_blank(key, "Translation resource key")?.to_owned();
        let this = self.translatable();
        if let ValueTransform::Translatable { key: current, .. } = &mut this.field.transform {
            *current = Some(key);
        }
        Ok(this)
    }

    /// Translates the key derived from the raw value by `key_fn`.
    pub fn translatable_with<F>(self, key_fn: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        let this = self.translatable();
        if let ValueTransform::Translatable { key_fn: current, .. } = &mut this.field.transform {
            *current = Some(Box::new(key_fn));
        }
        this
    }
}

/// Ordered set of field descriptors describing how `T` is exported.
///
/// # Examples
///
/// ```
/// use csv_export_engine::core::mapping::ClassMap;
///
/// struct Person { name: String, age: u8 }
///
/// # fn main() -> Result<(), csv_export_engine::ExportError> {
/// let mut map = ClassMap::<Person>::new();
/// map.map("Name", |p: &Person| p.name.clone())?.with_index(0)?;
/// map.map("Age", |p: &Person| p.age)?.with_index(1)?;
///
/// let names: Vec<&str> = map.get_ordered_fields().iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["Name", "Age"]);
/// # Ok(())
/// # }
/// ```
pub struct ClassMap<T> {
    fields: Vec<FieldDescriptor<T>>,
    headers_suppressed: bool,
}

impl<T: 'static> ClassMap<T> {
    pub fn new() -> Self {
        ClassMap {
            fields: Vec::new(),
            headers_suppressed: false,
        }
    }

    /// Maps the field `name`, read off each item by `getter`.
    ///
    /// The field is placed after every field mapped so far.
    pub fn map<M, F>(&mut self, name: &str, getter: F) -> ExportResult<FieldMap<'_, T, M>>
    where
        M: FieldType + 'static,
        F: Fn(&T) -> M + 'static,
    {
        self.map_accessor(Accessor::field(name, getter))
    }

    /// Maps a field through a prebuilt accessor, typically a nested [`Hop`](super::accessor::Hop) chain.
    pub fn map_accessor<M>(&mut self, accessor: Accessor<T, M>) -> ExportResult<FieldMap<'_, T, M>>
    where
        M: FieldType + 'static,
    {
        let name = non_blank(accessor.name(), "Field name")?.to_owned();

        if M::KIND == FieldKind::Collection {
            return Err(ExportError::UnsupportedFieldKind {
                field: accessor.path(),
                kind: type_name::<M>().to_owned(),
            });
        }

        let position = self
            .fields
            .iter()
            .map(|field| field.position)
            .max()
            .map_or(0, |max| max.saturating_add(1));

        let index = self.fields.len();
        self.fields.push(FieldDescriptor {
            name,
            path: accessor.path(),
            kind: M::KIND,
            position,
            header_label: None,
            header_translation_key: None,
            ignored: false,
            transform: ValueTransform::None,
            getter: Box::new(move |item: &T| accessor.resolve(item).map(M::into_value)),
        });

        Ok(FieldMap {
            field: &mut self.fields[index],
            _value: PhantomData,
        })
    }
}

impl<T> ClassMap<T> {
    /// Suppresses (or restores) the header row.
    pub fn ignore_headers(&mut self, ignore_headers: bool) -> &mut Self {
        self.headers_suppressed = ignore_headers;
        self
    }

    pub fn headers_suppressed(&self) -> bool {
        self.headers_suppressed
    }

    /// Every declared field, ignored ones included, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Looks a field up by name. The last declaration of a name wins.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().rev().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Non-ignored fields sorted by position. Ties keep declaration order.
    pub fn get_ordered_fields(&self) -> Vec<&FieldDescriptor<T>> {
        let mut fields: Vec<&FieldDescriptor<T>> =
            self.fields.iter().filter(|field| !field.ignored).collect();
        fields.sort_by_key(|field| field.position);
        fields
    }

    /// Checks that `columns` is a non-empty, duplicate-free list of declared field names.
    pub fn validate_columns<S: AsRef<str>>(&self, columns: &[S]) -> ExportResult<()> {
        if columns.is_empty() {
            return Err(ExportError::InvalidColumnSet(format!(
                "Export column list is empty for {}",
                type_name::<T>()
            )));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();

            if !self.fields.iter().any(|field| field.name == column) {
                return Err(ExportError::InvalidColumnSet(format!(
                    "Column '{}' is not mapped for {}",
                    column,
                    type_name::<T>()
                )));
            }

            if !seen.insert(column) {
                return Err(ExportError::InvalidColumnSet(format!(
                    "Column '{}' is requested more than once",
                    column
                )));
            }
        }

        Ok(())
    }

    /// Reorders the fields after `columns` and ignores every field not listed.
    ///
    /// Listed fields take their index in `columns` as position; the others
    /// are ignored with position `-1`. Callers are expected to have checked
    /// `columns` with [`validate_columns`](Self::validate_columns).
    pub fn reconcile<S: AsRef<str>>(&mut self, columns: &[S]) {
        for field in &mut self.fields {
            match columns.iter().position(|column| column.as_ref() == field.name) {
                Some(index) => {
                    field.position = i32::try_from(index).unwrap_or(i32::MAX);
                    field.ignored = false;
                }
                None => {
                    field.position = -1;
                    field.ignored = true;
                }
            }
        }

        debug!(
            "Reconciled class map of {} against {} column(s)",
            type_name::<T>(),
            columns.len()
        );
    }
}

impl<T: 'static> Default for ClassMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ClassMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMap")
            .field("class", &type_name::<T>())
            .field("fields", &self.fields)
            .field("headers_suppressed", &self.headers_suppressed)
            .finish()
    }
}

/// A mapping definition for one data class.
///
/// Implementors describe their fields once in [`configure`](Self::configure);
/// every export builds a fresh [`ClassMap`] from it.
///
/// ```
/// use csv_export_engine::{core::mapping::{ClassMap, CsvMap}, ExportResult};
///
/// struct Person { name: String, age: u8 }
///
/// struct PersonMap;
///
/// impl CsvMap for PersonMap {
///     type Item = Person;
///
///     fn configure(map: &mut ClassMap<Person>) -> ExportResult<()> {
///         map.map("Name", |p: &Person| p.name.clone())?.with_header_translation("Name")?;
///         map.map("Age", |p: &Person| p.age)?.with_header_translation("Age")?;
///         Ok(())
///     }
/// }
///
/// assert_eq!(PersonMap::build().unwrap().fields().len(), 2);
/// ```
pub trait CsvMap {
    type Item: 'static;

    fn configure(map: &mut ClassMap<Self::Item>) -> ExportResult<()>;

    fn build() -> ExportResult<ClassMap<Self::Item>> {
        let mut map = ClassMap::new();
        Self::configure(&mut map)?;
        Ok(map)
    }
}
