use std::fmt;

use rust_decimal::Decimal;
use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem, OwnedFormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime, Time,
};

const DEFAULT_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DEFAULT_TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const DEFAULT_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The declared value kind of a mapped field.
///
/// The kind decides which transforms a field accepts and how its values are
/// rendered by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-point numbers, eligible for rounding.
    Decimal,
    /// Dates, times and date-times, eligible for a date format.
    Temporal,
    /// Strings, eligible for translation.
    Text,
    /// Any other scalar, rendered as-is.
    Other,
    /// Multi-element containers. Never accepted by a class map.
    Collection,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Decimal => "decimal",
            FieldKind::Temporal => "date/time",
            FieldKind::Text => "text",
            FieldKind::Other => "other",
            FieldKind::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// A date/time value read off an exported item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date(Date),
    Time(Time),
    DateTime(PrimitiveDateTime),
    OffsetDateTime(OffsetDateTime),
}

impl Temporal {
    /// Formats the value with a format description parsed at mapping time.
    pub fn format_with(&self, format: &OwnedFormatItem) -> Result<String, time::error::Format> {
        match self {
            Temporal::Date(value) => value.format(format),
            Temporal::Time(value) => value.format(format),
            Temporal::DateTime(value) => value.format(format),
            Temporal::OffsetDateTime(value) => value.format(format),
        }
    }

    /// Formats the value with the full default representation of its type.
    ///
    /// Offset date-times are rendered as RFC 3339, the other types with
    /// ISO 8601 style descriptions.
    pub fn format_default(&self) -> Result<String, time::error::Format> {
        match self {
            Temporal::Date(value) => value.format(DEFAULT_DATE),
            Temporal::Time(value) => value.format(DEFAULT_TIME),
            Temporal::DateTime(value) => value.format(DEFAULT_DATE_TIME),
            Temporal::OffsetDateTime(value) => value.format(&Rfc3339),
        }
    }
}

/// A runtime field value, tagged by kind so the writer can dispatch on it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// An absent optional value. Rendered as an empty field.
    Empty,
    Decimal(Decimal),
    Temporal(Temporal),
    Text(String),
    /// Any other scalar, already rendered to text.
    Other(String),
}

/// Types that can be exported as a single CSV field.
///
/// Implemented for the scalar types the engine knows how to render, for
/// `Option` of those types and for `Vec`, which is reported as a collection
/// so that mapping it can be refused.
pub trait FieldType {
    /// The declared kind of this type.
    const KIND: FieldKind;

    /// Converts an owned value into its tagged runtime representation.
    fn into_value(self) -> FieldValue;
}

impl FieldType for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    fn into_value(self) -> FieldValue {
        FieldValue::Decimal(self)
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn into_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl FieldType for Date {
    const KIND: FieldKind = FieldKind::Temporal;

    fn into_value(self) -> FieldValue {
        FieldValue::Temporal(Temporal::Date(self))
    }
}

impl FieldType for Time {
    const KIND: FieldKind = FieldKind::Temporal;

    fn into_value(self) -> FieldValue {
        FieldValue::Temporal(Temporal::Time(self))
    }
}

impl FieldType for PrimitiveDateTime {
    const KIND: FieldKind = FieldKind::Temporal;

    fn into_value(self) -> FieldValue {
        FieldValue::Temporal(Temporal::DateTime(self))
    }
}

impl FieldType for OffsetDateTime {
    const KIND: FieldKind = FieldKind::Temporal;

    fn into_value(self) -> FieldValue {
        FieldValue::Temporal(Temporal::OffsetDateTime(self))
    }
}

impl<M: FieldType> FieldType for Option<M> {
    const KIND: FieldKind = M::KIND;

    fn into_value(self) -> FieldValue {
        match self {
            Some(value) => value.into_value(),
            None => FieldValue::Empty,
        }
    }
}

impl<M: fmt::Debug> FieldType for Vec<M> {
    const KIND: FieldKind = FieldKind::Collection;

    fn into_value(self) -> FieldValue {
        FieldValue::Other(format!("{self:?}"))
    }
}

macro_rules! display_field_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Other;

                fn into_value(self) -> FieldValue {
                    FieldValue::Other(self.to_string())
                }
            }
        )*
    };
}

display_field_type!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

/// Field types that accept the rounding transform.
pub trait DecimalField: FieldType {}

impl DecimalField for Decimal {}
impl DecimalField for Option<Decimal> {}

/// Field types that accept a date format.
pub trait TemporalField: FieldType {}

impl TemporalField for Date {}
impl TemporalField for Time {}
impl TemporalField for PrimitiveDateTime {}
impl TemporalField for OffsetDateTime {}
impl<M: TemporalField> TemporalField for Option<M> {}

/// Field types that accept the translation transform.
pub trait TextField: FieldType {}

impl TextField for String {}
impl TextField for Option<String> {}
