#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV Export Engine

 A typed, declarative CSV export engine. Describe once per data class which
 fields are exported, in which order, under which header and with which
 per-field transform; then render any collection of that class into
 delimited text.

 ## Core Concepts

- **ClassMap:** The ordered set of field descriptors of one data class, built with a fluent API.
- **CsvMap:** A reusable mapping definition; a fresh `ClassMap` is built from it for every export.
- **WriterConfiguration:** The registered class maps plus the delimiter, quoting, rounding and translation of one export.
- **CsvWriter:** Writes the header and one line per item into any `std::io::Write` sink.
- **ExportService:** Builds configuration, mapping and buffer per call and hands the bytes back.

 ## Transforms

| **Transform**          | **Field types**                                  | **Effect**                                       |
|------------------------|--------------------------------------------------|--------------------------------------------------|
| `rounded`              | `Decimal`, `Option<Decimal>`                     | Applies the rounding function (banker's by default) |
| `with_date_format`     | `Date`, `Time`, `PrimitiveDateTime`, `OffsetDateTime` | Renders with a `time` format description   |
| `translatable*`        | `String`, `Option<String>`                       | Looks the value (or a key) up in the translation function |

 ## Getting Started

```rust
# use csv_export_engine::{
#     core::mapping::{ClassMap, CsvMap},
#     item::csv::csv_writer::ExportOptions,
#     service::ExportService,
#     ExportResult,
# };
struct Person {
    name: String,
    age: u8,
}

struct PersonMap;

impl CsvMap for PersonMap {
    type Item = Person;

    fn configure(map: &mut ClassMap<Person>) -> ExportResult<()> {
        map.map("Name", |p: &Person| p.name.clone())?.with_header_translation("Name")?;
        map.map("Age", |p: &Person| p.age)?.with_header_translation("Age")?;
        Ok(())
    }
}

fn main() -> ExportResult<()> {
    let people = vec![
        Person { name: "Tom Tailor".to_string(), age: 15 },
        Person { name: "Jimmy Bob".to_string(), age: 22 },
    ];

    let translate = |key: &str| match key {
        "Name" => "Nom".to_string(),
        _ => String::new(),
    };

    let service = ExportService::new();
    let bytes = service.generate_with::<PersonMap, _>(
        &people,
        &ExportOptions::columns(["Age", "Name"]),
        translate,
    )?;

    assert_eq!(bytes, b"Age;Nom\n15;Tom Tailor\n22;Jimmy Bob\n");
    Ok(())
}
```

 */

/// Mapping model: field values, accessors, class maps and writer configuration
pub mod core;

/// Error types of the export engine
pub mod error;

pub use error::*;

/// Item writers (the CSV writer)
pub mod item;

/// Export settings and date format presets
pub mod settings;

/// One-call export entry points
pub mod service;
