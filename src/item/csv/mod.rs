/// CSV output of mapped classes.
///
/// [`CsvWriter`](csv_writer::CsvWriter) renders items through the class map
/// registered for their type in a
/// [`WriterConfiguration`](crate::core::configuration::WriterConfiguration):
/// the header first (unless suppressed), then one line per item, each value
/// formatted by the kind and transform of its field.
///
/// # Ownership and Borrowing Considerations
///
/// The writer owns its sink and buffers it. Call [`into_inner`](csv_writer::CsvWriter::into_inner)
/// to get an in-memory buffer back once the export is done.
///
/// # Features
///
/// - Configurable delimiter of any length (`;` by default)
/// - Values written verbatim, or quoted by an opt-in [`QuoteMode`](crate::settings::QuoteMode)
/// - Column subsets and reordering at write time
/// - Header suppression and header-only output
/// - Grouped output, one header and block of lines per group
pub mod csv_writer;
