use thiserror::Error;

#[derive(Error, Debug)]
/// Export error
pub enum ExportError {
    /// Malformed configuration input, reported by the call that introduced it.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Field '{field}' of type {kind} is not supported: collections cannot be exported")]
    UnsupportedFieldKind { field: String, kind: String },

    #[error("No mappings were specified in the class map for {0}")]
    EmptyMapping(String),

    #[error("No mapping found for {0}")]
    MappingNotFound(String),

    #[error("Invalid column set: {0}")]
    InvalidColumnSet(String),

    /// A mapped field could not be read off the instance being written.
    #[error("Unable to resolve field '{path}': {message}")]
    FieldResolution { path: String, message: String },

    #[error("Unable to format field '{field}': {message}")]
    ValueFormat { field: String, message: String },

    #[error("CsvWriter from: {0}")]
    Sink(String),
}

/// Result type returned by every fallible operation of the engine.
pub type ExportResult<T> = Result<T, ExportError>;
