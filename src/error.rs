//! Error types for rule loading and edge prediction

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictError>;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("record {record}: invalid number '{text}'")]
    MalformedNumber { record: usize, text: String },

    #[error("record {record}: wrong number of fields")]
    FieldCount { record: usize },

    #[error("record {record}: expected '{expect}' instead of '{found}'")]
    HeaderField {
        record: usize,
        expect: &'static str,
        found: String,
    },

    #[error("record {record}: unknown graph pattern '{name}'")]
    UnknownPattern { record: usize, name: String },

    #[error("record {record}: invalid {what} index {value}")]
    IndexRange {
        record: usize,
        what: &'static str,
        value: i64,
    },

    #[error("record {record}: invalid {what} support {value}")]
    SupportRange {
        record: usize,
        what: &'static str,
        value: i64,
    },

    #[error("line {line}: {msg}")]
    GraphFormat { line: usize, msg: String },

    #[error("no {0} found")]
    EmptyInput(&'static str),

    #[error("invalid input format '{0}'")]
    UnknownFormat(String),

    #[error("prediction worker terminated without a result")]
    WorkerLost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
