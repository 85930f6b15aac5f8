use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("missing feature {0}")]
    MissingFeature(String),

    #[error("feature {name} must be {expected}")]
    FeatureType { name: String, expected: &'static str },

    #[error("unknown level {level:?} for feature {name}")]
    UnknownLevel { name: String, level: String },

    #[error("model produced a non-finite score")]
    NonFinite,
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("failed to read history: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("history has no {0} column")]
    MissingColumn(&'static str),

    #[error("column {column} has non-numeric value {value:?} on row {row}")]
    NotNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("history has no usable {0} values")]
    Empty(&'static str),

    #[error("chart rendering failed: {0}")]
    Render(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for InsightError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        InsightError::Render(err.to_string())
    }
}
