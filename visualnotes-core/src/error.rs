use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Columns must be strictly increasing, got {0:?}")]
    ColumnsNotOrdered([f64; 3]),

    #[error("Column {column} cards ({width} wide) run into the next column")]
    ColumnTooNarrow { column: usize, width: f64 },

    #[error("{name} must be a finite, non-negative number, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("{name} ({value}) is shorter than the card height ({card_height})")]
    RowTooShort {
        name: &'static str,
        value: f64,
        card_height: f64,
    },

    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid layout configuration: {0}")]
    Layout(#[from] LayoutError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
