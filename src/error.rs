use arrow_schema::ArrowError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Data Error: {0}")]
    Data(String),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse Error: cannot read '{value}' as a date-time: {source}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Mapping Error: season code {code} is not one of 1-4")]
    Mapping { code: i64 },
    #[error("Hour {0} is outside 0-23")]
    InvalidHour(u32),
    #[error("Record {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Tags an error with the index of the record that produced it.
    pub fn at_row(self, row: usize) -> Self {
        PipelineError::Record {
            row,
            source: Box::new(self),
        }
    }

    /// The underlying error with any record tagging removed.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::Record { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
