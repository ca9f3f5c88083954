pub mod dataset;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod load;
pub mod structs;
pub mod summary;

// Re-export public API
pub use dataset::{DatasetCache, EnrichedDataset};
pub use enrich::{day_period, enrich, season_label};
pub use error::{PipelineError, Result};
pub use filter::{FilteredView, filter_records};
pub use load::{read_raw_csv, read_raw_csv_file, write_csv, write_json, write_parquet};
pub use structs::{DayPeriod, DayType, EnrichedRecord, Facets, RawRecord, Season, SimpleLogger};
pub use summary::Summary;
