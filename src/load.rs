use crate::error::{PipelineError, Result};
use crate::structs::{EnrichedRecord, RawRecord};
use arrow_array::{Float64Array, Int32Array, RecordBatch, StringArray, UInt8Array, UInt32Array};
use arrow_schema::{DataType, Field, Schema};
use csv::{ReaderBuilder, Writer};
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{fs::File, io::Read, path::Path, sync::Arc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns the enricher needs; any others in the header are optional.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "datetime",
    "season",
    "workingday",
    "weather",
    "temp",
    "atemp",
    "humidity",
    "windspeed",
    "count",
];

/// Reads raw rental rows from a headed, comma-delimited source.
///
/// # Arguments
/// * `reader` - Any byte source positioned at the header row
///
/// # Returns
/// Returns the rows in source order.
///
/// # Errors
/// Returns `PipelineError::Data` if the header lacks a required column, and
/// `PipelineError::Csv` if a row cannot be decoded.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(PipelineError::Data(format!("Column not found: {}", missing)));
    }

    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<RawRecord>, csv::Error>>()?;
    debug!("Read {} raw records", records.len());
    Ok(records)
}

/// Reads raw rental rows from a CSV file on disk.
pub fn read_raw_csv_file(path: &Path) -> Result<Vec<RawRecord>> {
    debug!("Reading CSV file: {}", path.display());
    read_raw_csv(File::open(path)?)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes enriched records to a CSV file.
///
/// # Arguments
/// * `records` - Records to write, typically a filtered view
/// * `output_path` - Path where the CSV file will be created
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(records: &[&EnrichedRecord], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "datetime",
        "season",
        "holiday",
        "workingday",
        "weather",
        "temp",
        "atemp",
        "humidity",
        "windspeed",
        "casual",
        "registered",
        "count",
        "year",
        "month",
        "hour",
        "day_period",
    ])?;

    for record in records {
        writer.write_record(&[
            record.datetime.format(TIMESTAMP_FORMAT).to_string(),
            record.season.to_string(),
            optional(record.holiday),
            record.workingday.to_string(),
            record.weather.to_string(),
            record.temp.to_string(),
            record.atemp.to_string(),
            record.humidity.to_string(),
            record.windspeed.to_string(),
            optional(record.casual),
            optional(record.registered),
            record.count.to_string(),
            record.year.to_string(),
            record.month.to_string(),
            record.hour.to_string(),
            record.day_period.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes any serializable value (records or a summary) as pretty JSON.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Builds the Arrow batch for a set of enriched records.
///
/// Optional raw columns become nullable fields.
pub fn to_record_batch(records: &[&EnrichedRecord]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("datetime", DataType::Utf8, false),
        Field::new("season", DataType::Utf8, false),
        Field::new("holiday", DataType::UInt8, true),
        Field::new("workingday", DataType::UInt8, false),
        Field::new("weather", DataType::UInt8, false),
        Field::new("temp", DataType::Float64, false),
        Field::new("atemp", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("windspeed", DataType::Float64, false),
        Field::new("casual", DataType::UInt32, true),
        Field::new("registered", DataType::UInt32, true),
        Field::new("count", DataType::UInt32, false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::UInt32, false),
        Field::new("hour", DataType::UInt32, false),
        Field::new("day_period", DataType::Utf8, false),
    ]));

    let datetimes = StringArray::from_iter_values(
        records
            .iter()
            .map(|r| r.datetime.format(TIMESTAMP_FORMAT).to_string()),
    );
    let seasons = StringArray::from_iter_values(records.iter().map(|r| r.season.label()));
    let holidays: UInt8Array = records.iter().map(|r| r.holiday).collect();
    let workingdays: UInt8Array = records.iter().map(|r| r.workingday).collect();
    let weathers: UInt8Array = records.iter().map(|r| r.weather).collect();
    let temps: Float64Array = records.iter().map(|r| r.temp).collect();
    let atemps: Float64Array = records.iter().map(|r| r.atemp).collect();
    let humidities: Float64Array = records.iter().map(|r| r.humidity).collect();
    let windspeeds: Float64Array = records.iter().map(|r| r.windspeed).collect();
    let casuals: UInt32Array = records.iter().map(|r| r.casual).collect();
    let registereds: UInt32Array = records.iter().map(|r| r.registered).collect();
    let counts: UInt32Array = records.iter().map(|r| r.count).collect();
    let years: Int32Array = records.iter().map(|r| r.year).collect();
    let months: UInt32Array = records.iter().map(|r| r.month).collect();
    let hours: UInt32Array = records.iter().map(|r| r.hour).collect();
    let periods = StringArray::from_iter_values(records.iter().map(|r| r.day_period.label()));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(datetimes),
            Arc::new(seasons),
            Arc::new(holidays),
            Arc::new(workingdays),
            Arc::new(weathers),
            Arc::new(temps),
            Arc::new(atemps),
            Arc::new(humidities),
            Arc::new(windspeeds),
            Arc::new(casuals),
            Arc::new(registereds),
            Arc::new(counts),
            Arc::new(years),
            Arc::new(months),
            Arc::new(hours),
            Arc::new(periods),
        ],
    )?;
    Ok(batch)
}

/// Writes enriched records to a columnar Parquet file using Arrow format.
///
/// # Errors
/// Returns error if file cannot be created or Arrow operations fail.
pub fn write_parquet(records: &[&EnrichedRecord], output_path: &Path) -> Result<()> {
    let batch = to_record_batch(records)?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
