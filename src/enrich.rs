use crate::error::{PipelineError, Result};
use crate::structs::{DayPeriod, EnrichedRecord, RawRecord, Season};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::debug;
use rayon::prelude::*;

/// Accepted date-time layouts, tried in order. `%.f` also accepts no fraction.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layout; such values are taken at midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open `[lower, upper)` hour ranges and the period each one maps to.
///
/// The ranges are disjoint and cover `0..24` exactly.
pub const DAY_PERIOD_BINS: [(u32, u32, DayPeriod); 4] = [
    (0, 6, DayPeriod::Night),
    (6, 12, DayPeriod::Morning),
    (12, 18, DayPeriod::Afternoon),
    (18, 24, DayPeriod::Evening),
];

/// Derives the enriched table from raw rental rows.
///
/// Each record gains `year`, `month`, `hour` and `day_period`, and its numeric season
/// code is replaced by a [`Season`] label. Output order matches input order.
///
/// # Arguments
///
/// * `raw_records` - Rows as read from the source, in source order
///
/// # Returns
///
/// Returns one `EnrichedRecord` per input row.
///
/// # Errors
///
/// The batch is all-or-nothing. The lowest-indexed failing record is reported as
/// `PipelineError::Record` wrapping:
/// - `PipelineError::Parse` if its timestamp cannot be read
/// - `PipelineError::Mapping` if its season code is outside 1-4
pub fn enrich(raw_records: &[RawRecord]) -> Result<Vec<EnrichedRecord>> {
    debug!("Enriching {} raw records", raw_records.len());

    let enriched: Vec<Result<EnrichedRecord>> = raw_records
        .par_iter()
        .enumerate()
        .map(|(row, raw)| enrich_record(raw).map_err(|e| e.at_row(row)))
        .collect();

    let records = enriched.into_iter().collect::<Result<Vec<_>>>()?;
    debug!("Enrichment completed for {} records", records.len());
    Ok(records)
}

/// Enriches a single raw row.
pub fn enrich_record(raw: &RawRecord) -> Result<EnrichedRecord> {
    let datetime = parse_timestamp(&raw.datetime)?;
    let season = season_label(raw.season)?;
    let hour = datetime.hour();
    let day_period = day_period(hour)?;

    Ok(EnrichedRecord {
        datetime,
        season,
        holiday: raw.holiday,
        workingday: raw.workingday,
        weather: raw.weather,
        temp: raw.temp,
        atemp: raw.atemp,
        humidity: raw.humidity,
        windspeed: raw.windspeed,
        casual: raw.casual,
        registered: raw.registered,
        count: raw.count,
        year: datetime.year(),
        month: datetime.month(),
        hour,
        day_period,
    })
}

/// Parses a source timestamp.
///
/// Tries the layouts in [`DATETIME_FORMATS`], then a bare date at midnight, then
/// RFC 3339. RFC 3339 values keep their local wall-clock time; the offset is dropped.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    let mut first_err = None;
    for format in DATETIME_FORMATS {
        match NaiveDateTime::parse_from_str(value, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .map_err(|e| PipelineError::Parse {
            value: value.to_string(),
            source: first_err.unwrap_or(e),
        })
}

/// Maps a season code to its label: 1 Spring, 2 Summer, 3 Fall, 4 Winter.
///
/// # Errors
///
/// Returns `PipelineError::Mapping` for any other code.
pub fn season_label(code: i64) -> Result<Season> {
    match code {
        1 => Ok(Season::Spring),
        2 => Ok(Season::Summer),
        3 => Ok(Season::Fall),
        4 => Ok(Season::Winter),
        other => Err(PipelineError::Mapping { code: other }),
    }
}

/// Bins an hour of day into its [`DayPeriod`] using [`DAY_PERIOD_BINS`].
///
/// # Errors
///
/// Returns `PipelineError::InvalidHour` for hours of 24 or more.
pub fn day_period(hour: u32) -> Result<DayPeriod> {
    DAY_PERIOD_BINS
        .iter()
        .find(|(lower, upper, _)| (*lower..*upper).contains(&hour))
        .map(|(_, _, period)| *period)
        .ok_or(PipelineError::InvalidHour(hour))
}
