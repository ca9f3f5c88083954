use chrono::NaiveDateTime;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Logger writing `[LEVEL] message` lines to stderr, leaving stdout for the report.
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// One hourly row of the rental source, as read from `train.csv`.
///
/// `holiday`, `casual` and `registered` are optional so that sources carrying only
/// the consumed columns still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub datetime: String,
    pub season: i64,
    #[serde(default)]
    pub holiday: Option<u8>,
    pub workingday: u8,
    pub weather: u8,
    pub temp: f64,
    pub atemp: f64,
    pub humidity: f64,
    pub windspeed: f64,
    #[serde(default)]
    pub casual: Option<u32>,
    #[serde(default)]
    pub registered: Option<u32>,
    pub count: u32,
}

/// A raw row plus its derived temporal and categorical attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub datetime: NaiveDateTime,
    pub season: Season,
    pub holiday: Option<u8>,
    pub workingday: u8,
    pub weather: u8,
    pub temp: f64,
    pub atemp: f64,
    pub humidity: f64,
    pub windspeed: f64,
    pub casual: Option<u32>,
    pub registered: Option<u32>,
    pub count: u32,
    pub year: i32,
    pub month: u32,
    pub hour: u32,
    pub day_period: DayPeriod,
}

/// Meteorological season label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse four-way split of the hour of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayPeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Night,
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Night => "Night",
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Evening => "Evening",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Day-type facet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DayType {
    #[default]
    All,
    WorkingDay,
    WeekendOrHoliday,
}

impl DayType {
    /// Whether a record with the given working-day flag passes this selector.
    pub fn matches(&self, workingday: u8) -> bool {
        match self {
            DayType::All => true,
            DayType::WorkingDay => workingday == 1,
            DayType::WeekendOrHoliday => workingday == 0,
        }
    }
}

/// Facet selections driving the filter engine.
///
/// Seasons are held as labels so that a label outside the four known seasons is a
/// legal selection that simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub years: BTreeSet<i32>,
    pub seasons: BTreeSet<String>,
    pub day_type: DayType,
}

impl Facets {
    pub fn new<Y, S>(years: Y, seasons: S, day_type: DayType) -> Self
    where
        Y: IntoIterator<Item = i32>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            years: years.into_iter().collect(),
            seasons: seasons.into_iter().map(Into::into).collect(),
            day_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_type_predicates() {
        assert!(DayType::All.matches(0));
        assert!(DayType::All.matches(1));
        assert!(DayType::WorkingDay.matches(1));
        assert!(!DayType::WorkingDay.matches(0));
        assert!(DayType::WeekendOrHoliday.matches(0));
        assert!(!DayType::WeekendOrHoliday.matches(1));
    }

    #[test]
    fn labels_serialize_as_names() {
        assert_eq!(serde_json::to_string(&Season::Fall).unwrap(), "\"Fall\"");
        assert_eq!(
            serde_json::to_string(&DayPeriod::Afternoon).unwrap(),
            "\"Afternoon\""
        );
        assert_eq!(Season::Winter.to_string(), "Winter");
    }

    #[test]
    fn facets_collect_labels() {
        let facets = Facets::new([2012, 2011, 2012], ["Spring", "Fall"], DayType::WorkingDay);
        assert_eq!(facets.years.len(), 2);
        assert!(facets.seasons.contains("Fall"));
        assert_eq!(facets.day_type, DayType::WorkingDay);
    }
}
