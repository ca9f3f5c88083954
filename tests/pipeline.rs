use lib::{
    DatasetCache, DayPeriod, DayType, EnrichedDataset, Facets, PipelineError, Season, Summary,
    enrich, filter_records, read_raw_csv, read_raw_csv_file,
};
use std::fs;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const HEADER: &str =
    "datetime,season,holiday,workingday,weather,temp,atemp,humidity,windspeed,casual,registered,count\n";

fn source(rows: &[&str]) -> String {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn temp_source(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn reference_record_enriches_and_filters() {
    let text = source(&["2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3"]);
    let dataset = EnrichedDataset::from_csv_bytes(text.as_bytes()).unwrap();
    let record = &dataset.records()[0];

    assert_eq!(record.year, 2011);
    assert_eq!(record.month, 1);
    assert_eq!(record.hour, 5);
    assert_eq!(record.season, Season::Spring);
    assert_eq!(record.day_period, DayPeriod::Night);
    assert_eq!(record.count, 3);

    let working = Facets::new([2011], ["Spring"], DayType::WorkingDay);
    assert_eq!(dataset.filter(&working).len(), 1);

    let weekend = Facets::new([2011], ["Spring"], DayType::WeekendOrHoliday);
    assert!(dataset.filter(&weekend).is_empty());
}

#[test]
fn boundary_hours_bin_correctly() {
    let text = source(&[
        "2011-05-01 11:00:00,2,0,0,1,20,22,50,5,10,20,30",
        "2011-05-01 12:00:00,2,0,0,1,21,23,50,5,10,25,35",
        "2011-05-01 18:00:00,2,0,0,1,19,21,55,5,10,40,50",
        "2011-05-01 06:00:00,2,0,0,1,15,17,70,5,1,4,5",
    ]);
    let enriched = enrich(&read_raw_csv(text.as_bytes()).unwrap()).unwrap();
    let periods: Vec<DayPeriod> = enriched.iter().map(|r| r.day_period).collect();
    assert_eq!(
        periods,
        vec![
            DayPeriod::Morning,
            DayPeriod::Afternoon,
            DayPeriod::Evening,
            DayPeriod::Morning
        ]
    );
}

#[test]
fn unmapped_season_aborts_batch() {
    let text = source(&[
        "2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3",
        "2011-01-01 06:00:00,5,0,1,1,9.84,14.395,81,0,0,3,3",
    ]);
    let err = EnrichedDataset::from_csv_bytes(text.as_bytes()).unwrap_err();
    assert!(matches!(err, PipelineError::Record { row: 1, .. }));
    assert!(matches!(err.root_cause(), PipelineError::Mapping { code: 5 }));
}

#[test]
fn unparseable_timestamp_aborts_batch() {
    let text = source(&["yesterday at noon,1,0,1,1,9.84,14.395,81,0,0,3,3"]);
    let err = EnrichedDataset::from_csv_bytes(text.as_bytes()).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        PipelineError::Parse { value, .. } if value == "yesterday at noon"
    ));
}

#[test]
fn iso_timestamp_variants_load() {
    let text = source(&[
        "2011-01-01 05:00:00.000,1,0,1,1,9.84,14.395,81,0,0,3,3",
        "2011-01-01T13:30,1,0,1,1,10.66,12.88,60,8,1,9,10",
        "2011-01-02,1,0,0,1,9.02,13.635,80,0,0,1,1",
        "2011-01-02T19:00:00Z,1,0,0,1,8.2,11.0,75,6,2,14,16",
    ]);
    let dataset = EnrichedDataset::from_csv_bytes(text.as_bytes()).unwrap();
    assert_eq!(dataset.len(), 4);

    let hours: Vec<u32> = dataset.records().iter().map(|r| r.hour).collect();
    assert_eq!(hours, vec![5, 13, 0, 19]);
    let periods: Vec<DayPeriod> = dataset.records().iter().map(|r| r.day_period).collect();
    assert_eq!(
        periods,
        vec![
            DayPeriod::Night,
            DayPeriod::Afternoon,
            DayPeriod::Night,
            DayPeriod::Evening
        ]
    );
    assert!(dataset.records().iter().all(|r| r.year == 2011 && r.month == 1));
}

#[test]
fn filtered_summary_over_two_years() {
    let text = source(&[
        "2011-01-01 05:00:00,1,0,0,1,9.84,14.395,81,0,0,3,3",
        "2011-07-01 08:00:00,3,0,1,1,30,33,40,10,50,250,300",
        "2012-01-02 17:00:00,1,0,1,2,12,14,60,12,20,180,200",
        "2012-07-02 08:00:00,3,0,1,1,31,34,42,9,60,340,400",
    ]);
    let dataset = EnrichedDataset::from_csv_bytes(text.as_bytes()).unwrap();
    let facets = Facets::new([2011, 2012], ["Fall"], DayType::WorkingDay);
    let view = dataset.filter(&facets);
    assert_eq!(view.iter().map(|r| r.count).collect::<Vec<_>>(), vec![300, 400]);
    assert_eq!(filter_records(&view, &facets), view);

    let summary = Summary::from_view(&view);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.hourly.len(), 1);
    assert_eq!(summary.hourly[0].mean_count, 350.0);
    assert_eq!(summary.day_periods[0].day_period, DayPeriod::Morning);
    assert_eq!(summary.day_periods[0].median, 350.0);
}

#[test]
fn cache_reuses_until_content_changes() {
    let first = source(&["2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3"]);
    let file = temp_source(&first);

    let mut cache = DatasetCache::new();
    let loaded = cache.load(file.path()).unwrap();
    let again = cache.load(file.path()).unwrap();
    assert!(Arc::ptr_eq(&loaded, &again));

    let second = source(&[
        "2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3",
        "2011-01-01 06:00:00,1,0,1,1,9.02,13.635,80,0,1,1,2",
    ]);
    fs::write(file.path(), &second).unwrap();
    let reloaded = cache.load(file.path()).unwrap();
    assert!(!Arc::ptr_eq(&loaded, &reloaded));
    assert_eq!(reloaded.len(), 2);
    assert_eq!(loaded.len(), 1);

    cache.invalidate();
    assert!(cache.cached().is_none());
    let fresh = cache.load(file.path()).unwrap();
    assert!(!Arc::ptr_eq(&fresh, &reloaded));
    assert_eq!(*fresh, *reloaded);

}

#[test]
fn failed_reload_empties_cache() {
    let good = source(&["2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3"]);
    let file = temp_source(&good);

    let mut cache = DatasetCache::new();
    cache.load(file.path()).unwrap();
    assert!(cache.cached().is_some());

    let bad = source(&["2011-01-01 05:00:00,9,0,1,1,9.84,14.395,81,0,0,3,3"]);
    fs::write(file.path(), &bad).unwrap();
    assert!(cache.load(file.path()).is_err());
    assert!(cache.cached().is_none());

}

#[test]
fn reads_source_file_in_order() {
    let text = source(&[
        "2011-01-01 05:00:00,1,0,1,1,9.84,14.395,81,0,0,3,3",
        "2011-01-01 04:00:00,1,0,1,1,9.84,14.395,81,0,0,1,1",
    ]);
    let file = temp_source(&text);
    let rows = read_raw_csv_file(file.path()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].count, 3);
    assert_eq!(rows[1].datetime, "2011-01-01 04:00:00");
}
