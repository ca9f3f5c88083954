use crate::filter::FilteredView;
use crate::structs::{DayPeriod, EnrichedRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Numeric columns entering the correlation matrix, in matrix order.
pub const CORRELATION_COLUMNS: [&str; 5] = ["temp", "atemp", "humidity", "windspeed", "count"];

/// Mean rentals for one hour of day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u32,
    pub mean_count: f64,
    pub samples: usize,
}

/// Mean rentals under one weather code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherBar {
    pub weather: u8,
    pub mean_count: f64,
    pub samples: usize,
}

/// Five-number summary of rentals within one day period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodDistribution {
    pub day_period: DayPeriod,
    pub min: f64,
    pub percentile_25: f64,
    pub median: f64,
    pub percentile_75: f64,
    pub max: f64,
    pub samples: usize,
}

/// Pairwise Pearson correlation over [`CORRELATION_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: [&'static str; 5],
    pub values: [[f64; 5]; 5],
}

/// Aggregates handed to the rendering layer for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub records: usize,
    pub hourly: Vec<HourlyPoint>,
    pub weather: Vec<WeatherBar>,
    pub day_periods: Vec<PeriodDistribution>,
    pub correlation: CorrelationMatrix,
}

impl Summary {
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        Self {
            records: view.len(),
            hourly: hourly_trend(view),
            weather: weather_impact(view),
            day_periods: day_period_distribution(view),
            correlation: correlation_matrix(view),
        }
    }
}

fn mean_by<K: Ord>(
    view: &FilteredView<'_>,
    key: impl Fn(&EnrichedRecord) -> K,
) -> BTreeMap<K, (f64, usize)> {
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for record in view {
        let entry = groups.entry(key(record)).or_insert((0.0, 0));
        entry.0 += f64::from(record.count);
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (sum, n))| (k, (sum / n as f64, n)))
        .collect()
}

/// Mean count per hour present in the view, by ascending hour.
pub fn hourly_trend(view: &FilteredView<'_>) -> Vec<HourlyPoint> {
    mean_by(view, |r| r.hour)
        .into_iter()
        .map(|(hour, (mean_count, samples))| HourlyPoint {
            hour,
            mean_count,
            samples,
        })
        .collect()
}

/// Mean count per weather code present in the view, by ascending code.
pub fn weather_impact(view: &FilteredView<'_>) -> Vec<WeatherBar> {
    mean_by(view, |r| r.weather)
        .into_iter()
        .map(|(weather, (mean_count, samples))| WeatherBar {
            weather,
            mean_count,
            samples,
        })
        .collect()
}

/// Count distribution per day period present, Night through Evening.
pub fn day_period_distribution(view: &FilteredView<'_>) -> Vec<PeriodDistribution> {
    let mut groups: BTreeMap<DayPeriod, Vec<f64>> = BTreeMap::new();
    for record in view {
        groups
            .entry(record.day_period)
            .or_default()
            .push(f64::from(record.count));
    }

    groups
        .into_iter()
        .map(|(day_period, mut counts)| {
            counts.sort_by(f64::total_cmp);
            PeriodDistribution {
                day_period,
                min: counts[0],
                percentile_25: calculate_percentile(&counts, 25.0),
                median: calculate_percentile(&counts, 50.0),
                percentile_75: calculate_percentile(&counts, 75.0),
                max: counts[counts.len() - 1],
                samples: counts.len(),
            }
        })
        .collect()
}

/// Pearson correlation between every pair of [`CORRELATION_COLUMNS`].
///
/// Pairs involving a constant column, or views with fewer than two rows, are NaN.
pub fn correlation_matrix(view: &FilteredView<'_>) -> CorrelationMatrix {
    let columns: [Vec<f64>; 5] = [
        view.iter().map(|r| r.temp).collect(),
        view.iter().map(|r| r.atemp).collect(),
        view.iter().map(|r| r.humidity).collect(),
        view.iter().map(|r| r.windspeed).collect(),
        view.iter().map(|r| f64::from(r.count)).collect(),
    ];

    let mut values = [[f64::NAN; 5]; 5];
    for i in 0..5 {
        for j in i..5 {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: CORRELATION_COLUMNS,
        values,
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return f64::NAN;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Linear-interpolated percentile of already sorted, non-empty data.
///
/// `percentile` is a percentage (0.0 to 100.0).
fn calculate_percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}
