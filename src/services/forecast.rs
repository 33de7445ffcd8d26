//! Daily forecast aggregation.
//!
//! The provider returns a flat list of 3-hour samples. Callers want one summary
//! per calendar day, so samples are grouped by their local date (the forecast
//! city's UTC offset applied) and reduced to min/max/mean values plus the
//! day's dominant condition.

use crate::models::weather::{DailyForecastSummary, RawForecastSample, WeatherCondition};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use std::collections::HashMap;

/// Days returned to callers, counted from the first date present.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Samples collected for one date, in input order.
struct DayBucket<'a> {
    date: NaiveDate,
    samples: Vec<&'a RawForecastSample>,
}

/// Group samples into per-day summaries, first-seen date first.
///
/// Empty input yields an empty vector. A day with a single sample (typically
/// the partial first or last day) still produces a summary.
pub fn aggregate_daily(
    samples: &[RawForecastSample],
    utc_offset: FixedOffset,
) -> Vec<DailyForecastSummary> {
    let mut buckets: Vec<DayBucket<'_>> = Vec::new();
    let mut index_by_date: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(&utc_offset).date_naive();
        let index = *index_by_date.entry(date).or_insert_with(|| {
            buckets.push(DayBucket {
                date,
                samples: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[index].samples.push(sample);
    }

    buckets
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(summarize_day)
        .collect()
}

/// Offset given in seconds east of UTC, as the provider reports it. Out-of-range
/// values fall back to UTC.
pub fn offset_from_seconds(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn summarize_day(bucket: DayBucket<'_>) -> Option<DailyForecastSummary> {
    let count = bucket.samples.len();
    if count == 0 {
        return None;
    }
    let n = count as f64;

    let temps = bucket.samples.iter().map(|s| s.temperature);
    let temp_min = temps.clone().fold(f64::INFINITY, f64::min);
    let temp_max = temps.clone().fold(f64::NEG_INFINITY, f64::max);
    // Rounding can push the mean a hair outside [min, max] when all values are equal.
    let temp_avg = (temps.sum::<f64>() / n).clamp(temp_min, temp_max);

    let humidity_avg = bucket.samples.iter().map(|s| s.humidity).sum::<f64>() / n;
    let wind_avg = bucket.samples.iter().map(|s| s.wind_speed).sum::<f64>() / n;

    let weather = dominant_condition(&bucket.samples)?.clone();

    Some(DailyForecastSummary {
        date: bucket.date,
        temp_min,
        temp_max,
        temp_avg,
        category: weather.category(),
        weather,
        humidity_avg,
        wind_avg,
    })
}

/// Most frequent condition by id. Ties go to the condition seen first, and the
/// returned entry is that first occurrence.
fn dominant_condition<'a>(samples: &[&'a RawForecastSample]) -> Option<&'a WeatherCondition> {
    // (condition, count) in first-seen order
    let mut tally: Vec<(&WeatherCondition, usize)> = Vec::new();
    for sample in samples {
        match tally
            .iter()
            .position(|(condition, _)| condition.id == sample.condition.id)
        {
            Some(index) => tally[index].1 += 1,
            None => tally.push((&sample.condition, 1)),
        }
    }

    let mut best: Option<(&WeatherCondition, usize)> = None;
    for (condition, count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition)
}
