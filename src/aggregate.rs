//! Summary statistics over filtered record sets.
//!
//! Every function accepts an empty slice. Where no value can be computed the
//! result is `None` rather than a zero that would look like real data.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{DashboardError, Result};
use crate::models::PeriodCount;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn count<T>(records: &[T]) -> usize {
    records.len()
}

/// Arithmetic mean of the defined values; `None` if there are none.
pub fn mean<T>(records: &[T], field: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    let values = defined(records, field);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min<T>(records: &[T], field: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    defined(records, field).into_iter().reduce(f64::min)
}

pub fn max<T>(records: &[T], field: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    defined(records, field).into_iter().reduce(f64::max)
}

/// Most frequent value and its count. Ties go to the value seen first.
pub fn mode<T, K>(records: &[T], field: impl Fn(&T) -> K) -> Option<(K, usize)>
where
    K: Eq + Hash + Clone,
{
    value_counts(records, field).into_iter().next()
}

/// Occurrences per value, most frequent first; equal counts keep first-seen order.
pub fn value_counts<T, K>(records: &[T], field: impl Fn(&T) -> K) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
{
    let mut counts = group_by(records, field, |_| Some(1.0))
        .into_iter()
        .map(|(key, values)| (key, values.len()))
        .collect::<Vec<_>>();
    // sort_by is stable, so first-seen order survives among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn distinct_count<T, K>(records: &[T], field: impl Fn(&T) -> K) -> usize
where
    K: Eq + Hash,
{
    records.iter().map(field).collect::<HashSet<_>>().len()
}

/// The `q`-th quantile with linear interpolation between order statistics.
pub fn quantile<T>(
    records: &[T],
    field: impl Fn(&T) -> Option<f64>,
    q: f64,
) -> Result<Option<f64>> {
    let values = defined(records, field);
    quantile_of(&values, q)
}

pub fn quantile_of(values: &[f64], q: f64) -> Result<Option<f64>> {
    if !(0.0..=1.0).contains(&q) {
        return Err(DashboardError::Precondition(format!(
            "quantile {q} is outside [0, 1]"
        )));
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Ok(Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction))
}

/// Sum of `value` per group, in first-seen group order.
pub fn grouped_sum<T, K>(
    records: &[T],
    group: impl Fn(&T) -> K,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
{
    group_by(records, group, value)
        .into_iter()
        .map(|(key, values)| (key, values.iter().sum()))
        .collect()
}

/// Mean of `value` per group, in first-seen group order. A group whose values
/// are all missing maps to `None`.
pub fn grouped_mean<T, K>(
    records: &[T],
    group: impl Fn(&T) -> K,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<(K, Option<f64>)>
where
    K: Eq + Hash + Clone,
{
    let mut order: Vec<K> = Vec::new();
    let mut sums: HashMap<K, (f64, usize)> = HashMap::new();
    for record in records {
        let key = group(record);
        let entry = sums.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0.0, 0)
        });
        if let Some(v) = value(record).filter(|v| !v.is_nan()) {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    order
        .into_iter()
        .map(|key| {
            let (sum, n) = sums[&key];
            let mean = if n == 0 { None } else { Some(sum / n as f64) };
            (key, mean)
        })
        .collect()
}

/// Group with the largest summed value. Ties go to the group seen first.
pub fn top_group<T, K>(
    records: &[T],
    group: impl Fn(&T) -> K,
    value: impl Fn(&T) -> Option<f64>,
) -> Option<(K, f64)>
where
    K: Eq + Hash + Clone,
{
    grouped_sum(records, group, value)
        .into_iter()
        .fold(None, |best: Option<(K, f64)>, (key, sum)| match best {
            Some((_, best_sum)) if best_sum >= sum => best,
            _ => Some((key, sum)),
        })
}

/// Mean of `value` per calendar day, oldest first.
pub fn daily_mean<T>(
    records: &[T],
    date: impl Fn(&T) -> NaiveDate,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<(NaiveDate, f64)> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(v) = value(record).filter(|v| !v.is_nan()) {
            let entry = days.entry(date(record)).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    days.into_iter()
        .map(|(day, (sum, n))| (day, sum / n as f64))
        .collect()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Records per Monday-start week across the full date span, empty weeks
/// included, oldest first.
pub fn weekly_bucket_counts<T>(
    records: &[T],
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<PeriodCount> {
    bucket_counts(records, date, week_start, |start| {
        start.checked_add_signed(Duration::days(7))
    })
}

/// Records per calendar month across the full date span, empty months
/// included, oldest first.
pub fn monthly_bucket_counts<T>(
    records: &[T],
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<PeriodCount> {
    bucket_counts(records, date, month_start, |start| {
        start.checked_add_months(Months::new(1))
    })
}

/// Records per weekday name, Monday through Sunday, zeros included.
pub fn day_of_week_counts<T>(
    records: &[T],
    date: impl Fn(&T) -> NaiveDate,
) -> Vec<(&'static str, usize)> {
    let mut counts = [0usize; 7];
    for record in records {
        counts[date(record).weekday().num_days_from_monday() as usize] += 1;
    }
    WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(day, n)| (weekday_name(*day), n))
        .collect()
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Pearson correlation of two equally long series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pairwise Pearson correlations; `values[i][j]` pairs `series[i]` with `series[j]`.
pub fn correlation_matrix(series: &[Vec<f64>]) -> Vec<Vec<Option<f64>>> {
    series
        .iter()
        .map(|row| series.iter().map(|col| pearson(row, col)).collect())
        .collect()
}

fn defined<T>(records: &[T], field: impl Fn(&T) -> Option<f64>) -> Vec<f64> {
    records
        .iter()
        .filter_map(field)
        .filter(|v| !v.is_nan())
        .collect()
}

fn group_by<T, K>(
    records: &[T],
    group: impl Fn(&T) -> K,
    value: impl Fn(&T) -> Option<f64>,
) -> Vec<(K, Vec<f64>)>
where
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<f64>)> = Vec::new();
    for record in records {
        let key = group(record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        if let Some(v) = value(record).filter(|v| !v.is_nan()) {
            groups[slot].1.push(v);
        }
    }
    groups
}

fn bucket_counts<T>(
    records: &[T],
    date: impl Fn(&T) -> NaiveDate,
    bucket_of: impl Fn(NaiveDate) -> NaiveDate,
    next_bucket: impl Fn(NaiveDate) -> Option<NaiveDate>,
) -> Vec<PeriodCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(bucket_of(date(record))).or_insert(0) += 1;
    }
    let (Some(first), Some(last)) = (
        counts.keys().next().copied(),
        counts.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut cursor = Some(first);
    while let Some(start) = cursor.filter(|start| *start <= last) {
        buckets.push(PeriodCount {
            period_start: start,
            count: counts.get(&start).copied().unwrap_or(0),
        });
        cursor = next_bucket(start);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Row {
        name: &'static str,
        date: NaiveDate,
        value: Option<f64>,
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(name: &'static str, date: NaiveDate, value: Option<f64>) -> Row {
        Row { name, date, value }
    }

    fn values(values: &[f64]) -> Vec<Row> {
        values
            .iter()
            .map(|v| row("Avery", day(2024, 1, 1), Some(*v)))
            .collect()
    }

    #[test]
    fn mean_of_nothing_is_unavailable() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(mean(&empty, |r| r.value), None);

        let all_missing = vec![row("Avery", day(2024, 1, 1), None)];
        assert_eq!(mean(&all_missing, |r| r.value), None);
    }

    #[test]
    fn mean_skips_missing_values() {
        let rows = vec![
            row("Avery", day(2024, 1, 1), Some(10.0)),
            row("Jules", day(2024, 1, 2), None),
            row("Kiara", day(2024, 1, 3), Some(20.0)),
        ];
        assert_eq!(mean(&rows, |r| r.value), Some(15.0));
        assert_eq!(count(&rows), 3);
        assert_eq!(min(&rows, |r| r.value), Some(10.0));
        assert_eq!(max(&rows, |r| r.value), Some(20.0));
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let rows = values(&[40.0, 10.0, 30.0, 20.0]);
        assert_eq!(quantile(&rows, |r| r.value, 0.75).unwrap(), Some(32.5));
        assert_eq!(quantile(&rows, |r| r.value, 0.0).unwrap(), Some(10.0));
        assert_eq!(quantile(&rows, |r| r.value, 1.0).unwrap(), Some(40.0));
        assert_eq!(quantile(&rows, |r| r.value, 0.5).unwrap(), Some(25.0));
    }

    #[test]
    fn quantile_handles_empty_and_bad_q() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(quantile(&empty, |r| r.value, 0.75).unwrap(), None);
        assert!(quantile_of(&[1.0], 1.5).is_err());
        assert_eq!(quantile_of(&[7.0], 0.75).unwrap(), Some(7.0));
    }

    #[test]
    fn mode_breaks_ties_by_first_seen() {
        let rows = vec![
            row("Jules", day(2024, 1, 1), None),
            row("Avery", day(2024, 1, 1), None),
            row("Avery", day(2024, 1, 1), None),
            row("Jules", day(2024, 1, 1), None),
        ];
        assert_eq!(mode(&rows, |r| r.name), Some(("Jules", 2)));

        let empty: Vec<Row> = Vec::new();
        assert_eq!(mode(&empty, |r| r.name), None);
    }

    #[test]
    fn value_counts_sorted_by_frequency() {
        let rows = vec![
            row("Jules", day(2024, 1, 1), None),
            row("Avery", day(2024, 1, 1), None),
            row("Kiara", day(2024, 1, 1), None),
            row("Avery", day(2024, 1, 1), None),
        ];
        assert_eq!(
            value_counts(&rows, |r| r.name),
            vec![("Avery", 2), ("Jules", 1), ("Kiara", 1)]
        );
        assert_eq!(distinct_count(&rows, |r| r.name), 3);
    }

    #[test]
    fn grouped_sums_and_means_keep_first_seen_order() {
        let rows = vec![
            row("Kiara", day(2024, 1, 1), Some(4.0)),
            row("Avery", day(2024, 1, 1), Some(1.0)),
            row("Kiara", day(2024, 1, 1), Some(2.0)),
            row("Jules", day(2024, 1, 1), None),
        ];
        assert_eq!(
            grouped_sum(&rows, |r| r.name, |r| r.value),
            vec![("Kiara", 6.0), ("Avery", 1.0), ("Jules", 0.0)]
        );
        assert_eq!(
            grouped_mean(&rows, |r| r.name, |r| r.value),
            vec![("Kiara", Some(3.0)), ("Avery", Some(1.0)), ("Jules", None)]
        );
    }

    #[test]
    fn top_group_prefers_first_on_tie() {
        let rows = vec![
            row("Jules", day(2024, 1, 1), Some(5.0)),
            row("Avery", day(2024, 1, 1), Some(3.0)),
            row("Avery", day(2024, 1, 1), Some(2.0)),
        ];
        assert_eq!(top_group(&rows, |r| r.name, |r| r.value), Some(("Jules", 5.0)));

        let empty: Vec<Row> = Vec::new();
        assert_eq!(top_group(&empty, |r| r.name, |r| r.value), None);
    }

    #[test]
    fn weekly_buckets_fill_empty_weeks() {
        // 2024-01-03 is a Wednesday, 2024-01-22 a Monday.
        let rows = vec![
            row("Avery", day(2024, 1, 22), None),
            row("Avery", day(2024, 1, 3), None),
            row("Jules", day(2024, 1, 7), None),
        ];
        let buckets: Vec<(NaiveDate, usize)> = weekly_bucket_counts(&rows, |r| r.date)
            .into_iter()
            .map(|bucket| (bucket.period_start, bucket.count))
            .collect();
        assert_eq!(
            buckets,
            vec![
                (day(2024, 1, 1), 2),
                (day(2024, 1, 8), 0),
                (day(2024, 1, 15), 0),
                (day(2024, 1, 22), 1),
            ]
        );

        let empty: Vec<Row> = Vec::new();
        assert!(weekly_bucket_counts(&empty, |r| r.date).is_empty());
    }

    #[test]
    fn monthly_buckets_fill_empty_months() {
        let rows = vec![
            row("Avery", day(2023, 11, 30), None),
            row("Avery", day(2024, 2, 1), None),
        ];
        let buckets = monthly_bucket_counts(&rows, |r| r.date);
        let starts: Vec<NaiveDate> = buckets.iter().map(|b| b.period_start).collect();
        assert_eq!(
            starts,
            vec![day(2023, 11, 1), day(2023, 12, 1), day(2024, 1, 1), day(2024, 2, 1)]
        );
        assert_eq!(
            buckets.iter().map(|b| b.count).collect::<Vec<_>>(),
            vec![1, 0, 0, 1]
        );
    }

    #[test]
    fn weekday_counts_cover_all_days() {
        let rows = vec![
            row("Avery", day(2024, 1, 1), None),
            row("Avery", day(2024, 1, 8), None),
            row("Avery", day(2024, 1, 7), None),
        ];
        let counts = day_of_week_counts(&rows, |r| r.date);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[0], ("Monday", 2));
        assert_eq!(counts[2], ("Wednesday", 0));
        assert_eq!(counts[6], ("Sunday", 1));
    }

    #[test]
    fn daily_mean_is_chronological() {
        let rows = vec![
            row("Avery", day(2024, 1, 5), Some(0.5)),
            row("Jules", day(2024, 1, 2), Some(0.2)),
            row("Kiara", day(2024, 1, 5), Some(0.7)),
        ];
        let series = daily_mean(&rows, |r| r.date, |r| r.value);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0], (day(2024, 1, 2), 0.2));
        assert_eq!(series[1].0, day(2024, 1, 5));
        assert!((series[1].1 - 0.6).abs() < 1e-9);
    }

    #[test]
    fn pearson_detects_linear_relationships() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&xs, &inverse).unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&xs, &[3.0, 3.0, 3.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);

        let matrix = correlation_matrix(&[xs.to_vec(), ys.to_vec()]);
        assert_eq!(matrix.len(), 2);
        assert!((matrix[0][1].unwrap() - 1.0).abs() < 1e-9);
    }
}
