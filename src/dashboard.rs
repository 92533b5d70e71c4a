//! Per-tab computations: filter the snapshot, then derive what each tab shows.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::{filter, FilterSelection};
use crate::models::{
    InjuryRecord, MuscleAssessmentRecord, MuscleMetric, PerformanceRecord, PeriodCount, RecordId,
    SessionRecord, ValueCount,
};
use crate::risk;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjurySummary {
    pub total_injuries: usize,
    pub average_recovery_days: Option<f64>,
    pub most_common_injury: Option<ValueCount>,
    pub most_affected_body_part: Option<ValueCount>,
    pub injury_types: Vec<ValueCount>,
    pub recovery_by_body_part: Vec<(String, Option<f64>)>,
    pub monthly_injuries: Vec<PeriodCount>,
    pub severity_distribution: Vec<ValueCount>,
    pub rows: Vec<InjuryRecord>,
}

pub fn injury_tab(records: &[InjuryRecord], selection: &FilterSelection) -> Result<InjurySummary> {
    if records.is_empty() {
        return Err(DashboardError::DataUnavailable("injury"));
    }
    let rows = filter(records, selection);

    Ok(InjurySummary {
        total_injuries: aggregate::count(&rows),
        average_recovery_days: aggregate::mean(&rows, |r| r.recovery_days),
        most_common_injury: aggregate::mode(&rows, |r| r.injury_type.clone()).map(value_count),
        most_affected_body_part: aggregate::mode(&rows, |r| r.body_part.clone()).map(value_count),
        injury_types: value_counts(&rows, |r| r.injury_type.clone()),
        recovery_by_body_part: aggregate::grouped_mean(
            &rows,
            |r| r.body_part.clone(),
            |r| r.recovery_days,
        ),
        monthly_injuries: aggregate::monthly_bucket_counts(&rows, |r| r.injury_date),
        severity_distribution: value_counts(&rows, |r| r.severity.clone()),
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: MuscleMetric,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub outside_ideal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerTrend {
    pub player: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<&'static str>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleRow {
    pub id: RecordId,
    pub player: String,
    pub recorded_on: NaiveDate,
    pub hq_ratio: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleSummary {
    pub total_assessments: usize,
    pub average_hq_ratio: Option<f64>,
    pub high_risk_cutoff: f64,
    pub high_risk_count: usize,
    pub high_risk_share_percent: Option<f64>,
    pub average_risk_score: Option<f64>,
    pub max_risk_score: Option<f64>,
    pub metrics: Vec<MetricSummary>,
    pub hq_trends: Vec<PlayerTrend>,
    pub correlation: CorrelationMatrix,
    pub rows: Vec<MuscleRow>,
}

/// Records are narrowed by player only; the category selection names the
/// metrics to summarise (all five when absent).
pub fn muscle_tab(
    records: &[MuscleAssessmentRecord],
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> Result<MuscleSummary> {
    if records.is_empty() {
        return Err(DashboardError::DataUnavailable("muscle imbalance"));
    }
    let metrics = selected_metrics(selection)?;
    let filtered = filter(records, &FilterSelection::players(selection.players.iter().cloned()));
    let scores = risk::score_all(&filtered)?;

    let total = aggregate::count(&filtered);
    let high_risk_count = scores.high_risk_count(config.muscle_high_risk_cutoff);
    let high_risk_share_percent =
        (total > 0).then(|| high_risk_count as f64 / total as f64 * 100.0);

    let metric_summaries: Vec<MetricSummary> = metrics
        .iter()
        .map(|metric| {
            let (low, high) = metric.ideal_band();
            MetricSummary {
                metric: *metric,
                mean: aggregate::mean(&filtered, |r| Some(r.metric(*metric))),
                min: aggregate::min(&filtered, |r| Some(r.metric(*metric))),
                max: aggregate::max(&filtered, |r| Some(r.metric(*metric))),
                outside_ideal: filtered
                    .iter()
                    .filter(|r| !(low..=high).contains(&r.metric(*metric)))
                    .count(),
            }
        })
        .collect();

    let series: Vec<Vec<f64>> = MuscleMetric::ALL
        .iter()
        .map(|metric| filtered.iter().map(|r| r.metric(*metric)).collect())
        .collect();
    let correlation = CorrelationMatrix {
        labels: MuscleMetric::ALL.iter().map(MuscleMetric::label).collect(),
        values: aggregate::correlation_matrix(&series),
    };

    let rows: Vec<MuscleRow> = filtered
        .iter()
        .map(|r| MuscleRow {
            id: r.id,
            player: r.player.clone(),
            recorded_on: r.recorded_on,
            hq_ratio: r.hq_ratio,
            risk_score: scores.get(r.id).unwrap_or_default(),
        })
        .collect();

    Ok(MuscleSummary {
        total_assessments: total,
        average_hq_ratio: aggregate::mean(&filtered, |r| Some(r.hq_ratio)),
        high_risk_cutoff: config.muscle_high_risk_cutoff,
        high_risk_count,
        high_risk_share_percent,
        average_risk_score: scores.mean(),
        max_risk_score: scores.max(),
        metrics: metric_summaries,
        hq_trends: hq_trends(&filtered),
        correlation,
        rows,
    })
}

fn selected_metrics(selection: &FilterSelection) -> Result<Vec<MuscleMetric>> {
    let Some(labels) = &selection.categories else {
        return Ok(MuscleMetric::ALL.to_vec());
    };
    let mut metrics = labels
        .iter()
        .map(|label| {
            MuscleMetric::from_label(label)
                .filter(|metric| MuscleMetric::IMBALANCES.contains(metric))
                .ok_or_else(|| {
                    DashboardError::Precondition(format!(
                        "`{label}` is not a muscle imbalance metric"
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;
    metrics.sort();
    Ok(metrics)
}

fn hq_trends(records: &[MuscleAssessmentRecord]) -> Vec<PlayerTrend> {
    let mut players: Vec<&str> = Vec::new();
    for record in records {
        if !players.contains(&record.player.as_str()) {
            players.push(&record.player);
        }
    }

    players
        .into_iter()
        .map(|player| {
            let mut points: Vec<(NaiveDate, f64)> = records
                .iter()
                .filter(|r| r.player == player)
                .map(|r| (r.recorded_on, r.hq_ratio))
                .collect();
            points.sort_by_key(|(date, _)| *date);
            PlayerTrend {
                player: player.to_string(),
                points,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionsSummary {
    pub total_sessions: usize,
    pub average_duration_minutes: Option<f64>,
    pub high_risk_threshold: Option<f64>,
    pub high_risk_sessions: usize,
    pub unique_players: usize,
    pub weekly_sessions: Vec<PeriodCount>,
    pub weekly_high_risk_sessions: Vec<PeriodCount>,
    pub sessions_per_player: Vec<ValueCount>,
    pub sessions_by_weekday: Vec<(&'static str, usize)>,
    pub rows: Vec<SessionRecord>,
}

/// High risk is trimp strictly above the configured quantile of the filtered sessions.
pub fn sessions_tab(
    records: &[SessionRecord],
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> Result<SessionsSummary> {
    if records.is_empty() {
        return Err(DashboardError::DataUnavailable("session"));
    }
    let rows = filter(records, &FilterSelection::players(selection.players.iter().cloned()));
    let threshold = aggregate::quantile(&rows, |r| Some(r.trimp), config.session_risk_quantile)?;
    tracing::debug!(?threshold, quantile = config.session_risk_quantile, "session risk threshold");

    let high_risk: Vec<&SessionRecord> = match threshold {
        Some(limit) => rows.iter().filter(|r| r.trimp > limit).collect(),
        None => Vec::new(),
    };
    let weekly_sessions = aggregate::weekly_bucket_counts(&rows, |r| r.session_date);
    let high_risk_weeks: Vec<NaiveDate> = high_risk
        .iter()
        .map(|r| aggregate::week_start(r.session_date))
        .collect();
    let weekly_high_risk_sessions = weekly_sessions
        .iter()
        .map(|week| PeriodCount {
            period_start: week.period_start,
            count: high_risk_weeks
                .iter()
                .filter(|start| **start == week.period_start)
                .count(),
        })
        .collect();

    Ok(SessionsSummary {
        total_sessions: aggregate::count(&rows),
        average_duration_minutes: aggregate::mean(&rows, |r| Some(r.duration_minutes)),
        high_risk_threshold: threshold,
        high_risk_sessions: high_risk.len(),
        unique_players: aggregate::distinct_count(&rows, |r| r.player.clone()),
        sessions_by_weekday: aggregate::day_of_week_counts(&rows, |r| r.session_date),
        sessions_per_player: value_counts(&rows, |r| r.player.clone()),
        weekly_sessions,
        weekly_high_risk_sessions,
        rows,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopShooter {
    pub shooter: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_shots_attempted: f64,
    pub average_accuracy_percent: Option<f64>,
    pub top_shooter: Option<TopShooter>,
    pub average_points: Option<f64>,
    pub points_by_shooter: Vec<(String, f64)>,
    pub accuracy_over_time: Vec<(NaiveDate, f64)>,
    pub rows: Vec<PerformanceRecord>,
}

pub fn performance_tab(
    records: Option<&[PerformanceRecord]>,
    selection: &FilterSelection,
) -> Result<PerformanceSummary> {
    let records = records
        .filter(|records| !records.is_empty())
        .ok_or(DashboardError::DataUnavailable("performance"))?;
    let rows = filter(records, &FilterSelection::players(selection.players.iter().cloned()));

    let mut points_by_shooter =
        aggregate::grouped_sum(&rows, |r| r.shooter.clone(), |r| Some(r.points));
    points_by_shooter.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(PerformanceSummary {
        total_shots_attempted: rows.iter().map(|r| r.shots_attempted).sum(),
        average_accuracy_percent: aggregate::mean(&rows, |r| Some(r.shot_accuracy))
            .map(|accuracy| accuracy * 100.0),
        top_shooter: aggregate::top_group(&rows, |r| r.shooter.clone(), |r| Some(r.points))
            .map(|(shooter, points)| TopShooter { shooter, points }),
        average_points: aggregate::mean(&rows, |r| Some(r.points)),
        points_by_shooter,
        accuracy_over_time: aggregate::daily_mean(
            &rows,
            |r| r.game_date,
            |r| Some(r.shot_accuracy),
        ),
        rows,
    })
}

fn value_count((value, count): (String, usize)) -> ValueCount {
    ValueCount { value, count }
}

fn value_counts<T>(records: &[T], field: impl Fn(&T) -> String) -> Vec<ValueCount> {
    aggregate::value_counts(records, field)
        .into_iter()
        .map(value_count)
        .collect()
}
