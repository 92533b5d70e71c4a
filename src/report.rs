use std::fmt::Write;

use crate::dashboard::{InjurySummary, MuscleSummary, PerformanceSummary, SessionsSummary};
use crate::filter::FilterSelection;
use crate::models::{PeriodCount, ValueCount};
use crate::predict::{InjuryPrediction, PredictionRequestBuilder, ShotRecommendation};

fn na(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "N/A".to_string(),
    }
}

fn selection_label(selection: &FilterSelection) -> String {
    if selection.players.is_empty() {
        "no players selected".to_string()
    } else {
        selection
            .players
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn write_counts(output: &mut String, counts: &[ValueCount], empty: &str) {
    if counts.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    for entry in counts {
        let _ = writeln!(output, "- {}: {}", entry.value, entry.count);
    }
}

fn write_periods(output: &mut String, periods: &[PeriodCount], empty: &str) {
    if periods.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    for period in periods {
        let _ = writeln!(output, "- {}: {}", period.period_start, period.count);
    }
}

pub fn injury_section(selection: &FilterSelection, summary: &InjurySummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Injury History");
    let _ = writeln!(output, "Players: {}", selection_label(selection));
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total injuries: {}", summary.total_injuries);
    let _ = writeln!(
        output,
        "- Average recovery time: {}",
        summary
            .average_recovery_days
            .map(|days| format!("{days:.1} days"))
            .unwrap_or_else(|| "N/A".to_string())
    );
    match &summary.most_common_injury {
        Some(injury) => {
            let _ = writeln!(
                output,
                "- Most common injury: {} ({} cases)",
                injury.value, injury.count
            );
        }
        None => {
            let _ = writeln!(output, "- Most common injury: N/A");
        }
    }
    match &summary.most_affected_body_part {
        Some(part) => {
            let _ = writeln!(
                output,
                "- Most affected body part: {} ({} injuries)",
                part.value, part.count
            );
        }
        None => {
            let _ = writeln!(output, "- Most affected body part: N/A");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Injury Types");
    write_counts(&mut output, &summary.injury_types, "No injuries recorded for this selection.");

    let _ = writeln!(output);
    let _ = writeln!(output, "### Recovery Time by Body Part");
    if summary.recovery_by_body_part.is_empty() {
        let _ = writeln!(output, "No injuries recorded for this selection.");
    }
    for (part, days) in &summary.recovery_by_body_part {
        let _ = writeln!(output, "- {part}: {} days", na(*days, 1));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Injuries per Month");
    write_periods(
        &mut output,
        &summary.monthly_injuries,
        "No injuries recorded for this selection.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Severity Distribution");
    let total = summary.total_injuries.max(1) as f64;
    for entry in &summary.severity_distribution {
        let _ = writeln!(
            output,
            "- {}: {} ({:.1}%)",
            entry.value,
            entry.count,
            entry.count as f64 / total * 100.0
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Injury Details");
    let _ = writeln!(
        output,
        "| Name | Injury Date | Injury Type | Body Part | Severity | Recovery (days) |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for row in &summary.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            row.player,
            row.injury_date,
            row.injury_type,
            row.body_part,
            row.severity,
            na(row.recovery_days, 0)
        );
    }

    output
}

pub fn muscle_section(selection: &FilterSelection, summary: &MuscleSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Muscle Imbalance");
    let _ = writeln!(output, "Players: {}", selection_label(selection));
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total assessments: {}", summary.total_assessments);
    let _ = writeln!(
        output,
        "- Avg H/Q ratio: {} (ideal 0.6-0.8)",
        na(summary.average_hq_ratio, 2)
    );
    let _ = writeln!(
        output,
        "- High risk assessments (score > {}): {} ({}% of total)",
        summary.high_risk_cutoff,
        summary.high_risk_count,
        na(summary.high_risk_share_percent, 1)
    );
    let _ = writeln!(
        output,
        "- Average risk score: {} (max {})",
        na(summary.average_risk_score, 1),
        na(summary.max_risk_score, 1)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Metric Distributions");
    for metric in &summary.metrics {
        let (low, high) = metric.metric.ideal_band();
        let _ = writeln!(
            output,
            "- {}: mean {}, range {} to {}, {} outside ideal [{low}, {high}]",
            metric.metric,
            na(metric.mean, 2),
            na(metric.min, 2),
            na(metric.max, 2),
            metric.outside_ideal
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### H/Q Ratio Trends");
    if summary.hq_trends.is_empty() {
        let _ = writeln!(output, "No assessments recorded for this selection.");
    }
    for trend in &summary.hq_trends {
        let points = trend
            .points
            .iter()
            .map(|(date, ratio)| format!("{date} {ratio:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "- {}: {}", trend.player, points);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Metric Correlation");
    let _ = writeln!(output, "| | {} |", summary.correlation.labels.join(" | "));
    let _ = writeln!(
        output,
        "|---|{}",
        "---|".repeat(summary.correlation.labels.len())
    );
    for (label, row) in summary.correlation.labels.iter().zip(&summary.correlation.values) {
        let cells = row
            .iter()
            .map(|value| na(*value, 2))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(output, "| {label} | {cells} |");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Muscle Imbalance Details");
    let _ = writeln!(output, "| Player Name | Date Recorded | H/Q Ratio | Risk Score |");
    let _ = writeln!(output, "|---|---|---|---|");
    for row in &summary.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {:.2} | {:.1} |",
            row.player, row.recorded_on, row.hq_ratio, row.risk_score
        );
    }

    output
}

pub fn sessions_section(selection: &FilterSelection, summary: &SessionsSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Sessions");
    let _ = writeln!(output, "Players: {}", selection_label(selection));
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total sessions: {}", summary.total_sessions);
    let _ = writeln!(
        output,
        "- Avg duration (mins): {}",
        na(summary.average_duration_minutes, 1)
    );
    let _ = writeln!(
        output,
        "- High risk sessions: {} (trimp above {})",
        summary.high_risk_sessions,
        na(summary.high_risk_threshold, 1)
    );
    let _ = writeln!(output, "- Unique players: {}", summary.unique_players);

    let _ = writeln!(output);
    let _ = writeln!(output, "### Sessions per Week");
    write_periods(
        &mut output,
        &summary.weekly_sessions,
        "No sessions recorded for this selection.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### High-Risk Sessions per Week");
    write_periods(
        &mut output,
        &summary.weekly_high_risk_sessions,
        "No sessions recorded for this selection.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Sessions per Player");
    write_counts(
        &mut output,
        &summary.sessions_per_player,
        "No sessions recorded for this selection.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Sessions by Day of the Week");
    for (day, count) in &summary.sessions_by_weekday {
        let _ = writeln!(output, "- {day}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Session Details");
    let _ = writeln!(output, "| Name | Session Date | Duration | TRIMP |");
    let _ = writeln!(output, "|---|---|---|---|");
    for row in &summary.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {:.0} | {:.1} |",
            row.player, row.session_date, row.duration_minutes, row.trimp
        );
    }

    output
}

pub fn performance_section(selection: &FilterSelection, summary: &PerformanceSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Shooting Performance");
    let _ = writeln!(output, "Shooters: {}", selection_label(selection));
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total shots attempted: {:.0}", summary.total_shots_attempted);
    let _ = writeln!(
        output,
        "- Average shot accuracy: {}%",
        na(summary.average_accuracy_percent, 2)
    );
    match &summary.top_shooter {
        Some(top) => {
            let _ = writeln!(output, "- Top shooter: {} ({:.0} points)", top.shooter, top.points);
        }
        None => {
            let _ = writeln!(output, "- Top shooter: N/A");
        }
    }
    let _ = writeln!(
        output,
        "- Average points per game: {}",
        na(summary.average_points, 1)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "### Points by Shooter");
    if summary.points_by_shooter.is_empty() {
        let _ = writeln!(output, "No games recorded for this selection.");
    }
    for (shooter, points) in &summary.points_by_shooter {
        let _ = writeln!(output, "- {shooter}: {points:.0}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Shot Accuracy over Time");
    for (date, accuracy) in &summary.accuracy_over_time {
        let _ = writeln!(output, "- {date}: {:.1}%", accuracy * 100.0);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Performance Details");
    let _ = writeln!(output, "| Shooter | Game Date | Points | Shot Accuracy | Shots Attempted |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for row in &summary.rows {
        let _ = writeln!(
            output,
            "| {} | {} | {:.0} | {:.2} | {:.0} |",
            row.shooter, row.game_date, row.points, row.shot_accuracy, row.shots_attempted
        );
    }

    output
}

/// The inputs a prediction form takes, with their ranges and defaults.
pub fn feature_form_section(title: &str, builder: &PredictionRequestBuilder) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## {title} Inputs");
    let _ = writeln!(output, "| Feature | Label | Range | Default |");
    let _ = writeln!(output, "|---|---|---|---|");
    for spec in builder.specs() {
        let _ = writeln!(
            output,
            "| {} | {} | {} to {} | {} |",
            spec.name, spec.label, spec.min, spec.max, spec.default
        );
    }

    output
}

pub fn injury_prediction_section(prediction: &InjuryPrediction) -> String {
    let mut output = String::new();
    let result = &prediction.classification;

    let _ = writeln!(output, "## Injury Risk Prediction");
    for (name, value) in prediction.features.names.iter().zip(&prediction.features.values) {
        let _ = writeln!(output, "- {name}: {value}");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "- Injury risk level: {}", result.status);
    let _ = writeln!(output, "- Injury probability: {:.2}%", result.probability_percent);
    let _ = writeln!(output, "- Risk tier: {}", result.tier);
    let _ = writeln!(output, "- Confidence: {:.1}", result.confidence);
    let _ = writeln!(output);
    let _ = writeln!(output, "Recommendation: {}", result.recommendation);

    output
}

pub fn shot_recommendation_section(recommendation: &ShotRecommendation) -> String {
    match recommendation {
        ShotRecommendation::Take { shooter } => {
            format!("The recommended player for the winning shot is: {shooter}\n")
        }
        ShotRecommendation::NoClearChoice => {
            "No player was predicted as the best choice for the winning shot.\n".to_string()
        }
    }
}
