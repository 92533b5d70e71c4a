use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use team_health_dashboard::config::{DashboardConfig, DataFiles};
use team_health_dashboard::dashboard;
use team_health_dashboard::filter::{self, FilterSelection};
use team_health_dashboard::loader;
use team_health_dashboard::models::{MuscleAssessmentRecord, RecordId};
use team_health_dashboard::report;
use team_health_dashboard::risk;

fn assessment(player: &str, ratio: f64, imbalances: [f64; 4]) -> MuscleAssessmentRecord {
    MuscleAssessmentRecord {
        id: RecordId::new(),
        player: player.to_string(),
        recorded_on: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        hq_ratio: ratio,
        quad_imbalance: imbalances[0],
        hamstring_imbalance: imbalances[1],
        calf_imbalance: imbalances[2],
        groin_imbalance: imbalances[3],
    }
}

fn write_fixture(dir: &Path) -> DataFiles {
    let files = DataFiles::default();
    fs::write(
        files.injuries_path(dir),
        "Name,Injury Date,Injury Type,Body Part,Severity,Recovery Time (days)\n\
         Avery,2024-01-05,Strain,Hamstring,Moderate,21\n\
         Jules,2024-03-12,Sprain,Ankle,Mild,7\n\
         Avery,2024-03-20,Strain,Hamstring,Severe,\n\
         Kiara,2024-02-01,Contusion,Thigh,Mild,3\n",
    )
    .unwrap();
    fs::write(
        files.muscle_path(dir),
        "Player Name,Date Recorded,Hamstring To Quad Ratio,Quad Imbalance Percent,\
         HamstringImbalance Percent,Calf Imbalance Percent,Groin Imbalance Percent\n\
         Avery,2024-01-08,0.70,2,-3,1,0\n\
         Jules,2024-01-08,0.30,25,0,0,0\n\
         Kiara,2024-01-09,0.85,6,-7,0,0\n",
    )
    .unwrap();
    fs::write(
        files.sessions_path(dir),
        "name,session_date,durations,trimp\n\
         Avery,2024-01-01,60,10\n\
         Jules,2024-01-02,45,20\n\
         Avery,2024-01-16,90,30\n\
         Kiara,2024-01-17,75,40\n",
    )
    .unwrap();
    fs::write(
        files.performance_path(dir),
        "Shooter,Game Date,Points,Shot Accuracy,Shots Attempted\n\
         Judah,2024-02-01,22,0.48,18\n\
         Chris,2024-02-01,14,0.41,15\n",
    )
    .unwrap();
    files
}

#[test]
fn four_players_one_flagged_high_risk() {
    let records = vec![
        assessment("A", 0.7, [0.0, 0.0, 0.0, 0.0]),
        assessment("B", 0.65, [6.0, -4.0, 0.0, 2.0]),
        // (0.6 - 0.2) * 10 + (30 - 5) * 0.5 = 16.5
        assessment("C", 0.2, [30.0, 0.0, 0.0, 0.0]),
        assessment("D", 0.9, [0.0, 10.0, 0.0, 0.0]),
    ];
    let selection = FilterSelection::players(["A", "B", "C", "D"]);
    let filtered = filter::filter(&records, &selection);
    let scores = risk::score_all(&filtered).unwrap();

    assert_eq!(filtered.len(), 4);
    assert_eq!(scores.high_risk_count(DashboardConfig::default().muscle_high_risk_cutoff), 1);

    let summary = dashboard::muscle_tab(&records, &selection, &DashboardConfig::default()).unwrap();
    assert_eq!(summary.total_assessments, 4);
    assert_eq!(summary.high_risk_count, 1);
}

#[test]
fn csv_snapshot_drives_every_tab() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_fixture(dir.path());
    let snapshot = loader::load_snapshot(dir.path(), &files).unwrap();
    let config = DashboardConfig::default();

    let injuries = &snapshot.injuries;
    let selection = FilterSelection::players(filter::default_players(injuries, 2))
        .with_categories(filter::distinct_categories(injuries));
    assert_eq!(
        selection.players.iter().cloned().collect::<Vec<_>>(),
        vec!["Avery".to_string(), "Jules".to_string()]
    );
    let injury = dashboard::injury_tab(injuries, &selection).unwrap();
    assert_eq!(injury.total_injuries, 3);
    assert_eq!(injury.average_recovery_days, Some(14.0));
    assert_eq!(injury.monthly_injuries.len(), 3);
    assert_eq!(injury.monthly_injuries[1].count, 0);

    let everyone = FilterSelection::players(filter::distinct_players(&snapshot.muscle));
    let muscle = dashboard::muscle_tab(&snapshot.muscle, &everyone, &config).unwrap();
    assert_eq!(muscle.high_risk_count, 1);
    assert!(report::muscle_section(&everyone, &muscle)
        .contains("| Jules | 2024-01-08 | 0.30 | 13.0 |"));

    let everyone = FilterSelection::players(filter::distinct_players(&snapshot.sessions));
    let sessions = dashboard::sessions_tab(&snapshot.sessions, &everyone, &config).unwrap();
    assert_eq!(sessions.high_risk_threshold, Some(32.5));
    assert_eq!(sessions.high_risk_sessions, 1);
    assert_eq!(sessions.weekly_sessions.len(), 3);

    let shooters = snapshot.performance.as_deref().unwrap();
    let everyone = FilterSelection::players(filter::distinct_players(shooters));
    let performance = dashboard::performance_tab(Some(shooters), &everyone).unwrap();
    assert_eq!(performance.top_shooter.unwrap().shooter, "Judah");
    assert_eq!(performance.total_shots_attempted, 33.0);
}

#[test]
fn filtered_out_selection_is_empty_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_fixture(dir.path());
    let snapshot = loader::load_snapshot(dir.path(), &files).unwrap();

    let nobody = FilterSelection::players(["Morgan"]);
    let sessions =
        dashboard::sessions_tab(&snapshot.sessions, &nobody, &DashboardConfig::default()).unwrap();
    assert_eq!(sessions.total_sessions, 0);
    assert_eq!(sessions.high_risk_threshold, None);
    assert!(sessions.weekly_sessions.is_empty());
    assert!(report::sessions_section(&nobody, &sessions).contains("No sessions recorded"));
}

#[test]
fn short_year_dates_keep_weekly_buckets_tight() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_fixture(dir.path());
    fs::write(
        files.sessions_path(dir.path()),
        "name,session_date,durations,trimp\n\
         Avery,2024-01-01,60,10\n\
         Avery,1/8/24,45,20\n",
    )
    .unwrap();
    let snapshot = loader::load_snapshot(dir.path(), &files).unwrap();

    let everyone = FilterSelection::players(["Avery"]);
    let sessions =
        dashboard::sessions_tab(&snapshot.sessions, &everyone, &DashboardConfig::default())
            .unwrap();
    assert_eq!(sessions.weekly_sessions.len(), 2);
    assert_eq!(
        sessions.weekly_sessions[1].period_start,
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    );
}
