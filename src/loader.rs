//! CSV loading into an immutable [`Snapshot`].

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::DataFiles;
use crate::error::{DashboardError, Result};
use crate::models::{
    InjuryRecord, MuscleAssessmentRecord, PerformanceRecord, RecordId, SessionRecord,
};

// `%m/%d/%y` goes first: `%Y` would read "24" as the year 24.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const MIN_YEAR: i32 = 1900;
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Everything loaded for one dashboard session. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub injuries: Vec<InjuryRecord>,
    pub muscle: Vec<MuscleAssessmentRecord>,
    pub sessions: Vec<SessionRecord>,
    pub performance: Option<Vec<PerformanceRecord>>,
}

pub fn load_snapshot(dir: &Path, files: &DataFiles) -> Result<Snapshot> {
    let injuries = load_injuries(&files.injuries_path(dir))?;
    let muscle = load_muscle(&files.muscle_path(dir))?;
    let sessions = load_sessions(&files.sessions_path(dir))?;

    let performance_path = files.performance_path(dir);
    let performance = if performance_path.exists() {
        Some(load_performance(&performance_path)?)
    } else {
        tracing::info!(path = %performance_path.display(), "no performance data, tab disabled");
        None
    };

    tracing::info!(
        injuries = injuries.len(),
        muscle = muscle.len(),
        sessions = sessions.len(),
        performance = ?performance.as_ref().map(Vec::len),
        "loaded snapshot"
    );

    Ok(Snapshot {
        injuries,
        muscle,
        sessions,
        performance,
    })
}

pub fn load_injuries(path: &Path) -> Result<Vec<InjuryRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Injury Date", deserialize_with = "deserialize_date")]
        injury_date: NaiveDate,
        #[serde(rename = "Injury Type")]
        injury_type: String,
        #[serde(rename = "Body Part")]
        body_part: String,
        #[serde(rename = "Severity")]
        severity: String,
        #[serde(rename = "Recovery Time (days)", default)]
        recovery_days: Option<String>,
    }

    let rows: Vec<CsvRow> = read_rows(path)?;
    let mut coerced = 0usize;
    let records = rows
        .into_iter()
        .map(|row| {
            let raw = row.recovery_days.as_deref().unwrap_or_default();
            let recovery_days = coerce_number(raw);
            if recovery_days.is_none() && !raw.is_empty() {
                coerced += 1;
            }
            InjuryRecord {
                id: RecordId::new(),
                player: row.name,
                injury_date: row.injury_date,
                injury_type: row.injury_type,
                body_part: row.body_part,
                severity: row.severity,
                recovery_days,
            }
        })
        .collect();

    if coerced > 0 {
        tracing::warn!(
            path = %path.display(),
            coerced,
            "non-numeric recovery times treated as missing"
        );
    }
    Ok(records)
}

pub fn load_muscle(path: &Path) -> Result<Vec<MuscleAssessmentRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Player Name")]
        player: String,
        #[serde(rename = "Date Recorded", deserialize_with = "deserialize_date")]
        recorded_on: NaiveDate,
        #[serde(rename = "Hamstring To Quad Ratio")]
        hq_ratio: f64,
        #[serde(rename = "Quad Imbalance Percent")]
        quad_imbalance: f64,
        #[serde(rename = "HamstringImbalance Percent")]
        hamstring_imbalance: f64,
        #[serde(rename = "Calf Imbalance Percent")]
        calf_imbalance: f64,
        #[serde(rename = "Groin Imbalance Percent")]
        groin_imbalance: f64,
    }

    let rows: Vec<CsvRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| MuscleAssessmentRecord {
            id: RecordId::new(),
            player: row.player,
            recorded_on: row.recorded_on,
            hq_ratio: row.hq_ratio,
            quad_imbalance: row.quad_imbalance,
            hamstring_imbalance: row.hamstring_imbalance,
            calf_imbalance: row.calf_imbalance,
            groin_imbalance: row.groin_imbalance,
        })
        .collect())
}

pub fn load_sessions(path: &Path) -> Result<Vec<SessionRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        name: String,
        #[serde(deserialize_with = "deserialize_date")]
        session_date: NaiveDate,
        durations: f64,
        trimp: f64,
    }

    let rows: Vec<CsvRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| SessionRecord {
            id: RecordId::new(),
            player: row.name,
            session_date: row.session_date,
            duration_minutes: row.durations,
            trimp: row.trimp,
        })
        .collect())
}

pub fn load_performance(path: &Path) -> Result<Vec<PerformanceRecord>> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "Shooter")]
        shooter: String,
        #[serde(rename = "Game Date", deserialize_with = "deserialize_date")]
        game_date: NaiveDate,
        #[serde(rename = "Points")]
        points: f64,
        #[serde(rename = "Shot Accuracy")]
        shot_accuracy: f64,
        #[serde(rename = "Shots Attempted")]
        shots_attempted: f64,
    }

    let rows: Vec<CsvRow> = read_rows(path)?;
    Ok(rows
        .into_iter()
        .map(|row| PerformanceRecord {
            id: RecordId::new(),
            shooter: row.shooter,
            game_date: row.game_date,
            points: row.points,
            shot_accuracy: row.shot_accuracy,
            shots_attempted: row.shots_attempted,
        })
        .collect())
}

/// Parses the date formats found in exported sheets; a time part is dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
        .filter(|date| date.year() >= MIN_YEAR)
}

/// Numeric coercion for optional columns: anything unparseable is missing.
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The exports are ISO-8859-1, where every byte is its own code point.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = fs::read(path).map_err(|err| DashboardError::load(path, err))?;
    let text = decode_latin1(&bytes);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = result.map_err(|err| {
            // header is line 1
            DashboardError::load(path, format!("row {}: {err}", index + 2))
        })?;
        rows.push(row);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read csv");
    Ok(rows)
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn parses_supported_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09"), Some(expected));
        assert_eq!(parse_date("03/09/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-09 14:30:00"), Some(expected));
        assert_eq!(parse_date(" 2024-03-09 "), Some(expected));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn short_years_land_in_this_century() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("3/9/24"), Some(expected));
        assert_eq!(parse_date("03/09/24"), Some(expected));
        assert_eq!(parse_date("0024-03-09"), None);
    }

    #[test]
    fn coerces_bad_numbers_to_missing() {
        assert_eq!(coerce_number("21"), Some(21.0));
        assert_eq!(coerce_number(" 7.5 "), Some(7.5));
        assert_eq!(coerce_number("unknown"), None);
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("NaN"), None);
    }

    #[test]
    fn decodes_latin1_names() {
        assert_eq!(decode_latin1(b"Jos\xe9"), "José");
    }

    #[test]
    fn loads_injuries_with_missing_recovery() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "injuries.csv",
            b"Name,Injury Date,Injury Type,Body Part,Severity,Recovery Time (days)\n\
              Jos\xe9 Ruiz,2024-01-05,Sprain,Ankle,Mild,14\n\
              Avery Lee,01/20/2024,Strain,Hamstring,Severe,\n\
              Avery Lee,2024-02-02,Strain,Hamstring,Moderate,unknown\n",
        );

        let records = load_injuries(&dir.path().join("injuries.csv")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].player, "José Ruiz");
        assert_eq!(records[0].recovery_days, Some(14.0));
        assert_eq!(records[1].recovery_days, None);
        assert_eq!(records[2].recovery_days, None);
        assert_eq!(
            records[1].injury_date,
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
        );
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn malformed_row_reports_its_line() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "sessions.csv",
            b"name,session_date,durations,trimp\n\
              Avery,2024-01-01,60,90\n\
              Jules,2024-01-02,sixty,80\n",
        );
        let err = load_sessions(&dir.path().join("sessions.csv")).unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn snapshot_without_performance_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::default();
        write_file(
            dir.path(),
            &files.injuries,
            b"Name,Injury Date,Injury Type,Body Part,Severity,Recovery Time (days)\n",
        );
        write_file(
            dir.path(),
            &files.muscle,
            b"Player Name,Date Recorded,Hamstring To Quad Ratio,Quad Imbalance Percent,\
              HamstringImbalance Percent,Calf Imbalance Percent,Groin Imbalance Percent\n\
              Avery,2024-01-01,0.65,2.0,-3.5,8.0,1.0\n",
        );
        write_file(
            dir.path(),
            &files.sessions,
            b"name,session_date,durations,trimp\nAvery,2024-01-01,60,90\n",
        );

        let snapshot = load_snapshot(dir.path(), &files).unwrap();
        assert!(snapshot.injuries.is_empty());
        assert_eq!(snapshot.muscle.len(), 1);
        assert_eq!(snapshot.muscle[0].calf_imbalance, 8.0);
        assert_eq!(snapshot.sessions[0].trimp, 90.0);
        assert!(snapshot.performance.is_none());
    }

    #[test]
    fn missing_required_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(dir.path(), &DataFiles::default()).unwrap_err();
        assert!(matches!(err, DashboardError::Load { .. }));
    }
}
