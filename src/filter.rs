use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{InjuryRecord, MuscleAssessmentRecord, PerformanceRecord, SessionRecord};

/// Field access used by [`filter`].
pub trait Filterable {
    fn player(&self) -> &str;

    /// The value matched against a category selection, if the record has one.
    fn category(&self) -> Option<&str> {
        None
    }
}

impl Filterable for InjuryRecord {
    fn player(&self) -> &str {
        &self.player
    }

    fn category(&self) -> Option<&str> {
        Some(&self.severity)
    }
}

impl Filterable for MuscleAssessmentRecord {
    fn player(&self) -> &str {
        &self.player
    }
}

impl Filterable for SessionRecord {
    fn player(&self) -> &str {
        &self.player
    }
}

impl Filterable for PerformanceRecord {
    fn player(&self) -> &str {
        &self.shooter
    }
}

/// What the user picked for one tab. An empty player set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub players: BTreeSet<String>,
    pub categories: Option<BTreeSet<String>>,
}

impl FilterSelection {
    pub fn players<I, S>(players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSelection {
            players: players.into_iter().map(Into::into).collect(),
            categories: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        if !self.players.contains(record.player()) {
            return false;
        }
        match &self.categories {
            None => true,
            Some(categories) => record
                .category()
                .is_some_and(|category| categories.contains(category)),
        }
    }
}

/// Keeps the records matching `selection`, preserving input order.
pub fn filter<T: Filterable + Clone>(records: &[T], selection: &FilterSelection) -> Vec<T> {
    let kept: Vec<T> = records
        .iter()
        .filter(|record| selection.matches(*record))
        .cloned()
        .collect();
    tracing::debug!(
        input = records.len(),
        kept = kept.len(),
        players = selection.players.len(),
        "applied record filter"
    );
    kept
}

/// Sorted distinct player names, the options offered by a player picker.
pub fn distinct_players<T: Filterable>(records: &[T]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.player().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The first `count` players in sorted order, the picker's initial selection.
pub fn default_players<T: Filterable>(records: &[T], count: usize) -> Vec<String> {
    distinct_players(records).into_iter().take(count).collect()
}

/// Sorted distinct category values present in `records`.
pub fn distinct_categories<T: Filterable>(records: &[T]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.category().map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
