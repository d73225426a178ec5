use std::collections::HashMap;

use shared::{
    domain::{display_timestamp, HistoryQuery},
    protocol::PredictionRecord,
};
use tracing::debug;

use crate::{ClientResult, PredictionService};

/// A history record ready for display. Field names stay canonical; column
/// labels are applied by whatever renders the row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub created_at: String,
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub predicted_species: String,
}

impl From<PredictionRecord> for HistoryRow {
    fn from(record: PredictionRecord) -> Self {
        Self {
            created_at: display_timestamp(&record.created_at),
            sepal_length: record.sepal_length,
            sepal_width: record.sepal_width,
            petal_length: record.petal_length,
            petal_width: record.petal_width,
            predicted_species: record.predicted_species,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    token: String,
    query: HistoryQuery,
}

/// Memoizes history pages per (token, limit, offset). Invalidation is always
/// total.
#[derive(Debug, Default)]
pub struct HistoryCache {
    entries: HashMap<CacheKey, Vec<HistoryRow>>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached page for this exact key, fetching and storing it on
    /// a miss. Errors are returned as-is and never cached.
    pub async fn get(
        &mut self,
        api: &dyn PredictionService,
        token: &str,
        query: HistoryQuery,
    ) -> ClientResult<&[HistoryRow]> {
        let key = CacheKey {
            token: token.to_string(),
            query,
        };
        if self.entries.contains_key(&key) {
            debug!(
                limit = query.limit(),
                offset = query.offset(),
                "history: cache hit"
            );
            return Ok(&self.entries[&key]);
        }

        let rows: Vec<HistoryRow> = api
            .list_predictions(token, query)
            .await?
            .into_iter()
            .map(HistoryRow::from)
            .collect();
        Ok(self.entries.entry(key).or_insert(rows).as_slice())
    }

    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(entries = self.entries.len(), "history: cache invalidated");
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
