use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::types::{AnalysisResult, StoredAnalysis};

/// Storage for finished analyses. Swap in a persistent backend by
/// implementing this; nothing else needs to change.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Newest analysis stored for exactly this URL string.
    async fn latest_for_url(&self, url: &str) -> Result<Option<StoredAnalysis>>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredAnalysis>>;

    async fn insert(&self, result: AnalysisResult, created_at: DateTime<Utc>) -> Result<StoredAnalysis>;

    /// Newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>>;
}

pub const DEFAULT_MAX_ROWS: usize = 1000;

/// In-memory store. Everything is lost on restart.
///
/// Keeps one row per URL; inserting for a URL that is already stored
/// replaces it. Past `max_rows` the oldest rows are evicted.
pub struct MemStore {
    rows: RwLock<VecDeque<StoredAnalysis>>,
    max_rows: usize,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::with_max_rows(DEFAULT_MAX_ROWS)
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            rows: RwLock::new(VecDeque::new()),
            max_rows: max_rows.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl AnalysisStore for MemStore {
    async fn latest_for_url(&self, url: &str) -> Result<Option<StoredAnalysis>> {
        let rows = self.rows.read();
        Ok(rows.iter().find(|row| row.result.url == url).cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredAnalysis>> {
        Ok(self.rows.read().iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, result: AnalysisResult, created_at: DateTime<Utc>) -> Result<StoredAnalysis> {
        let row = StoredAnalysis {
            id: Uuid::new_v4(),
            created_at,
            result,
        };

        let mut rows = self.rows.write();
        rows.retain(|old| old.result.url != row.result.url);
        // kept oldest first by created_at
        let at = rows.partition_point(|old| old.created_at <= created_at);
        rows.insert(at, row.clone());
        while rows.len() > self.max_rows {
            if let Some(evicted) = rows.pop_front() {
                debug!(url = %evicted.result.url, id = %evicted.id, "evicted stored analysis");
            }
        }
        Ok(row)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        Ok(self.rows.read().iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::analyzer::evaluate;
    use crate::types::MetaTags;

    fn result(url: &str) -> AnalysisResult {
        evaluate(url, &MetaTags::default())
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = MemStore::new();
        let t0 = Utc::now();
        store.insert(result("https://a.test/"), t0).await.unwrap();
        store.insert(result("https://c.test/"), t0 + Duration::minutes(2)).await.unwrap();
        store.insert(result("https://b.test/"), t0 + Duration::minutes(1)).await.unwrap();

        let urls: Vec<String> = store
            .recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.result.url)
            .collect();
        assert_eq!(urls, ["https://c.test/", "https://b.test/", "https://a.test/"]);

        assert_eq!(store.recent(2).await.unwrap().len(), 2);
        assert!(store.recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reinsert_replaces_row_for_same_url() {
        let store = MemStore::new();
        let t0 = Utc::now();
        let older = store.insert(result("https://a.test/"), t0).await.unwrap();
        let newer = store
            .insert(result("https://a.test/"), t0 + Duration::seconds(5))
            .await
            .unwrap();
        store.insert(result("https://a.test/other"), t0 + Duration::seconds(9)).await.unwrap();

        let found = store.latest_for_url("https://a.test/").await.unwrap().unwrap();
        assert_eq!(found.id, newer.id);
        assert!(store.get(older.id).await.unwrap().is_none());
        assert!(store.latest_for_url("https://a.test").await.unwrap().is_none());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn oldest_rows_are_evicted_past_the_cap() {
        let store = MemStore::with_max_rows(3);
        let t0 = Utc::now();
        for i in 0..5 {
            let url = format!("https://site{i}.test/");
            store.insert(result(&url), t0 + Duration::minutes(i)).await.unwrap();
        }

        assert_eq!(store.len(), 3);
        let urls: Vec<String> = store
            .recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.result.url)
            .collect();
        assert_eq!(urls, ["https://site4.test/", "https://site3.test/", "https://site2.test/"]);
        assert!(store.latest_for_url("https://site0.test/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_by_id() {
        let store = MemStore::new();
        let row = store.insert(result("https://a.test/"), Utc::now()).await.unwrap();
        assert_eq!(store.get(row.id).await.unwrap(), Some(row));
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn stored_analysis_flattens_result() {
        let row = StoredAnalysis {
            id: Uuid::nil(),
            created_at: Utc::now(),
            result: result("https://a.test/"),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["url"], "https://a.test/");
        assert_eq!(value["score"], 45);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("result").is_none());
    }
}
