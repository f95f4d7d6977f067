use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::analyzer::evaluate;
use crate::error::AppError;
use crate::scrape::PageSource;
use crate::store::AnalysisStore;
use crate::types::{AnalysisResult, StoredAnalysis};

/// Validate, serve from the store when fresh, otherwise fetch and score.
#[derive(Clone)]
pub struct AnalysisService {
    source: Arc<dyn PageSource>,
    store: Arc<dyn AnalysisStore>,
    cache_ttl: chrono::Duration,
}

impl AnalysisService {
    pub fn new(source: Arc<dyn PageSource>, store: Arc<dyn AnalysisStore>, cache_ttl: Duration) -> Self {
        Self {
            source,
            store,
            cache_ttl: chrono::Duration::from_std(cache_ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisResult, AppError> {
        self.analyze_at(raw_url, Utc::now()).await
    }

    pub(crate) async fn analyze_at(&self, raw_url: &str, now: DateTime<Utc>) -> Result<AnalysisResult, AppError> {
        let url = parse_target(raw_url)?;

        // Two requests racing on the same URL may both miss and both store; that is fine.
        if let Some(prev) = self.store.latest_for_url(raw_url).await? {
            if now - prev.created_at < self.cache_ttl {
                debug!(url = %raw_url, id = %prev.id, "serving cached analysis");
                return Ok(prev.result);
            }
        }

        let tags = self.source.fetch_meta(&url).await?;
        let result = evaluate(raw_url, &tags);
        info!(url = %raw_url, score = result.score, issues = result.issues.len(), "analyzed");

        let stored = self.store.insert(result, now).await?;
        Ok(stored.result)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>, AppError> {
        Ok(self.store.recent(limit).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<StoredAnalysis, AppError> {
        self.store.get(id).await?.ok_or(AppError::NotFound)
    }
}

/// Absolute http(s) URL with a host.
fn parse_target(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw).map_err(|e| AppError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::InvalidUrl("missing host".into()));
    }
    Ok(url)
}
