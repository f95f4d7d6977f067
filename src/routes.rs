use actix_web::{error::JsonPayloadError, get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::service::AnalysisService;
use crate::types::{AnalyzeRequest, Health};

pub const DEFAULT_RECENT: usize = 10;
const MAX_RECENT: usize = 100;

#[get("/health")]
async fn health() -> impl Responder {
    web::Json(Health { status: "ok".into() })
}

/* ------------------------ /api/seo/analyze ------------------------ */

#[post("/api/seo/analyze")]
async fn analyze(
    payload: web::Json<AnalyzeRequest>,
    svc: web::Data<AnalysisService>,
) -> Result<HttpResponse, AppError> {
    let req = payload.into_inner();
    match svc.analyze(&req.url).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            match &e {
                AppError::Internal(inner) => error!(error = ?inner, url = %req.url, "analysis failed"),
                other => warn!(error = %other, url = %req.url, "analysis rejected"),
            }
            Err(e)
        }
    }
}

/* ------------------------ /api/seo/recent ------------------------ */

#[derive(Debug, Deserialize)]
struct RecentQ {
    limit: Option<usize>,
}

#[get("/api/seo/recent")]
async fn recent(
    q: web::Query<RecentQ>,
    svc: web::Data<AnalysisService>,
) -> Result<HttpResponse, AppError> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT).clamp(1, MAX_RECENT);
    let rows = svc.recent(limit).await.map_err(|e| {
        error!(error = ?e, "listing recent analyses failed");
        e
    })?;
    Ok(HttpResponse::Ok().json(rows))
}

/* ------------------------ /api/seo/analyses/{id} ------------------------ */

#[get("/api/seo/analyses/{id}")]
async fn analysis_by_id(
    id: web::Path<Uuid>,
    svc: web::Data<AnalysisService>,
) -> Result<HttpResponse, AppError> {
    let row = svc.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// Malformed bodies get the same 400 as a bad URL.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected request body");
    AppError::InvalidUrl(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(health)
        .service(analyze)
        .service(recent)
        .service(analysis_by_id);
}
