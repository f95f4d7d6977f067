use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use seo_worker::config::Config;
use seo_worker::routes;
use seo_worker::scrape::ScrapeClient;
use seo_worker::service::AnalysisService;
use seo_worker::store::MemStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .finish()
        .try_init();

    // Config
    let cfg = Config::from_env()?;

    // Init subsystems
    let sc = Arc::new(ScrapeClient::new(
        &cfg.user_agent,
        cfg.fetch_timeout,
        cfg.max_concurrent_fetches,
    )?);
    let store = Arc::new(MemStore::with_max_rows(cfg.store_max_rows));
    let svc = AnalysisService::new(sc.clone(), store, cfg.cache_ttl);

    info!(bind = %cfg.bind, workers = cfg.workers, "seo worker listening");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(svc.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(&cfg.bind)
    .with_context(|| format!("binding {}", cfg.bind))?
    .workers(cfg.workers.max(1))
    .run()
    .await
    .context("server exited")?;

    sc.close();
    info!("seo worker stopped");
    Ok(())
}
