use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
#[cfg(test)]
mod test_support;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::store::{InMemoryStore, MySqlStore, RecordStore};
use crate::utils::worker_cache::WorkerCache;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Worker Attendance & Salary API"
}

async fn serve<S: RecordStore>(store: S, config: Config) -> anyhow::Result<()> {
    let store = Data::new(store);
    let cache = Data::new(WorkerCache::new(config.worker_cache_ttl()));
    let limiter = routes::build_limiter(config.rate_api_per_min)?;
    let api_prefix = config.api_prefix.clone();

    info!(addr = %config.server_addr, prefix = %api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(cache.clone())
            .service(index)
            .configure(|cfg| routes::configure::<S>(cfg, &api_prefix, limiter.clone()))
    })
    .bind(&config.server_addr)?
    .run()
    .await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    match config.database_url.clone() {
        Some(url) => {
            let pool = init_db(&url, config.run_migrations).await?;
            serve(MySqlStore::new(pool), config).await
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            serve(InMemoryStore::new(), config).await
        }
    }
}
