use actix_web::middleware::NormalizePath;
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer, Responder, get};
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod document;
mod error;
mod model;
mod models;
mod payroll;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::document::PdfRenderer;
use crate::error::AppError;
use crate::routes::Limiters;
use crate::store::MySqlStore;
use crate::utils::{identity_cache, identity_filter};
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Payroll HRM API"
}

/// Extractor failures (bad JSON, bad query, bad path) use the same
/// `{"message"}` body as every other error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        AppError::validation(format!("Invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        AppError::validation(format!("Invalid query: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        AppError::validation(format!("Invalid path: {err}")).into()
    }));
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store = MySqlStore::new(pool.clone());

    auth::handlers::ensure_initial_admin(&store, &config).await?;

    document::assets::init_company_logo(config.company_logo_path.as_deref());
    let renderer = Data::new(PdfRenderer::new(
        config.pdf_max_concurrency,
        config.chrome_path.clone(),
        Duration::from_secs(config.pdf_render_timeout_secs),
    ));

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool;

    actix_web::rt::spawn(async move {
        if let Err(e) = identity_filter::warmup_identity_filter(&pool_for_filter_warmup, 100).await {
            error!(error = %e, "Failed to warm up identity filter");
        }
    });

    actix_web::rt::spawn(async move {
        // Users touched in the last 30 days, batches of 250
        if let Err(e) = identity_cache::warmup_identity_cache(&pool_for_cache_warmup, 30, 250).await {
            error!(error = %e, "Failed to warm up identity cache");
        }
    });

    let limiters = Limiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();
    let store = Data::new(store);
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(config.clone())
            .app_data(renderer.clone())
            .configure(extractor_configs)
            .service(index)
            // Auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
