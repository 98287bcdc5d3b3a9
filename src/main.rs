use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trading_stats::{api, SeriesCatalog, ServiceConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let catalog = web::Data::new(SeriesCatalog::new(config.limits.clone()));
    let json_limit = config.server.max_payload_bytes;
    let bind = config.bind_address();
    info!(host = %bind.0, port = bind.1, "starting trading stats service");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(catalog.clone())
            .app_data(web::JsonConfig::default().limit(json_limit))
            .configure(api::configure)
    })
        .bind(bind)?
        .run()
        .await
}
