use std::io;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::Logger, web};
use log::info;

use crate::emojiutf8::{EmojiEngine, SiteConfig};

pub mod emojiutf8;
pub mod handlers;

pub async fn run() -> io::Result<()> {
    let config = SiteConfig::load();
    let server_cfg = config.server.clone();

    // One engine for all workers; the lexicon and compiled patterns are read-only.
    let engine = web::Data::new(EmojiEngine::new(config.emoji));

    info!(
        "emojiutf8 is listening on: http://{}:{}",
        server_cfg.host, server_cfg.port
    );
    let cors_origins = server_cfg.cors_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(engine.clone())
            .wrap(build_cors(&cors_origins))
            .configure(handlers::config)
    })
    .bind((server_cfg.host.as_str(), server_cfg.port))?
    .run()
    .await
}

fn build_cors(origins: &[String]) -> Cors {
    let base = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_any_origin();
    }

    origins
        .iter()
        .fold(base, |c, origin| c.allowed_origin(origin))
        .supports_credentials()
}
