use actix_web::{HttpResponse, Responder, get, post, web};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::emojiutf8::EmojiEngine;
use crate::emojiutf8::autocomplete::{Adapter, Strategy, Textarea};
use crate::emojiutf8::autoreplace::Delimiter;
use crate::emojiutf8::types::RenderMode;

pub fn config(conf: &mut web::ServiceConfig) {
    let emoji_scope = web::scope("/emoji")
        .service(search_handler)
        .service(render_handler)
        .service(replace_handler)
        .service(assets_handler)
        .service(strategy_handler);

    let api_scope = web::scope("/api")
        .service(healthcheck_handler)
        .service(emoji_scope);

    conf.service(api_scope);
}

#[get("/health")]
pub async fn healthcheck_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "pong" }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[get("/search")]
pub async fn search_handler(
    engine: web::Data<EmojiEngine>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let strategy = engine.strategy();
    let results: Vec<_> = engine
        .search(&query.q)
        .into_iter()
        .map(|candidate| {
            json!({
                "html": strategy.template(&candidate),
                "shortname": candidate.shortname,
                "glyph": candidate.glyph,
                "bucket": candidate.bucket,
            })
        })
        .collect();

    HttpResponse::Ok().json(json!({ "query": query.q, "results": results }))
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    #[serde(default)]
    pub mode: Option<String>,
}

#[post("/render")]
pub async fn render_handler(
    engine: web::Data<EmojiEngine>,
    body: web::Json<RenderRequest>,
) -> impl Responder {
    let mode = body
        .mode
        .as_deref()
        .map(RenderMode::from_id)
        .unwrap_or_default();

    match engine.render(&body.text, mode) {
        Ok(rendered) => HttpResponse::Ok().json(rendered),
        Err(err) => {
            error!("failed to render text: {err:#}");
            HttpResponse::InternalServerError().json(json!({ "error": "render failed" }))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRequest {
    pub text: String,
    pub cursor: usize,
    pub key: String,
}

#[post("/replace")]
pub async fn replace_handler(
    engine: web::Data<EmojiEngine>,
    body: web::Json<ReplaceRequest>,
) -> impl Responder {
    let Some(delimiter) = Delimiter::from_key(&body.key) else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": format!("{:?} does not trigger a replacement", body.key) }));
    };

    let body = body.into_inner();
    let mut surface = Textarea::with_cursor(body.text, body.cursor);
    let replaced = engine.auto_replace(&mut surface, delimiter);

    HttpResponse::Ok().json(json!({
        "replaced": replaced,
        "text": surface.value(),
        "cursor": surface.cursor(),
    }))
}

#[get("/assets")]
pub async fn assets_handler(engine: web::Data<EmojiEngine>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "assetsrc": engine.settings.assetsrc,
        "base": engine.asset_base(),
    }))
}

/// The lexicon in strategy-file form, for editor pages that complete client side.
#[get("/strategy")]
pub async fn strategy_handler(engine: web::Data<EmojiEngine>) -> impl Responder {
    HttpResponse::Ok().json(engine.lexicon().to_records())
}
