mod config;
mod error;
mod handlers;
mod models;
mod services;
mod store;
mod validation;

use config::Config;
use ntex::web;
use ntex_cors::Cors;
use std::sync::Arc;
use store::Store;
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    let store = Arc::new(Store::open(&config.data_file).map_err(|e| {
        tracing::error!("Failed to open data file {}: {}", config.data_file.display(), e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?);

    tracing::info!("River Raid leaderboard server starting on {}", config.bind_addr());
    tracing::info!("Data file: {}", config.data_file.display());
    tracing::info!("API info: http://localhost:{}/api", config.port);

    web::HttpServer::new(move || {
        web::App::new()
            .state(store.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .configure(routes)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}

/// Request bodies up to 100 KiB; checkpoints carry whole enemy lists.
const JSON_BODY_LIMIT: usize = 100 * 1024;

fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::leaderboard as lb;

    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/api").route(web::get().to(api_info)))
        .service(web::resource("/api/leaderboard").route(web::get().to(lb::get_leaderboard)))
        .service(
            web::resource("/api/score")
                .state(web::types::JsonConfig::default().limit(JSON_BODY_LIMIT))
                .route(web::post().to(lb::submit_score)),
        )
        .service(
            web::resource("/api/game-state")
                .state(web::types::JsonConfig::default().limit(JSON_BODY_LIMIT))
                .route(web::post().to(lb::save_game_state)),
        )
        .service(web::resource("/api/stats").route(web::get().to(lb::get_stats)))
        .service(
            web::resource("/api/player/{username}").route(web::delete().to(lb::delete_player)),
        );
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }))
}

async fn api_info() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "name": "River Raid Leaderboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /api/leaderboard": "Get all leaderboard data",
            "POST /api/score": "Submit a new score",
            "POST /api/game-state": "Save complete game state",
            "GET /api/stats": "Get leaderboard statistics",
            "DELETE /api/player/:username": "Delete a player",
            "GET /health": "Health check",
        },
    }))
}
