use crate::error::AppError;
use crate::services::leaderboard as service;
use crate::store::Store;
use crate::validation;
use ntex::web::{self, HttpResponse};
use serde_json::Value;
use std::sync::Arc;

pub async fn get_leaderboard(
    store: web::types::State<Arc<Store>>,
) -> Result<HttpResponse, AppError> {
    let board = service::get_leaderboard(&store)?;
    Ok(HttpResponse::Ok().json(&board))
}

pub async fn submit_score(
    store: web::types::State<Arc<Store>>,
    body: web::types::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let req = validation::decode(body.into_inner())?;
    let result = service::submit_score(&store, req)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn save_game_state(
    store: web::types::State<Arc<Store>>,
    body: web::types::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let req = validation::decode(body.into_inner())?;
    let result = service::save_game_state(&store, req)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn get_stats(store: web::types::State<Arc<Store>>) -> Result<HttpResponse, AppError> {
    let stats = service::get_stats(&store)?;
    Ok(HttpResponse::Ok().json(&stats))
}

pub async fn delete_player(
    store: web::types::State<Arc<Store>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let result = service::delete_player(&store, &username)?;
    Ok(HttpResponse::Ok().json(&result))
}
