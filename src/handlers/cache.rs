use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use super::AppState;
use crate::models::ApiResponse;

#[derive(Debug, Serialize)]
pub struct ClearedCache {
    pub removed: usize,
}

/// DELETE /cache/expired - 清理过期缓存
pub async fn clear_expired(state: web::Data<AppState>) -> Result<HttpResponse> {
    let removed = state.cache.clear_expired();
    log::info!("清理过期缓存 {} 条", removed);
    Ok(HttpResponse::Ok().json(ApiResponse::success(ClearedCache { removed })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/cache/expired", web::delete().to(clear_expired));
}
