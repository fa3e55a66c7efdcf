use actix_web::{web, HttpResponse, Result};

use super::error_response;
use crate::models::{ApiResponse, Market};
use crate::services::market_hours::{market_status, MarketStatus};

/// GET /markets/{market}/status
pub async fn get_market_status(path: web::Path<String>) -> Result<HttpResponse> {
    match path.into_inner().parse::<Market>() {
        Ok(market) => Ok(HttpResponse::Ok().json(ApiResponse::success(market_status(market)))),
        Err(e) => Ok(error_response::<MarketStatus>(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/markets/{market}/status", web::get().to(get_market_status));
}
