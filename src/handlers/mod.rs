pub mod cache;
pub mod health;
pub mod market;
pub mod quote;
pub mod stock;

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::DataSourceConfig;
use crate::error::DataError;
use crate::models::{ApiResponse, Market};
use crate::services::cache::CacheManager;
use crate::services::stock::AkshareAdapter;

/// 共享状态：每个市场一个适配器，共用一个缓存
pub struct AppState {
    pub adapters: HashMap<Market, Arc<AkshareAdapter>>,
    pub cache: Arc<CacheManager>,
}

impl AppState {
    pub fn new(config: &DataSourceConfig, cache: Arc<CacheManager>) -> Result<Self, DataError> {
        let mut adapters = HashMap::new();
        for market in Market::ALL {
            let adapter = AkshareAdapter::new(market, config, cache.clone())?;
            adapters.insert(market, Arc::new(adapter));
        }
        Ok(Self { adapters, cache })
    }

    pub fn adapter(&self, market: Market) -> Result<Arc<AkshareAdapter>, DataError> {
        self.adapters
            .get(&market)
            .cloned()
            .ok_or_else(|| DataError::InvalidMarket(market.to_string()))
    }

    /// 按代码后缀选择适配器
    pub fn adapter_for(&self, symbol: &str) -> Result<Arc<AkshareAdapter>, DataError> {
        self.adapter(Market::from_symbol(symbol)?)
    }
}

/// 错误到 HTTP 状态码的映射
pub fn error_response<T: Serialize>(err: &DataError) -> HttpResponse {
    let body = ApiResponse::<T>::error(err.to_string());
    match err {
        e if e.is_invalid_input() => HttpResponse::BadRequest().json(body),
        DataError::EmptyData(_) | DataError::SymbolNotFound(_) => HttpResponse::NotFound().json(body),
        DataError::Http(_) | DataError::Upstream { .. } | DataError::Parse(_) => {
            HttpResponse::BadGateway().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// 请求参数错误
pub fn bad_request<T: Serialize>(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<T>::error(message))
}

/// 逗号分隔的代码列表，去空白并转大写
pub fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 查询参数解析失败时同样返回统一响应结构
fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("查询参数无效 {}: {}", req.path(), err);
    let response = bad_request::<()>(format!("invalid query: {}", err));
    InternalError::from_response(err, response).into()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(health::config)
            .configure(stock::config)
            .configure(quote::config)
            .configure(market::config)
            .configure(cache::config),
    );
}
