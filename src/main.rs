//! 行情数据服务入口
//!
//! 提供 A 股、港股数据的 RESTful API 服务
//! 数据来源：东方财富、新浪财经

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use windsurf_stock::config::AppConfig;
use windsurf_stock::handlers::{self, AppState};
use windsurf_stock::logger;
use windsurf_stock::middleware::ApiKeyMiddleware;
use windsurf_stock::services::cache::CacheManager;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    let (config, source) = AppConfig::load();
    logger::init(&config.log)?;
    log::info!("{}", source);

    config.ensure_dirs()?;
    let cache = Arc::new(CacheManager::new(&config.storage.cache_dir)?);
    let expired = cache.clear_expired();
    if expired > 0 {
        log::info!("启动时清理过期缓存 {} 条", expired);
    }

    let state = web::Data::new(AppState::new(&config.data_source, cache)?);

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API_KEY，接口认证已关闭");
    }

    let bind_addr = config.bind_addr();
    log::info!("启动行情数据服务，监听 {}", bind_addr);

    let api_key = config.api.api_key.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(ApiKeyMiddleware::new(api_key.clone()))
            .wrap(Logger::default())
            .configure(handlers::config)
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await?;
    Ok(())
}
