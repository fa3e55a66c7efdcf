//! 股票接口处理器
//!
//! - GET /stocks?market=CN - 股票列表
//! - GET /stocks/{symbol} - 个股信息
//! - GET /stocks/{symbol}/history - 历史K线
//! - GET /stocks/batch/history?symbols=a,b - 批量历史K线

use actix_web::{web, HttpResponse, Result};
use chrono::{Duration, NaiveDate};

use super::{bad_request, error_response, split_symbols, AppState};
use crate::models::{
    AdjustType, ApiResponse, BatchHistoryQuery, HistoryBar, HistoryQuery, Market, Period,
    StockInfo, StockListQuery,
};
use crate::services::adapter::{parse_date, MarketDataAdapter};
use crate::services::market_hours::beijing_today;

/// 默认查询最近 30 天
const DEFAULT_RANGE_DAYS: i64 = 30;

/// 解析日期区间，缺省结束日期为今天
fn date_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate), String> {
    let end = match end {
        Some(s) => parse_date(s).map_err(|e| e.to_string())?,
        None => beijing_today(),
    };
    let start = match start {
        Some(s) => parse_date(s).map_err(|e| e.to_string())?,
        None => end - Duration::days(DEFAULT_RANGE_DAYS),
    };
    Ok((start, end))
}

fn parse_period(raw: Option<&str>) -> Result<Period, String> {
    raw.map_or(Ok(Period::Daily), |s| s.parse().map_err(|e: crate::error::DataError| e.to_string()))
}

pub async fn list_stocks(
    state: web::Data<AppState>,
    query: web::Query<StockListQuery>,
) -> Result<HttpResponse> {
    let market = match query.market.as_deref().map(str::parse::<Market>).transpose() {
        Ok(m) => m.unwrap_or(Market::CN),
        Err(e) => return Ok(error_response::<Vec<StockInfo>>(&e)),
    };

    let adapter = match state.adapter(market) {
        Ok(a) => a,
        Err(e) => return Ok(error_response::<Vec<StockInfo>>(&e)),
    };

    match adapter.get_stock_list().await {
        Ok(mut stocks) => {
            if let Some(limit) = query.limit {
                stocks.truncate(limit);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(stocks)))
        }
        Err(e) => Ok(error_response::<Vec<StockInfo>>(&e)),
    }
}

pub async fn get_stock_info(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();

    let result = match state.adapter_for(&symbol) {
        Ok(adapter) => adapter.get_stock_info(&symbol).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(error_response::<StockInfo>(&e)),
    }
}

pub async fn get_stock_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();

    let (start, end) = match date_range(query.start_date.as_deref(), query.end_date.as_deref()) {
        Ok(range) => range,
        Err(msg) => return Ok(bad_request::<Vec<HistoryBar>>(msg)),
    };
    let period = match parse_period(query.period.as_deref()) {
        Ok(p) => p,
        Err(msg) => return Ok(bad_request::<Vec<HistoryBar>>(msg)),
    };
    let adjust = match query.adjust.as_deref().map(str::parse::<AdjustType>).transpose() {
        Ok(a) => a.unwrap_or_default(),
        Err(e) => return Ok(bad_request::<Vec<HistoryBar>>(e.to_string())),
    };

    let result = match state.adapter_for(&symbol) {
        Ok(adapter) => {
            adapter
                .get_historical_data(&symbol, period, start, end, adjust)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(bars) => Ok(HttpResponse::Ok().json(ApiResponse::success(bars))),
        Err(e) => Ok(error_response::<Vec<HistoryBar>>(&e)),
    }
}

pub async fn get_batch_history(
    state: web::Data<AppState>,
    query: web::Query<BatchHistoryQuery>,
) -> Result<HttpResponse> {
    let symbols = split_symbols(&query.symbols);
    if symbols.is_empty() {
        return Ok(bad_request::<Vec<HistoryBar>>("symbols 不能为空"));
    }

    let (start, end) = match date_range(query.start_date.as_deref(), query.end_date.as_deref()) {
        Ok(range) => range,
        Err(msg) => return Ok(bad_request::<Vec<HistoryBar>>(msg)),
    };
    let period = match parse_period(query.period.as_deref()) {
        Ok(p) => p,
        Err(msg) => return Ok(bad_request::<Vec<HistoryBar>>(msg)),
    };

    // 批量接口要求所有代码属于同一市场
    let market = match Market::from_symbol(&symbols[0]) {
        Ok(m) => m,
        Err(e) => return Ok(error_response::<Vec<HistoryBar>>(&e)),
    };
    let adapter = match state.adapter(market) {
        Ok(a) => a,
        Err(e) => return Ok(error_response::<Vec<HistoryBar>>(&e)),
    };
    if let Some(e) = symbols.iter().find_map(|s| adapter.check_symbol(s).err()) {
        return Ok(error_response::<Vec<HistoryBar>>(&e));
    }

    let max_workers = query.max_workers.unwrap_or_else(|| adapter.max_workers());
    match adapter
        .get_batch_historical_data(&symbols, period, start, end, max_workers)
        .await
    {
        Ok(bars) => Ok(HttpResponse::Ok().json(ApiResponse::success(bars))),
        Err(e) => Ok(error_response::<Vec<HistoryBar>>(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("", web::get().to(list_stocks))
            .route("/batch/history", web::get().to(get_batch_history))
            .route("/{symbol}", web::get().to(get_stock_info))
            .route("/{symbol}/history", web::get().to(get_stock_history)),
    );
}
