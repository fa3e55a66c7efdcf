//! 实时行情接口
//!
//! GET /quotes?symbols=000001.SZ,00700.HK

use actix_web::{web, HttpResponse, Result};
use std::collections::HashMap;

use super::{bad_request, error_response, split_symbols, AppState};
use crate::error::DataError;
use crate::models::{ApiResponse, Market, MarketData, QuoteQuery};
use crate::services::adapter::MarketDataAdapter;

type Quotes = HashMap<String, MarketData>;

/// 按市场分组后分别请求，结果合并
async fn fetch_quotes(state: &AppState, symbols: Vec<String>) -> Result<Quotes, DataError> {
    let mut by_market: HashMap<Market, Vec<String>> = HashMap::new();
    for symbol in symbols {
        by_market
            .entry(Market::from_symbol(&symbol)?)
            .or_default()
            .push(symbol);
    }

    let mut quotes = HashMap::new();
    for (market, symbols) in by_market {
        let adapter = state.adapter(market)?;
        quotes.extend(adapter.get_real_time_quotes(&symbols).await?);
    }
    Ok(quotes)
}

pub async fn get_quotes(
    state: web::Data<AppState>,
    query: web::Query<QuoteQuery>,
) -> Result<HttpResponse> {
    let symbols = split_symbols(&query.symbols);
    if symbols.is_empty() {
        return Ok(bad_request::<Quotes>("symbols 不能为空"));
    }

    match fetch_quotes(&state, symbols).await {
        Ok(quotes) => Ok(HttpResponse::Ok().json(ApiResponse::success(quotes))),
        Err(e) => Ok(error_response::<Quotes>(&e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quotes", web::get().to(get_quotes));
}
