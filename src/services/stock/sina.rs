//! 新浪财经实时行情
//!
//! 对接 https://hq.sinajs.cn ，一次请求可查询多只股票，A 股与港股返回格式不同

use chrono::Utc;
use std::collections::HashMap;

use super::common::{sina_code, to_volume, Fetcher, SINA_REFERER};
use crate::config::Endpoints;
use crate::error::{DataError, Result};
use crate::models::{Market, MarketData};

const SOURCE: &str = "sina";

/// 获取多只股票实时行情，key 为股票代码
pub async fn fetch_quotes(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    market: Market,
    symbols: &[String],
) -> Result<HashMap<String, MarketData>> {
    let codes = symbols
        .iter()
        .map(|s| sina_code(s))
        .collect::<Result<Vec<_>>>()?;
    let url = format!(
        "{}/list={}",
        endpoints.sina_quote.trim_end_matches('/'),
        codes.join(",")
    );

    let bytes = fetcher.get_bytes(SOURCE, &url, &[], SINA_REFERER).await?;
    let text = encoding_rs::GBK.decode(&bytes).0.to_string();

    let mut raw = parse_sina_lines(&text);
    let mut quotes = HashMap::with_capacity(symbols.len());
    for (symbol, code) in symbols.iter().zip(&codes) {
        let content = raw
            .remove(code.as_str())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DataError::SymbolNotFound(symbol.clone()))?;
        let quote = match market {
            Market::CN => parse_a_share_quote(&content, symbol)?,
            Market::HK => parse_hk_quote(&content, symbol)?,
        };
        quotes.insert(symbol.clone(), quote);
    }

    Ok(quotes)
}

/// 拆分响应为 行情代码 -> 引号内内容
///
/// 格式: var hq_str_sh600000="浦发银行,10.00,...";
pub fn parse_sina_lines(text: &str) -> HashMap<&str, String> {
    let mut result = HashMap::new();
    for line in text.lines() {
        let Some(rest) = line.trim().strip_prefix("var hq_str_") else {
            continue;
        };
        let Some((code, value)) = rest.split_once('=') else {
            continue;
        };
        let start = value.find('"');
        let end = value.rfind('"');
        if let (Some(start), Some(end)) = (start, end) {
            if end > start {
                result.insert(code, value[start + 1..end].to_string());
            } else {
                result.insert(code, String::new());
            }
        }
    }
    result
}

fn field(fields: &[&str], idx: usize, symbol: &str) -> Result<f64> {
    let raw = fields.get(idx).map(|v| v.trim()).unwrap_or_default();
    raw.parse::<f64>()
        .map_err(|_| DataError::Parse(format!("{} 第 {} 个字段不是数值: {:?}", symbol, idx, raw)))
}

/// A 股字段: 0 名称, 1 开盘, 2 昨收, 3 最新, 4 最高, 5 最低, 8 成交量, 9 成交额, 30 日期, 31 时间
pub fn parse_a_share_quote(content: &str, symbol: &str) -> Result<MarketData> {
    let fields: Vec<&str> = content.split(',').collect();
    if fields.len() < 32 {
        return Err(DataError::Parse(format!("{} 数据字段不足", symbol)));
    }

    Ok(MarketData {
        symbol: symbol.to_string(),
        market: Market::CN,
        timestamp: Utc::now(),
        open: field(&fields, 1, symbol)?,
        high: field(&fields, 4, symbol)?,
        low: field(&fields, 5, symbol)?,
        close: field(&fields, 3, symbol)?,
        volume: to_volume(field(&fields, 8, symbol)?)?,
        amount: field(&fields, 9, symbol)?,
    })
}

/// 港股字段: 0 英文名, 1 中文名, 2 开盘, 3 昨收, 4 最高, 5 最低, 6 最新, 11 成交额, 12 成交量
pub fn parse_hk_quote(content: &str, symbol: &str) -> Result<MarketData> {
    let fields: Vec<&str> = content.split(',').collect();
    if fields.len() < 13 {
        return Err(DataError::Parse(format!("{} 数据字段不足", symbol)));
    }

    Ok(MarketData {
        symbol: symbol.to_string(),
        market: Market::HK,
        timestamp: Utc::now(),
        open: field(&fields, 2, symbol)?,
        high: field(&fields, 4, symbol)?,
        low: field(&fields, 5, symbol)?,
        close: field(&fields, 6, symbol)?,
        volume: to_volume(field(&fields, 12, symbol)?)?,
        amount: field(&fields, 11, symbol)?,
    })
}
