//! 东方财富接口实现
//!
//! 提供历史K线、个股信息、股票列表
//! 对应 akshare 的 stock_zh_a_hist / stock_individual_info_em / stock_info_a_code_name

use chrono::NaiveDate;
use serde_json::Value;

use super::common::{eastmoney_secid, exchange_suffix, to_volume, Fetcher, EASTMONEY_REFERER};
use crate::config::Endpoints;
use crate::error::{DataError, Result};
use crate::models::{AdjustType, HistoryBar, Market, Period, StockInfo};

const SOURCE: &str = "eastmoney";
const KLINE_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
const QUOTE_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";
const LIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";
const LIST_PAGE_SIZE: usize = 100;

/// 获取历史K线
pub async fn fetch_kline(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    symbol: &str,
    period: Period,
    start_date: &str,
    end_date: &str,
    adjust: AdjustType,
) -> Result<Vec<HistoryBar>> {
    let query = [
        ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
        ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string()),
        ("ut", KLINE_UT.to_string()),
        ("klt", period.eastmoney_klt().to_string()),
        ("fqt", adjust.eastmoney_fqt().to_string()),
        ("secid", eastmoney_secid(symbol)?),
        ("beg", start_date.to_string()),
        ("end", end_date.to_string()),
    ];

    log::debug!(
        "请求K线: symbol={}, period={}, start_date={}, end_date={}, adjust={}",
        symbol,
        period,
        start_date,
        end_date,
        adjust.as_str()
    );

    let json = fetcher
        .get_json(SOURCE, &endpoints.eastmoney_kline, &query, EASTMONEY_REFERER)
        .await?;
    parse_kline(&json, symbol)
}

/// 解析K线响应
///
/// 每行格式: 日期,开盘,收盘,最高,最低,成交量,成交额,振幅,涨跌幅,涨跌额,换手率
pub fn parse_kline(json: &Value, symbol: &str) -> Result<Vec<HistoryBar>> {
    let klines = match json["data"]["klines"].as_array() {
        Some(arr) => arr,
        None if json["data"].is_null() => return Ok(Vec::new()),
        None => return Err(DataError::Parse("K线数据缺少 klines 字段".to_string())),
    };

    let mut bars = Vec::with_capacity(klines.len());
    for line in klines {
        let line = line
            .as_str()
            .ok_or_else(|| DataError::Parse("K线行不是字符串".to_string()))?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 7 {
            return Err(DataError::Parse(format!("K线字段不足: {}", line)));
        }

        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|_| DataError::Parse(format!("无效日期: {}", fields[0])))?;

        bars.push(HistoryBar {
            symbol: symbol.to_string(),
            date: date.format("%Y%m%d").to_string(),
            open: parse_num(fields[1])?,
            close: parse_num(fields[2])?,
            high: parse_num(fields[3])?,
            low: parse_num(fields[4])?,
            volume: to_volume(parse_num(fields[5])?)?,
            amount: parse_num(fields[6])?,
        });
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(bars)
}

fn parse_num(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| DataError::Parse(format!("无效数值: {}", s)))
}

/// 获取个股信息
pub async fn fetch_stock_info(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    market: Market,
    symbol: &str,
) -> Result<StockInfo> {
    let query = [
        ("ut", QUOTE_UT.to_string()),
        ("fltt", "2".to_string()),
        ("invt", "2".to_string()),
        ("fields", "f57,f58,f84,f85,f116,f117,f127,f189".to_string()),
        ("secid", eastmoney_secid(symbol)?),
    ];

    let json = fetcher
        .get_json(SOURCE, &endpoints.eastmoney_quote, &query, EASTMONEY_REFERER)
        .await?;
    parse_stock_info(&json, market, symbol)
}

/// 解析个股信息：f58 名称，f127 行业，f189 上市日期（YYYYMMDD 整数）
pub fn parse_stock_info(json: &Value, market: Market, symbol: &str) -> Result<StockInfo> {
    let data = &json["data"];
    if !data.is_object() {
        return Err(DataError::SymbolNotFound(symbol.to_string()));
    }

    let name = text_field(&data["f58"]).unwrap_or_default();
    let industry = text_field(&data["f127"]);
    let list_date = match &data["f189"] {
        Value::Number(n) => n.as_u64().filter(|v| *v > 0).map(|v| v.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
    .and_then(|s| NaiveDate::parse_from_str(&s, "%Y%m%d").ok());

    let mut info = StockInfo::new(symbol, name, market);
    info.industry = industry;
    info.list_date = list_date;
    Ok(info)
}

/// 东方财富以 "-" 表示缺失
fn text_field(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "-")
        .map(str::to_string)
}

fn list_filter(market: Market) -> &'static str {
    match market {
        // 深主板、创业板、沪主板、科创板
        Market::CN => "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23",
        Market::HK => "m:128 t:3,m:128 t:4,m:128 t:1,m:128 t:2",
    }
}

/// 分页获取股票列表
pub async fn fetch_stock_list(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    market: Market,
) -> Result<Vec<StockInfo>> {
    let mut stocks = Vec::new();
    let mut page = 1usize;

    loop {
        let query = [
            ("pn", page.to_string()),
            ("pz", LIST_PAGE_SIZE.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("ut", LIST_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f12".to_string()),
            ("fs", list_filter(market).to_string()),
            ("fields", "f12,f14".to_string()),
        ];

        let json = fetcher
            .get_json(SOURCE, &endpoints.eastmoney_list, &query, EASTMONEY_REFERER)
            .await?;
        let (rows, total) = parse_stock_list_page(&json, market);
        let fetched = rows.len();
        stocks.extend(rows);

        if fetched == 0 || page * LIST_PAGE_SIZE >= total {
            break;
        }
        page += 1;
    }

    log::debug!("股票列表获取成功，{} 共 {} 只股票", market, stocks.len());
    Ok(stocks)
}

/// 解析单页股票列表，返回 (股票, 总数)
///
/// A 股无法识别交易所的代码（如北交所）被跳过
pub fn parse_stock_list_page(json: &Value, market: Market) -> (Vec<StockInfo>, usize) {
    let data = &json["data"];
    let total = data["total"].as_u64().unwrap_or(0) as usize;

    // np=1 时 diff 为数组，否则为以序号为键的对象
    let rows: Vec<&Value> = match &data["diff"] {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };

    let mut stocks = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(code) = text_field(&row["f12"]) else {
            continue;
        };
        let name = text_field(&row["f14"]).unwrap_or_default();

        let symbol = match market {
            Market::CN => match exchange_suffix(&code) {
                Ok(suffix) => format!("{}.{}", code, suffix),
                Err(e) => {
                    log::debug!("跳过股票 {}: {}", code, e);
                    continue;
                }
            },
            Market::HK => format!("{}.HK", code),
        };
        stocks.push(StockInfo::new(symbol, name, market));
    }

    (stocks, total)
}
