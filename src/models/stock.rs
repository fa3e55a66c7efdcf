//! 股票数据模型
//!
//! 定义股票相关的数据结构

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::market::Market;
use crate::error::DataError;

/// 行情快照
///
/// 单只股票某一时刻的 OHLCV 数据
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketData {
    /// 股票代码（带市场后缀）
    pub symbol: String,
    /// 市场
    pub market: Market,
    /// 行情时间
    pub timestamp: DateTime<Utc>,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价/最新价
    pub close: f64,
    /// 成交量
    pub volume: u64,
    /// 成交额
    pub amount: f64,
}

impl MarketData {
    /// 从 JSON 对象构建
    pub fn from_map(map: Map<String, Value>) -> Result<Self, DataError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// 转为 JSON 对象
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// 股票基本信息
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StockInfo {
    /// 股票代码（带市场后缀）
    pub symbol: String,
    /// 股票名称
    pub name: String,
    /// 市场
    pub market: Market,
    /// 所属行业
    #[serde(default)]
    pub industry: Option<String>,
    /// 上市日期
    #[serde(default)]
    pub list_date: Option<NaiveDate>,
    /// 是否正常交易
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StockInfo {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, market: Market) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            market,
            industry: None,
            list_date: None,
            is_active: true,
        }
    }

    /// 从 JSON 对象构建，可选字段可缺省
    pub fn from_map(map: Map<String, Value>) -> Result<Self, DataError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

/// 历史K线数据
///
/// 单个周期的 OHLCV 数据
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryBar {
    /// 股票代码
    pub symbol: String,
    /// 日期（YYYYMMDD）
    pub date: String,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 成交量
    pub volume: u64,
    /// 成交额
    pub amount: f64,
}

/// 历史数据查询参数
#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    /// 周期: daily / weekly / monthly
    pub period: Option<String>,
    /// 开始日期（YYYYMMDD）
    pub start_date: Option<String>,
    /// 结束日期（YYYYMMDD）
    pub end_date: Option<String>,
    /// 复权类型: qfq / hfq / none
    pub adjust: Option<String>,
}

/// 批量历史数据查询参数
#[derive(Debug, Deserialize)]
pub struct BatchHistoryQuery {
    /// 逗号分隔的股票代码
    pub symbols: String,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// 最大并发数
    pub max_workers: Option<usize>,
}

/// 股票列表查询参数
#[derive(Debug, Deserialize)]
pub struct StockListQuery {
    /// 市场，默认 CN
    pub market: Option<String>,
    /// 返回数量限制
    pub limit: Option<usize>,
}

/// 实时行情查询参数
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// 逗号分隔的股票代码
    pub symbols: String,
}
