//! 行情数据校验

use serde_json::{Map, Value};

use super::stock::{HistoryBar, MarketData};

/// 行情记录必须包含的列
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "symbol", "market", "timestamp", "open", "high", "low", "close", "volume", "amount",
];

/// 必须为数值的列
pub const NUMERIC_COLUMNS: [&str; 6] = ["open", "high", "low", "close", "volume", "amount"];

/// 行情数据校验工具
pub struct DataValidator;

impl DataValidator {
    /// 校验原始行情记录
    ///
    /// 要求：列齐全、数值列为数字、无空值、价格与量额非负
    pub fn validate_records(records: &[Map<String, Value>]) -> bool {
        records.iter().all(|row| {
            let complete = REQUIRED_COLUMNS
                .iter()
                .all(|col| row.get(*col).is_some_and(|v| !v.is_null()));
            if !complete {
                return false;
            }

            NUMERIC_COLUMNS.iter().all(|col| {
                row.get(*col)
                    .and_then(Value::as_f64)
                    .is_some_and(|v| v.is_finite() && v >= 0.0)
            })
        })
    }

    /// 校验行情快照，NaN 视为缺失值
    pub fn validate_market_data(data: &[MarketData]) -> bool {
        data.iter()
            .all(|d| valid_prices(&[d.open, d.high, d.low, d.close]) && valid_amount(d.amount))
    }

    /// 校验K线数据
    pub fn validate_bars(bars: &[HistoryBar]) -> bool {
        bars.iter()
            .all(|b| valid_prices(&[b.open, b.high, b.low, b.close]) && valid_amount(b.amount))
    }
}

fn valid_prices(prices: &[f64]) -> bool {
    prices.iter().all(|p| p.is_finite() && *p >= 0.0)
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
