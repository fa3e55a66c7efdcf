//! 行情数据适配器接口
//!
//! 每个数据源按市场实现 [`MarketDataAdapter`]，公共的代码、日期校验放在这里

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::{DataError, Result};
use crate::models::{AdjustType, HistoryBar, Market, MarketData, StockInfo};

/// 行情数据适配器
#[async_trait]
pub trait MarketDataAdapter: Send + Sync {
    /// 适配器名称（用于日志）
    fn name(&self) -> &str;

    /// 适配器对应的市场
    fn market(&self) -> Market;

    /// 获取全部股票列表
    async fn get_stock_list(&self) -> Result<Vec<StockInfo>>;

    /// 获取单只股票的详细信息
    async fn get_stock_info(&self, symbol: &str) -> Result<StockInfo>;

    /// 获取日K线历史数据
    async fn get_daily_data(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        adjust: AdjustType,
    ) -> Result<Vec<HistoryBar>>;

    /// 获取多只股票的实时行情，key 为股票代码
    async fn get_real_time_quotes(&self, symbols: &[String]) -> Result<HashMap<String, MarketData>>;
}

/// 按市场校验代码后缀：A 股 .SH/.SZ，港股 .HK
pub fn validate_symbol(market: Market, symbol: &str) -> Result<()> {
    let valid = match market {
        Market::CN => symbol.ends_with(".SH") || symbol.ends_with(".SZ"),
        Market::HK => symbol.ends_with(".HK"),
    };
    if valid {
        Ok(())
    } else {
        Err(DataError::InvalidSymbol {
            market,
            symbol: symbol.to_string(),
        })
    }
}

/// 校验日期区间：开始不晚于结束，结束不晚于今天
pub fn validate_date_range(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<()> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            reason: "start date must be earlier than end date".to_string(),
        });
    }
    if end > today {
        return Err(DataError::InvalidDateRange {
            reason: "end date cannot be in the future".to_string(),
        });
    }
    Ok(())
}

/// YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// YYYYMMDD
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 解析 YYYYMMDD 或 YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| DataError::Parse(format!("invalid date: {}", s)))
}

/// 记录错误后原样返回，配合 `map_err` 使用
pub fn log_failure<'a>(adapter: &'a str, context: &'a str) -> impl FnOnce(DataError) -> DataError + 'a {
    move |err| {
        log::error!("Error in {} - {}: {}", adapter, context, err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn symbol_suffix_by_market() {
        assert!(validate_symbol(Market::CN, "000001.SZ").is_ok());
        assert!(validate_symbol(Market::CN, "600000.SH").is_ok());
        assert!(validate_symbol(Market::CN, "INVALID").is_err());
        assert!(validate_symbol(Market::CN, "000001.XX").is_err());
        assert!(validate_symbol(Market::CN, "00700.HK").is_err());
        assert!(validate_symbol(Market::HK, "00700.HK").is_ok());
        assert!(validate_symbol(Market::HK, "600000.SH").is_err());
    }

    #[test]
    fn date_range_rules() {
        let today = d(2024, 3, 1);
        assert!(validate_date_range(d(2024, 2, 1), d(2024, 2, 29), today).is_ok());
        assert!(validate_date_range(d(2024, 3, 1), d(2024, 3, 1), today).is_ok());

        let reversed = validate_date_range(d(2024, 2, 29), d(2024, 2, 28), today);
        assert!(matches!(reversed, Err(DataError::InvalidDateRange { .. })));

        let future = validate_date_range(d(2024, 3, 2), d(2024, 3, 2), today);
        assert!(matches!(future, Err(DataError::InvalidDateRange { .. })));
    }

    #[test]
    fn date_formats() {
        assert_eq!(format_date(d(2024, 2, 9)), "2024-02-09");
        assert_eq!(compact_date(d(2024, 2, 9)), "20240209");
        assert_eq!(parse_date("20240209").unwrap(), d(2024, 2, 9));
        assert_eq!(parse_date("2024-02-09").unwrap(), d(2024, 2, 9));
        assert!(parse_date("2024/02/09").is_err());
    }
}
