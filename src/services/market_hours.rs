//! 交易时段
//!
//! A 股与港股均以 UTC+8 计时，周一至周五交易，不含节假日

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Asia::{Hong_Kong, Shanghai};
use chrono_tz::Tz;
use serde::Serialize;

use crate::models::Market;

/// 获取北京时间
pub fn beijing_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 北京时间的当日日期
pub fn beijing_today() -> NaiveDate {
    beijing_now().date_naive()
}

/// 单个市场的交易时段
#[derive(Debug, Clone, Copy)]
pub struct TradingHours {
    pub timezone: Tz,
    pub morning: (NaiveTime, NaiveTime),
    pub afternoon: (NaiveTime, NaiveTime),
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl TradingHours {
    pub fn for_market(market: Market) -> Self {
        match market {
            Market::CN => Self {
                timezone: Shanghai,
                morning: (hm(9, 30), hm(11, 30)),
                afternoon: (hm(13, 0), hm(15, 0)),
            },
            Market::HK => Self {
                timezone: Hong_Kong,
                morning: (hm(9, 30), hm(12, 0)),
                afternoon: (hm(13, 0), hm(16, 0)),
            },
        }
    }
}

/// 交易时段状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 非交易日
    Closed,
    /// 开盘前
    PreOpen,
    /// 上午连续交易
    Morning,
    /// 午间休市
    Break,
    /// 下午连续交易
    Afternoon,
    /// 收盘后
    AfterClose,
}

/// 市场状态
#[derive(Debug, Clone, Serialize)]
pub struct MarketStatus {
    pub market: Market,
    pub status: SessionStatus,
    pub is_trading_day: bool,
    pub is_trading_time: bool,
    pub local_time: String,
}

/// 是否交易日（周一至周五）
pub fn is_trading_day(_market: Market, date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 计算给定时刻的交易时段状态，开盘时刻含、收盘时刻不含
pub fn session_status<T: TimeZone>(market: Market, at: &DateTime<T>) -> SessionStatus {
    let hours = TradingHours::for_market(market);
    let local = at.with_timezone(&hours.timezone);

    if !is_trading_day(market, local.date_naive()) {
        return SessionStatus::Closed;
    }

    let t = local.time();
    if t < hours.morning.0 {
        SessionStatus::PreOpen
    } else if t < hours.morning.1 {
        SessionStatus::Morning
    } else if t < hours.afternoon.0 {
        SessionStatus::Break
    } else if t < hours.afternoon.1 {
        SessionStatus::Afternoon
    } else {
        SessionStatus::AfterClose
    }
}

/// 是否处于连续交易时段
pub fn is_trading_time<T: TimeZone>(market: Market, at: &DateTime<T>) -> bool {
    matches!(
        session_status(market, at),
        SessionStatus::Morning | SessionStatus::Afternoon
    )
}

/// 当前市场状态
pub fn market_status(market: Market) -> MarketStatus {
    let hours = TradingHours::for_market(market);
    let now = Utc::now().with_timezone(&hours.timezone);
    let status = session_status(market, &now);

    MarketStatus {
        market,
        status,
        is_trading_day: is_trading_day(market, now.date_naive()),
        is_trading_time: matches!(status, SessionStatus::Morning | SessionStatus::Afternoon),
        local_time: now.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Tz> {
        Shanghai.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
    }

    #[test]
    fn weekends_are_closed() {
        // 2024-03-02 是周六
        assert_eq!(session_status(Market::CN, &sh(2024, 3, 2, 10, 0)), SessionStatus::Closed);
        assert!(!is_trading_day(Market::HK, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));
        assert!(is_trading_day(Market::HK, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
    }

    #[test]
    fn cn_sessions() {
        let day = |hh, mm| session_status(Market::CN, &sh(2024, 2, 29, hh, mm));
        assert_eq!(day(9, 0), SessionStatus::PreOpen);
        assert_eq!(day(9, 30), SessionStatus::Morning);
        assert_eq!(day(11, 30), SessionStatus::Break);
        assert_eq!(day(13, 0), SessionStatus::Afternoon);
        assert_eq!(day(14, 59), SessionStatus::Afternoon);
        assert_eq!(day(15, 0), SessionStatus::AfterClose);
    }

    #[test]
    fn hk_trades_longer_than_cn() {
        let noon_ish = sh(2024, 2, 29, 11, 45);
        assert!(is_trading_time(Market::HK, &noon_ish));
        assert!(!is_trading_time(Market::CN, &noon_ish));

        let late = sh(2024, 2, 29, 15, 30);
        assert!(is_trading_time(Market::HK, &late));
        assert!(!is_trading_time(Market::CN, &late));
    }

    #[test]
    fn utc_input_is_converted() {
        // 02:00 UTC = 10:00 北京时间
        let utc = Utc.with_ymd_and_hms(2024, 2, 29, 2, 0, 0).unwrap();
        assert_eq!(session_status(Market::CN, &utc), SessionStatus::Morning);
    }
}
