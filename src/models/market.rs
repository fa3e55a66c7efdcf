//! 市场、周期与复权类型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// 市场标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// 沪深 A 股
    CN,
    /// 港股
    HK,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::CN, Market::HK];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::CN => "CN",
            Market::HK => "HK",
        }
    }

    /// 根据代码后缀推断市场（000001.SZ -> CN, 00700.HK -> HK）
    pub fn from_symbol(symbol: &str) -> Result<Self, DataError> {
        match symbol.rsplit_once('.').map(|(_, suffix)| suffix) {
            Some("SH") | Some("SZ") => Ok(Market::CN),
            Some("HK") => Ok(Market::HK),
            _ => Err(DataError::UnknownSuffix(symbol.to_string())),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CN" => Ok(Market::CN),
            "HK" => Ok(Market::HK),
            _ => Err(DataError::InvalidMarket(s.to_string())),
        }
    }
}

/// K线周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// 东方财富 klt 参数
    pub fn eastmoney_klt(&self) -> &'static str {
        match self {
            Period::Daily => "101",
            Period::Weekly => "102",
            Period::Monthly => "103",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(DataError::Parse(format!("unknown period: {}", s))),
        }
    }
}

/// 复权类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustType {
    /// 不复权
    None,
    /// 前复权
    #[default]
    Qfq,
    /// 后复权
    Hfq,
}

impl AdjustType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustType::None => "",
            AdjustType::Qfq => "qfq",
            AdjustType::Hfq => "hfq",
        }
    }

    /// 东方财富 fqt 参数
    pub fn eastmoney_fqt(&self) -> &'static str {
        match self {
            AdjustType::None => "0",
            AdjustType::Qfq => "1",
            AdjustType::Hfq => "2",
        }
    }
}

impl FromStr for AdjustType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(AdjustType::None),
            "qfq" => Ok(AdjustType::Qfq),
            "hfq" => Ok(AdjustType::Hfq),
            _ => Err(DataError::Parse(format!("unknown adjust type: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_parsing() {
        assert_eq!("cn".parse::<Market>().unwrap(), Market::CN);
        assert_eq!(" HK ".parse::<Market>().unwrap(), Market::HK);
        assert!(matches!(
            "US".parse::<Market>(),
            Err(DataError::InvalidMarket(_))
        ));
    }

    #[test]
    fn market_from_symbol_suffix() {
        assert_eq!(Market::from_symbol("600519.SH").unwrap(), Market::CN);
        assert_eq!(Market::from_symbol("000001.SZ").unwrap(), Market::CN);
        assert_eq!(Market::from_symbol("00700.HK").unwrap(), Market::HK);
        assert!(Market::from_symbol("AAPL").is_err());
        let err = Market::from_symbol("00700.XX").unwrap_err();
        assert!(matches!(err, DataError::UnknownSuffix(_)));
        assert!(!err.to_string().contains("CN"));
    }

    #[test]
    fn period_codes() {
        assert_eq!("weekly".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!(Period::Daily.eastmoney_klt(), "101");
        assert_eq!(Period::Monthly.eastmoney_klt(), "103");
        assert!("hourly".parse::<Period>().is_err());
    }

    #[test]
    fn adjust_type_defaults_to_forward() {
        assert_eq!(AdjustType::default(), AdjustType::Qfq);
        assert_eq!("".parse::<AdjustType>().unwrap(), AdjustType::None);
        assert_eq!(AdjustType::Hfq.eastmoney_fqt(), "2");
    }
}
