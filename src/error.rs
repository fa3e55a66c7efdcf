//! 数据层错误类型

use crate::models::Market;

/// 行情数据相关错误
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("invalid market: {0}. Must be one of [CN, HK]")]
    InvalidMarket(String),

    #[error("invalid {market} symbol format: {symbol}")]
    InvalidSymbol { market: Market, symbol: String },

    #[error("invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error("unknown market suffix in symbol: {0}. Must end with .SH, .SZ or .HK")]
    UnknownSuffix(String),

    #[error("unknown exchange for stock code: {0}")]
    UnknownExchange(String),

    #[error("empty data returned for {0}")]
    EmptyData(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream {source_name} returned status {status}")]
    Upstream { source_name: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// 是否属于调用方输入错误
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DataError::InvalidMarket(_)
                | DataError::InvalidSymbol { .. }
                | DataError::InvalidDateRange { .. }
                | DataError::UnknownSuffix(_)
                | DataError::UnknownExchange(_)
        )
    }

    /// 是否值得重试：网络错误与上游 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            DataError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(e: rusqlite::Error) -> Self {
        DataError::Cache(e.to_string())
    }
}

impl From<r2d2::Error> for DataError {
    fn from(e: r2d2::Error) -> Self {
        DataError::Cache(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified() {
        assert!(DataError::InvalidMarket("US".into()).is_invalid_input());
        assert!(DataError::UnknownExchange("830799".into()).is_invalid_input());
        assert!(DataError::UnknownSuffix("00700.XX".into()).is_invalid_input());
        assert!(!DataError::EmptyData("000001.SZ".into()).is_invalid_input());
    }

    #[test]
    fn only_server_errors_are_transient() {
        let bad_gateway = DataError::Upstream {
            source_name: "eastmoney".into(),
            status: 502,
        };
        let not_found = DataError::Upstream {
            source_name: "eastmoney".into(),
            status: 404,
        };
        assert!(bad_gateway.is_transient());
        assert!(!not_found.is_transient());
        assert!(!DataError::Parse("x".into()).is_transient());
    }

    #[test]
    fn unknown_suffix_names_no_market() {
        let msg = DataError::UnknownSuffix("00700.XX".into()).to_string();
        assert!(msg.contains("00700.XX"));
        assert!(!msg.contains("CN symbol"));
    }

    #[test]
    fn invalid_market_message_lists_markets() {
        let msg = DataError::InvalidMarket("US".into()).to_string();
        assert!(msg.contains("US"));
        assert!(msg.contains("CN"));
        assert!(msg.contains("HK"));
    }
}
