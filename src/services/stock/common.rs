//! 公共常量、代码转换与 HTTP 请求

use backon::{ConstantBuilder, Retryable};
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::DataSourceConfig;
use crate::error::{DataError, Result};
use crate::models::Market;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const SINA_REFERER: &str = "https://finance.sina.com.cn/";
pub const EASTMONEY_REFERER: &str = "https://quote.eastmoney.com/";

static CN_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}\.(SH|SZ)$").unwrap());
static HK_SYMBOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}\.HK$").unwrap());

/// 严格校验代码格式：A 股 6 位数字，港股 5 位数字
pub fn validate_symbol_format(market: Market, symbol: &str) -> Result<()> {
    let re = match market {
        Market::CN => &CN_SYMBOL,
        Market::HK => &HK_SYMBOL,
    };
    if re.is_match(symbol) {
        Ok(())
    } else {
        Err(DataError::InvalidSymbol {
            market,
            symbol: symbol.to_string(),
        })
    }
}

/// 根据 A 股代码前缀判断交易所后缀
pub fn exchange_suffix(code: &str) -> Result<&'static str> {
    const SH: [&str; 5] = ["600", "601", "603", "605", "688"];
    const SZ: [&str; 6] = ["000", "001", "002", "003", "300", "301"];

    if SH.iter().any(|p| code.starts_with(p)) {
        Ok("SH")
    } else if SZ.iter().any(|p| code.starts_with(p)) {
        Ok("SZ")
    } else {
        Err(DataError::UnknownExchange(code.to_string()))
    }
}

/// 移除市场后缀（000001.SZ -> 000001）
pub fn format_symbol(symbol: &str) -> &str {
    symbol.split('.').next().unwrap_or(symbol)
}

/// 东方财富 secid：沪市 1，深市 0，港股 116
pub fn eastmoney_secid(symbol: &str) -> Result<String> {
    let code = format_symbol(symbol);
    let prefix = match symbol.rsplit_once('.').map(|(_, s)| s) {
        Some("SH") => "1",
        Some("SZ") => "0",
        Some("HK") => "116",
        _ => return Err(DataError::UnknownSuffix(symbol.to_string())),
    };
    Ok(format!("{}.{}", prefix, code))
}

/// 新浪行情代码：sh600000 / sz000001 / rt_hk00700
pub fn sina_code(symbol: &str) -> Result<String> {
    let code = format_symbol(symbol);
    match symbol.rsplit_once('.').map(|(_, s)| s) {
        Some("SH") => Ok(format!("sh{}", code)),
        Some("SZ") => Ok(format!("sz{}", code)),
        Some("HK") => Ok(format!("rt_hk{}", code)),
        _ => Err(DataError::UnknownSuffix(symbol.to_string())),
    }
}

/// 成交量取整，负数与非有限值视为解析错误
pub fn to_volume(value: f64) -> Result<u64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value as u64)
    } else {
        Err(DataError::Parse(format!("无效成交量: {}", value)))
    }
}

/// 带超时与重试的 HTTP 客户端
pub struct Fetcher {
    client: Client,
    retry_count: usize,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &DataSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            retry_count: config.retry_count,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    /// GET 请求，网络错误与 5xx 按配置重试
    pub async fn get_bytes(
        &self,
        source: &str,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<Vec<u8>> {
        let attempt = || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .header("Referer", referer)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(DataError::Upstream {
                    source_name: source.to_string(),
                    status: response.status().as_u16(),
                });
            }

            Ok(response.bytes().await?.to_vec())
        };

        attempt
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.retry_delay)
                    .with_max_times(self.retry_count),
            )
            .when(DataError::is_transient)
            .notify(|err: &DataError, dur: Duration| {
                log::warn!("请求 {} 失败，{:?} 后重试: {}", source, dur, err);
            })
            .await
    }

    /// GET 请求并解析 JSON
    pub async fn get_json(
        &self,
        source: &str,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<serde_json::Value> {
        let bytes = self.get_bytes(source, url, query, referer).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_symbol_format() {
        assert!(validate_symbol_format(Market::CN, "000001.SZ").is_ok());
        assert!(validate_symbol_format(Market::CN, "600519.SH").is_ok());
        assert!(validate_symbol_format(Market::CN, "00001.SZ").is_err());
        assert!(validate_symbol_format(Market::CN, "000001.sz").is_err());
        assert!(validate_symbol_format(Market::HK, "00700.HK").is_ok());
        assert!(validate_symbol_format(Market::HK, "700.HK").is_err());
    }

    #[test]
    fn exchange_by_prefix() {
        assert_eq!(exchange_suffix("600000").unwrap(), "SH");
        assert_eq!(exchange_suffix("688981").unwrap(), "SH");
        assert_eq!(exchange_suffix("000001").unwrap(), "SZ");
        assert_eq!(exchange_suffix("300750").unwrap(), "SZ");
        assert!(matches!(
            exchange_suffix("830799"),
            Err(DataError::UnknownExchange(_))
        ));
    }

    #[test]
    fn volume_must_be_non_negative() {
        assert_eq!(to_volume(1_000_000.0).unwrap(), 1_000_000);
        assert!(matches!(to_volume(-1.0), Err(DataError::Parse(_))));
        assert!(matches!(to_volume(f64::NAN), Err(DataError::Parse(_))));
    }

    #[test]
    fn code_conversions() {
        assert_eq!(format_symbol("000001.SZ"), "000001");
        assert_eq!(eastmoney_secid("600519.SH").unwrap(), "1.600519");
        assert_eq!(eastmoney_secid("000001.SZ").unwrap(), "0.000001");
        assert_eq!(eastmoney_secid("00700.HK").unwrap(), "116.00700");
        assert_eq!(sina_code("600000.SH").unwrap(), "sh600000");
        assert_eq!(sina_code("00700.HK").unwrap(), "rt_hk00700");
        assert!(matches!(sina_code("AAPL"), Err(DataError::UnknownSuffix(_))));
        assert!(matches!(eastmoney_secid("00700.XX"), Err(DataError::UnknownSuffix(_))));
    }
}
