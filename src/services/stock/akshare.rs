//! AkShare 风格的行情适配器
//!
//! 历史K线、个股信息、股票列表来自东方财富，实时行情来自新浪；
//! 历史K线查询结果写入本地缓存

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};

use super::common::{validate_symbol_format, Fetcher};
use super::{eastmoney, sina};
use crate::config::{DataSourceConfig, Endpoints};
use crate::error::{DataError, Result};
use crate::models::{AdjustType, HistoryBar, Market, MarketData, Period, StockInfo};
use crate::services::adapter::{
    compact_date, log_failure, validate_date_range, validate_symbol, MarketDataAdapter,
};
use crate::services::cache::CacheManager;
use crate::services::market_hours::beijing_today;

/// 单个市场的行情适配器
pub struct AkshareAdapter {
    market: Market,
    fetcher: Fetcher,
    endpoints: Endpoints,
    cache: Arc<CacheManager>,
    max_workers: usize,
    stock_list: OnceCell<Vec<StockInfo>>,
}

/// 缓存键中的周期：前复权沿用周期名，其他复权方式附加后缀
fn cache_period(period: Period, adjust: AdjustType) -> String {
    match adjust {
        AdjustType::Qfq => period.as_str().to_string(),
        AdjustType::Hfq => format!("{}:hfq", period.as_str()),
        AdjustType::None => format!("{}:none", period.as_str()),
    }
}

impl AkshareAdapter {
    pub fn new(market: Market, config: &DataSourceConfig, cache: Arc<CacheManager>) -> Result<Self> {
        Ok(Self {
            market,
            fetcher: Fetcher::new(config)?,
            endpoints: config.endpoints.clone(),
            cache,
            max_workers: config.max_workers.max(1),
            stock_list: OnceCell::new(),
        })
    }

    /// 默认批量并发数
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 校验代码：后缀与格式都需符合本市场
    pub fn check_symbol(&self, symbol: &str) -> Result<()> {
        validate_symbol(self.market, symbol)?;
        validate_symbol_format(self.market, symbol)
    }

    /// 获取历史K线数据，先查缓存
    ///
    /// 返回按日期升序的K线，上游无数据时返回 `EmptyData`
    pub async fn get_historical_data(
        &self,
        symbol: &str,
        period: Period,
        start_date: NaiveDate,
        end_date: NaiveDate,
        adjust: AdjustType,
    ) -> Result<Vec<HistoryBar>> {
        let (start, end) = (compact_date(start_date), compact_date(end_date));
        let period_key = cache_period(period, adjust);

        if let Some(cached) = self.cache.get_data(symbol, &period_key, &start, &end) {
            return Ok(cached);
        }

        let bars = self
            .fetch_history(symbol, period, start_date, end_date, adjust)
            .await
            .map_err(log_failure(self.name(), "获取历史数据出错"))?;

        self.cache.save_data(symbol, &period_key, &start, &end, &bars);
        Ok(bars)
    }

    /// 直接从上游获取K线，不经过缓存
    async fn fetch_history(
        &self,
        symbol: &str,
        period: Period,
        start_date: NaiveDate,
        end_date: NaiveDate,
        adjust: AdjustType,
    ) -> Result<Vec<HistoryBar>> {
        self.check_symbol(symbol)?;
        validate_date_range(start_date, end_date, beijing_today())?;

        let bars = eastmoney::fetch_kline(
            &self.fetcher,
            &self.endpoints,
            symbol,
            period,
            &compact_date(start_date),
            &compact_date(end_date),
            adjust,
        )
        .await?;

        if bars.is_empty() {
            return Err(DataError::EmptyData(symbol.to_string()));
        }
        Ok(bars)
    }

    /// 批量获取多只股票的历史数据
    ///
    /// 缓存命中的数据在前，新获取的数据在后；任一股票失败则整体失败
    pub async fn get_batch_historical_data(
        &self,
        symbols: &[String],
        period: Period,
        start_date: NaiveDate,
        end_date: NaiveDate,
        max_workers: usize,
    ) -> Result<Vec<HistoryBar>> {
        let adjust = AdjustType::default();
        let (start, end) = (compact_date(start_date), compact_date(end_date));
        let period_key = cache_period(period, adjust);

        log::debug!("开始批量获取 {} 只股票的 {} 数据", symbols.len(), period);

        let (missed, cached) = self.cache.get_batch_data(symbols, &period_key, &start, &end);
        if missed.is_empty() {
            log::debug!("所有数据均命中缓存");
            return Ok(cached.concat());
        }

        log::debug!("从接口获取 {} 只股票的数据", missed.len());
        // 并发数不超过待获取数量
        let semaphore = Semaphore::new(max_workers.clamp(1, missed.len()));
        let tasks = missed.iter().map(|symbol| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| DataError::Internal(e.to_string()))?;
                self.fetch_history(symbol, period, start_date, end_date, adjust)
                    .await
            }
        });

        let fresh = futures::future::try_join_all(tasks)
            .await
            .map_err(log_failure(self.name(), "批量获取数据出错"))?;

        self.cache
            .save_batch_data(&missed, &period_key, &start, &end, &fresh);

        let result: Vec<HistoryBar> = cached.into_iter().chain(fresh).flatten().collect();
        log::debug!("成功获取 {} 只股票的数据，共 {} 行", symbols.len(), result.len());
        Ok(result)
    }
}

#[async_trait]
impl MarketDataAdapter for AkshareAdapter {
    fn name(&self) -> &str {
        "AkshareAdapter"
    }

    fn market(&self) -> Market {
        self.market
    }

    async fn get_stock_list(&self) -> Result<Vec<StockInfo>> {
        let list = self
            .stock_list
            .get_or_try_init(|| eastmoney::fetch_stock_list(&self.fetcher, &self.endpoints, self.market))
            .await
            .map_err(log_failure(self.name(), "Failed to get stock list"))?;
        Ok(list.clone())
    }

    async fn get_stock_info(&self, symbol: &str) -> Result<StockInfo> {
        self.check_symbol(symbol)?;
        eastmoney::fetch_stock_info(&self.fetcher, &self.endpoints, self.market, symbol)
            .await
            .map_err(log_failure(self.name(), "Failed to get stock info"))
    }

    async fn get_daily_data(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        adjust: AdjustType,
    ) -> Result<Vec<HistoryBar>> {
        self.get_historical_data(symbol, Period::Daily, start_date, end_date, adjust)
            .await
    }

    async fn get_real_time_quotes(&self, symbols: &[String]) -> Result<HashMap<String, MarketData>> {
        for symbol in symbols {
            self.check_symbol(symbol)?;
        }
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        sina::fetch_quotes(&self.fetcher, &self.endpoints, self.market, symbols)
            .await
            .map_err(log_failure(self.name(), "Failed to get real-time quotes"))
    }
}
