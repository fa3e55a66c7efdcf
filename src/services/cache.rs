//! 股票数据缓存
//!
//! 使用 SQLite 缓存历史K线查询结果，主要功能：
//! 1. 按 (代码, 周期, 起止日期) 缓存查询结果
//! 2. 按周期自动过期：日K 7 天，周K 15 天，月K 30 天
//! 3. 批量数据存取
//!
//! 读写失败只记录日志，不向调用方传播

use chrono::{DateTime, Duration, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::fs;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::models::HistoryBar;

const DB_FILE: &str = "stock_data.db";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 股票数据缓存管理器
pub struct CacheManager {
    pool: Pool<SqliteConnectionManager>,
}

impl CacheManager {
    /// 在指定目录下打开（或创建）缓存数据库
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir).map_err(|e| DataError::Cache(e.to_string()))?;

        let manager = SqliteConnectionManager::file(cache_dir.join(DB_FILE));
        let pool = Pool::builder().max_size(4).build(manager)?;

        let cache = Self { pool };
        cache.init_db()?;
        Ok(cache)
    }

    /// 内存数据库，单连接
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;

        let cache = Self { pool };
        cache.init_db()?;
        Ok(cache)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stock_data (
                symbol TEXT NOT NULL,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expire_at TEXT NOT NULL,
                PRIMARY KEY (symbol, period, start_date, end_date)
            );
            CREATE INDEX IF NOT EXISTS idx_stock_data_expire ON stock_data(expire_at);",
        )?;
        Ok(())
    }

    /// 各周期缓存天数，未知周期按日K处理
    ///
    /// 复权后缀（如 `daily:hfq`）不影响过期时间
    pub fn expire_days(period: &str) -> i64 {
        let base = period.split(':').next().unwrap_or(period);
        match base {
            "daily" => 7,
            "weekly" => 15,
            "monthly" => 30,
            _ => 7,
        }
    }

    /// 获取缓存的K线数据，未命中或出错返回 None
    pub fn get_data(
        &self,
        symbol: &str,
        period: &str,
        start_date: &str,
        end_date: &str,
    ) -> Option<Vec<HistoryBar>> {
        match self.try_get(symbol, period, start_date, end_date, Utc::now()) {
            Ok(Some(data)) => {
                log::debug!("缓存命中: {} {} {}-{}", symbol, period, start_date, end_date);
                Some(data)
            }
            Ok(None) => {
                log::debug!("缓存未命中: {} {} {}-{}", symbol, period, start_date, end_date);
                None
            }
            Err(e) => {
                log::error!("读取缓存出错: {}", e);
                None
            }
        }
    }

    fn try_get(
        &self,
        symbol: &str,
        period: &str,
        start_date: &str,
        end_date: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<HistoryBar>>> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT data FROM stock_data
                 WHERE symbol = ?1 AND period = ?2
                 AND start_date = ?3 AND end_date = ?4
                 AND expire_at > ?5",
                params![
                    symbol,
                    period,
                    start_date,
                    end_date,
                    now.format(TIME_FORMAT).to_string()
                ],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 保存K线数据到缓存，返回是否成功
    pub fn save_data(
        &self,
        symbol: &str,
        period: &str,
        start_date: &str,
        end_date: &str,
        data: &[HistoryBar],
    ) -> bool {
        let expire_at = Utc::now() + Duration::days(Self::expire_days(period));
        match self.save_with_expiry(symbol, period, start_date, end_date, data, expire_at) {
            Ok(()) => {
                log::debug!("保存缓存成功: {} {} {}-{}", symbol, period, start_date, end_date);
                true
            }
            Err(e) => {
                log::error!("保存缓存出错: {}", e);
                false
            }
        }
    }

    pub(crate) fn save_with_expiry(
        &self,
        symbol: &str,
        period: &str,
        start_date: &str,
        end_date: &str,
        data: &[HistoryBar],
        expire_at: DateTime<Utc>,
    ) -> Result<()> {
        let json = serde_json::to_string(data)?;
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO stock_data
             (symbol, period, start_date, end_date, data, created_at, expire_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                symbol,
                period,
                start_date,
                end_date,
                json,
                Utc::now().format(TIME_FORMAT).to_string(),
                expire_at.format(TIME_FORMAT).to_string()
            ],
        )?;
        Ok(())
    }

    /// 批量获取缓存数据
    ///
    /// 返回 (未命中的股票列表, 命中的数据列表)，均保持输入顺序
    pub fn get_batch_data(
        &self,
        symbols: &[String],
        period: &str,
        start_date: &str,
        end_date: &str,
    ) -> (Vec<String>, Vec<Vec<HistoryBar>>) {
        let mut missed = Vec::new();
        let mut cached = Vec::new();

        for symbol in symbols {
            match self.get_data(symbol, period, start_date, end_date) {
                Some(data) => cached.push(data),
                None => missed.push(symbol.clone()),
            }
        }

        (missed, cached)
    }

    /// 批量保存，代码与数据按位置配对，多余项忽略
    pub fn save_batch_data(
        &self,
        symbols: &[String],
        period: &str,
        start_date: &str,
        end_date: &str,
        data_list: &[Vec<HistoryBar>],
    ) {
        for (symbol, data) in symbols.iter().zip(data_list) {
            self.save_data(symbol, period, start_date, end_date, data);
        }
    }

    /// 清理过期缓存，返回清理的记录数
    pub fn clear_expired(&self) -> usize {
        match self.try_clear_expired(Utc::now()) {
            Ok(n) => n,
            Err(e) => {
                log::error!("清理过期缓存出错: {}", e);
                0
            }
        }
    }

    fn try_clear_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM stock_data WHERE expire_at <= ?1",
            params![now.format(TIME_FORMAT).to_string()],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(symbol: &str, date: &str, close: f64) -> HistoryBar {
        HistoryBar {
            symbol: symbol.to_string(),
            date: date.to_string(),
            open: close - 0.1,
            high: close + 0.2,
            low: close - 0.3,
            close,
            volume: 1_000_000,
            amount: close * 1_000_000.0,
        }
    }

    #[test]
    fn expire_days_by_period() {
        assert_eq!(CacheManager::expire_days("daily"), 7);
        assert_eq!(CacheManager::expire_days("weekly"), 15);
        assert_eq!(CacheManager::expire_days("monthly"), 30);
        assert_eq!(CacheManager::expire_days("quarterly"), 7);
        assert_eq!(CacheManager::expire_days("monthly:hfq"), 30);
    }

    #[test]
    fn save_then_get() {
        let cache = CacheManager::in_memory().unwrap();
        let data = vec![bar("600519.SH", "20230120", 1800.0), bar("600519.SH", "20230130", 1850.0)];

        assert!(cache.get_data("600519.SH", "daily", "20230120", "20230220").is_none());
        assert!(cache.save_data("600519.SH", "daily", "20230120", "20230220", &data));
        assert_eq!(
            cache.get_data("600519.SH", "daily", "20230120", "20230220"),
            Some(data)
        );

        // 键的任一部分不同都不命中
        assert!(cache.get_data("600519.SH", "weekly", "20230120", "20230220").is_none());
        assert!(cache.get_data("600519.SH", "daily", "20230121", "20230220").is_none());
    }

    #[test]
    fn save_replaces_existing_entry() {
        let cache = CacheManager::in_memory().unwrap();
        cache.save_data("000001.SZ", "daily", "20240101", "20240131", &[bar("000001.SZ", "20240102", 9.0)]);
        let updated = vec![bar("000001.SZ", "20240102", 9.5)];
        cache.save_data("000001.SZ", "daily", "20240101", "20240131", &updated);

        assert_eq!(
            cache.get_data("000001.SZ", "daily", "20240101", "20240131"),
            Some(updated)
        );
    }

    #[test]
    fn expired_entries_are_misses_and_cleared() {
        let cache = CacheManager::in_memory().unwrap();
        let past = Utc::now() - Duration::days(1);
        cache
            .save_with_expiry("000858.SZ", "daily", "20230120", "20230220", &[bar("000858.SZ", "20230120", 150.0)], past)
            .unwrap();
        cache.save_data("600887.SH", "monthly", "20230120", "20230220", &[bar("600887.SH", "20230131", 30.0)]);

        assert!(cache.get_data("000858.SZ", "daily", "20230120", "20230220").is_none());
        assert_eq!(cache.clear_expired(), 1);
        assert_eq!(cache.clear_expired(), 0);
        assert!(cache.get_data("600887.SH", "monthly", "20230120", "20230220").is_some());
    }

    #[test]
    fn batch_preserves_order() {
        let cache = CacheManager::in_memory().unwrap();
        let symbols: Vec<String> = ["600519.SH", "000858.SZ", "600887.SH"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        cache.save_batch_data(
            &symbols[..2],
            "daily",
            "20230120",
            "20230220",
            &[vec![bar("600519.SH", "20230120", 1800.0)], vec![bar("000858.SZ", "20230120", 150.0)], vec![]],
        );

        let (missed, cached) = cache.get_batch_data(&symbols, "daily", "20230120", "20230220");
        assert_eq!(missed, vec!["600887.SH".to_string()]);
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0][0].symbol, "600519.SH");
        assert_eq!(cached[1][0].symbol, "000858.SZ");
    }

    #[test]
    fn file_backed_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = CacheManager::new(dir.path().join("cache")).unwrap();
            cache.save_data("600000.SH", "weekly", "20240101", "20240301", &[bar("600000.SH", "20240105", 7.0)]);
        }
        assert!(dir.path().join("cache").join(DB_FILE).exists());

        let reopened = CacheManager::new(dir.path().join("cache")).unwrap();
        assert!(reopened.get_data("600000.SH", "weekly", "20240101", "20240301").is_some());
    }
}
