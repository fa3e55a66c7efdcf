//! 业务逻辑服务模块
//!
//! 封装数据获取、缓存和交易时段逻辑

pub mod adapter;       // 行情适配器接口
pub mod cache;         // SQLite 数据缓存
pub mod market_hours;  // 交易时段
pub mod stock;         // 股票数据服务
