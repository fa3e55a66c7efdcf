//! 股票数据服务模块
//!
//! 东方财富（K线、个股信息、股票列表）与新浪（实时行情）两个数据源，
//! 由 [`AkshareAdapter`] 组合为统一的行情适配器

pub mod akshare;
pub mod common;
pub mod eastmoney;
pub mod sina;

pub use akshare::AkshareAdapter;
