//! windsurf-stock
//!
//! A 股与港股行情数据服务：东方财富/新浪数据源、SQLite 缓存、交易时段与 HTTP API

pub mod config;     // 配置加载
pub mod error;      // 错误类型
pub mod handlers;   // HTTP 请求处理器
pub mod logger;     // 日志初始化
pub mod middleware; // 中间件
pub mod models;     // 数据模型定义
pub mod services;   // 业务逻辑服务

pub use error::{DataError, Result};
