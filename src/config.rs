//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量（含 .env）可覆盖部分字段

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 日志文件路径（为空则只输出到 stderr）
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

/// 上游数据接口地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    /// 东方财富K线接口
    #[serde(default = "default_eastmoney_kline")]
    pub eastmoney_kline: String,
    /// 东方财富个股信息接口
    #[serde(default = "default_eastmoney_quote")]
    pub eastmoney_quote: String,
    /// 东方财富股票列表接口
    #[serde(default = "default_eastmoney_list")]
    pub eastmoney_list: String,
    /// 新浪实时行情接口
    #[serde(default = "default_sina_quote")]
    pub sina_quote: String,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// 失败重试次数
    #[serde(default = "default_retry_count")]
    pub retry_count: usize,
    /// 重试间隔（秒）
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 批量获取的最大并发数
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// 缓存目录
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub data_source: DataSourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_retry_count() -> usize { 3 }
fn default_retry_delay() -> u64 { 1 }
fn default_max_workers() -> usize { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_file() -> Option<PathBuf> { Some(PathBuf::from("logs/app.log")) }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_cache_dir() -> PathBuf { PathBuf::from("cache") }
fn default_eastmoney_kline() -> String {
    "https://push2his.eastmoney.com/api/qt/stock/kline/get".to_string()
}
fn default_eastmoney_quote() -> String {
    "https://push2.eastmoney.com/api/qt/stock/get".to_string()
}
fn default_eastmoney_list() -> String {
    "https://82.push2.eastmoney.com/api/qt/clist/get".to_string()
}
fn default_sina_quote() -> String { "https://hq.sinajs.cn".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            eastmoney_kline: default_eastmoney_kline(),
            eastmoney_quote: default_eastmoney_quote(),
            eastmoney_list: default_eastmoney_list(),
            sina_quote: default_sina_quote(),
        }
    }
}

impl Endpoints {
    /// 所有接口指向同一基地址（测试用 mock server）
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            eastmoney_kline: format!("{}/api/qt/stock/kline/get", base),
            eastmoney_quote: format!("{}/api/qt/stock/get", base),
            eastmoney_list: format!("{}/api/qt/clist/get", base),
            sina_quote: base.to_string(),
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_delay_secs: default_retry_delay(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_workers: default_max_workers(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

const CONFIG_PATHS: [&str; 2] = ["config.json", "config/config.json"];

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 查找第一个存在的配置文件
    pub fn locate() -> Option<&'static str> {
        CONFIG_PATHS.into_iter().find(|p| Path::new(p).exists())
    }

    /// 加载配置：优先从文件，失败则使用默认值，再叠加环境变量
    ///
    /// 返回配置及其来源描述（日志系统此时尚未初始化）
    pub fn load() -> (Self, String) {
        let (mut config, source) = match Self::locate() {
            Some(path) => match Self::from_file(path) {
                Ok(config) => (config, format!("从 {} 加载配置成功", path)),
                Err(e) => (
                    Self::default(),
                    format!("加载配置文件 {} 失败: {}，使用默认配置", path, e),
                ),
            },
            None => (Self::default(), "使用默认配置".to_string()),
        };
        config.apply_env();
        (config, source)
    }

    /// 环境变量覆盖：API_KEY, LOG_LEVEL, CACHE_DIR, SERVER_PORT
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(key) = lookup("API_KEY") {
            self.api.api_key = key;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(dir) = lookup("CACHE_DIR") {
            self.storage.cache_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// 创建数据与缓存目录
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.storage.data_dir)?;
        fs::create_dir_all(&self.storage.cache_dir)?;
        Ok(())
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
