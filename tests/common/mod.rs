//! 集成测试公共工具：mock 上游接口与测试数据

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use windsurf_stock::config::{DataSourceConfig, Endpoints};
use windsurf_stock::models::Market;
use windsurf_stock::services::cache::CacheManager;
use windsurf_stock::services::stock::AkshareAdapter;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn test_config(server: &MockServer) -> DataSourceConfig {
    DataSourceConfig {
        retry_count: 2,
        retry_delay_secs: 0,
        timeout_secs: 5,
        connect_timeout_secs: 5,
        max_workers: 2,
        endpoints: Endpoints::with_base(&server.uri()),
    }
}

pub fn make_adapter(server: &MockServer, market: Market) -> (AkshareAdapter, Arc<CacheManager>) {
    let cache = Arc::new(CacheManager::in_memory().expect("in-memory cache"));
    let adapter = AkshareAdapter::new(market, &test_config(server), cache.clone()).expect("adapter");
    (adapter, cache)
}

pub fn kline_body(code: &str, rows: &[(&str, f64, f64)]) -> Value {
    let klines: Vec<String> = rows
        .iter()
        .map(|(date, open, close)| {
            format!(
                "{},{:.2},{:.2},{:.2},{:.2},1000000,{:.2},1.00,0.50,0.05,0.30",
                date,
                open,
                close,
                open.max(*close) + 0.2,
                open.min(*close) - 0.2,
                close * 1_000_000.0
            )
        })
        .collect();
    json!({"rc": 0, "data": {"code": code, "klines": klines}})
}

pub async fn mock_kline(server: &MockServer, secid: &str, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/qt/stock/kline/get"))
        .and(query_param("secid", secid))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// A 股新浪行情行，字段位置与真实接口一致
pub fn sina_a_share_line(code: &str, name: &str, open: f64, last: f64, volume: u64) -> String {
    let mut fields = vec![
        name.to_string(),
        format!("{:.2}", open),
        format!("{:.2}", open - 0.1),
        format!("{:.2}", last),
        format!("{:.2}", last + 0.2),
        format!("{:.2}", open - 0.2),
        format!("{:.2}", last - 0.01),
        format!("{:.2}", last),
        volume.to_string(),
        format!("{:.2}", last * volume as f64),
    ];
    while fields.len() < 30 {
        fields.push("0".to_string());
    }
    fields.push("2024-02-29".to_string());
    fields.push("15:00:00".to_string());
    fields.push("00".to_string());
    format!("var hq_str_{}=\"{}\";", code, fields.join(","))
}

pub async fn mock_sina(server: &MockServer, text: &str) {
    let (bytes, _, _) = encoding_rs::GBK.encode(text);
    Mock::given(method("GET"))
        .and(path_regex(r"^/list="))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.into_owned()))
        .mount(server)
        .await;
}
