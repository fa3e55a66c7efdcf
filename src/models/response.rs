//! 通用 API 响应模型

use serde::{Deserialize, Serialize};

use crate::services::market_hours::beijing_now;

/// 统一 API 响应结构
///
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - timestamp: 响应时间戳（北京时间）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: beijing_now().to_rfc3339(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            timestamp: beijing_now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_fields() {
        let ok = ApiResponse::success(vec![1, 2]);
        assert!(ok.success);
        assert_eq!(ok.data, Some(vec![1, 2]));
        assert!(ok.timestamp.ends_with("+08:00"));

        let err = ApiResponse::<()>::error("无效的股票代码");
        assert!(!err.success);
        assert!(err.data.is_none());
        assert_eq!(err.message, "无效的股票代码");
    }
}
