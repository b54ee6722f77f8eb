//! 网关消息类型定义
//!
//! 服务端通过 WebSocket 推送给仪表盘的 JSON 帧。所有写操作完成后
//! 广播一个 [`GatewayEvent`]，连接控制帧使用 [`ControlFrame`]。

use serde::{Deserialize, Serialize};

/// 资源变更事件 (服务端 -> 客户端)
///
/// `event` 为 camelCase 事件名，例如 `requestApproved`、`materialsIssued`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEvent {
    /// 事件名
    pub event: String,
    /// 资源类型 (例如: "request", "stock", "cage")
    pub resource: String,
    /// 资源 ID (删除事件同样携带)
    pub id: String,
    /// 资源数据 (删除时为 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// 资源版本号 (前端判断是否需要全量刷新)
    pub version: u64,
    /// 事件时间 (毫秒)
    pub timestamp: i64,
}

impl GatewayEvent {
    pub fn new(
        event: impl Into<String>,
        resource: impl Into<String>,
        id: impl Into<String>,
        data: Option<serde_json::Value>,
        version: u64,
    ) -> Self {
        Self {
            event: event.into(),
            resource: resource.into(),
            id: id.into(),
            data,
            version,
            timestamp: crate::util::now_millis(),
        }
    }

    /// 序列化为文本帧
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 连接控制帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ControlFrame {
    /// 握手完成
    Connected {
        #[serde(skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// 订阅者落后，丢失了 `skipped` 个事件，客户端应重新拉取
    Resync { skipped: u64 },
    Ping,
    Pong,
}

impl ControlFrame {
    pub fn to_json(&self) -> String {
        // 纯枚举 + 基本类型，序列化不会失败
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_event_serialization() {
        let event = GatewayEvent::new(
            "materialsIssued",
            "request",
            "42",
            Some(serde_json::json!({"status": "PARTIALLY_ISSUED"})),
            3,
        );
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["event"], "materialsIssued");
        assert_eq!(json["resource"], "request");
        assert_eq!(json["id"], "42");
        assert_eq!(json["version"], 3);
        assert_eq!(json["data"]["status"], "PARTIALLY_ISSUED");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_deleted_event_omits_data() {
        let event = GatewayEvent::new("cageDeleted", "cage", "7", None, 1);
        let json = event.to_json().unwrap();
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_control_frames() {
        assert_eq!(
            ControlFrame::Connected { user_id: None }.to_json(),
            r#"{"event":"connected"}"#
        );
        assert_eq!(
            ControlFrame::Resync { skipped: 5 }.to_json(),
            r#"{"event":"resync","skipped":5}"#
        );
        let ping: ControlFrame = serde_json::from_str(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(ping, ControlFrame::Ping);
        assert_eq!(ControlFrame::Pong.to_json(), r#"{"event":"pong"}"#);
    }
}
