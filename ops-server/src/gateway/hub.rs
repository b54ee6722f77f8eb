//! GatewayHub — 资源变更实时分发
//!
//! ```text
//! HTTP handler (写操作完成)
//!       │ publish(resource, event, id, data)
//!       ▼
//! GatewayHub
//!   ├── versions: resource → 版本号 (DashMap)
//!   └── tx: broadcast::Sender<GatewayEvent>
//!         │
//!         ▼
//!   WebSocket session (subscribe → 推送 JSON 文本帧)
//! ```

use dashmap::DashMap;
use shared::message::GatewayEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel 容量 — 足以缓冲仪表盘突发刷新
pub const BROADCAST_CAPACITY: usize = 256;

/// 资源版本管理器
///
/// 每种资源类型维护独立的版本号，支持原子递增。
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号 (不存在返回 0)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// 全局广播中心，无房间划分，所有连接收到全部事件
#[derive(Debug, Clone)]
pub struct GatewayHub {
    tx: broadcast::Sender<GatewayEvent>,
    versions: Arc<ResourceVersions>,
}

impl GatewayHub {
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.tx.subscribe()
    }

    /// 当前 WebSocket 订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn version(&self, resource: &str) -> u64 {
        self.versions.get(resource)
    }

    /// 发布事件，返回该资源的新版本号
    ///
    /// 没有订阅者时事件直接丢弃，从不让调用方失败
    pub fn publish(
        &self,
        resource: &str,
        event: &str,
        id: impl ToString,
        data: Option<serde_json::Value>,
    ) -> u64 {
        let version = self.versions.increment(resource);
        let message = GatewayEvent::new(event, resource, id.to_string(), data, version);
        match self.tx.send(message) {
            Ok(receivers) => {
                tracing::debug!(resource, event, version, receivers, "Gateway event published");
            }
            Err(_) => {
                tracing::trace!(resource, event, "No gateway subscribers, event dropped");
            }
        }
        version
    }
}

impl Default for GatewayHub {
    fn default() -> Self {
        Self::new()
    }
}
