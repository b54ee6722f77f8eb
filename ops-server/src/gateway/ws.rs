//! Dashboard WebSocket endpoint
//!
//! GET /ws?token=<JWT>
//! Auth: JWT 通过 query parameter 传递（浏览器 WebSocket 不支持自定义 headers），
//! 也接受 `access_token` cookie
//!
//! 协议:
//! - Server → Dashboard: `{"event":"connected"}`, 之后每个 GatewayEvent 一帧
//! - 订阅者落后: `{"event":"resync","skipped":n}`
//! - Dashboard → Server: `{"event":"ping"}` → `{"event":"pong"}`, 其余忽略

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use http::HeaderMap;
use serde::Deserialize;
use shared::message::{ControlFrame, GatewayEvent};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::AppError;
use crate::auth::middleware::refresh_account;
use crate::auth::{CurrentUser, cookie};
use crate::core::ServerState;
use crate::security_log;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// GET /ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let token = query
        .token
        .or_else(|| cookie::access_token_from_headers(&headers))
        .ok_or_else(|| {
            security_log!("WARN", "ws_auth_missing", path = "/ws");
            AppError::not_authenticated()
        })?;

    let user = state
        .jwt_service
        .validate_token(&token)
        .and_then(CurrentUser::try_from)
        .map_err(|e| {
            security_log!("WARN", "ws_auth_failed", error = format!("{}", e));
            AppError::from(e)
        })?;
    let user = refresh_account(&state, user).await?;

    Ok(ws.on_upgrade(move |socket| gateway_session(socket, state, user)))
}

/// What a hub receive turns into on the socket
#[derive(Debug, PartialEq)]
enum HubFrame {
    Send(String),
    Skip,
    Closed,
}

/// 事件 → JSON 帧; 落后时发送 resync 帧后继续
fn hub_frame(event: Result<GatewayEvent, broadcast::error::RecvError>) -> HubFrame {
    match event {
        Ok(event) => match event.to_json() {
            Ok(json) => HubFrame::Send(json),
            Err(e) => {
                tracing::warn!(event = %event.event, error = %e, "Failed to serialize gateway event");
                HubFrame::Skip
            }
        },
        Err(broadcast::error::RecvError::Lagged(n)) => {
            tracing::warn!(lagged = n, "Gateway subscriber lagged");
            HubFrame::Send(ControlFrame::Resync { skipped: n }.to_json())
        }
        Err(broadcast::error::RecvError::Closed) => HubFrame::Closed,
    }
}

async fn gateway_session(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let (mut sink, mut stream) = socket.split();
    let mut hub_rx = state.gateway.subscribe();

    tracing::info!(user_id = user.id, username = %user.username, "Gateway WS connected");

    let connected = ControlFrame::Connected {
        user_id: Some(user.id.to_string()),
    };
    if send_text(&mut sink, connected.to_json()).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match hub_frame(event) {
                    HubFrame::Send(text) => {
                        if send_text(&mut sink, text).await.is_err() {
                            break;
                        }
                    }
                    HubFrame::Skip => {}
                    HubFrame::Closed => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(ControlFrame::Ping) = serde_json::from_str::<ControlFrame>(&text)
                            && send_text(&mut sink, ControlFrame::Pong.to_json()).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(user_id = user.id, "Gateway WS disconnected");
}

async fn send_text<S>(sink: &mut S, text: String) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    sink.send(Message::Text(text.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayHub;

    #[tokio::test]
    async fn test_events_become_text_frames() {
        let hub = GatewayHub::new();
        let mut rx = hub.subscribe();
        hub.publish("cage", "cageCreated", 7, None);

        let HubFrame::Send(text) = hub_frame(rx.recv().await) else {
            panic!("expected a frame");
        };
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["event"], "cageCreated");
        assert_eq!(json["id"], "7");
    }

    #[tokio::test]
    async fn test_lagging_subscriber_gets_resync_then_continues() {
        let hub = GatewayHub::with_capacity(2);
        let mut rx = hub.subscribe();
        for i in 0..5 {
            hub.publish("stock", "stockUpdated", i, None);
        }

        assert_eq!(
            hub_frame(rx.recv().await),
            HubFrame::Send(r#"{"event":"resync","skipped":3}"#.to_string())
        );
        let HubFrame::Send(text) = hub_frame(rx.recv().await) else {
            panic!("expected the next event");
        };
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["id"], "3");
    }

    #[tokio::test]
    async fn test_closed_hub_ends_session() {
        let hub = GatewayHub::new();
        let mut rx = hub.subscribe();
        drop(hub);
        assert_eq!(hub_frame(rx.recv().await), HubFrame::Closed);
    }
}
