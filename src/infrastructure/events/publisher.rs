//! Event Publisher Implementation
//!
//! 播放事件推送：订阅方（UI 外壳、日志、测试）通过 broadcast 接收状态变化，取代轮询

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::playback::{PlaybackState, ProgressSnapshot};

/// 播放事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum PlaybackEvent {
    /// 状态变更
    StateChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<Uuid>,
        from: PlaybackState,
        to: PlaybackState,
    },
    /// 进度更新（仅供展示）
    Progress(ProgressSnapshot),
    /// 面向用户的状态文本
    Status { message: String, is_error: bool },
    /// 可用语音列表变化
    VoicesChanged { count: usize },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<PlaybackEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    /// 订阅播放事件
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.channel.subscribe()
    }

    /// 发布状态变更事件
    pub fn publish_state_changed(
        &self,
        session_id: Option<Uuid>,
        from: PlaybackState,
        to: PlaybackState,
    ) {
        self.publish(PlaybackEvent::StateChanged {
            session_id,
            from,
            to,
        });
    }

    /// 发布进度事件
    pub fn publish_progress(&self, snapshot: ProgressSnapshot) {
        self.publish(PlaybackEvent::Progress(snapshot));
    }

    /// 发布普通状态文本
    pub fn publish_status(&self, message: impl Into<String>) {
        self.publish(PlaybackEvent::Status {
            message: message.into(),
            is_error: false,
        });
    }

    /// 发布错误状态文本
    pub fn publish_error(&self, message: impl Into<String>) {
        self.publish(PlaybackEvent::Status {
            message: message.into(),
            is_error: true,
        });
    }

    /// 发布语音列表变化事件
    pub fn publish_voices_changed(&self, count: usize) {
        self.publish(PlaybackEvent::VoicesChanged { count });
    }

    fn publish(&self, event: PlaybackEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish playback event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_state_changed(None, PlaybackState::Idle, PlaybackState::Playing);
        publisher.publish_error("boom");

        match rx.try_recv().unwrap() {
            PlaybackEvent::StateChanged { from, to, .. } => {
                assert_eq!(from, PlaybackState::Idle);
                assert_eq!(to, PlaybackState::Playing);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.try_recv().unwrap() {
            PlaybackEvent::Status { message, is_error } => {
                assert_eq!(message, "boom");
                assert!(is_error);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish_status("nobody listens");
    }

    #[test]
    fn test_event_serialization() {
        let event = PlaybackEvent::VoicesChanged { count: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "VoicesChanged");
        assert_eq!(json["data"]["count"], 3);
    }
}
