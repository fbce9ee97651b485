//! MessagePusher trait 定義
//!
//! UseCase 層がクライアントへメッセージを届けるためのインターフェース。
//! 送信は best-effort: 送れなかった接続は読み飛ばし、再送もキューイングもしない。

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use super::{error::MessagePushError, event::ServerEvent, value_object::ConnectionId};

/// Frame handed to a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    /// Liveness ping.
    Ping,
}

/// Sending half of one connection.
///
/// Frames are queued for the writer task. `terminate` bypasses the queue, so
/// a connection whose writer is stuck on a dead peer can still be dropped.
#[derive(Debug)]
pub struct PusherChannel {
    frames: mpsc::UnboundedSender<OutboundFrame>,
    kill: watch::Sender<bool>,
}

/// Receiving half of one connection, owned by its socket task.
#[derive(Debug)]
pub struct PusherReceiver {
    pub frames: mpsc::UnboundedReceiver<OutboundFrame>,
    pub kill: KillSwitch,
}

/// Fires once the connection has been told to terminate.
#[derive(Debug)]
pub struct KillSwitch(watch::Receiver<bool>);

/// Create the two halves of a connection's outbound path.
pub fn pusher_channel() -> (PusherChannel, PusherReceiver) {
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (kill_tx, kill_rx) = watch::channel(false);
    (
        PusherChannel {
            frames: frames_tx,
            kill: kill_tx,
        },
        PusherReceiver {
            frames: frames_rx,
            kill: KillSwitch(kill_rx),
        },
    )
}

impl PusherChannel {
    pub fn send(&self, frame: OutboundFrame) -> Result<(), MessagePushError> {
        self.frames
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }

    pub fn terminate(&self) {
        self.kill.send_replace(true);
    }
}

impl KillSwitch {
    /// Wait until `terminate` is called. Never resolves if the sending half
    /// is dropped without terminating.
    pub async fn triggered(&mut self) {
        let fired = self.0.wait_for(|killed| *killed).await.is_ok();
        if !fired {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// エンコード済みのメッセージを一つの接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// イベントを一つの接続に送信
    async fn push_event(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// イベントを複数の接続に送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 生存確認の ping を送信
    async fn ping(&self, connection_id: &ConnectionId) -> Result<(), MessagePushError>;

    /// 接続を強制的に閉じる（送信キューを待たない）
    async fn close(&self, connection_id: &ConnectionId) -> Result<(), MessagePushError>;
}
