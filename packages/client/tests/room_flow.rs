//! End-to-end tests: the real server on an ephemeral port, driven by the real client.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::SinkExt;
use jubensha_client::{ClientError, EventStream, GameClient};
use jubensha_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryRoomRepository},
        script::StaticScriptCatalog,
    },
    ui::{Server, state::AppState},
};
use jubensha_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_heartbeat(Duration::from_secs(30)).await
    }

    async fn start_with_heartbeat(heartbeat_interval: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(AppState::build(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(InMemoryConnectionRegistry::new()),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(StaticScriptCatalog::builtin().unwrap()),
            Arc::new(SystemClock),
            6,
        ));
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = Server::new(state, heartbeat_interval);
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = shutdown_rx.await;
        }));

        TestServer {
            addr,
            shutdown: Some(shutdown),
            handle,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> (GameClient, EventStream) {
        GameClient::connect(&self.ws_url()).await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.abort();
    }
}

/// Wait for the next pushed event of `kind`, skipping others
async fn expect_event(events: &mut EventStream, kind: &str) -> Value {
    expect_event_within(events, kind, EVENT_TIMEOUT).await
}

async fn expect_event_within(events: &mut EventStream, kind: &str, timeout: Duration) -> Value {
    let wait = async {
        while let Some(event) = events.recv().await {
            if event.kind == kind {
                return Some(event.data);
            }
        }
        None
    };
    tokio::time::timeout(timeout, wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for '{}'", kind))
        .unwrap_or_else(|| panic!("connection closed while waiting for '{}'", kind))
}

#[tokio::test]
async fn test_connected_event_on_open() {
    // テスト項目: 接続直後に connected イベントが届く
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (_client, mut events) = server.connect().await;

    // then (期待する結果):
    let data = expect_event(&mut events, "connected").await;
    assert_eq!(data["message"], "Connected successfully");
    assert!(data["connectionId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(data["timestamp"].as_i64().is_some_and(|t| t > 0));
}

#[tokio::test]
async fn test_full_room_flow() {
    // テスト項目: 作成 → 参加 → 開始 → フェーズ変更 → 満員のルームへの参加拒否
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, mut a_events) = server.connect().await;
    let (b, mut b_events) = server.connect().await;
    let (c, _c_events) = server.connect().await;

    // when (操作): A がルームを作成
    let created = a
        .create_room("esther-story", Some(2), Some("A"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(created.room_id.len(), 6);
    assert!(created.room_id.chars().all(|c| c.is_ascii_digit()));
    assert!(created.player.is_host);
    assert_eq!(created.room.max_players, 2);

    // when (操作): B が参加
    let joined = b
        .join_room(&created.room_id, Some("测试玩家"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(joined.room.players.len(), 2);
    let pushed = expect_event(&mut a_events, "room:playerJoined").await;
    assert_eq!(pushed["player"]["name"], "测试玩家");
    assert_eq!(pushed["room"]["players"].as_array().unwrap().len(), 2);

    // when (操作): A がゲームを開始
    let started = a.start_game().await.unwrap();

    // then (期待する結果):
    assert!(started.success);
    for events in [&mut a_events, &mut b_events] {
        let data = expect_event(events, "game:started").await;
        assert_eq!(data["room"]["status"], "playing");
        let b_record = data["room"]["players"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == joined.player.id.as_str())
            .cloned()
            .unwrap();
        assert!(b_record["characterId"].as_str().is_some_and(|c| !c.is_empty()));
    }

    // when (操作): A がフェーズを READING に変更
    a.update_phase("READING").await.unwrap();

    // then (期待する結果):
    for events in [&mut a_events, &mut b_events] {
        let data = expect_event(events, "game:phaseChanged").await;
        assert_eq!(data["phase"], "READING");
        assert_eq!(data["playerId"], created.player.id.as_str());
    }

    // when (操作): C が満員のルームに参加
    let rejected = c.join_room(&created.room_id, None).await;

    // then (期待する結果):
    assert!(matches!(rejected, Err(ClientError::Server(ref m)) if m == "Room is full"));
    let detail: Value = reqwest::get(server.http_url(&format!("/api/rooms/{}", created.room_id)))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_host_succession_on_disconnect() {
    // テスト項目: ホストが切断すると最も早く参加したメンバーが新しいホストになる
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, _a_events) = server.connect().await;
    let (b, mut b_events) = server.connect().await;
    let (c, mut c_events) = server.connect().await;
    let created = a.create_room("esther-story", None, Some("A")).await.unwrap();
    let b_joined = b.join_room(&created.room_id, Some("B")).await.unwrap();
    c.join_room(&created.room_id, Some("C")).await.unwrap();

    // when (操作):
    a.close();

    // then (期待する結果):
    for events in [&mut b_events, &mut c_events] {
        let changed = expect_event(events, "room:hostChanged").await;
        assert_eq!(changed["newHostId"], b_joined.player.id.as_str());
        let left = expect_event(events, "room:playerLeft").await;
        assert_eq!(left["playerName"], "A");
        assert_eq!(left["room"]["players"].as_array().unwrap().len(), 2);
        assert_eq!(left["room"]["hostId"], b_joined.player.id.as_str());
    }
}

#[tokio::test]
async fn test_non_host_cannot_start() {
    // テスト項目: ホスト以外はゲームを開始できない
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, _a_events) = server.connect().await;
    let (b, _b_events) = server.connect().await;
    let created = a.create_room("esther-story", None, None).await.unwrap();
    b.join_room(&created.room_id, None).await.unwrap();

    // when (操作):
    let result = b.start_game().await;

    // then (期待する結果):
    assert!(
        matches!(result, Err(ClientError::Server(ref m)) if m == "Only host can start the game")
    );
}

#[tokio::test]
async fn test_any_phase_token_is_relayed() {
    // テスト項目: スクリプトにないフェーズでもそのまま記録・配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, mut a_events) = server.connect().await;
    a.create_room("esther-story", None, None).await.unwrap();

    // when (操作):
    let reply = a.update_phase("INTERMISSION").await.unwrap();

    // then (期待する結果):
    assert_eq!(reply.phase, "INTERMISSION");
    let data = expect_event(&mut a_events, "game:phaseChanged").await;
    assert_eq!(data["phase"], "INTERMISSION");
}

#[tokio::test]
async fn test_chat_is_echoed_to_sender() {
    // テスト項目: チャットは送信者自身にも配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, mut a_events) = server.connect().await;
    a.create_room("esther-story", None, Some("A")).await.unwrap();

    // when (操作):
    let ack = a.send_chat("who was in the study?").await.unwrap();

    // then (期待する結果):
    assert!(ack.success);
    let data = expect_event(&mut a_events, "chat:message").await;
    assert_eq!(data["playerName"], "A");
    assert_eq!(data["message"], "who was in the study?");
}

#[tokio::test]
async fn test_scripts_over_websocket() {
    // テスト項目: script:list と script:get が組み込みスクリプトを返す
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, _a_events) = server.connect().await;

    // when (操作):
    let list = a.list_scripts().await.unwrap();
    let script = a.get_script("esther-story").await.unwrap();
    let missing = a.get_script("no-such-story").await;

    // then (期待する結果):
    assert!(list.scripts.iter().any(|s| s.id == "esther-story"));
    assert_eq!(script.script["id"], "esther-story");
    assert!(matches!(missing, Err(ClientError::Server(ref m)) if m == "Script not found"));
}

#[tokio::test]
async fn test_http_api() {
    // テスト項目: HTTP API がヘルスチェック・ルーム一覧・スクリプト一覧を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, _a_events) = server.connect().await;
    let created = a.create_room("esther-story", None, None).await.unwrap();

    // when (操作):
    let health: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: Value = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let scripts: Value = reqwest::get(server.http_url("/api/scripts"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing_room = reqwest::get(server.http_url("/api/rooms/000000")).await.unwrap();
    let missing_script = reqwest::get(server.http_url("/api/scripts/nope")).await.unwrap();

    // then (期待する結果):
    assert_eq!(health["status"], "ok");
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["id"], created.room_id.as_str());
    assert_eq!(rooms[0]["player_count"], 1);
    assert!(scripts.as_array().unwrap().iter().any(|s| s["id"] == "esther-story"));
    assert_eq!(missing_room.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(missing_script.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_last_player_leaving_deletes_room() {
    // テスト項目: 最後のメンバーが退出するとルームが削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, _a_events) = server.connect().await;
    let created = a.create_room("esther-story", None, None).await.unwrap();

    // when (操作):
    let first = a.leave_room().await.unwrap();
    let second = a.leave_room().await.unwrap();

    // then (期待する結果):
    assert!(first.success);
    assert!(second.success);
    let response = reqwest::get(server.http_url(&format!("/api/rooms/{}", created.room_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_heartbeat_keeps_responsive_clients() {
    // テスト項目: ping に応答するクライアントは heartbeat で切断されない
    // given (前提条件):
    let server = TestServer::start_with_heartbeat(Duration::from_secs(1)).await;
    let (a, _a_events) = server.connect().await;
    let created = a.create_room("esther-story", None, None).await.unwrap();

    // when (操作):
    tokio::time::sleep(Duration::from_millis(3500)).await;

    // then (期待する結果):
    let ack = a.send_chat("still here").await.unwrap();
    assert!(ack.success);
    let rooms: Value = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms[0]["id"], created.room_id.as_str());
}

#[tokio::test]
async fn test_heartbeat_drops_unresponsive_clients() {
    // テスト項目: ping に応答しない接続は heartbeat で切断され、ルームから外される
    // given (前提条件):
    let server = TestServer::start_with_heartbeat(Duration::from_secs(1)).await;
    let (a, mut a_events) = server.connect().await;
    let created = a.create_room("esther-story", None, None).await.unwrap();

    // 参加リクエストを送った後は一切読まない接続（pong を返さない）
    let (mut silent, _response) = connect_async(server.ws_url()).await.unwrap();
    let join = json!({
        "event": "room:join",
        "data": { "roomId": created.room_id, "playerName": "silent" }
    });
    silent
        .send(Message::Text(join.to_string().into()))
        .await
        .unwrap();
    expect_event(&mut a_events, "room:playerJoined").await;

    // when (操作):
    let left = expect_event_within(&mut a_events, "room:playerLeft", Duration::from_secs(6)).await;

    // then (期待する結果):
    assert_eq!(left["playerName"], "silent");
    assert_eq!(left["room"]["players"].as_array().unwrap().len(), 1);
    let room: Value = reqwest::get(server.http_url(&format!("/api/rooms/{}", created.room_id)))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(room["players"].as_array().unwrap().len(), 1);
    drop(silent);
}
