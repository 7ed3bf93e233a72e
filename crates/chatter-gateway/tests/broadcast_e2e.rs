// End-to-end: real listener, real WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use chatter_core::ChatterConfig;
use chatter_gateway::AppState;
use chatter_protocol::ServerFrame;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> (String, Arc<AppState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(ChatterConfig::default()));
    let served = Arc::clone(&state);
    tokio::spawn(async move {
        chatter_gateway::serve(listener, served, std::future::pending())
            .await
            .unwrap();
    });
    (format!("ws://{addr}/websocket"), state)
}

async fn next_frame(client: &mut Client) -> ServerFrame {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("read error");
        if let Message::Text(_) = msg {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

/// Connect and consume the initial `name` frame.
async fn join(url: &str) -> (Client, String) {
    let (mut client, _) = connect_async(url).await.expect("connect failed");
    match next_frame(&mut client).await {
        ServerFrame::Name { name } => {
            assert!(!name.is_empty());
            (client, name)
        }
        other => panic!("first frame must be name, got {other:?}"),
    }
}

async fn say(client: &mut Client, raw: &str) {
    client.send(Message::text(raw.to_string())).await.unwrap();
}

async fn wait_for_count(state: &AppState, n: usize) {
    for _ in 0..500 {
        if state.hub.connection_count() == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {n} connections, have {}",
        state.hub.connection_count()
    );
}

fn chat(sender: &str, text: &str, recipient: &str) -> ServerFrame {
    ServerFrame::message(sender, text, sender == recipient)
}

#[tokio::test]
async fn three_clients_hi_then_bye() {
    let (url, state) = start_server().await;
    let (mut c1, n1) = join(&url).await;
    let (mut c2, n2) = join(&url).await;
    let (mut c3, n3) = join(&url).await;
    wait_for_count(&state, 3).await;

    say(&mut c1, r#"{"message":"hi"}"#).await;
    assert_eq!(next_frame(&mut c1).await, chat(&n1, "hi", &n1));
    assert_eq!(next_frame(&mut c2).await, chat(&n1, "hi", &n2));
    assert_eq!(next_frame(&mut c3).await, chat(&n1, "hi", &n3));

    c2.close(None).await.unwrap();
    wait_for_count(&state, 2).await;

    say(&mut c1, r#"{"message":"bye"}"#).await;
    assert_eq!(next_frame(&mut c1).await, chat(&n1, "bye", &n1));
    assert_eq!(next_frame(&mut c3).await, chat(&n1, "bye", &n3));
}

#[tokio::test]
async fn malformed_frames_are_dropped_and_connection_survives() {
    let (url, state) = start_server().await;
    let (mut c1, n1) = join(&url).await;
    let (mut c2, n2) = join(&url).await;
    wait_for_count(&state, 2).await;

    say(&mut c1, "not json").await;
    say(&mut c1, "{}").await;
    say(&mut c1, r#"{"message":"after"}"#).await;

    // the first message c2 sees is the valid one
    assert_eq!(next_frame(&mut c2).await, chat(&n1, "after", &n2));
    assert_eq!(next_frame(&mut c1).await, chat(&n1, "after", &n1));
    assert_eq!(state.hub.connection_count(), 2);
}

#[tokio::test]
async fn messages_from_one_sender_arrive_in_order() {
    let (url, state) = start_server().await;
    let (mut a, na) = join(&url).await;
    let (mut b, nb) = join(&url).await;
    wait_for_count(&state, 2).await;

    for i in 0..10 {
        say(&mut a, &format!(r#"{{"message":"m{i}"}}"#)).await;
    }
    for i in 0..10 {
        assert_eq!(next_frame(&mut b).await, chat(&na, &format!("m{i}"), &nb));
    }
}

#[tokio::test]
async fn ping_is_answered_once() {
    let (url, _state) = start_server().await;
    let (mut client, _) = join(&url).await;

    client.send(Message::Ping("hb".into())).await.unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for pong")
        .expect("stream ended")
        .expect("read error");
    assert_eq!(reply, Message::Pong("hb".into()));

    let extra = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(extra.is_err(), "unexpected frame after pong: {extra:?}");
}
