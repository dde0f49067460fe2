//! WebSocket test client for protocol testing
//!
//! Provides both low-level WsConnection and high-level TestClient.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for an expected frame
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to the WebSocket endpoint
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/", addr);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send raw binary message
    #[allow(dead_code)]
    pub async fn send_binary(&mut self, data: &[u8]) {
        self.sink
            .send(Message::Binary(data.to_vec().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message, None if the socket closed
    pub async fn next_text(&mut self) -> Option<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.to_string()),
                Some(Ok(Message::Close(_))) => return None,
                Some(Ok(_)) => continue,
                Some(Err(_)) => return None,
                None => return None,
            }
        }
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        tokio::time::timeout(RECV_TIMEOUT, self.next_text())
            .await
            .expect("Timeout waiting for message")
            .expect("WebSocket closed")
    }

    /// Receive and deserialize JSON message
    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> T {
        let text = self.recv_raw().await;
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Receive with timeout, returns None if timeout or closed
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.next_text())
            .await
            .ok()
            .flatten()
    }

    /// Close the connection from the client side
    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

/// High-level test client with helper methods
pub struct TestClient {
    pub conn: WsConnection,
}

impl TestClient {
    /// Connect to server (consumes the registration hint)
    pub async fn connect(addr: SocketAddr) -> Self {
        let mut conn = WsConnection::connect(addr).await;

        let hint: Value = conn.recv_json().await;
        assert_eq!(hint["type"], "system", "Expected hint on connect");
        assert!(
            hint["text"].as_str().unwrap().contains("register"),
            "Hint should explain registration: {}",
            hint
        );

        Self { conn }
    }

    /// Connect and register, consuming the welcome message
    #[allow(dead_code)]
    pub async fn connect_as(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.register(name).await;
        client
    }

    /// Send a register frame and assert the welcome
    #[allow(dead_code)]
    pub async fn register(&mut self, name: &str) {
        self.conn
            .send_json(&json!({"type": "register", "name": name}))
            .await;

        let welcome = self.recv().await;
        assert_eq!(
            welcome,
            json!({"type": "system", "text": format!("Welcome, {}!", name.trim())}),
        );
    }

    /// Send a chat frame
    #[allow(dead_code)]
    pub async fn say(&mut self, text: &str) {
        self.conn
            .send_json(&json!({"type": "message", "text": text}))
            .await;
    }

    /// Receive next message
    pub async fn recv(&mut self) -> Value {
        self.conn.recv_json().await
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        if let Some(text) = self.conn.recv_timeout(duration).await {
            panic!("Expected no message but received: {}", text);
        }
    }

    /// Assert the server closes the connection within the timeout
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) {
        let result = tokio::time::timeout(RECV_TIMEOUT, self.conn.next_text()).await;
        match result {
            Ok(None) => {}
            Ok(Some(text)) => panic!("Expected close but received: {}", text),
            Err(_) => panic!("Timeout waiting for server to close"),
        }
    }

    /// Close the connection
    #[allow(dead_code)]
    pub async fn close(self) {
        self.conn.close().await;
    }
}
