//! WebSocket connection handling

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::AppState;
use crate::registry::OutboundFrame;
use crate::session::Session;

/// What the reader loop got from the socket
enum Inbound {
    Frame(String),
    Closed,
}

/// Drive one WebSocket connection until either side closes it
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let writer = tokio::spawn(write_frames(sink, rx));

    let mut session = Session::new(state.registry.clone());
    session.accept(tx).await;

    if let Some(text) = first_frame(&mut stream, &mut session, state.registration_timeout).await {
        session.handle_frame(&text).await;

        while let Inbound::Frame(text) = next_frame(&mut stream).await {
            session.handle_frame(&text).await;
        }
    }

    session.close().await;

    // The registry held the last sender besides the session, so the writer
    // drains what is queued and then stops.
    if let Err(e) = writer.await {
        warn!(session_id = %session.id(), "Writer task failed: {}", e);
    }
}

/// Wait for the registration frame, honouring the optional timeout
async fn first_frame(
    stream: &mut SplitStream<WebSocket>,
    session: &mut Session,
    timeout: Option<Duration>,
) -> Option<String> {
    let Some(timeout) = timeout else {
        return match next_frame(stream).await {
            Inbound::Frame(text) => Some(text),
            Inbound::Closed => None,
        };
    };

    match tokio::time::timeout(timeout, next_frame(stream)).await {
        Ok(Inbound::Frame(text)) => Some(text),
        Ok(Inbound::Closed) => None,
        Err(_) => {
            session.registration_timed_out().await;
            None
        }
    }
}

/// Read until the next frame carrying text, or until the socket ends
async fn next_frame(stream: &mut SplitStream<WebSocket>) -> Inbound {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => return Inbound::Frame(text),
            Ok(Message::Binary(data)) => {
                return Inbound::Frame(String::from_utf8_lossy(&data).into_owned());
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket client sent close frame");
                return Inbound::Closed;
            }
            Ok(_) => {
                // Pings are answered by axum; pongs carry nothing for us
            }
            Err(e) => {
                debug!("WebSocket read error: {}", e);
                return Inbound::Closed;
            }
        }
    }
    Inbound::Closed
}

/// Forward queued frames to the socket in order
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = sink.send(Message::Text(frame.to_string())).await {
            debug!("WebSocket send failed: {}", e);
            break;
        }
    }
    let _ = sink.close().await;
}
