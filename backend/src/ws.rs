//! Websocket transport for the dispatcher

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::Receiver;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::registry::Connection;

#[derive(Clone)]
struct WsState {
    dispatcher: Arc<Dispatcher>,
    keepalive: Option<Duration>,
}

pub fn router(dispatcher: Arc<Dispatcher>, keepalive: Option<Duration>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(WsState {
            dispatcher,
            keepalive,
        })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (sink, mut stream) = socket.split();
    let (conn, outbound) = Connection::channel();
    info!("{} opened", conn.id());

    let writer = tokio::spawn(write_loop(sink, outbound, state.keepalive));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => state.dispatcher.handle_text(&conn, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!("{} read failed: {}", conn.id(), err);
                break;
            }
        }
    }

    state.dispatcher.disconnect(&conn);
    writer.abort();
    info!("{} closed", conn.id());
}

async fn write_loop(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outbound: Receiver<String>,
    keepalive: Option<Duration>,
) {
    let mut pings = keepalive.map(|period| {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            next = outbound.recv() => {
                let Some(text) = next else { break };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = tick(&mut pings) => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("Writer stopped");
}

/// Next keepalive tick, or never when pings are disabled
async fn tick(pings: &mut Option<Interval>) {
    match pings {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
