use crate::{
    Service,
    statistics::{Statistics, Stats},
};

use std::{net::SocketAddr, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use service::Transport;
use tokio::{
    sync::mpsc::{Sender, channel},
    time::timeout,
};

/// The sending half of a peer's websocket.
///
/// Frames are queued to the task that owns the socket, which writes them in
/// order. The transport counts as closed as soon as that task has exited.
/// The queue is bounded: while it is full, sending fails instead of waiting
/// for the peer to catch up.
#[derive(Clone)]
pub struct WebSocketSender(Sender<String>);

impl Transport for WebSocketSender {
    fn is_open(&self) -> bool {
        !self.0.is_closed()
    }

    fn send(&self, message: String) -> bool {
        self.0.try_send(message).is_ok()
    }
}

/// serve one upgraded websocket until either side goes away.
pub async fn websocket_session(
    socket: WebSocket,
    addr: SocketAddr,
    queue: usize,
    service: Service,
    statistics: Statistics,
) {
    let (mut writer, mut reader) = socket.split();
    let (sender, mut receiver) = channel(queue.max(1));

    let id = service.admit(WebSocketSender(sender));
    let relay = service.get_relay(id.clone());

    log::info!("websocket accept: addr={}, id={}", addr, id);

    loop {
        tokio::select! {
            message = reader.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text.as_str().to_string(),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            statistics.add(&id, &[Stats::Received(1), Stats::Errors(1)]);
                            log::warn!("websocket binary frame is not utf8: id={}", id);

                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        log::debug!("websocket read failed: id={}, err={}", id, e);

                        break;
                    }
                };

                statistics.add(&id, &[Stats::Received(1)]);
                log::trace!("websocket receive: id={}, size={}", id, text.len());

                // A bad frame is dropped, the connection stays up.
                if let Err(e) = relay.process(&text) {
                    statistics.add(&id, &[Stats::Errors(1)]);

                    match e {
                        codec::Error::UnknownMessage => {
                            log::debug!("unknown message: id={}, message={}", id, text)
                        }
                        codec::Error::Json(_) => {
                            log::warn!("malformed message: id={}, err={}", id, e)
                        }
                    }
                }
            }
            Some(message) = receiver.recv() => {
                log::trace!("websocket send: id={}, size={}", id, message.len());

                if writer.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Close the queue before the peer leaves the registry, so that nothing is
    // handed to it in between.
    receiver.close();
    service.remove(&id);

    // Flushes the reply to a close frame sent by the peer. A peer that stopped
    // reading doesn't get to hold the task.
    let _ = timeout(Duration::from_secs(5), writer.close()).await;

    log::info!("websocket disconnect: addr={}, id={}", addr, id);
}
