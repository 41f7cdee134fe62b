use std::sync::atomic::Ordering;

use futures_util::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::domain::{
    events::ServerEvent,
    types::{ConnectedFlag, InboundSink},
};

/// Decodes one websocket frame. Control frames and undecodable payloads give `None`.
pub fn decode_frame(msg: &Message) -> Option<ServerEvent> {
    let decoded = match msg {
        Message::Text(text) => serde_json::from_str::<ServerEvent>(text),
        Message::Binary(data) => serde_json::from_slice::<ServerEvent>(data),
        _ => return None,
    };

    match decoded {
        Ok(event) => Some(event),
        Err(e) => {
            log::warn!("Dropping undecodable server frame. Error: {e}");
            None
        }
    }
}

/// Reads frames off the socket and routes decoded events into the inbound channel
/// until the socket closes, errors, or nobody is listening any more.
pub async fn recv_routing_handler<S>(
    mut ws_source: S,
    inbound: InboundSink,
    connected: ConnectedFlag,
) where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    'main_loop: while let Some(frame) = ws_source.next().await {
        let msg = match frame {
            Ok(Message::Close(reason)) => {
                log::info!("Server closed the connection: {reason:?}");
                break 'main_loop;
            }
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Websocket read failed, dropping connection. Error: {e}");
                break 'main_loop;
            }
        };

        let Some(event) = decode_frame(&msg) else {
            continue 'main_loop;
        };

        log::debug!("Received {}", event.kind());
        if inbound.unbounded_send(event).is_err() {
            log::debug!("Inbound channel closed, stopping reader.");
            break 'main_loop;
        }
    }

    connected.store(false, Ordering::Release);
    inbound.close_channel();
}
