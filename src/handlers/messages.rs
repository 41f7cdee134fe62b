use std::{fmt::Display, sync::atomic::Ordering};

use anyhow::{anyhow, Result};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::domain::{
    events::ClientEvent,
    types::{ConnectedFlag, OutboundSource},
};

pub fn encode_frame(event: &ClientEvent) -> Result<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Ok(Message::Text(text)),
        Err(e) => Err(anyhow!("Failed serializing {event:?}. Error: {e}")),
    }
}

/// Drains the outbound channel onto the socket. When the channel closes the
/// socket is closed politely; when the socket fails the connection is flagged down.
pub async fn outbound_message_handler<K>(
    mut ws_sink: K,
    mut outbound: OutboundSource,
    connected: ConnectedFlag,
) where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    while let Some(event) = outbound.next().await {
        let frame = match encode_frame(&event) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("{e}");
                continue;
            }
        };

        if let Err(e) = ws_sink.send(frame).await {
            log::error!("Websocket write failed, dropping connection. Error: {e}");
            connected.store(false, Ordering::Release);
            outbound.close();
            return;
        }
    }

    log::debug!("Outbound channel closed, closing socket.");
    connected.store(false, Ordering::Release);
    if let Err(e) = ws_sink.close().await {
        log::debug!("Socket close did not complete cleanly. Error: {e}");
    }
}
