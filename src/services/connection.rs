use std::{
    collections::HashMap,
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use futures_channel::mpsc::unbounded;
use futures_util::{Sink, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{
    domain::{
        events::{ClientEvent, EventKind, ServerEvent},
        types::{ConnectedFlag, Handler, InboundSource, OutboundSink},
    },
    handlers::{messages::outbound_message_handler, recv_routing::recv_routing_handler},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Emit-only handle onto the connection. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Emitter {
    sink: OutboundSink,
    connected: ConnectedFlag,
}

impl Emitter {
    pub fn new(sink: OutboundSink, connected: ConnectedFlag) -> Self {
        Self { sink, connected }
    }

    /// Fire and forget. Silently dropped once the connection is down.
    pub fn emit(&self, event: ClientEvent) {
        if !self.is_connected() {
            log::debug!("Not connected, dropping {event:?}");
            return;
        }
        if let Err(e) = self.sink.unbounded_send(event) {
            log::debug!("Outbound channel closed, dropped {:?}", e.into_inner());
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.sink.is_closed()
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }
}

/// The single connection a session talks through.
///
/// Inbound events are pulled with [`ConnectionAdapter::next_event`] and routed
/// to the one handler registered for their kind with
/// [`ConnectionAdapter::dispatch`]. `C` is whatever the handlers fold events into.
pub struct ConnectionAdapter<C> {
    emitter: Emitter,
    inbound: InboundSource,
    handlers: HashMap<EventKind, Handler<C>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl<C> ConnectionAdapter<C> {
    /// In-process transport: events sent on `outbound`'s receiver side are what
    /// the adapter emitted, events pushed into `inbound`'s sender side are delivered.
    pub fn from_channels(outbound: OutboundSink, inbound: InboundSource) -> Self {
        Self {
            emitter: Emitter::new(outbound, Arc::new(AtomicBool::new(true))),
            inbound,
            handlers: HashMap::new(),
            reader: None,
            writer: None,
        }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url).await?;
        log::info!("Connected to {url}");
        Ok(Self::attach(ws_stream))
    }

    /// Wraps an already open websocket, spawning its reader and writer workers.
    pub fn attach<S>(socket: S) -> Self
    where
        S: Stream<Item = Result<Message, WsError>> + Sink<Message> + Send + 'static,
        <S as Sink<Message>>::Error: Display + Send,
    {
        let (ws_sink, ws_source) = socket.split();
        let (outbound_tx, outbound_rx) = unbounded::<ClientEvent>();
        let (inbound_tx, inbound_rx) = unbounded::<ServerEvent>();

        let mut adapter = Self::from_channels(outbound_tx, inbound_rx);
        let connected = adapter.emitter.connected.clone();

        adapter.writer = Some(tokio::spawn(outbound_message_handler(
            ws_sink,
            outbound_rx,
            connected.clone(),
        )));
        adapter.reader = Some(tokio::spawn(recv_routing_handler(
            ws_source, inbound_tx, connected,
        )));
        adapter
    }

    pub fn emitter(&self) -> Emitter {
        self.emitter.clone()
    }

    pub fn emit(&self, event: ClientEvent) {
        self.emitter.emit(event);
    }

    pub fn is_connected(&self) -> bool {
        self.emitter.is_connected()
    }

    /// Registers the handler for `kind`, replacing any previous one.
    /// Returns whether a handler was replaced.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> bool
    where
        F: FnMut(&mut C, ServerEvent) + Send + 'static,
    {
        let replaced = self.handlers.insert(kind, Box::new(handler)).is_some();
        if replaced {
            log::debug!("Replaced handler for {kind}");
        }
        replaced
    }

    pub fn off(&mut self, kind: EventKind) -> bool {
        self.handlers.remove(&kind).is_some()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Next inbound event in delivery order. `None` means the connection is gone.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        let event = self.inbound.next().await;
        if event.is_none() {
            self.emitter.mark_disconnected();
        }
        event
    }

    /// Runs the handler registered for the event's kind. Returns false if there was none.
    pub fn dispatch(&mut self, ctx: &mut C, event: ServerEvent) -> bool {
        let kind = event.kind();
        match self.handlers.get_mut(&kind) {
            Some(handler) => {
                handler(ctx, event);
                true
            }
            None => {
                log::debug!("No handler registered for {kind}, dropping event");
                false
            }
        }
    }

    /// Tears the connection down: all handlers go, the writer flushes and closes
    /// the socket, the reader stops.
    pub fn close(&mut self) {
        self.handlers.clear();
        self.emitter.sink.close_channel();
        self.emitter.mark_disconnected();
        self.inbound.close();
        // writer is left to finish its close handshake
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        log::info!("Connection closed");
    }

    /// [`ConnectionAdapter::close`], then waits a bounded time for the writer to
    /// finish the close handshake.
    pub async fn shutdown(&mut self) {
        self.close();
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut writer).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Socket writer ended abnormally. Error: {e}"),
            Err(_) => {
                log::warn!("Socket writer did not finish within {SHUTDOWN_TIMEOUT:?}, aborting");
                writer.abort();
            }
        }
    }
}

impl<C> Drop for ConnectionAdapter<C> {
    fn drop(&mut self) {
        for worker in [self.reader.take(), self.writer.take()].into_iter().flatten() {
            if !worker.is_finished() {
                worker.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_channel::mpsc::UnboundedReceiver;

    use super::*;
    use crate::domain::user::User;

    #[derive(Default)]
    struct Seen {
        names: Vec<String>,
    }

    fn adapter() -> (
        ConnectionAdapter<Seen>,
        UnboundedReceiver<ClientEvent>,
        futures_channel::mpsc::UnboundedSender<ServerEvent>,
    ) {
        let (outbound_tx, outbound_rx) = unbounded();
        let (inbound_tx, inbound_rx) = unbounded();
        (
            ConnectionAdapter::from_channels(outbound_tx, inbound_rx),
            outbound_rx,
            inbound_tx,
        )
    }

    fn joined(name: &str) -> ServerEvent {
        ServerEvent::UserJoined {
            user: User::new(name, name, false),
        }
    }

    #[test]
    fn re_registering_replaces_the_handler() {
        let (mut adapter, _out, _in) = adapter();
        assert!(!adapter.on(EventKind::UserJoined, |seen: &mut Seen, _| {
            seen.names.push("first".into())
        }));
        assert!(adapter.on(EventKind::UserJoined, |seen: &mut Seen, _| {
            seen.names.push("second".into())
        }));
        assert_eq!(adapter.handler_count(), 1);

        let mut seen = Seen::default();
        assert!(adapter.dispatch(&mut seen, joined("bob")));
        assert_eq!(seen.names, vec!["second"]);
    }

    #[test]
    fn events_without_a_handler_are_dropped() {
        let (mut adapter, _out, _in) = adapter();
        adapter.on(EventKind::UserJoined, |seen: &mut Seen, _| {
            seen.names.push("joined".into())
        });
        assert!(adapter.off(EventKind::UserJoined));
        assert!(!adapter.off(EventKind::UserJoined));

        let mut seen = Seen::default();
        assert!(!adapter.dispatch(&mut seen, joined("bob")));
        assert!(seen.names.is_empty());
    }

    #[test]
    fn emit_is_forwarded_until_closed() {
        let (mut adapter, mut out, _in) = adapter();
        adapter.on(EventKind::Welcome, |_: &mut Seen, _| {});
        adapter.emit(ClientEvent::Typing);
        adapter.close();
        adapter.emit(ClientEvent::StopTyping);

        assert_eq!(out.try_next().unwrap(), Some(ClientEvent::Typing));
        assert_eq!(out.try_next().unwrap(), None);
        assert_eq!(adapter.handler_count(), 0);
        assert!(!adapter.is_connected());
    }

    #[tokio::test]
    async fn end_of_inbound_is_the_disconnect_signal() {
        let (mut adapter, mut out, inbound) = adapter();
        let emitter = adapter.emitter();
        inbound.unbounded_send(joined("bob")).unwrap();
        drop(inbound);

        assert_eq!(adapter.next_event().await, Some(joined("bob")));
        assert!(adapter.is_connected());
        assert_eq!(adapter.next_event().await, None);
        assert!(!adapter.is_connected());

        emitter.emit(ClientEvent::Typing);
        assert!(out.try_next().is_err());
    }
}
