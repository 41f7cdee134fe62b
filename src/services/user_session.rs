use std::time::Duration;

use anyhow::Result;
use futures_channel::mpsc::UnboundedSender;
use futures_util::{Stream, StreamExt};
use tokio::time::{sleep_until, Instant};

use crate::domain::user::User;

use super::{
    config::ClientConfig,
    connection::ConnectionAdapter,
    identity::{load_identity, save_identity, FileStore, SessionStore},
    session::{ChatSession, UiInput},
    view::SessionView,
};

/// Top-level owner of one chat session: the connection, the state machine and
/// the identity store. Handlers are registered once in [`SessionWorker::new`]
/// and torn down once when [`SessionWorker::run`] returns.
pub struct SessionWorker {
    adapter: ConnectionAdapter<ChatSession>,
    session: ChatSession,
    store: Box<dyn SessionStore + Send>,
    persisted: Option<User>,
}

impl SessionWorker {
    pub fn new(
        mut adapter: ConnectionAdapter<ChatSession>,
        store: Box<dyn SessionStore + Send>,
        quiet_period: Duration,
    ) -> Self {
        let identity = load_identity(&*store);
        match &identity {
            Some(user) => log::info!("Resuming session identity {} ({})", user.username, user.id),
            None => log::info!("No session identity stored yet"),
        }

        let session = ChatSession::new(identity.clone(), adapter.emitter(), quiet_period);
        ChatSession::register_handlers(&mut adapter);

        SessionWorker {
            adapter,
            session,
            store,
            persisted: identity,
        }
    }

    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let adapter = ConnectionAdapter::connect(&config.server_url).await?;
        let store = Box::new(FileStore::new(&config.session_dir));
        Ok(SessionWorker::new(
            adapter,
            store,
            config.typing_quiet_period,
        ))
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    fn persist_identity(&mut self) {
        let Some(current) = self.session.identity() else {
            return;
        };
        if self.persisted.as_ref() == Some(current) {
            return;
        }

        let current = current.clone();
        if let Err(e) = save_identity(&mut *self.store, &current) {
            log::warn!("Failed to persist session identity. Error: {e}");
        }
        self.persisted = Some(current);
    }

    fn publish(&self, views: &UnboundedSender<SessionView>) -> bool {
        views
            .unbounded_send(SessionView::render(&self.session))
            .is_ok()
    }

    /// Drives the session until the UI quits, its input ends, or its view
    /// receiver goes away. Returns the final state.
    pub async fn run<I>(
        mut self,
        mut inputs: I,
        views: UnboundedSender<SessionView>,
    ) -> Result<ChatSession>
    where
        I: Stream<Item = UiInput> + Unpin,
    {
        let mut connected = true;
        let mut ui_attached = self.publish(&views);

        'main_loop: while ui_attached {
            let deadline = self.session.typing_deadline();

            tokio::select! {
                event = self.adapter.next_event(), if connected => {
                    match event {
                        Some(event) => {
                            self.adapter.dispatch(&mut self.session, event);
                        }
                        None => {
                            log::warn!("Lost connection to server, outbound events will be dropped.");
                            connected = false;
                        }
                    }
                }

                input = inputs.next() => {
                    match input {
                        None | Some(UiInput::Quit) => break 'main_loop,
                        Some(input) => self.session.handle_input(input, Instant::now()),
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.fire_typing_timer(Instant::now());
                }
            }

            self.persist_identity();
            ui_attached = self.publish(&views);
        }

        if !ui_attached {
            log::info!("View receiver dropped, ending session.");
        }
        self.adapter.shutdown().await;
        Ok(self.session)
    }
}
