use std::sync::{atomic::AtomicBool, Arc};

use futures_channel::mpsc::{UnboundedReceiver, UnboundedSender};

use super::events::{ClientEvent, ServerEvent};

pub type OutboundSink = UnboundedSender<ClientEvent>;
pub type OutboundSource = UnboundedReceiver<ClientEvent>;
pub type InboundSink = UnboundedSender<ServerEvent>;
pub type InboundSource = UnboundedReceiver<ServerEvent>;
pub type ConnectedFlag = Arc<AtomicBool>;

/// A handler folds one inbound event into some context `C`.
pub type Handler<C> = Box<dyn FnMut(&mut C, ServerEvent) + Send>;
