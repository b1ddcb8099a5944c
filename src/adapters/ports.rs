// In-process port table.
//
// Stands in for the application runtime's port mechanism: each outbound
// channel holds at most one subscriber, and inbound values are queued on a
// tokio unbounded channel for the application side to drain.

use crate::domain::model::{InboundChannel, InboundMessage, OutboundChannel, Payload};
use crate::domain::ports::{InboundPort, OutboundPort, PortHandler, PortTable};
use crate::utils::error::{BridgeError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub struct LocalOutboundPort {
    name: String,
    handler: Mutex<Option<PortHandler>>,
}

impl LocalOutboundPort {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            handler: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_subscriber(&self) -> bool {
        self.handler
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Runs the subscriber to completion. Returns `false` when nobody listens.
    ///
    /// The subscriber must not emit on its own channel.
    pub fn emit(&self, value: Payload) -> bool {
        let mut slot = match self.handler.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot.as_mut() {
            Some(handler) => {
                handler(value);
                true
            }
            None => {
                tracing::debug!("No subscriber on {}, message dropped", self.name);
                false
            }
        }
    }
}

impl OutboundPort for LocalOutboundPort {
    fn subscribe(&self, handler: PortHandler) -> Result<()> {
        let mut slot = match self.handler.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_some() {
            return Err(BridgeError::AlreadySubscribed {
                channel: self.name.clone(),
            });
        }
        *slot = Some(handler);
        Ok(())
    }
}

pub struct LocalInboundPort {
    channel: InboundChannel,
    sender: UnboundedSender<InboundMessage>,
}

impl InboundPort for LocalInboundPort {
    fn send(&self, value: Payload) {
        let message = InboundMessage {
            channel: self.channel,
            value,
        };
        if self.sender.send(message).is_err() {
            tracing::debug!("Application stopped listening on {}", self.channel);
        }
    }
}

pub struct LocalPortTable {
    outbound: HashMap<String, Arc<LocalOutboundPort>>,
    inbound: HashMap<String, Arc<LocalInboundPort>>,
    receiver: Mutex<Option<UnboundedReceiver<InboundMessage>>>,
}

impl LocalPortTable {
    /// A table exposing every channel the bridge expects.
    pub fn new() -> Self {
        Self::with_channels(&OutboundChannel::ALL, &InboundChannel::ALL)
    }

    /// A full table together with its application-side receiver.
    pub fn with_receiver() -> (Self, UnboundedReceiver<InboundMessage>) {
        Self::build(&OutboundChannel::ALL, &InboundChannel::ALL)
    }

    pub fn with_channels(outbound: &[OutboundChannel], inbound: &[InboundChannel]) -> Self {
        let (mut table, receiver) = Self::build(outbound, inbound);
        table.receiver = Mutex::new(Some(receiver));
        table
    }

    fn build(
        outbound: &[OutboundChannel],
        inbound: &[InboundChannel],
    ) -> (Self, UnboundedReceiver<InboundMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let outbound = outbound
            .iter()
            .map(|channel| {
                (
                    channel.name().to_string(),
                    Arc::new(LocalOutboundPort::new(channel.name())),
                )
            })
            .collect();

        let inbound = inbound
            .iter()
            .map(|channel| {
                (
                    channel.name().to_string(),
                    Arc::new(LocalInboundPort {
                        channel: *channel,
                        sender: sender.clone(),
                    }),
                )
            })
            .collect();

        let table = Self {
            outbound,
            inbound,
            receiver: Mutex::new(None),
        };
        (table, receiver)
    }

    /// Delivers `value` to the subscriber of the named outbound channel.
    pub fn emit(&self, name: &str, value: Payload) -> Result<bool> {
        let port = self
            .outbound
            .get(name)
            .ok_or_else(|| BridgeError::UnknownChannel {
                name: name.to_string(),
            })?;
        Ok(port.emit(value))
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.outbound
            .get(name)
            .map(|port| port.has_subscriber())
            .unwrap_or(false)
    }

    /// Hands out the application-side receiver. Only the first call gets it,
    /// and tables from `with_receiver` never hold one.
    pub fn take_inbound(&self) -> Option<UnboundedReceiver<InboundMessage>> {
        self.receiver.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Default for LocalPortTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PortTable for LocalPortTable {
    fn outbound(&self, name: &str) -> Option<Arc<dyn OutboundPort>> {
        self.outbound
            .get(name)
            .map(|port| Arc::clone(port) as Arc<dyn OutboundPort>)
    }

    fn inbound(&self, name: &str) -> Option<Arc<dyn InboundPort>> {
        self.inbound
            .get(name)
            .map(|port| Arc::clone(port) as Arc<dyn InboundPort>)
    }
}
