// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The stanza dispatcher and its reconnect supervisor.
//!
//! One spawned task per client owns the live [`Session`] end to end:
//! it reads stanzas in arrival order, routes derived events to the
//! subscriber conduits, and performs every write on behalf of the
//! facade via a bounded command queue. Funnelling writes through the
//! owning task is what makes the mid-reconnect session swap safe:
//! no other task ever holds a reference to the transport.

use core::time::Duration;
use std::io;

use tokio::sync::{mpsc, watch};

use crate::config::Config;
use crate::error::Error;
use crate::event::{Message, MessageKind, Room, User};
use crate::ns;
use crate::session::{self, Session};
use crate::transport::{Connector, Packet, Stanza};
use crate::Identity;

/// Write sides of the subscriber conduits.
pub(crate) struct Channels {
    pub(crate) messages: mpsc::Sender<Message>,
    pub(crate) rooms: mpsc::Sender<Vec<Room>>,
    pub(crate) users: mpsc::Sender<Vec<User>>,
    pub(crate) connected: mpsc::Sender<bool>,
    pub(crate) faults: mpsc::Sender<Error>,
}

pub(crate) struct Dispatcher<C: Connector> {
    connector: C,
    config: Config,
    identity: Identity,
    session: Session<C::Transport>,
    commands: mpsc::Receiver<Packet>,
    channels: Channels,
    shutdown: watch::Receiver<bool>,
}

impl<C: Connector> Dispatcher<C> {
    pub(crate) fn new(
        connector: C,
        config: Config,
        identity: Identity,
        session: Session<C::Transport>,
        commands: mpsc::Receiver<Packet>,
        channels: Channels,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Dispatcher {
            connector,
            config,
            identity,
            session,
            commands,
            channels,
            shutdown,
        }
    }

    /// Run until shutdown, the client is dropped, or reconnection is
    /// exhausted. Exactly one stanza is consumed per iteration.
    pub(crate) async fn run(mut self) {
        self.signal_connected();
        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    debug!("shutdown requested, stopping dispatch");
                    break;
                }
                command = self.commands.recv() => match command {
                    Some(packet) => {
                        if let Err(e) = self.session.send(&packet).await {
                            // The read path owns recovery; a broken
                            // connection surfaces there as well.
                            warn!("write failed: {}", e);
                        }
                    }
                    None => {
                        debug!("client dropped, stopping dispatch");
                        break;
                    }
                },
                stanza = self.session.recv() => {
                    let error = match stanza {
                        Ok(Some(stanza)) => {
                            if !self.handle_stanza(stanza).await {
                                break;
                            }
                            continue;
                        }
                        Ok(None) => io::Error::new(
                            io::ErrorKind::ConnectionAborted,
                            "peer closed the stream",
                        ),
                        Err(e) => e,
                    };
                    if !self.recover(error.into()).await {
                        break;
                    }
                }
            }
        }
    }

    /// Classify one stanza and deliver at most one subscriber event.
    ///
    /// Sends block until the subscriber drains. Returns `false` when a
    /// conduit is closed, i.e. the client side is gone.
    async fn handle_stanza(&mut self, stanza: Stanza) -> bool {
        match (stanza.name.as_str(), stanza.ns.as_str()) {
            ("iq", ns::CLIENT) => {
                let Some(query) = stanza.query else {
                    return true;
                };
                match query.ns.as_str() {
                    ns::DISCO_ITEMS => {
                        let rooms: Vec<Room> = query
                            .items
                            .into_iter()
                            .map(|item| Room {
                                id: item.jid,
                                name: item.name,
                            })
                            .collect();
                        trace!("delivering {} discovered rooms", rooms.len());
                        self.channels.rooms.send(rooms).await.is_ok()
                    }
                    ns::ROSTER => {
                        let users: Vec<User> = query
                            .items
                            .into_iter()
                            .map(|item| User {
                                id: item.jid,
                                name: item.name,
                                mention_name: item.mention_name,
                            })
                            .collect();
                        trace!("delivering roster of {} users", users.len());
                        self.channels.users.send(users).await.is_ok()
                    }
                    _ => true,
                }
            }
            ("presence", ns::CLIENT) => {
                // Inspected but not surfaced yet.
                trace!("ignoring presence from {:?}", stanza.attr("from"));
                true
            }
            ("message", ns::CLIENT) => match filter_message(&stanza) {
                Some(message) => self.channels.messages.send(message).await.is_ok(),
                None => true,
            },
            _ => true,
        }
    }

    /// Reconnect supervisor: bounded two-tier retry, replacing the
    /// session on success. Returns `false` when dispatch must stop,
    /// either because shutdown arrived mid-backoff or because every
    /// attempt failed and the fault was delivered.
    async fn recover(&mut self, cause: Error) -> bool {
        warn!("connection lost ({}), starting reconnect", cause);
        let policy = self.config.reconnect.clone();
        let mut last = cause;
        for round in 0..policy.outer_rounds {
            for attempt in 1..=policy.inner_attempts {
                if !self.pause(policy.attempt_delay(attempt)).await {
                    return false;
                }
                match session::establish(&self.connector, &self.config, &self.identity).await {
                    Ok(session) => {
                        info!(
                            "reconnected as {} (round {}, attempt {})",
                            self.identity.jid(),
                            round,
                            attempt
                        );
                        self.session = session;
                        self.signal_connected();
                        return true;
                    }
                    Err(e) => {
                        warn!("reconnect attempt {} of round {} failed: {}", attempt, round, e);
                        last = e;
                    }
                }
            }
            if !self.pause(policy.round_delay(round)).await {
                return false;
            }
        }
        error!("reconnect attempts exhausted: {}", last);
        let _ = self
            .channels
            .faults
            .send(Error::ReconnectExhausted(Box::new(last)))
            .await;
        false
    }

    /// Sleep unless shutdown arrives first; `false` means stop.
    async fn pause(&mut self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !*self.shutdown.borrow();
        }
        tokio::select! {
            _ = self.shutdown.changed() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Emit one connect-event from a one-shot task, so an absent
    /// subscriber never stalls dispatch or the supervisor.
    fn signal_connected(&self) {
        let tx = self.channels.connected.clone();
        tokio::spawn(async move {
            let _ = tx.send(true).await;
        });
    }
}

/// Apply the message filter: only chat/groupchat stanzas with a
/// non-empty body qualify. An empty body denotes a typing-indicator
/// toggle and is dropped.
fn filter_message(stanza: &Stanza) -> Option<Message> {
    let kind = stanza.attr("type").and_then(MessageKind::from_attr)?;
    let body = stanza.body.as_deref().filter(|body| !body.is_empty())?;
    Some(Message {
        id: stanza.attr("mid").unwrap_or_default().to_owned(),
        from: stanza.attr("from").unwrap_or_default().to_owned(),
        to: stanza.attr("to").unwrap_or_default().to_owned(),
        body: body.to_owned(),
        kind,
    })
}
