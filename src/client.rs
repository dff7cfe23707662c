// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The public client facade.

use core::future::Future;
use core::time::Duration;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

use crate::config::Config;
use crate::dispatch::{Channels, Dispatcher};
use crate::error::Error;
use crate::event::{Events, Room, Subscription, User};
use crate::session;
use crate::transport::{Connector, Packet};
use crate::Identity;

/// Bound of the facade-to-dispatcher command queue. Fire-and-forget
/// operations block once this many writes are pending.
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Handle to a connected session.
///
/// All operations are issued through the dispatch task, which is the
/// sole owner of the live connection; the handle itself is cheap to
/// use from several tasks at once. Dropping the client (together with
/// any [`keep_alive`][`Client::keep_alive`] future it produced) ends
/// the dispatch task; [`close`][`Client::close`] does so explicitly.
pub struct Client {
    identity: Identity,
    account_domain: String,
    room_domain: String,
    keepalive_interval: Duration,
    commands: mpsc::Sender<Packet>,
    rooms: Arc<Mutex<mpsc::Receiver<Vec<Room>>>>,
    users: Arc<Mutex<mpsc::Receiver<Vec<User>>>>,
    shutdown: watch::Sender<bool>,
}

impl Client {
    /// Connect and authenticate, then start dispatching in the
    /// background.
    ///
    /// Dial and authentication failures are returned synchronously;
    /// later transport failures are handled by the reconnect
    /// supervisor and only surface on [`Events::faults`] once every
    /// retry is exhausted.
    pub async fn connect<C: Connector>(
        connector: C,
        config: Config,
        username: &str,
        password: &str,
        resource: &str,
    ) -> Result<(Self, Events), Error> {
        let identity = Identity::new(username, password, resource, &config.account_domain);
        let session = session::establish(&connector, &config, &identity).await?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        // Capacity 1 is the closest tokio gets to an unbuffered
        // conduit: the dispatcher blocks until the subscriber drains.
        let (message_tx, message_rx) = mpsc::channel(1);
        let (room_tx, room_rx) = mpsc::channel(1);
        let (user_tx, user_rx) = mpsc::channel(1);
        let (connected_tx, connected_rx) = mpsc::channel(1);
        let (fault_tx, fault_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let client = Client {
            identity: identity.clone(),
            account_domain: config.account_domain.clone(),
            room_domain: config.room_domain.clone(),
            keepalive_interval: config.keepalive_interval,
            commands: command_tx,
            rooms: Arc::new(Mutex::new(room_rx)),
            users: Arc::new(Mutex::new(user_rx)),
            shutdown: shutdown_tx,
        };
        let events = Events {
            messages: Subscription::new(message_rx),
            connect_events: Subscription::new(connected_rx),
            faults: Subscription::new(fault_rx),
        };

        let dispatcher = Dispatcher::new(
            connector,
            config,
            identity,
            session,
            command_rx,
            Channels {
                messages: message_tx,
                rooms: room_tx,
                users: user_tx,
                connected: connected_tx,
                faults: fault_tx,
            },
            shutdown_rx,
        );
        tokio::spawn(dispatcher.run());

        Ok((client, events))
    }

    /// The full address this client is authenticated as.
    pub fn id(&self) -> &str {
        self.identity.jid()
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    pub fn resource(&self) -> &str {
        self.identity.resource()
    }

    /// Fire-and-forget availability update (available, away, idle…).
    pub async fn status(&self, show: &str) -> Result<(), Error> {
        self.command(Packet::Presence {
            from: self.identity.jid().to_owned(),
            status: show.to_owned(),
        })
        .await
    }

    /// Join a room under the given nickname.
    ///
    /// Announces the occupant identity `room/nick` from our own full
    /// address; fire-and-forget.
    pub async fn join(&self, room: &str, nick: &str) -> Result<(), Error> {
        self.command(Packet::RoomPresence {
            occupant: format!("{}/{}", room, nick),
            from: self.identity.jid().to_owned(),
        })
        .await
    }

    /// Send a message, routed by destination: addresses within the
    /// room-service domain take the group-chat path, everything else
    /// the direct-message path.
    pub async fn say(&self, to: &str, nick: &str, body: &str) -> Result<(), Error> {
        let from = format!("{}/{}", self.identity.jid(), nick);
        let packet = if is_room_address(to, &self.room_domain) {
            Packet::GroupChat {
                to: to.to_owned(),
                from,
                body: body.to_owned(),
            }
        } else {
            Packet::Chat {
                to: to.to_owned(),
                from,
                body: body.to_owned(),
            }
        };
        self.command(packet).await
    }

    /// Discover the rooms available on the room service.
    ///
    /// Blocks until the single reply arrives. Replies carry no request
    /// id, so concurrent calls serialize on an internal lock: one
    /// discovery in flight at a time.
    pub async fn rooms(&self) -> Result<Vec<Room>, Error> {
        let mut replies = self.rooms.lock().await;
        self.command(Packet::DiscoQuery {
            from: self.identity.jid().to_owned(),
            domain: self.room_domain.clone(),
        })
        .await?;
        replies.recv().await.ok_or(Error::Disconnected)
    }

    /// Fetch the roster from the account service.
    ///
    /// Same single-slot request protocol as [`rooms`][`Client::rooms`].
    pub async fn users(&self) -> Result<Vec<User>, Error> {
        let mut replies = self.users.lock().await;
        self.command(Packet::RosterQuery {
            from: self.identity.jid().to_owned(),
            domain: self.account_domain.clone(),
        })
        .await?;
        replies.recv().await.ok_or(Error::Disconnected)
    }

    /// Periodic idle-prevention activity, one frame per interval.
    ///
    /// Spawn the returned future; it runs until the client is closed
    /// or dropped.
    pub fn keep_alive(&self) -> impl Future<Output = ()> + Send + 'static {
        let commands = self.commands.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.keepalive_interval;
        async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        if commands.send(Packet::KeepAlive).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Signal shutdown. The dispatch task stops at its next blocking
    /// point and all subscriber conduits end.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }

    async fn command(&self, packet: Packet) -> Result<(), Error> {
        self.commands
            .send(packet)
            .await
            .map_err(|_| Error::Disconnected)
    }
}

/// True when the destination's domain part is the room-service domain.
fn is_room_address(to: &str, room_domain: &str) -> bool {
    let after_at = match to.rsplit_once('@') {
        Some((_, rest)) => rest,
        None => to,
    };
    let domain = match after_at.split_once('/') {
        Some((domain, _)) => domain,
        None => after_at,
    };
    domain == room_domain
}
