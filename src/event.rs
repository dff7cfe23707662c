// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Events delivered to subscribers, and the conduits carrying them.

use core::pin::Pin;
use core::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::error::Error;

/// Kind of a delivered chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// One-to-one message.
    Chat,
    /// Message inside a room.
    GroupChat,
}

impl MessageKind {
    /// Parse the wire `type` attribute; anything else is filtered out.
    pub(crate) fn from_attr(value: &str) -> Option<Self> {
        match value {
            "chat" => Some(MessageKind::Chat),
            "groupchat" => Some(MessageKind::GroupChat),
            _ => None,
        }
    }
}

/// A message received from the service.
///
/// Only stanzas of kind chat/groupchat with a non-empty body become
/// a `Message`; everything else (typing indicators in particular) is
/// dropped by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Service-assigned message id, empty if the stanza carried none.
    pub id: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Message text.
    pub body: String,
    /// Chat or group chat.
    pub kind: MessageKind,
}

/// A member of the service, from a roster reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub mention_name: String,
}

/// A room the client can join, from a discovery reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub name: String,
}

/// Read side of a subscriber conduit.
///
/// Conduits are effectively unbuffered: the dispatcher blocks on
/// delivery until the subscriber drains, which is the client's
/// backpressure mechanism. Consume [`Events::messages`] promptly or
/// dispatch stalls.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Subscription { rx }
    }

    /// Receive the next event, or `None` once the dispatcher is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Subscriber conduits handed out once per client at connect time.
///
/// A subscriber that attaches late misses prior events; none of these
/// conduits replay.
pub struct Events {
    /// Incoming chat and group-chat messages.
    pub messages: Subscription<Message>,
    /// Fires `true` once per successful connect and reconnect.
    pub connect_events: Subscription<bool>,
    /// Carries the final error when reconnection is exhausted; the
    /// dispatcher terminates right after delivering it.
    pub faults: Subscription<Error>,
}
