// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stanza-level interface to the underlying stream protocol library.
//!
//! The client does not parse or serialize XML itself. It drives a
//! [`Transport`], which exposes the stream at stanza granularity:
//! one parsed [`Stanza`] per read, typed [`Packet`]s for writes, and
//! in-place stream operations (open, TLS upgrade, SASL PLAIN) for the
//! negotiation phase. A [`Connector`] dials fresh transports and is
//! invoked again for every reconnect attempt.

use core::future::Future;
use std::io;

/// One parsed protocol element received from the stream.
#[derive(Debug, Clone, Default)]
pub struct Stanza {
    /// Local element name (`iq`, `message`, `presence`, `features`, …).
    pub name: String,
    /// Element namespace.
    pub ns: String,
    /// Attribute list in document order.
    pub attrs: Vec<(String, String)>,
    /// Character content of the body child, if any.
    pub body: Option<String>,
    /// Query payload carried by an `iq`, if any.
    pub query: Option<Query>,
}

impl Stanza {
    /// Create a stanza with the given name and namespace and no payload.
    pub fn new(name: impl Into<String>, ns: impl Into<String>) -> Self {
        Stanza {
            name: name.into(),
            ns: ns.into(),
            ..Stanza::default()
        }
    }

    /// Look up an attribute by name.
    ///
    /// The first occurrence wins, matching how the attribute list is
    /// folded into a map on the wire side.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Query payload of an `iq` stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Namespace of the query element; decides how items are interpreted.
    pub ns: String,
    /// Items listed in the reply.
    pub items: Vec<QueryItem>,
}

/// One item of a roster or room-discovery reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryItem {
    /// Address of the entity.
    pub jid: String,
    /// Human-readable label.
    pub name: String,
    /// Mention name, only present on roster items.
    pub mention_name: String,
}

/// The most recently negotiated stream-features descriptor.
#[derive(Debug, Clone, Default)]
pub struct StreamFeatures {
    /// Whether the peer offers STARTTLS.
    pub starttls: bool,
    /// SASL mechanisms advertised by the peer.
    pub mechanisms: Vec<String>,
}

impl StreamFeatures {
    /// Whether the PLAIN mechanism is among the advertised ones.
    pub fn can_plain(&self) -> bool {
        self.mechanisms.iter().any(|m| m == "PLAIN")
    }
}

/// An outbound protocol verb.
///
/// All writes are funneled through [`Transport::send`] so that the
/// dispatch task stays the sole writer of a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Availability update for our own full address.
    Presence { from: String, status: String },
    /// Occupant presence announcing us inside a room.
    RoomPresence { occupant: String, from: String },
    /// One-to-one chat message.
    Chat {
        to: String,
        from: String,
        body: String,
    },
    /// Message to a room.
    GroupChat {
        to: String,
        from: String,
        body: String,
    },
    /// Roster query against the account service.
    RosterQuery { from: String, domain: String },
    /// Room-discovery query against the room service.
    DiscoQuery { from: String, domain: String },
    /// Idle-prevention frame.
    KeepAlive,
}

/// A stream-oriented connection exposing stanza-level primitives.
///
/// Implementations are provided by the underlying protocol library;
/// this crate only drives them. All methods are sequential with
/// respect to the owning task.
pub trait Transport: Send + 'static {
    /// Read the next parsed stanza.
    ///
    /// `Ok(None)` signals clean closure of the stream by the peer.
    /// The returned future must be cancel-safe: dropping it before
    /// completion must not lose a stanza.
    fn recv(&mut self) -> impl Future<Output = io::Result<Option<Stanza>>> + Send;

    /// The features descriptor from the latest stream negotiation.
    fn features(&self) -> &StreamFeatures;

    /// Open (or re-open) a protocol stream addressed from `jid` to
    /// `domain`.
    fn open_stream(&mut self, jid: &str, domain: &str) -> impl Future<Output = io::Result<()>> + Send;

    /// Perform the TLS upgrade request/response and switch the
    /// connection to encrypted mode in place.
    fn upgrade_tls(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Submit credentials via SASL PLAIN.
    fn auth_plain(
        &mut self,
        username: &str,
        password: &str,
        resource: &str,
    ) -> impl Future<Output = io::Result<()>> + Send;

    /// Send one outbound verb.
    fn send(&mut self, packet: &Packet) -> impl Future<Output = io::Result<()>> + Send;
}

/// Dials stream connections, perhaps called multiple times.
///
/// Every reconnect attempt goes through `connect` again, so
/// implementations must be freely cloneable and self-contained.
pub trait Connector: Clone + Send + Sync + 'static {
    /// The transport this connector produces.
    type Transport: Transport;

    /// Open a fresh connection to the named server.
    ///
    /// The returned transport must be ready for `open_stream`; no
    /// stream-level negotiation may have happened yet.
    fn connect(&self, server: &str) -> impl Future<Output = io::Result<Self::Transport>> + Send;
}
