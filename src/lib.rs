// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Client for hosted XMPP-derived group-chat services.
//!
//! The crate drives a stanza-level [`Transport`] (provided by an
//! underlying protocol library) through stream negotiation and SASL
//! PLAIN authentication, then runs a single dispatch task that turns
//! the inbound stanza stream into typed events, transparently
//! reconnecting with bounded backoff when the transport fails.
//!
//! ```no_run
//! # use groupchat::{Client, Config};
//! # async fn run<C: groupchat::Connector>(connector: C) -> Result<(), groupchat::Error> {
//! let config = Config::new("chat.example.com", "conf.example.com");
//! let (client, mut events) = Client::connect(connector, config, "bob", "pw", "desk").await?;
//! tokio::spawn(client.keep_alive());
//! client.join("123_conf@conf.example.com", "desk").await?;
//! client.say("123_conf@conf.example.com", "desk", "hello").await?;
//! while let Some(message) = events.messages.recv().await {
//!     println!("<{}> {}", message.from, message.body);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(bare_trait_objects)]

#[macro_use]
extern crate log;

use core::fmt;

pub mod client;
pub mod config;
mod dispatch;
pub mod error;
pub mod event;
mod negotiation;
pub mod ns;
pub mod reconnect;
mod session;
pub mod transport;

pub use client::Client;
pub use config::Config;
pub use error::{AuthError, Error};
pub use event::{Events, Message, MessageKind, Room, Subscription, User};
pub use reconnect::ReconnectPolicy;
pub use transport::{Connector, Packet, Query, QueryItem, Stanza, StreamFeatures, Transport};

/// Account identity: credentials plus the derived full address.
///
/// Immutable after construction; the full address is
/// `username@account_domain`.
#[derive(Clone)]
pub struct Identity {
    username: String,
    password: String,
    resource: String,
    jid: String,
}

impl Identity {
    pub(crate) fn new(username: &str, password: &str, resource: &str, account_domain: &str) -> Self {
        Identity {
            username: username.to_owned(),
            password: password.to_owned(),
            resource: resource.to_owned(),
            jid: format!("{}@{}", username, account_domain),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The derived full address.
    pub fn jid(&self) -> &str {
        &self.jid
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

// Manual impl to keep the password out of logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("resource", &self.resource)
            .field("jid", &self.jid)
            .finish_non_exhaustive()
    }
}
