// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Session establishment: dial, negotiate, authenticate.

use std::io;

use crate::config::Config;
use crate::error::{AuthError, Error};
use crate::negotiation::{Negotiation, Step};
use crate::transport::{Connector, Packet, Stanza, Transport};
use crate::Identity;

/// One live, authenticated connection.
///
/// A session is exclusively owned by the dispatch task and replaced
/// wholesale on reconnect; it is never mutated in place.
pub(crate) struct Session<T: Transport> {
    transport: T,
}

impl<T: Transport> Session<T> {
    pub(crate) async fn recv(&mut self) -> io::Result<Option<Stanza>> {
        self.transport.recv().await
    }

    pub(crate) async fn send(&mut self, packet: &Packet) -> io::Result<()> {
        self.transport.send(packet).await
    }
}

/// Run the full connection flow against a fresh transport: open the
/// stream, upgrade to TLS whenever offered, authenticate via SASL
/// PLAIN, and hand back a ready [`Session`].
pub(crate) async fn establish<C: Connector>(
    connector: &C,
    config: &Config,
    identity: &Identity,
) -> Result<Session<C::Transport>, Error> {
    debug!("connecting to {} as {}", config.server, identity.jid());
    let mut transport = connector.connect(&config.server).await?;
    transport
        .open_stream(identity.jid(), &config.account_domain)
        .await?;

    let mut negotiation = Negotiation::new();
    loop {
        let Some(stanza) = transport.recv().await? else {
            return Err(AuthError::Closed.into());
        };
        match negotiation.on_stanza(&stanza, transport.features())? {
            Step::UpgradeTls => {
                debug!("peer offers STARTTLS, upgrading");
                transport.upgrade_tls().await?;
                transport
                    .open_stream(identity.jid(), &config.account_domain)
                    .await?;
            }
            Step::SubmitPlain => {
                debug!("submitting PLAIN credentials for {}", identity.username());
                transport
                    .auth_plain(identity.username(), identity.password(), identity.resource())
                    .await?;
            }
            Step::Ready => {
                debug!("session ready as {}", identity.jid());
                return Ok(Session { transport });
            }
            Step::Ignore => (),
        }
    }
}
