// Copyright (c) 2026 groupchat-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stream negotiation and authentication state machine.
//!
//! The machine is a pure function of the incoming stanza and the
//! current features descriptor; all I/O lives in the driver
//! ([`crate::session::establish`]). That keeps every transition — the
//! STARTTLS path, the PLAIN path and the failure paths — testable from
//! a scripted sequence of stanzas.

use crate::error::AuthError;
use crate::ns;
use crate::transport::{Stanza, StreamFeatures};

/// Negotiation state, advanced once per received stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Negotiation {
    /// Waiting for the peer's stream-features element.
    AwaitFeatures {
        /// Whether the TLS upgrade has already been performed. A second
        /// STARTTLS offer after the upgrade is not taken up again.
        secured: bool,
    },
    /// Credentials submitted, waiting for the terminal reply.
    AwaitResult,
    /// Authentication succeeded.
    Ready,
}

/// Action the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Upgrade the transport to TLS, then re-open the stream.
    UpgradeTls,
    /// Submit credentials via SASL PLAIN.
    SubmitPlain,
    /// The session is authenticated and ready for dispatch.
    Ready,
    /// Not a negotiation element; read on.
    Ignore,
}

impl Negotiation {
    pub(crate) fn new() -> Self {
        Negotiation::AwaitFeatures { secured: false }
    }

    /// Advance the machine with the next received stanza.
    ///
    /// `features` must be the transport's current stream-features
    /// descriptor; it is only consulted when `stanza` announces a
    /// completed feature negotiation.
    pub(crate) fn on_stanza(
        &mut self,
        stanza: &Stanza,
        features: &StreamFeatures,
    ) -> Result<Step, AuthError> {
        match self {
            Negotiation::AwaitFeatures { secured } => {
                if stanza.name != "features" || stanza.ns != ns::STREAM {
                    return Ok(Step::Ignore);
                }
                // TLS is mandatory whenever offered.
                if features.starttls && !*secured {
                    *self = Negotiation::AwaitFeatures { secured: true };
                    Ok(Step::UpgradeTls)
                } else if features.can_plain() {
                    *self = Negotiation::AwaitResult;
                    Ok(Step::SubmitPlain)
                } else {
                    Err(AuthError::NoMechanism)
                }
            }
            Negotiation::AwaitResult => match (stanza.name.as_str(), stanza.ns.as_str()) {
                ("iq", ns::CLIENT) => {
                    if stanza.attr("type") == Some("result") {
                        *self = Negotiation::Ready;
                        Ok(Step::Ready)
                    } else {
                        Err(AuthError::Rejected)
                    }
                }
                ("failure", ns::SASL) => Err(AuthError::Rejected),
                _ => Ok(Step::Ignore),
            },
            Negotiation::Ready => Ok(Step::Ignore),
        }
    }
}
