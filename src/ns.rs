//! Protocol namespaces used to classify inbound stanzas.

/// Stream framing and `<features/>`.
pub const STREAM: &str = "http://etherx.jabber.org/streams";

/// SASL authentication.
pub const SASL: &str = "urn:ietf:params:xml:ns:xmpp-sasl";

/// Regular client traffic (iq/message/presence).
pub const CLIENT: &str = "jabber:client";

/// Room discovery query payloads.
pub const DISCO_ITEMS: &str = "http://jabber.org/protocol/disco#items";

/// Roster query payloads.
pub const ROSTER: &str = "jabber:iq:roster";
