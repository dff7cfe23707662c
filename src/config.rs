//! Client configuration.

use core::time::Duration;

use crate::reconnect::ReconnectPolicy;

/// Where and how to reach the hosted service.
///
/// The two service domains were module-level constants in earlier
/// incarnations of this client; they are explicit configuration now so
/// the same code can talk to staging or self-hosted deployments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host the connector dials. Defaults to the account domain.
    pub server: String,
    /// Domain of the account service; the full user address is
    /// `username@account_domain`.
    pub account_domain: String,
    /// Domain of the room service; message routing in
    /// [`Client::say`][`crate::Client::say`] keys off this.
    pub room_domain: String,
    /// Retry schedule applied after a mid-session read failure.
    pub reconnect: ReconnectPolicy,
    /// How often the keepalive activity sends an idle-prevention
    /// frame. The service drops idle connections after about 150 s,
    /// so the default is one minute.
    pub keepalive_interval: Duration,
}

impl Config {
    /// Configuration for the given service domains, with the dial
    /// target defaulting to the account domain.
    pub fn new(account_domain: impl Into<String>, room_domain: impl Into<String>) -> Self {
        let account_domain = account_domain.into();
        Config {
            server: account_domain.clone(),
            account_domain,
            room_domain: room_domain.into(),
            reconnect: ReconnectPolicy::default(),
            keepalive_interval: Duration::from_secs(60),
        }
    }
}
