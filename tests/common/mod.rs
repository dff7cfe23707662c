//! Scripted fake transport for driving the client without I/O.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use groupchat::{ns, Connector, Packet, Query, QueryItem, Stanza, StreamFeatures, Transport};

/// One observed transport operation, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Dial { server: String },
    OpenStream { jid: String, domain: String },
    UpgradeTls,
    AuthPlain { username: String, resource: String },
    Send(Packet),
}

pub type OpLog = Arc<Mutex<Vec<Op>>>;

/// Fresh operation log; also wires `log` output to the test harness.
pub fn op_log() -> OpLog {
    let _ = env_logger::builder().is_test(true).try_init();
    Arc::new(Mutex::new(Vec::new()))
}

pub fn sends(log: &OpLog) -> Vec<Packet> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|op| match op {
            Op::Send(packet) => Some(packet.clone()),
            _ => None,
        })
        .collect()
}

/// A transport that replays a scripted sequence of reads and records
/// every operation. Once the script is exhausted, reads stay pending
/// forever, like an idle connection.
pub struct FakeTransport {
    log: OpLog,
    current: StreamFeatures,
    feature_script: VecDeque<StreamFeatures>,
    incoming: VecDeque<io::Result<Option<Stanza>>>,
}

impl FakeTransport {
    /// A server that offers PLAIN right away and accepts it; `script`
    /// is what the dispatcher reads after authentication.
    pub fn plain(log: OpLog, script: Vec<io::Result<Option<Stanza>>>) -> Self {
        let mut incoming = VecDeque::from([Ok(Some(features_stanza())), Ok(Some(auth_result()))]);
        incoming.extend(script);
        FakeTransport {
            log,
            current: StreamFeatures::default(),
            feature_script: VecDeque::from([plain_features()]),
            incoming,
        }
    }

    /// A server that requires STARTTLS first and only then offers
    /// PLAIN.
    pub fn starttls(log: OpLog, script: Vec<io::Result<Option<Stanza>>>) -> Self {
        let mut incoming = VecDeque::from([
            Ok(Some(features_stanza())),
            Ok(Some(features_stanza())),
            Ok(Some(auth_result())),
        ]);
        incoming.extend(script);
        FakeTransport {
            log,
            current: StreamFeatures::default(),
            feature_script: VecDeque::from([
                StreamFeatures {
                    starttls: true,
                    mechanisms: vec![],
                },
                plain_features(),
            ]),
            incoming,
        }
    }

    /// A server that answers the credential submission with an error.
    pub fn rejecting(log: OpLog) -> Self {
        FakeTransport {
            log,
            current: StreamFeatures::default(),
            feature_script: VecDeque::from([plain_features()]),
            incoming: VecDeque::from([Ok(Some(features_stanza())), Ok(Some(auth_error()))]),
        }
    }

    /// A server that closes the stream right after the credential
    /// submission instead of answering it.
    pub fn closing(log: OpLog) -> Self {
        FakeTransport {
            log,
            current: StreamFeatures::default(),
            feature_script: VecDeque::from([plain_features()]),
            incoming: VecDeque::from([Ok(Some(features_stanza())), Ok(None)]),
        }
    }

    /// A server that offers neither STARTTLS nor PLAIN.
    pub fn no_mechanism(log: OpLog) -> Self {
        FakeTransport {
            log,
            current: StreamFeatures::default(),
            feature_script: VecDeque::from([StreamFeatures {
                starttls: false,
                mechanisms: vec!["SCRAM-SHA-1".to_owned()],
            }]),
            incoming: VecDeque::from([Ok(Some(features_stanza()))]),
        }
    }
}

impl Transport for FakeTransport {
    async fn recv(&mut self) -> io::Result<Option<Stanza>> {
        match self.incoming.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }

    fn features(&self) -> &StreamFeatures {
        &self.current
    }

    async fn open_stream(&mut self, jid: &str, domain: &str) -> io::Result<()> {
        self.log.lock().unwrap().push(Op::OpenStream {
            jid: jid.to_owned(),
            domain: domain.to_owned(),
        });
        if let Some(features) = self.feature_script.pop_front() {
            self.current = features;
        }
        Ok(())
    }

    async fn upgrade_tls(&mut self) -> io::Result<()> {
        self.log.lock().unwrap().push(Op::UpgradeTls);
        Ok(())
    }

    async fn auth_plain(&mut self, username: &str, _password: &str, resource: &str) -> io::Result<()> {
        self.log.lock().unwrap().push(Op::AuthPlain {
            username: username.to_owned(),
            resource: resource.to_owned(),
        });
        Ok(())
    }

    async fn send(&mut self, packet: &Packet) -> io::Result<()> {
        self.log.lock().unwrap().push(Op::Send(packet.clone()));
        Ok(())
    }
}

/// Hands out pre-built transports, one per dial; dials fail once the
/// supply is exhausted.
#[derive(Clone)]
pub struct FakeConnector {
    log: OpLog,
    supply: Arc<Mutex<VecDeque<FakeTransport>>>,
}

impl FakeConnector {
    pub fn new(log: OpLog, transports: Vec<FakeTransport>) -> Self {
        FakeConnector {
            log,
            supply: Arc::new(Mutex::new(transports.into())),
        }
    }
}

impl Connector for FakeConnector {
    type Transport = FakeTransport;

    async fn connect(&self, server: &str) -> io::Result<FakeTransport> {
        self.log.lock().unwrap().push(Op::Dial {
            server: server.to_owned(),
        });
        self.supply
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "no server"))
    }
}

pub fn features_stanza() -> Stanza {
    Stanza::new("features", ns::STREAM)
}

pub fn plain_features() -> StreamFeatures {
    StreamFeatures {
        starttls: false,
        mechanisms: vec!["PLAIN".to_owned()],
    }
}

pub fn auth_result() -> Stanza {
    let mut stanza = Stanza::new("iq", ns::CLIENT);
    stanza.attrs.push(("type".to_owned(), "result".to_owned()));
    stanza
}

pub fn auth_error() -> Stanza {
    let mut stanza = Stanza::new("iq", ns::CLIENT);
    stanza.attrs.push(("type".to_owned(), "error".to_owned()));
    stanza
}

pub fn chat_message(id: &str, type_: &str, from: &str, to: &str, body: &str) -> Stanza {
    let mut stanza = Stanza::new("message", ns::CLIENT);
    stanza.attrs.push(("mid".to_owned(), id.to_owned()));
    stanza.attrs.push(("type".to_owned(), type_.to_owned()));
    stanza.attrs.push(("from".to_owned(), from.to_owned()));
    stanza.attrs.push(("to".to_owned(), to.to_owned()));
    stanza.body = Some(body.to_owned());
    stanza
}

pub fn typing_toggle(from: &str, to: &str) -> Stanza {
    let mut stanza = chat_message("", "chat", from, to, "");
    stanza.body = None;
    stanza
}

pub fn iq_reply(query_ns: &str, items: Vec<QueryItem>) -> Stanza {
    let mut stanza = Stanza::new("iq", ns::CLIENT);
    stanza.attrs.push(("type".to_owned(), "result".to_owned()));
    stanza.query = Some(Query {
        ns: query_ns.to_owned(),
        items,
    });
    stanza
}

pub fn item(jid: &str, name: &str, mention_name: &str) -> QueryItem {
    QueryItem {
        jid: jid.to_owned(),
        name: name.to_owned(),
        mention_name: mention_name.to_owned(),
    }
}

pub fn read_error() -> io::Result<Option<Stanza>> {
    Err(io::Error::new(io::ErrorKind::ConnectionReset, "link down"))
}

/// Yield to the runtime until `cond` holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
