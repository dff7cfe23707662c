use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// I/O error on the underlying transport (dial, read or write)
    Io(IoError),
    /// Authentication error
    Auth(AuthError),
    /// The client or its dispatch task is gone
    Disconnected,
    /// Every bounded reconnect attempt failed; carries the last failure
    ReconnectExhausted(Box<Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(fmt, "IO error: {}", e),
            Error::Auth(e) => write!(fmt, "authentication error: {}", e),
            Error::Disconnected => write!(fmt, "disconnected"),
            Error::ReconnectExhausted(e) => {
                write!(fmt, "reconnect attempts exhausted, last error: {}", e)
            }
        }
    }
}

impl StdError for Error {}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Error::Auth(e)
    }
}

/// Authentication error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server offered neither STARTTLS nor the PLAIN mechanism
    NoMechanism,
    /// The server answered the credential submission with anything but
    /// a result
    Rejected,
    /// The stream was closed before authentication completed
    Closed,
}

impl StdError for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::NoMechanism => write!(fmt, "no supported authentication mechanism offered"),
            AuthError::Rejected => write!(fmt, "could not authenticate"),
            AuthError::Closed => write!(fmt, "stream closed during authentication"),
        }
    }
}
