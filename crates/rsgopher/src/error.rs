//! Error type used across the crate.

use std::{error as stderror, fmt, io};

/// The error type of rsgopher.
///
/// Almost every failure during a request is absorbed by the resolver and turned
/// into a degraded response; these errors surface from startup, from the
/// accept loop, and from parsing single gophermap lines.
#[derive(Debug)]
pub enum Error {
    /// System error carrying an errno
    No(nix::errno::Errno),
    /// I/O error
    Io(io::Error),
    /// A gophermap line that can not be turned into a menu entry
    Listing(String),
}

impl Error {
    /// Build a `Listing` error from anything printable.
    pub fn listing<S: Into<String>>(reason: S) -> Error {
        Error::Listing(reason.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::No(ref e) => write!(f, "System error: {}", e.desc()),
            Error::Io(ref e) => write!(f, "I/O error: {}", e),
            Error::Listing(ref reason) => write!(f, "Invalid gophermap line: {}", reason),
        }
    }
}

impl stderror::Error for Error {
    fn source(&self) -> Option<&(dyn stderror::Error + 'static)> {
        match *self {
            Error::No(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
            Error::Listing(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<nix::errno::Errno> for Error {
    fn from(e: nix::errno::Errno) -> Self {
        Error::No(e)
    }
}
