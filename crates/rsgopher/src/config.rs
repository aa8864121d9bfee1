//! Server configuration shared by every request.

use std::{borrow::Cow, fmt, path::PathBuf, str::FromStr};

/// Well-known Gopher port
pub const DEFAULT_PORT: u16 = 70;

/// Directory served when none is given
pub const DEFAULT_ROOT: &str = "/var/gopher";

/// Name of the authored listing file looked up in every directory
pub const DEFAULT_MAP_FILENAME: &str = "gophermap";

/// Host advertised when the machine's hostname is unknown
pub const DEFAULT_HOST: &str = "localhost";

/// Text encoding used for menus, error lines and gophermaps.
///
/// RFC 1436 talks about 8-bit text without naming a charset. UTF-8 is the
/// default; `Latin1` maps every byte to the code point of the same value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    /// Decode bytes read from disk or from a client.
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes),
            Encoding::Latin1 => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Encode text for the wire.
    ///
    /// Characters Latin-1 can not represent are sent as `?`.
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Encoding::Utf8 => Cow::Borrowed(text.as_bytes()),
            Encoding::Latin1 if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Encoding::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Encoding::Utf8 => write!(f, "utf-8"),
            Encoding::Latin1 => write!(f, "latin1"),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            other => Err(format!("unsupported encoding: {}", other)),
        }
    }
}

/// Everything a request needs to know about the server it runs in.
///
/// Built once at startup and shared read-only between connections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Host name advertised in menu entries and error lines
    pub host: String,
    /// Port advertised in menu entries and error lines
    pub port: u16,
    /// Directory every selector is resolved against
    pub root: PathBuf,
    /// File name of the authored listing in each directory
    pub map_filename: String,
    /// Encoding of server generated text
    pub encoding: Encoding,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            root: PathBuf::from(DEFAULT_ROOT),
            map_filename: DEFAULT_MAP_FILENAME.to_owned(),
            encoding: Encoding::default(),
        }
    }
}
