//! Serialize menus, error lines and text files into their wire form.

use {
    crate::{
        config::{Config, Encoding},
        item::{ItemType, Menu, MenuEntry},
    },
    bytes::{BufMut, Bytes, BytesMut},
    std::io::{Result, Write},
};

/// Line terminator mandated by the protocol
pub const CRLF: &[u8] = b"\r\n";

/// Last line of every menu
pub const END_OF_MENU: &[u8] = b".\r\n";

/// Trait representing a type which can be written on the wire
pub trait Encodable {
    /// Encode self to w and returns the number of bytes encoded
    fn encode<W: Write>(&self, w: &mut W, encoding: Encoding) -> Result<usize>;
}

impl Encodable for str {
    fn encode<W: Write>(&self, w: &mut W, encoding: Encoding) -> Result<usize> {
        let bytes = encoding.encode(self);
        w.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

impl Encodable for MenuEntry {
    fn encode<W: Write>(&self, w: &mut W, encoding: Encoding) -> Result<usize> {
        let bytes = self.to_string().encode(w, encoding)?;
        w.write_all(CRLF)?;
        Ok(bytes + CRLF.len())
    }
}

impl Encodable for Menu {
    fn encode<W: Write>(&self, w: &mut W, encoding: Encoding) -> Result<usize> {
        let mut bytes = 0;
        for entry in self {
            bytes += entry.encode(w, encoding)?;
        }
        w.write_all(END_OF_MENU)?;
        Ok(bytes + END_OF_MENU.len())
    }
}

/// A writer bound to the text encoding of the server
#[derive(Clone, Debug)]
pub struct Encoder<W> {
    writer: W,
    encoding: Encoding,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, encoding: Encoding) -> Encoder<W> {
        Encoder { writer, encoding }
    }

    /// Encode data
    pub fn encode<T: Encodable + ?Sized>(&mut self, data: &T) -> Result<usize> {
        data.encode(&mut self.writer, self.encoding)
    }

    /// Get inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn encode_to_bytes<T: Encodable + ?Sized>(data: &T, encoding: Encoding) -> Result<Bytes> {
    let mut encoder = Encoder::new(BytesMut::with_capacity(4096).writer(), encoding);
    encoder.encode(data)?;
    Ok(encoder.into_inner().into_inner().freeze())
}

/// Render a whole menu, including the terminating `.` line.
pub fn render_menu(menu: &Menu, encoding: Encoding) -> Result<Bytes> {
    encode_to_bytes(menu, encoding)
}

/// The single line sent back for a selector that names nothing.
pub fn render_not_found(selector: &str, config: &Config) -> Result<Bytes> {
    let entry = MenuEntry::local(
        ItemType::Error,
        format!(" '{}' doesn't exist!", selector),
        "",
        config,
    );
    encode_to_bytes(&entry, config.encoding)
}

/// Re-terminate text lines with CRLF after stripping trailing whitespace.
///
/// Works on raw bytes, so file content is never re-encoded.
pub fn render_text<L: AsRef<[u8]>>(lines: &[L]) -> Bytes {
    let mut buf = BytesMut::with_capacity(lines.iter().map(|l| l.as_ref().len() + 2).sum());
    for line in lines {
        buf.put_slice(line.as_ref().trim_ascii_end());
        buf.put_slice(CRLF);
    }
    buf.freeze()
}
