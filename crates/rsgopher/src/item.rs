//! Gopher item types and menu data.
//!
//! # Protocol
//! RFC 1436, plus the informal types most servers agree on (`i`, `h`, `s`, ...)

use std::fmt;

use enum_primitive::*;

use crate::config::Config;

enum_from_primitive! {
    #[doc = "Item type, the first character of every menu line"]
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    #[repr(u8)]
    pub enum ItemType {
        // RFC 1436
        Text        = b'0',
        Directory   = b'1',
        NameServer  = b'2',
        Error       = b'3',
        BinHex      = b'4',
        Archive     = b'5',
        Search      = b'7',
        Binary      = b'9',
        Mirror      = b'+',
        Gif         = b'g',
        Image       = b'I',
        // unofficial
        Document    = b'd',
        Html        = b'h',
        Info        = b'i',
        Sound       = b's',
        Video       = b';',
        Calendar    = b'c',
    }
}

impl ItemType {
    /// The character sent on the wire.
    pub fn code(self) -> char {
        self as u8 as char
    }

    /// Look up a wire character.
    pub fn from_code(code: char) -> Option<ItemType> {
        u8::try_from(code).ok().and_then(ItemType::from_u8)
    }

    /// Type of a file with the given extension.
    ///
    /// Matching is exact and case-sensitive. Anything unknown is binary so it
    /// still transfers byte for byte.
    pub fn from_extension(ext: &str) -> ItemType {
        use ItemType::*;

        match ext {
            "txt" | "md" | "pl" | "py" | "sh" | "tcl" | "c" | "cpp" | "h" | "log" | "conf"
            | "php" | "php3" => Text,
            "hqx" => BinHex,
            "zip" | "gz" | "Z" | "tgz" | "bz2" | "rar" => Archive,
            "ics" | "ical" => Calendar,
            "gif" => Gif,
            "jpg" | "jpeg" | "png" | "bmp" => Image,
            "mp3" | "wav" | "flac" | "ogg" => Sound,
            "avi" | "mp4" | "mpg" | "mov" | "qt" => Video,
            "pdf" | "ps" | "doc" | "docx" | "ppt" | "pptx" | "xls" | "xlsx" => Document,
            _ => Binary,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Extension of a file name: whatever follows the last dot, unless that dot
/// starts the name.
pub fn extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Decide the item type of a directory entry.
pub fn classify(name: &str, is_dir: bool, is_exec_dir: bool) -> ItemType {
    if is_dir && is_exec_dir {
        return ItemType::Directory;
    }

    extension(name)
        .map(ItemType::from_extension)
        .unwrap_or(ItemType::Binary)
}

/// One line of a Gopher menu.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MenuEntry {
    /// Kind of resource the line points at
    pub typ: ItemType,
    /// Text shown to the user, never containing a tab or line break
    pub name: String,
    /// Selector the client sends to fetch the resource, may be empty
    pub selector: String,
    /// Server holding the resource
    pub host: String,
    /// Port of that server
    pub port: u16,
}

impl MenuEntry {
    pub fn new<N, S, H>(typ: ItemType, name: N, selector: S, host: H, port: u16) -> MenuEntry
    where
        N: Into<String>,
        S: Into<String>,
        H: Into<String>,
    {
        MenuEntry {
            typ,
            name: name.into(),
            selector: selector.into(),
            host: host.into(),
            port,
        }
    }

    /// An informational line pointing back at this server.
    pub fn info<T: Into<String>>(text: T, config: &Config) -> MenuEntry {
        MenuEntry::new(ItemType::Info, text, "", config.host.as_str(), config.port)
    }

    /// An entry for something served by this server.
    pub fn local<N, S>(typ: ItemType, name: N, selector: S, config: &Config) -> MenuEntry
    where
        N: Into<String>,
        S: Into<String>,
    {
        MenuEntry::new(typ, name, selector, config.host.as_str(), config.port)
    }
}

impl fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}\t{}\t{}\t{}",
            self.typ, self.name, self.selector, self.host, self.port
        )
    }
}

/// An ordered Gopher menu. Entries render in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new() -> Menu {
        Default::default()
    }

    pub fn push(&mut self, entry: MenuEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MenuEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<MenuEntry>> for Menu {
    fn from(entries: Vec<MenuEntry>) -> Menu {
        Menu { entries }
    }
}

impl FromIterator<MenuEntry> for Menu {
    fn from_iter<I: IntoIterator<Item = MenuEntry>>(iter: I) -> Menu {
        Menu {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<MenuEntry> for Menu {
    fn extend<I: IntoIterator<Item = MenuEntry>>(&mut self, iter: I) {
        self.entries.extend(iter)
    }
}

impl IntoIterator for Menu {
    type Item = MenuEntry;
    type IntoIter = std::vec::IntoIter<MenuEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Menu {
    type Item = &'a MenuEntry;
    type IntoIter = std::slice::Iter<'a, MenuEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
