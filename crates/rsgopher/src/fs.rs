//! Filesystem access used while resolving selectors.
//!
//! The resolver and the menu builder only see the [`Filesystem`] trait, so the
//! storage behind a Gopher hole can be swapped out (tests use a fake one).

use {
    async_trait::async_trait,
    bitflags::bitflags,
    log::debug,
    nix::unistd::{AccessFlags, access},
    std::{
        io,
        path::{Path, PathBuf},
        pin::Pin,
    },
    tokio::{fs, io::AsyncRead},
    tokio_stream::{StreamExt, wrappers::ReadDirStream},
};

/// Response body handed to the connection boundary.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

bitflags! {
    /// What the server may do with a path.
    ///
    /// An empty set means the path does not exist.
    #[derive(Copy, Debug, Default, Clone, PartialEq, Eq)]
    pub struct Access: u8 {
        #[doc = "Path exists"]
        const EXISTS    = 0x01;
        #[doc = "Readable by the server process"]
        const READ      = 0x02;
        #[doc = "Executable (searchable, for directories)"]
        const EXEC      = 0x04;
        #[doc = "Directory"]
        const DIR       = 0x08;
        #[doc = "Regular file"]
        const FILE      = 0x10;
    }
}

impl Access {
    /// Existing directory the server can read.
    pub fn is_readable_dir(self) -> bool {
        self.contains(Access::EXISTS | Access::READ | Access::DIR)
    }

    /// Existing regular file the server can read.
    pub fn is_readable_file(self) -> bool {
        self.contains(Access::EXISTS | Access::READ | Access::FILE)
    }

    /// Directory a client can browse into.
    pub fn is_exec_dir(self) -> bool {
        self.contains(Access::DIR | Access::EXEC)
    }
}

impl From<::std::fs::FileType> for Access {
    fn from(typ: ::std::fs::FileType) -> Self {
        From::from(&typ)
    }
}

impl<'a> From<&'a ::std::fs::FileType> for Access {
    fn from(typ: &'a ::std::fs::FileType) -> Self {
        let mut access = Access::EXISTS;

        if typ.is_dir() {
            access.insert(Access::DIR)
        }

        if typ.is_file() {
            access.insert(Access::FILE)
        }

        access
    }
}

/// Read-only view of the storage a server publishes.
///
/// None of these operations are retried; callers decide how a failure degrades
/// the response.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Existence, type and permission of `path`, following symbolic links.
    async fn stat(&self, path: &Path) -> Access;

    /// Immediate children of a directory, in whatever order the storage yields.
    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Content of a file split into lines, without line terminators.
    async fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>>;

    /// Raw content of a file.
    async fn open(&self, path: &Path) -> io::Result<ByteStream>;
}

/// The local disk, seen through tokio's blocking-pool backed file API.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalFs;

#[async_trait]
impl Filesystem for LocalFs {
    async fn stat(&self, path: &Path) -> Access {
        let attr = match fs::metadata(path).await {
            Ok(attr) => attr,
            Err(_) => return Access::empty(),
        };

        let path = path.to_owned();
        let perms = tokio::task::spawn_blocking(move || {
            let mut perms = Access::empty();
            if access(&path, AccessFlags::R_OK).is_ok() {
                perms.insert(Access::READ);
            }
            if access(&path, AccessFlags::X_OK).is_ok() {
                perms.insert(Access::EXEC);
            }
            perms
        })
        .await
        .unwrap_or_default();

        Access::from(attr.file_type()) | perms
    }

    async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = ReadDirStream::new(fs::read_dir(dir).await?);

        let mut children = Vec::new();
        while let Some(entry) = entries.next().await {
            match entry {
                Ok(entry) => children.push(entry.path()),
                Err(e) => debug!("skipping unreadable entry in {:?}: {}", dir, e),
            }
        }

        Ok(children)
    }

    async fn read_lines(&self, path: &Path) -> io::Result<Vec<Vec<u8>>> {
        let content = fs::read(path).await?;
        Ok(split_lines(&content).into_iter().map(<[u8]>::to_vec).collect())
    }

    async fn open(&self, path: &Path) -> io::Result<ByteStream> {
        Ok(Box::pin(fs::File::open(path).await?))
    }
}

/// Split a buffer into lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A final line without a
/// terminator is kept, an empty tail is not.
pub fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < buf.len() {
        match buf[i] {
            b'\n' => {
                lines.push(&buf[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&buf[start..i]);
                if buf.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < buf.len() {
        lines.push(&buf[start..]);
    }

    lines
}
