//! Turn a selector into a response body.

use {
    crate::{
        config::Config,
        fs::{ByteStream, Filesystem},
        item::{ItemType, classify},
        menu::MenuBuilder,
        render::{render_menu, render_not_found, render_text},
    },
    bytes::Bytes,
    log::{debug, error, warn},
    std::{
        io::Cursor,
        path::{Path, PathBuf},
        sync::Arc,
    },
};

/// What a selector names, decided before anything is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    /// A readable directory, served as a menu
    Directory(PathBuf),
    /// A readable regular file, served as text or raw bytes
    File(PathBuf),
    /// Anything else; carries the selector as the client sent it
    NotFound(String),
}

/// Map a selector onto the filesystem below `root`.
///
/// The selector is always treated as relative to the root. `.` components are
/// dropped and `..` never climbs above the root.
pub fn selector_to_path(root: &Path, selector: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    let mut depth: usize = 0;

    for name in selector.split('/') {
        match name {
            "" | "." => {}
            ".." => {
                if depth > 0 {
                    path.pop();
                    depth -= 1;
                }
            }
            name => {
                path.push(name);
                depth += 1;
            }
        }
    }

    path
}

fn bytes_stream(bytes: Bytes) -> ByteStream {
    Box::pin(Cursor::new(bytes))
}

/// Resolves selectors against the configured root.
///
/// Holds no per-request state; one instance serves every connection.
#[derive(Clone, Debug)]
pub struct Resolver<Fs> {
    config: Arc<Config>,
    fs: Fs,
}

impl<Fs: Filesystem> Resolver<Fs> {
    pub fn new(config: Arc<Config>, fs: Fs) -> Self {
        Resolver { config, fs }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify a selector. Directories win over files, anything unreadable is
    /// not found.
    pub async fn resolve(&self, selector: &str) -> Resolved {
        let path = selector_to_path(&self.config.root, selector);
        let access = self.fs.stat(&path).await;

        if access.is_readable_dir() {
            Resolved::Directory(path)
        } else if access.is_readable_file() {
            Resolved::File(path)
        } else {
            Resolved::NotFound(selector.to_owned())
        }
    }

    /// Produce the response body.
    ///
    /// `None` means there is nothing to send: the connection should just be
    /// closed.
    pub async fn stream(&self, resolved: Resolved) -> Option<ByteStream> {
        let rendered = match resolved {
            Resolved::Directory(path) => {
                let menu = MenuBuilder::new(&self.config, &self.fs).build(&path).await;
                debug!("menu for {:?}: {} entries", path, menu.len());
                render_menu(&menu, self.config.encoding)
            }
            Resolved::File(path) => return self.file(&path).await,
            Resolved::NotFound(selector) => render_not_found(&selector, &self.config),
        };

        rendered
            .map(bytes_stream)
            .map_err(|e| error!("Unable to render response: {}", e))
            .ok()
    }

    /// `resolve` followed by `stream`.
    pub async fn respond(&self, selector: &str) -> Option<ByteStream> {
        let resolved = self.resolve(selector).await;
        self.stream(resolved).await
    }

    async fn file(&self, path: &Path) -> Option<ByteStream> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        let body = if classify(&name, false, false) == ItemType::Text {
            self.fs
                .read_lines(path)
                .await
                .map(|lines| bytes_stream(render_text(lines.as_slice())))
        } else {
            self.fs.open(path).await
        };

        body.map_err(|e| {
            warn!("File not found even though it was just there: {:?}: {}", path, e)
        })
        .ok()
    }
}
