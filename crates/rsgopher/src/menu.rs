//! Build the menu of a directory.
//!
//! A directory holding a readable gophermap is described entirely by that
//! file. Any other directory gets a menu synthesized from its children.

use {
    crate::{
        config::Config,
        error::Error,
        fs::{Access, Filesystem},
        item::{ItemType, Menu, MenuEntry, classify},
        utils::Result,
    },
    futures::stream::{self, StreamExt},
    log::{debug, warn},
    std::path::{Component, Path},
};

/// Builds one [`Menu`] per request; nothing is cached between calls.
pub struct MenuBuilder<'a, Fs: ?Sized> {
    config: &'a Config,
    fs: &'a Fs,
}

impl<'a, Fs: Filesystem + ?Sized> MenuBuilder<'a, Fs> {
    pub fn new(config: &'a Config, fs: &'a Fs) -> Self {
        MenuBuilder { config, fs }
    }

    /// Menu for `dir`, an already resolved path below the root.
    ///
    /// Never fails: an unreadable directory yields an empty menu.
    pub async fn build(&self, dir: &Path) -> Menu {
        let map = dir.join(&self.config.map_filename);
        if self.fs.stat(&map).await.contains(Access::READ) {
            self.from_gophermap(&map).await
        } else {
            self.from_directory(dir).await
        }
    }

    async fn from_gophermap(&self, map: &Path) -> Menu {
        let lines = match self.fs.read_lines(map).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Unable to open {:?}: {}", map, e);
                return Menu::new();
            }
        };

        lines
            .iter()
            .filter_map(|line| {
                let line = self.config.encoding.decode(line);
                self.parse_line(&line).unwrap_or_else(|e| {
                    warn!("{:?}: {}", map, e);
                    None
                })
            })
            .collect()
    }

    /// Parse one gophermap line.
    ///
    /// `Ok(None)` for comments, an error for lines that can not be served.
    pub fn parse_line(&self, line: &str) -> Result<Option<MenuEntry>> {
        if line.starts_with('#') {
            return Ok(None);
        }
        if !line.contains('\t') {
            return Ok(Some(MenuEntry::info(line, self.config)));
        }

        let mut fields = line.split('\t');
        let (type_and_name, selector, host, port) =
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(t), Some(s), Some(h), Some(p)) => (t, s, h, p),
                _ => return Err(Error::listing(format!("expected 4 fields in {:?}", line))),
            };

        let mut chars = type_and_name.chars();
        let code = chars
            .next()
            .ok_or_else(|| Error::listing(format!("missing type code in {:?}", line)))?;
        let typ = ItemType::from_code(code)
            .ok_or_else(|| Error::listing(format!("unknown type code {:?} in {:?}", code, line)))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::listing(format!("bad port {:?} in {:?}: {}", port, line, e)))?;

        Ok(Some(MenuEntry::new(typ, chars.as_str(), selector, host, port)))
    }

    async fn from_directory(&self, dir: &Path) -> Menu {
        let children = match self.fs.list(dir).await {
            Ok(children) => children,
            Err(e) => {
                warn!("Unable to list {:?}: {}", dir, e);
                return Menu::new();
            }
        };

        stream::iter(children)
            .filter_map(move |path| async move {
                let access = self.fs.stat(&path).await;
                if !access.contains(Access::READ) {
                    debug!("omitting unreadable {:?}", path);
                    return None;
                }

                let name = path.file_name()?.to_str()?;
                if name.contains(['\t', '\r', '\n']) {
                    debug!("omitting {:?}: name can not be sent in a menu", path);
                    return None;
                }

                let selector = self.selector_for(&path)?;
                let typ = classify(
                    name,
                    access.contains(Access::DIR),
                    access.is_exec_dir(),
                );
                Some(MenuEntry::local(typ, name, selector, self.config))
            })
            .collect()
            .await
    }

    /// Selector a client sends to reach `path`: its location below the root,
    /// `/`-separated and rooted with `/`.
    fn selector_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.config.root).ok()?;

        let mut selector = String::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    selector.push('/');
                    selector.push_str(part.to_str()?);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }

        if selector.is_empty() {
            selector.push('/');
        }
        Some(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fs::{ByteStream, LocalFs},
        io_err,
    };
    use async_trait::async_trait;
    use std::{collections::HashSet, fs, io, path::PathBuf};

    fn config(root: &Path) -> Config {
        Config {
            host: "gopher.test".to_owned(),
            port: 7070,
            root: root.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn comment_and_info_lines() {
        let config = config(Path::new("/srv"));
        let builder = MenuBuilder::new(&config, &LocalFs);

        assert_eq!(builder.parse_line("# a comment").unwrap(), None);
        assert_eq!(
            builder.parse_line("Welcome to my hole").unwrap(),
            Some(MenuEntry::new(ItemType::Info, "Welcome to my hole", "", "gopher.test", 7070))
        );
        assert_eq!(
            builder.parse_line("").unwrap(),
            Some(MenuEntry::info("", &config))
        );
    }

    #[test]
    fn full_line() {
        let config = config(Path::new("/srv"));
        let builder = MenuBuilder::new(&config, &LocalFs);

        assert_eq!(
            builder
                .parse_line("1Floodgap\t/\tgopher.floodgap.com\t70")
                .unwrap(),
            Some(MenuEntry::new(ItemType::Directory, "Floodgap", "/", "gopher.floodgap.com", 70))
        );
        // Gopher+ maps carry a fifth field
        assert!(builder.parse_line("0About\t/about.txt\thost\t70\t+").unwrap().is_some());
    }

    #[test]
    fn invalid_lines() {
        let config = config(Path::new("/srv"));
        let builder = MenuBuilder::new(&config, &LocalFs);

        for line in [
            "xNope\t/\thost\t70",
            "0Short\t/only-selector",
            "0Port\t/\thost\tseventy",
            "0Port\t/\thost\t99999",
            "\t/\thost\t70",
        ] {
            assert!(
                matches!(builder.parse_line(line), Err(Error::Listing(_))),
                "{:?}",
                line
            );
        }
    }

    #[tokio::test]
    async fn gophermap_comments_and_info_only() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("gophermap"),
            "# header\nFirst line\n#another\nSecond line\n\nThird\n",
        )
        .unwrap();

        let config = config(root.path());
        let menu = MenuBuilder::new(&config, &LocalFs).build(root.path()).await;

        let expected: Menu = ["First line", "Second line", "", "Third"]
            .into_iter()
            .map(|text| MenuEntry::info(text, &config))
            .collect();
        assert_eq!(menu, expected);
        assert!(menu.iter().all(|e| e.selector.is_empty() && e.port == 7070));
    }

    #[tokio::test]
    async fn gophermap_skips_only_bad_lines() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("gophermap"),
            "0One\t/one.txt\thost\t70\r\n\
             QBroken\t/broken\thost\t70\r\n\
             1Two\t/two\thost\t70\r\n\
             9Three\t/three.bin\thost\t70\r\n",
        )
        .unwrap();

        let config = config(root.path());
        let menu = MenuBuilder::new(&config, &LocalFs).build(root.path()).await;

        let names: Vec<_> = menu.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert_eq!(menu.entries()[1].typ, ItemType::Directory);
    }

    #[tokio::test]
    async fn gophermap_with_custom_name() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("index.gph"), "hello\n").unwrap();
        fs::write(root.path().join("gophermap"), "ignored\n").unwrap();

        let config = Config {
            map_filename: "index.gph".to_owned(),
            ..config(root.path())
        };
        let menu = MenuBuilder::new(&config, &LocalFs).build(root.path()).await;

        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].name, "hello");
    }

    #[tokio::test]
    async fn synthesized_listing() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.txt"), b"text").unwrap();
        fs::write(root.path().join("b.bin"), b"\0\x01").unwrap();

        let config = config(root.path());
        let menu = MenuBuilder::new(&config, &LocalFs).build(root.path()).await;

        let entries: HashSet<_> = menu.into_iter().collect();
        let expected: HashSet<_> = [
            MenuEntry::local(ItemType::Text, "a.txt", "/a.txt", &config),
            MenuEntry::local(ItemType::Binary, "b.bin", "/b.bin", &config),
        ]
        .into_iter()
        .collect();
        assert_eq!(entries, expected);
    }

    #[tokio::test]
    async fn synthesized_selectors_are_relative_to_root() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("docs/old")).unwrap();
        fs::write(root.path().join("docs/guide.md"), b"# guide").unwrap();

        let config = config(root.path());
        let menu = MenuBuilder::new(&config, &LocalFs)
            .build(&root.path().join("docs"))
            .await;

        let entries: HashSet<_> = menu
            .iter()
            .map(|e| (e.typ, e.selector.as_str()))
            .collect();
        assert_eq!(
            entries,
            HashSet::from([
                (ItemType::Directory, "/docs/old"),
                (ItemType::Text, "/docs/guide.md"),
            ])
        );
    }

    #[tokio::test]
    async fn unlistable_directory_gives_empty_menu() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        let menu = MenuBuilder::new(&config, &LocalFs)
            .build(&root.path().join("missing"))
            .await;
        assert!(menu.is_empty());
    }

    /// A directory whose children carry fixed permissions. `None` makes the
    /// listing itself fail.
    struct Fixed(Option<Vec<(&'static str, Access)>>);

    #[async_trait]
    impl Filesystem for Fixed {
        async fn stat(&self, path: &Path) -> Access {
            let name = path.file_name().and_then(|n| n.to_str());
            self.0
                .iter()
                .flatten()
                .find(|&&(child, _)| Some(child) == name)
                .map(|&(_, access)| access)
                .unwrap_or_default()
        }

        async fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
            match self.0 {
                Some(ref children) => Ok(children.iter().map(|(name, _)| dir.join(name)).collect()),
                None => Err(io_err!(PermissionDenied, "listing denied")),
            }
        }

        async fn read_lines(&self, _: &Path) -> io::Result<Vec<Vec<u8>>> {
            Err(io_err!(NotFound, "no files"))
        }

        async fn open(&self, _: &Path) -> io::Result<ByteStream> {
            Err(io_err!(NotFound, "no files"))
        }
    }

    #[tokio::test]
    async fn unreadable_and_vanished_children_are_omitted() {
        let readable = Access::EXISTS | Access::READ;
        let fs = Fixed(Some(vec![
            ("a.txt", readable | Access::FILE),
            ("secret.txt", Access::EXISTS | Access::FILE),
            ("private", Access::EXISTS | Access::EXEC | Access::DIR),
            ("gone.bin", Access::empty()),
            ("pub", readable | Access::EXEC | Access::DIR),
        ]));

        let config = config(Path::new("/srv"));
        let menu = MenuBuilder::new(&config, &fs).build(Path::new("/srv")).await;

        let entries: HashSet<_> = menu.into_iter().collect();
        let expected: HashSet<_> = [
            MenuEntry::local(ItemType::Text, "a.txt", "/a.txt", &config),
            MenuEntry::local(ItemType::Directory, "pub", "/pub", &config),
        ]
        .into_iter()
        .collect();
        assert_eq!(entries, expected);
    }

    #[tokio::test]
    async fn failed_listing_gives_empty_menu() {
        let config = config(Path::new("/srv"));
        let menu = MenuBuilder::new(&config, &Fixed(None))
            .build(Path::new("/srv"))
            .await;
        assert!(menu.is_empty());
    }
}
