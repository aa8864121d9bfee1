use {
    clap::Parser,
    log::warn,
    rsgopher::{
        Config, Encoding, Resolver,
        config::{DEFAULT_HOST, DEFAULT_MAP_FILENAME, DEFAULT_PORT, DEFAULT_ROOT},
        fs::LocalFs,
        io_err, res,
        srv::srv_async,
    },
    std::{path::PathBuf, sync::Arc},
    tokio::fs,
};

#[derive(Debug, clap::Parser)]
#[command(version, about = "Serve a directory tree over Gopher")]
struct Cli {
    /// Directory to serve
    #[arg(long, default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// Host name advertised in menus [default: this machine's hostname]
    #[arg(long)]
    host: Option<String>,

    /// Port advertised in menus, also the default listening port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Name of the listing file looked up in every directory
    #[arg(long, default_value = DEFAULT_MAP_FILENAME)]
    map_filename: String,

    /// Encoding of menus and gophermaps (utf-8 | latin1)
    #[arg(long, default_value_t = Encoding::Utf8)]
    encoding: Encoding,

    /// tcp!address!port to listen on [default: tcp!0.0.0.0!<port>]
    #[arg(long)]
    listen: Option<String>,
}

fn hostname() -> rsgopher::Result<String> {
    nix::unistd::gethostname()?
        .into_string()
        .map_err(|_| From::from(io_err!(InvalidData, "hostname is not valid unicode")))
}

fn default_listen(port: u16) -> String {
    format!("tcp!0.0.0.0!{}", port)
}

impl Cli {
    fn into_config(self) -> (Config, String) {
        let host = self.host.unwrap_or_else(|| {
            hostname().unwrap_or_else(|e| {
                warn!("Unable to determine host name: {}", e);
                DEFAULT_HOST.to_owned()
            })
        });
        let listen = self.listen.unwrap_or_else(|| default_listen(self.port));

        let config = Config {
            host,
            port: self.port,
            root: self.root,
            map_filename: self.map_filename,
            encoding: self.encoding,
        };
        (config, listen)
    }
}

async fn gopherd_main(cli: Cli) -> rsgopher::Result<i32> {
    let (config, listen) = cli.into_config();

    if !fs::try_exists(&config.root).await? {
        return res!(io_err!(NotFound, "root directory does not exist"));
    }
    if !fs::metadata(&config.root).await?.is_dir() {
        return res!(io_err!(Other, "root must be a directory"));
    }

    println!(
        "[*] Serving {:?} as {}:{} (map file: {}, encoding: {})",
        config.root, config.host, config.port, config.map_filename, config.encoding
    );
    println!("[*] Ready to accept clients: {}", listen);
    srv_async(Resolver::new(Arc::new(config), LocalFs), &listen)
        .await
        .and(Ok(0))
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let exit_code = gopherd_main(Cli::parse()).await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        -1
    });

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gopherd", "--host", "gopher.test"]).unwrap();
        let (config, listen) = cli.into_config();

        assert_eq!(config.host, "gopher.test");
        assert_eq!(config.port, 70);
        assert_eq!(config.root, PathBuf::from("/var/gopher"));
        assert_eq!(config.map_filename, "gophermap");
        assert_eq!(config.encoding, Encoding::Utf8);
        assert_eq!(listen, "tcp!0.0.0.0!70");
    }

    #[test]
    fn listen_follows_port() {
        let cli = Cli::try_parse_from([
            "gopherd",
            "--host=localhost",
            "--port=7070",
            "--root=/srv/gopher",
            "--map-filename=index.gph",
            "--encoding=latin1",
        ])
        .unwrap();
        let (config, listen) = cli.into_config();

        assert_eq!(config.port, 7070);
        assert_eq!(config.root, PathBuf::from("/srv/gopher"));
        assert_eq!(config.map_filename, "index.gph");
        assert_eq!(config.encoding, Encoding::Latin1);
        assert_eq!(listen, "tcp!0.0.0.0!7070");
    }

    #[test]
    fn explicit_listen_address() {
        let cli = Cli::try_parse_from([
            "gopherd",
            "--host",
            "localhost",
            "--listen",
            "tcp!127.0.0.1!7070",
        ])
        .unwrap();
        assert_eq!(cli.into_config().1, "tcp!127.0.0.1!7070");
    }

    #[test]
    fn rejects_unknown_encoding() {
        assert!(Cli::try_parse_from(["gopherd", "--encoding", "ebcdic"]).is_err());
    }
}
