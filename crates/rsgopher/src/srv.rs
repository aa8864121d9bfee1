//! Asynchronous Gopher server.
//!
//! # Protocol
//! RFC 1436: one selector line in, one response out, then the connection is
//! closed.

use {
    crate::{
        fs::Filesystem,
        io_err,
        resolve::Resolver,
        utils::{self, Result},
    },
    log::{debug, error, info, warn},
    std::sync::Arc,
    tokio::{
        io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
        net::TcpListener,
    },
    tokio_stream::StreamExt,
    tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead},
};

/// Longest selector line accepted from a client
pub const MAX_SELECTOR_LEN: usize = 4096;

/// Chunk size used when copying a response to the client
pub const BUFFER_SIZE: usize = 16384;

/// Selector part of a request line.
///
/// Gopher+ clients and search items append a tab and more fields; only the
/// selector before the first tab is used.
pub fn parse_selector(line: &str) -> &str {
    line.split('\t').next().unwrap_or_default()
}

/// Serve a single connection: read one selector, write the response, close.
pub async fn dispatch<Fs, Reader, Writer>(
    resolver: Arc<Resolver<Fs>>,
    reader: Reader,
    mut writer: Writer,
) -> Result<()>
where
    Fs: 'static + Filesystem,
    Reader: AsyncRead + Send + std::marker::Unpin,
    Writer: AsyncWrite + Send + std::marker::Unpin,
{
    let codec = AnyDelimiterCodec::new_with_max_length(b"\r\n".to_vec(), Vec::new(), MAX_SELECTOR_LEN);
    let mut framedread = FramedRead::new(reader, codec);

    let line = match framedread.next().await {
        Some(Ok(line)) => line,
        Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
            warn!("selector longer than {} bytes, closing", MAX_SELECTOR_LEN);
            return Ok(());
        }
        Some(Err(AnyDelimiterCodecError::Io(e))) => return Err(e.into()),
        None => {
            debug!("connection closed before a selector was sent");
            return Ok(());
        }
    };

    let line = resolver.config().encoding.decode(&line);
    let selector = parse_selector(&line);
    info!("\t← {:?}", selector);

    match resolver.respond(selector).await {
        Some(stream) => {
            let mut body = BufReader::with_capacity(BUFFER_SIZE, stream);
            let sent = tokio::io::copy_buf(&mut body, &mut writer).await?;
            info!("\t→ {:?}: {} bytes", selector, sent);
        }
        None => warn!("Nothing to send for {:?}, closing", selector),
    }

    writer.flush().await?;
    writer.shutdown().await?;

    Ok(())
}

/// Accept connections on an already bound listener, one task per client.
pub async fn serve<Fs>(resolver: Resolver<Fs>, listener: TcpListener) -> Result<()>
where
    Fs: 'static + Filesystem,
{
    let resolver = Arc::new(resolver);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("accepted: {:?}", peer);

        let resolver = resolver.clone();
        tokio::spawn(async move {
            let (readhalf, writehalf) = stream.into_split();
            let res = dispatch(resolver, readhalf, writehalf).await;
            if let Err(e) = res {
                error!("Error: {}: {:?}", e, e);
            }
        });
    }
}

async fn srv_async_tcp<Fs>(resolver: Resolver<Fs>, addr: &str) -> Result<()>
where
    Fs: 'static + Filesystem,
{
    let listener = TcpListener::bind(addr).await?;
    serve(resolver, listener).await
}

/// Serve `resolver` on `proto!address!port`. Only `tcp` is supported.
pub async fn srv_async<Fs>(resolver: Resolver<Fs>, addr: &str) -> Result<()>
where
    Fs: 'static + Filesystem,
{
    let (proto, listen_addr) = utils::parse_proto(addr)
        .ok_or_else(|| io_err!(InvalidInput, "Invalid protocol or address"))?;

    match proto {
        "tcp" => srv_async_tcp(resolver, &listen_addr).await,
        _ => Err(From::from(io_err!(InvalidInput, "Protocol not supported"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_ignores_gopher_plus_suffix() {
        assert_eq!(parse_selector("/docs"), "/docs");
        assert_eq!(parse_selector("/search\tquery terms"), "/search");
        assert_eq!(parse_selector("/about\t+"), "/about");
        assert_eq!(parse_selector(""), "");
    }

    #[tokio::test]
    async fn only_tcp_listeners() {
        let resolver = || Resolver::new(Arc::new(Default::default()), crate::fs::LocalFs);

        for addr in ["unix!/tmp/gopher!0", "udp!0.0.0.0!70", "tcp!0.0.0.0"] {
            let res = srv_async(resolver(), addr).await;
            assert!(
                matches!(res, Err(crate::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::InvalidInput),
                "{}",
                addr
            );
        }
    }
}
