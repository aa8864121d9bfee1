use crate::error;

pub type Result<T> = ::std::result::Result<T, error::Error>;

#[macro_export]
macro_rules! io_err {
    ($kind:ident, $msg:expr) => {
        ::std::io::Error::new(::std::io::ErrorKind::$kind, $msg)
    };
}

#[macro_export]
macro_rules! res {
    ($err:expr) => {
        Err(From::from($err))
    };
}

/// Split a `proto!address!port` string into the protocol and a bindable address.
///
/// `tcp!0.0.0.0!70` becomes `("tcp", "0.0.0.0:70")`.
pub fn parse_proto(arg: &str) -> Option<(&str, String)> {
    let mut split = arg.split('!');
    let (proto, addr, port) = (split.next()?, split.next()?, split.next()?);

    Some((proto, addr.to_owned() + ":" + port))
}

#[test]
fn parse_proto_tcp() {
    assert_eq!(
        parse_proto("tcp!0.0.0.0!70"),
        Some(("tcp", "0.0.0.0:70".to_owned()))
    );
}

#[test]
fn parse_proto_rejects_short_input() {
    assert_eq!(parse_proto("tcp!localhost"), None);
    assert_eq!(parse_proto(""), None);
}
