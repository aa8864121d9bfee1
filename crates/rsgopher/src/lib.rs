#![forbid(unsafe_code)]
//! Asynchronous Gopher server library for Rust.
//!
//! This crate provides a tokio-based implementation of the server side of the
//! Gopher protocol (RFC 1436): a client connects, sends a single selector line,
//! and receives a menu, a file, or an error line before the server closes the
//! connection.
//!
//! # Overview
//!
//! Serving a request is split into small pieces:
//!
//! 1. [`resolve::Resolver::resolve`] maps the selector below the configured root
//!    and decides whether it names a directory, a file, or nothing.
//! 2. Directories go through [`menu::MenuBuilder`], which either parses the
//!    directory's gophermap or synthesizes a listing from its children.
//! 3. [`render`] turns menus, error lines and text files into wire bytes.
//! 4. [`srv`] owns the sockets: it reads the selector, copies the response and
//!    closes the connection.
//!
//! All storage access goes through the [`fs::Filesystem`] trait.
//! [`fs::LocalFs`] serves the local disk.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rsgopher::{Config, Resolver, fs::LocalFs, srv::srv_async};
//!
//! #[tokio::main]
//! async fn main() -> rsgopher::Result<()> {
//!     let config = Config {
//!         host: "gopher.example.org".to_owned(),
//!         root: "/var/gopher".into(),
//!         ..Default::default()
//!     };
//!     let resolver = Resolver::new(Arc::new(config), LocalFs);
//!     srv_async(resolver, "tcp!0.0.0.0!70").await
//! }
//! ```
//!
//! # Gophermaps
//!
//! A directory containing a readable file named like
//! [`Config::map_filename`] (default `gophermap`) is described by that file,
//! one menu line per file line:
//!
//! - lines starting with `#` are comments
//! - lines without a tab are informational text
//! - other lines are `<type><name>\t<selector>\t<host>\t<port>`
//!
//! A line that can not be parsed is logged and skipped; it never affects the
//! rest of the menu.
//!
//! # Error Handling
//!
//! Per-request failures never reach the client as anything but a shorter menu,
//! an empty response, or the not-found line. [`Error`] is returned by startup
//! and by the accept loop.
//!
//! # Transport
//!
//! Listen addresses are written `"tcp!host!port"` (e.g., `"tcp!0.0.0.0!70"`).
pub mod config;
pub mod error;
pub mod fs;
pub mod item;
pub mod menu;
pub mod render;
pub mod resolve;
pub mod srv;
#[macro_use]
pub mod utils;

pub use crate::config::{Config, Encoding};
pub use crate::error::Error;
pub use crate::item::{ItemType, Menu, MenuEntry};
pub use crate::resolve::{Resolved, Resolver};
pub use crate::utils::Result;
