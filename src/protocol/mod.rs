//! Line-delimited JSON wire protocol between `treecmp` and `treecmp serve`
//!
//! The comparing side spawns the transport (ssh) and talks to its stdio
//! through [`ProtocolClient`]; the remote side runs [`serve`] on its own
//! stdin/stdout.

pub mod client;
pub mod error;
pub mod messages;
pub mod server;

pub use client::{ProtocolClient, SshSession};
pub use error::ProtocolError;
pub use messages::{RemoteErrorKind, Request, Response, FRAME_SIZE, PROTOCOL_VERSION};
pub use server::{serve, serve_stdio};

// vim: ts=4
