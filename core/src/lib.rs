//! tinyircd core
//!
//! This crate provides a single-process IRC server based on RFC 1459 and
//! RFC 2812: the wire codec, client and channel state, command handlers and
//! the event loop driving them.

pub mod buffer;
pub mod channel;
pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod lookup;
pub mod message;
pub mod modes;
pub mod numeric;
pub mod server;

pub use buffer::{ConnectionTiming, RecvQueue, SendQueue};
pub use channel::{Channel, ChannelRegistry};
pub use client::{Client, ClientId, ClientState};
pub use config::Config;
pub use connection::{run, serve};
pub use error::{Error, Result};
pub use lookup::DnsResolver;
pub use message::{Message, MessageType, Prefix};
pub use modes::{ChannelModes, MemberModes};
pub use numeric::NumericReply;
pub use server::Server;
