//! Client connection state

use crate::buffer::{ConnectionTiming, RecvQueue, SendQueue};
use crate::{Error, Message, Prefix, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Server-assigned connection identifier, increasing in accept order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Registration progress of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Just connected, neither NICK nor USER accepted
    Anon,
    /// Nickname set
    NickSet,
    /// User info provided
    UserSet,
    /// Fully registered
    Registered,
}

/// One accepted client connection
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub state: ClientState,
    /// None until the first accepted NICK
    pub nick: Option<String>,
    /// None until USER
    pub username: Option<String>,
    pub realname: String,
    /// Resolved hostname, or the textual IP when resolution failed
    pub hostname: String,
    pub addr: SocketAddr,
    /// Case-folded names of joined channels
    pub channels: BTreeSet<String>,
    pub away: Option<String>,
    /// Server operator; never granted by any command here
    pub is_operator: bool,
    pub signon: DateTime<Utc>,
    pub timing: ConnectionTiming,
    /// Last time the client sent PRIVMSG or NOTICE, for WHOIS idle
    pub last_message: Instant,
    pub recvq: RecvQueue,
    pub sendq: SendQueue,
    /// Bounded writer task channel; None for detached clients whose output
    /// stays queued
    sender: Option<mpsc::Sender<String>>,
}

impl Client {
    pub fn new(
        id: ClientId,
        addr: SocketAddr,
        hostname: String,
        recv_limit: usize,
        send_limit: usize,
        now: Instant,
    ) -> Self {
        Self {
            id,
            state: ClientState::Anon,
            nick: None,
            username: None,
            realname: String::new(),
            hostname,
            addr,
            channels: BTreeSet::new(),
            away: None,
            is_operator: false,
            signon: Utc::now(),
            timing: ConnectionTiming::new(now),
            last_message: now,
            recvq: RecvQueue::new(recv_limit),
            sendq: SendQueue::new(send_limit),
            sender: None,
        }
    }

    /// Attach the channel feeding this client's socket writer
    pub fn attach_sender(&mut self, sender: mpsc::Sender<String>) {
        self.sender = Some(sender);
    }

    /// Detach the writer channel; the writer task ends once it has drained
    pub fn take_sender(&mut self) -> Option<mpsc::Sender<String>> {
        self.sender.take()
    }

    /// Nickname, or `*` before one is set
    pub fn nick(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown")
    }

    /// `nick!user@host` prefix for messages originating from this client
    pub fn prefix(&self) -> Prefix {
        Prefix::User {
            nick: self.nick().to_string(),
            user: self.username().to_string(),
            host: self.hostname.clone(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.state == ClientState::Registered
    }

    pub fn has_nick(&self) -> bool {
        self.nick.is_some()
    }

    pub fn has_user(&self) -> bool {
        self.username.is_some()
    }

    /// User mode string as shown by RPL_UMODEIS
    pub fn user_modes(&self) -> String {
        if self.is_operator {
            "+o".to_string()
        } else {
            "+".to_string()
        }
    }

    /// Queue a message for delivery. False when the send queue is full.
    pub fn queue(&mut self, message: &Message) -> bool {
        self.sendq.push(message.to_wire())
    }

    /// Hand queued lines to the writer task.
    ///
    /// Lines the writer has no room for stay queued and keep counting against
    /// the send queue limit. Without a writer everything stays queued.
    pub fn flush(&mut self) -> Result<()> {
        let Some(ref sender) = self.sender else {
            return Ok(());
        };

        while let Some(line) = self.sendq.pop() {
            match sender.try_send(line) {
                Ok(()) => {}
                Err(TrySendError::Full(line)) => {
                    self.sendq.push_front(line);
                    break;
                }
                Err(TrySendError::Closed(_)) => {
                    return Err(Error::Connection(format!("Writer for {} has gone away", self.id)));
                }
            }
        }
        Ok(())
    }

    /// Take all queued output
    pub fn take_output(&mut self) -> Vec<String> {
        self.sendq.drain()
    }
}

/// ASCII case folding used for nickname and channel comparisons
pub fn casefold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Check if a string is a valid nickname
pub fn is_valid_nickname(nick: &str, max_length: usize) -> bool {
    if nick.is_empty() || nick.len() > max_length {
        return false;
    }

    let mut chars = nick.chars();

    // First character must be letter or special character
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || "[]\\`_^{|}".contains(first) => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || "-[]\\`_^{|}".contains(c))
}
