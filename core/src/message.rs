//! IRC message parsing and formatting
//!
//! This module implements the line format of RFC 1459: an optional `:prefix`,
//! a command token, space separated middle parameters and an optional trailing
//! parameter introduced by `:` which may itself contain spaces.

use std::fmt;

/// IRC message prefix (server or user)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// Server name
    Server(String),
    /// User prefix (nick!user@host)
    User {
        nick: String,
        user: String,
        host: String,
    },
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Server(name) => write!(f, "{}", name),
            Prefix::User { nick, user, host } => write!(f, "{}!{}@{}", nick, user, host),
        }
    }
}

impl Prefix {
    fn parse(input: &str) -> crate::Result<Self> {
        match input.split_once('!') {
            Some((nick, rest)) => {
                let (user, host) = rest.split_once('@').ok_or_else(|| {
                    crate::Error::MessageParse("Invalid user prefix format".to_string())
                })?;
                Ok(Prefix::User {
                    nick: nick.to_string(),
                    user: user.to_string(),
                    host: host.to_string(),
                })
            }
            None => Ok(Prefix::Server(input.to_string())),
        }
    }
}

/// IRC message types understood by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Connection registration
    Nick,
    User,
    Quit,

    // Channel operations
    Join,
    Part,
    Mode,
    Topic,
    Names,
    List,
    Invite,
    Kick,

    // Server queries
    Version,
    Time,
    Motd,
    Lusers,

    // Messaging
    PrivMsg,
    Notice,

    // User queries
    Who,
    Whois,

    // Miscellaneous
    Ping,
    Pong,
    Error,
    Away,
    Ison,
    Userhost,

    /// Anything else, including numeric replies, kept as sent
    Custom(String),
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Nick => "NICK",
            MessageType::User => "USER",
            MessageType::Quit => "QUIT",
            MessageType::Join => "JOIN",
            MessageType::Part => "PART",
            MessageType::Mode => "MODE",
            MessageType::Topic => "TOPIC",
            MessageType::Names => "NAMES",
            MessageType::List => "LIST",
            MessageType::Invite => "INVITE",
            MessageType::Kick => "KICK",
            MessageType::Version => "VERSION",
            MessageType::Time => "TIME",
            MessageType::Motd => "MOTD",
            MessageType::Lusers => "LUSERS",
            MessageType::PrivMsg => "PRIVMSG",
            MessageType::Notice => "NOTICE",
            MessageType::Who => "WHO",
            MessageType::Whois => "WHOIS",
            MessageType::Ping => "PING",
            MessageType::Pong => "PONG",
            MessageType::Error => "ERROR",
            MessageType::Away => "AWAY",
            MessageType::Ison => "ISON",
            MessageType::Userhost => "USERHOST",
            MessageType::Custom(cmd) => cmd,
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "NICK" => MessageType::Nick,
            "USER" => MessageType::User,
            "QUIT" => MessageType::Quit,
            "JOIN" => MessageType::Join,
            "PART" => MessageType::Part,
            "MODE" => MessageType::Mode,
            "TOPIC" => MessageType::Topic,
            "NAMES" => MessageType::Names,
            "LIST" => MessageType::List,
            "INVITE" => MessageType::Invite,
            "KICK" => MessageType::Kick,
            "VERSION" => MessageType::Version,
            "TIME" => MessageType::Time,
            "MOTD" => MessageType::Motd,
            "LUSERS" => MessageType::Lusers,
            "PRIVMSG" => MessageType::PrivMsg,
            "NOTICE" => MessageType::Notice,
            "WHO" => MessageType::Who,
            "WHOIS" => MessageType::Whois,
            "PING" => MessageType::Ping,
            "PONG" => MessageType::Pong,
            "ERROR" => MessageType::Error,
            "AWAY" => MessageType::Away,
            "ISON" => MessageType::Ison,
            "USERHOST" => MessageType::Userhost,
            _ => MessageType::Custom(s.to_string()),
        }
    }
}

impl MessageType {
    /// Whether the final parameter is free text, written with a leading `:`
    /// even when it holds a single word
    fn final_param_is_text(&self, param_count: usize) -> bool {
        match self {
            MessageType::Quit | MessageType::Error | MessageType::Away => true,
            MessageType::PrivMsg | MessageType::Notice | MessageType::Part | MessageType::Topic => {
                param_count >= 2
            }
            MessageType::Kick => param_count >= 3,
            MessageType::Custom(code) => {
                param_count >= 2 && code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        }
    }
}

/// IRC message as defined in RFC 1459
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Optional prefix (server or user)
    pub prefix: Option<Prefix>,
    /// Message command/type
    pub command: MessageType,
    /// Message parameters
    pub params: Vec<String>,
}

impl Message {
    /// Create a new message
    pub fn new(command: MessageType, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command,
            params,
        }
    }

    /// Create a new message with prefix
    pub fn with_prefix(prefix: Prefix, command: MessageType, params: Vec<String>) -> Self {
        Self {
            prefix: Some(prefix),
            command,
            params,
        }
    }

    /// Parse an IRC message from a single line (without the line terminator)
    ///
    /// Tokens are separated by spaces. A token starting with `:` begins the
    /// trailing parameter, which runs to the end of the line verbatim.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let mut rest = input.trim_matches(|c| c == ' ' || c == '\r' || c == '\n');
        if rest.is_empty() {
            return Err(crate::Error::MessageParse("Empty message".to_string()));
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (token, remainder) = next_token(stripped);
            prefix = Some(Prefix::parse(token)?);
            rest = remainder;
        }

        let (command_str, mut rest) = next_token(rest);
        if command_str.is_empty() {
            return Err(crate::Error::MessageParse("No command found".to_string()));
        }

        let mut params = Vec::new();
        while !rest.is_empty() {
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (token, remainder) = next_token(rest);
            params.push(token.to_string());
            rest = remainder;
        }

        Ok(Message {
            prefix,
            command: MessageType::from(command_str),
            params,
        })
    }

    /// Serialize the message for the wire, CRLF terminated
    pub fn to_wire(&self) -> String {
        let mut line = self.to_string();
        line.push_str("\r\n");
        line
    }
}

/// Split off the first space-delimited token, skipping repeated spaces
fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start_matches(' ');
    match input.find(' ') {
        Some(pos) => (&input[..pos], input[pos + 1..].trim_start_matches(' ')),
        None => (input, ""),
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)?;

        let last = self.params.len().saturating_sub(1);
        let text_trailing = self.command.final_param_is_text(self.params.len());
        for (i, param) in self.params.iter().enumerate() {
            let needs_colon = i == last
                && (text_trailing
                    || param.is_empty()
                    || param.contains(' ')
                    || param.starts_with(':'));
            if needs_colon {
                write!(f, " :{}", param)?;
            } else {
                write!(f, " {}", param)?;
            }
        }
        Ok(())
    }
}
