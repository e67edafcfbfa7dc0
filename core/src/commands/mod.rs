//! Command dispatch
//!
//! Every command the server understands has a [`CommandSpec`] in a static
//! table: its minimum parameter count, whether it is allowed before
//! registration and the handler to run. Handlers answer protocol errors with
//! numeric replies and never fail.

mod channel;
mod messaging;
mod query;
mod registration;

use crate::client::ClientId;
use crate::server::Server;
use crate::{Message, MessageType, NumericReply};

/// Uniform handler signature
pub type Handler = fn(&mut Server, ClientId, &Message);

/// Static description of one command
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Fewer parameters than this yields ERR_NEEDMOREPARAMS before the handler runs
    pub min_params: usize,
    /// Usable before registration completes
    pub pre_registration: bool,
    pub handler: Handler,
}

impl CommandSpec {
    const fn new(min_params: usize, pre_registration: bool, handler: Handler) -> Self {
        Self {
            min_params,
            pre_registration,
            handler,
        }
    }
}

/// Look up the table entry for a command
pub fn lookup(command: &MessageType) -> Option<CommandSpec> {
    use MessageType::*;

    let spec = match command {
        // NICK, PRIVMSG and NOTICE check their own parameters for distinct numerics
        Nick => CommandSpec::new(0, true, registration::handle_nick),
        User => CommandSpec::new(4, true, registration::handle_user),
        Ping => CommandSpec::new(0, true, registration::handle_ping),
        Pong => CommandSpec::new(0, true, registration::handle_pong),
        Quit => CommandSpec::new(0, true, registration::handle_quit),
        Motd => CommandSpec::new(0, true, registration::handle_motd),
        Version => CommandSpec::new(0, true, query::handle_version),
        Time => CommandSpec::new(0, true, query::handle_time),
        Lusers => CommandSpec::new(0, true, query::handle_lusers),

        Join => CommandSpec::new(1, false, channel::handle_join),
        Part => CommandSpec::new(1, false, channel::handle_part),
        Mode => CommandSpec::new(1, false, channel::handle_mode),
        Topic => CommandSpec::new(1, false, channel::handle_topic),
        Kick => CommandSpec::new(2, false, channel::handle_kick),
        Invite => CommandSpec::new(2, false, channel::handle_invite),
        Names => CommandSpec::new(0, false, channel::handle_names),
        List => CommandSpec::new(0, false, channel::handle_list),

        PrivMsg => CommandSpec::new(0, false, messaging::handle_privmsg),
        Notice => CommandSpec::new(0, false, messaging::handle_notice),
        Away => CommandSpec::new(0, false, messaging::handle_away),

        Whois => CommandSpec::new(1, false, query::handle_whois),
        Who => CommandSpec::new(0, false, query::handle_who),
        Ison => CommandSpec::new(1, false, query::handle_ison),
        Userhost => CommandSpec::new(1, false, query::handle_userhost),

        Error | Custom(_) => return None,
    };
    Some(spec)
}

/// Route one parsed message from a client to its handler
pub fn dispatch(server: &mut Server, id: ClientId, message: &Message) {
    let Some(client) = server.client(id) else {
        return;
    };
    let registered = client.is_registered();
    let nick = client.nick().to_string();
    let command = message.command.to_string();

    let Some(spec) = lookup(&message.command) else {
        server.reply(id, NumericReply::unknown_command(&nick, &command));
        return;
    };

    if !registered && !spec.pre_registration {
        server.reply(id, NumericReply::not_registered(&nick));
        return;
    }

    if message.params.len() < spec.min_params {
        server.reply(id, NumericReply::need_more_params(&nick, &command));
        return;
    }

    (spec.handler)(server, id, message);
}
