//! PRIVMSG, NOTICE and AWAY

use crate::client::ClientId;
use crate::modes::ChannelModes;
use crate::server::Server;
use crate::{Message, MessageType, NumericReply};

/// Handle PRIVMSG command
pub fn handle_privmsg(server: &mut Server, id: ClientId, message: &Message) {
    deliver(server, id, message, MessageType::PrivMsg);
}

/// Handle NOTICE command
///
/// Never answered with an error reply.
pub fn handle_notice(server: &mut Server, id: ClientId, message: &Message) {
    deliver(server, id, message, MessageType::Notice);
}

fn deliver(server: &mut Server, id: ClientId, message: &Message, command: MessageType) {
    let notice = command == MessageType::Notice;
    let nick = server.nick_of(id);

    let Some(targets) = message.params.first().filter(|t| !t.is_empty()) else {
        if !notice {
            server.reply(id, NumericReply::no_recipient(&nick, &command.to_string()));
        }
        return;
    };
    let Some(text) = message.params.get(1).filter(|t| !t.is_empty()) else {
        if !notice {
            server.reply(id, NumericReply::no_text_to_send(&nick));
        }
        return;
    };

    let Some(client) = server.client_mut(id) else {
        return;
    };
    client.last_message = client.timing.last_activity;
    let prefix = client.prefix();

    for target in targets.split(',') {
        let outgoing = Message::with_prefix(
            prefix.clone(),
            command.clone(),
            vec![target.to_string(), text.clone()],
        );

        if target.starts_with('#') {
            let Some(channel) = server.channels.find(target) else {
                if !notice {
                    server.reply(id, NumericReply::no_such_nick(&nick, target));
                }
                continue;
            };

            let member = channel.member_modes(id);
            let blocked_external =
                channel.modes.contains(ChannelModes::NO_EXTERNAL) && member.is_none();
            let blocked_moderated = channel.modes.contains(ChannelModes::MODERATED)
                && !member.is_some_and(|m| m.can_speak_moderated());

            if blocked_external || blocked_moderated {
                let display = channel.name.clone();
                if !notice {
                    server.reply(id, NumericReply::cannot_send_to_chan(&nick, &display));
                }
                continue;
            }

            let display = channel.name.clone();
            server.broadcast_channel(&display, &outgoing, Some(id));
        } else {
            let Some(recipient) = server.find_nick(target) else {
                if !notice {
                    server.reply(id, NumericReply::no_such_nick(&nick, target));
                }
                continue;
            };

            server.send_to(recipient, &outgoing);

            if !notice {
                if let Some(away) = server.client(recipient).and_then(|c| c.away.clone()) {
                    let recipient_nick = server.nick_of(recipient);
                    server.reply(id, NumericReply::away(&nick, &recipient_nick, &away));
                }
            }
        }
    }
}

/// Handle AWAY command
pub fn handle_away(server: &mut Server, id: ClientId, message: &Message) {
    let away = message.params.first().filter(|m| !m.is_empty()).cloned();

    let Some(client) = server.client_mut(id) else {
        return;
    };
    let nick = client.nick().to_string();
    let reply = if away.is_some() {
        NumericReply::now_away(&nick)
    } else {
        NumericReply::unaway(&nick)
    };
    client.away = away;
    server.reply(id, reply);
}
