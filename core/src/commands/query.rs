//! Read-only queries over the registries, plus user MODE

use crate::client::{casefold, Client, ClientId};
use crate::server::Server;
use crate::{Message, MessageType, NumericReply};
use chrono::Utc;

/// Handle WHOIS command
pub fn handle_whois(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    // WHOIS [server] nick
    let targets = message.params.last().cloned().unwrap_or_default();
    let now = server
        .client(id)
        .map(|c| c.timing.last_activity)
        .unwrap_or_else(std::time::Instant::now);

    for target_nick in targets.split(',').filter(|t| !t.is_empty()) {
        let Some(target) = server.find_nick(target_nick).and_then(|t| server.client(t)) else {
            server.reply(id, NumericReply::no_such_nick(&nick, target_nick));
            server.reply(id, NumericReply::end_of_whois(&nick, target_nick));
            continue;
        };

        let target_display = target.nick().to_string();
        let mut replies = vec![NumericReply::whois_user(
            &nick,
            &target_display,
            target.username(),
            &target.hostname,
            &target.realname,
        )];

        let channels = whois_channel_list(server, id, target);
        if !channels.is_empty() {
            replies.push(NumericReply::whois_channels(&nick, &target_display, &channels));
        }

        let config = &server.config.server;
        replies.push(NumericReply::whois_server(
            &nick,
            &target_display,
            &config.name,
            &config.network,
        ));
        if target.is_operator {
            replies.push(NumericReply::whois_operator(&nick, &target_display));
        }
        if let Some(ref away) = target.away {
            replies.push(NumericReply::away(&nick, &target_display, away));
        }
        let idle = now.saturating_duration_since(target.last_message).as_secs();
        replies.push(NumericReply::whois_idle(
            &nick,
            &target_display,
            idle,
            target.signon.timestamp(),
        ));
        replies.push(NumericReply::end_of_whois(&nick, &target_display));

        for reply in replies {
            server.reply(id, reply);
        }
    }
}

/// Channels of `target` as seen by `viewer`, with membership prefixes
fn whois_channel_list(server: &Server, viewer: ClientId, target: &Client) -> String {
    target
        .channels
        .iter()
        .filter_map(|name| server.channels.find(name))
        .filter(|channel| !channel.is_secret() || channel.has_member(viewer))
        .map(|channel| {
            let prefix = channel
                .member_modes(target.id)
                .map(|m| m.prefix())
                .unwrap_or("");
            format!("{}{}", prefix, channel.name)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Handle WHO command
pub fn handle_who(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let mask = message
        .params
        .first()
        .cloned()
        .filter(|m| m != "0")
        .unwrap_or_else(|| "*".to_string());

    let server_name = server.config.server.name.clone();
    let mut replies = Vec::new();

    if mask.starts_with('#') {
        if let Some(channel) = server.channels.find(&mask) {
            if !channel.is_secret() || channel.has_member(id) {
                for (member, modes) in channel.members() {
                    if let Some(client) = server.client(member) {
                        replies.push(who_reply(&nick, &channel.name, client, modes.prefix(), &server_name));
                    }
                }
            }
        }
    } else if mask == "*" {
        for client in server.clients().filter(|c| c.is_registered()) {
            replies.push(who_reply(&nick, "*", client, "", &server_name));
        }
    } else if let Some(client) = server.find_nick(&mask).and_then(|t| server.client(t)) {
        replies.push(who_reply(&nick, "*", client, "", &server_name));
    }

    replies.push(NumericReply::end_of_who(&nick, &mask));
    for reply in replies {
        server.reply(id, reply);
    }
}

fn who_reply(nick: &str, channel: &str, client: &Client, prefix: &str, server_name: &str) -> Message {
    let mut flags = String::from(if client.away.is_some() { "G" } else { "H" });
    if client.is_operator {
        flags.push('*');
    }
    flags.push_str(prefix);

    NumericReply::who_reply(
        nick,
        channel,
        client.username(),
        &client.hostname,
        server_name,
        client.nick(),
        &flags,
        &client.realname,
    )
}

/// Handle ISON command
pub fn handle_ison(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let online: Vec<String> = message
        .params
        .iter()
        .flat_map(|p| p.split_whitespace())
        .filter_map(|n| server.find_nick(n))
        .map(|t| server.nick_of(t))
        .collect();

    server.reply(id, NumericReply::ison(&nick, &online));
}

/// Handle USERHOST command
pub fn handle_userhost(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let entries: Vec<String> = message
        .params
        .iter()
        .flat_map(|p| p.split_whitespace())
        .take(5)
        .filter_map(|n| server.find_nick(n).and_then(|t| server.client(t)))
        .map(|c| {
            format!(
                "{}{}={}{}@{}",
                c.nick(),
                if c.is_operator { "*" } else { "" },
                if c.away.is_some() { "-" } else { "+" },
                c.username(),
                c.hostname
            )
        })
        .collect();

    server.reply(id, NumericReply::userhost(&nick, &entries));
}

/// Handle VERSION command
pub fn handle_version(server: &mut Server, id: ClientId, _message: &Message) {
    let nick = server.nick_of(id);
    let config = &server.config.server;
    let reply = NumericReply::version(&nick, &config.version, &config.name, &config.network);
    server.reply(id, reply);
}

/// Handle TIME command
pub fn handle_time(server: &mut Server, id: ClientId, _message: &Message) {
    let nick = server.nick_of(id);
    let reply = NumericReply::time(&nick, &server.config.server.name, &Utc::now().to_rfc2822());
    server.reply(id, reply);
}

/// Handle LUSERS command
pub fn handle_lusers(server: &mut Server, id: ClientId, _message: &Message) {
    let nick = server.nick_of(id);
    let registered = server.registered_count();
    let total = server.client_count();

    let replies = vec![
        NumericReply::luser_client(&nick, registered),
        NumericReply::luser_op(&nick, server.operator_count()),
        NumericReply::luser_unknown(&nick, total - registered),
        NumericReply::luser_channels(&nick, server.channels.len()),
        NumericReply::luser_me(&nick, total),
    ];
    for reply in replies {
        server.reply(id, reply);
    }
}

/// MODE on a nickname. Only the issuer's own modes can be queried; the only
/// change honoured is dropping operator status with `-o`.
pub fn user_mode(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    if casefold(&message.params[0]) != casefold(&nick) {
        server.reply(id, NumericReply::users_dont_match(&nick));
        return;
    }

    let Some(change) = message.params.get(1) else {
        let modes = server
            .client(id)
            .map(Client::user_modes)
            .unwrap_or_default();
        server.reply(id, NumericReply::umode_is(&nick, &modes));
        return;
    };

    if change == "-o" {
        if let Some(client) = server.client_mut(id) {
            if client.is_operator {
                client.is_operator = false;
                let prefix = client.prefix();
                let mode = Message::with_prefix(
                    prefix,
                    MessageType::Mode,
                    vec![nick.clone(), "-o".to_string()],
                );
                server.send_to(id, &mode);
            }
        }
    }
}
