//! Connection registration: NICK, USER, PING, PONG, QUIT and MOTD

use crate::client::{is_valid_nickname, ClientId, ClientState};
use crate::server::Server;
use crate::{Message, MessageType, NumericReply};

/// Handle NICK command
pub fn handle_nick(server: &mut Server, id: ClientId, message: &Message) {
    let current = server.nick_of(id);

    let Some(new_nick) = message.params.first().filter(|n| !n.is_empty()) else {
        server.reply(id, NumericReply::no_nickname_given(&current));
        return;
    };

    if !is_valid_nickname(new_nick, server.config.server.max_nickname_length) {
        server.reply(id, NumericReply::erroneous_nickname(&current, new_nick));
        return;
    }

    match server.find_nick(new_nick) {
        Some(owner) if owner != id => {
            server.reply(id, NumericReply::nickname_in_use(&current, new_nick));
            return;
        }
        _ => {}
    }

    let Some(client) = server.client(id) else {
        return;
    };
    if client.nick.as_deref() == Some(new_nick.as_str()) {
        return;
    }
    let old_prefix = client.prefix();
    let state = client.state;

    server.rename(id, new_nick);

    match state {
        ClientState::Registered => {
            let notice = Message::with_prefix(old_prefix, MessageType::Nick, vec![new_nick.clone()]);
            server.broadcast_to_peers(id, &notice, true);
            tracing::info!("{} is now known as {}", current, new_nick);
        }
        ClientState::Anon | ClientState::NickSet => set_state(server, id, ClientState::NickSet),
        ClientState::UserSet => complete_registration(server, id),
    }
}

/// Handle USER command
pub fn handle_user(server: &mut Server, id: ClientId, message: &Message) {
    let Some(client) = server.client_mut(id) else {
        return;
    };
    if client.has_user() {
        let nick = client.nick().to_string();
        server.reply(id, NumericReply::already_registered(&nick));
        return;
    }

    client.username = Some(message.params[0].clone());
    client.realname = message.params[3].clone();
    let state = client.state;

    match state {
        ClientState::NickSet => complete_registration(server, id),
        _ => set_state(server, id, ClientState::UserSet),
    }
}

fn set_state(server: &mut Server, id: ClientId, state: ClientState) {
    if let Some(client) = server.client_mut(id) {
        client.state = state;
    }
}

fn complete_registration(server: &mut Server, id: ClientId) {
    set_state(server, id, ClientState::Registered);
    if let Some(client) = server.client(id) {
        tracing::info!("Client {} registered as {}", id, client.prefix());
    }
    send_welcome(server, id);
}

/// ISUPPORT tokens advertised in 005
fn isupport_tokens(server: &Server) -> Vec<String> {
    let config = &server.config.server;
    vec![
        "CHANTYPES=#".to_string(),
        "PREFIX=(ov)@+".to_string(),
        "CHANMODES=b,k,l,imnst".to_string(),
        format!("NICKLEN={}", config.max_nickname_length),
        format!("CHANNELLEN={}", config.max_channel_name_length),
        format!("TOPICLEN={}", config.max_topic_length),
        format!("CHANLIMIT=#:{}", config.max_channels_per_client),
        "CASEMAPPING=ascii".to_string(),
        format!("NETWORK={}", config.network),
    ]
}

/// Welcome burst: 001-005 followed by the MOTD
fn send_welcome(server: &mut Server, id: ClientId) {
    let Some(client) = server.client(id) else {
        return;
    };
    let nick = client.nick().to_string();
    let user = client.username().to_string();
    let host = client.hostname.clone();

    let config = &server.config.server;
    let replies = vec![
        NumericReply::welcome(&nick, &user, &host, &config.network),
        NumericReply::your_host(&nick, &config.name, &config.version),
        NumericReply::created(&nick, &config.created),
        NumericReply::my_info(&nick, &config.name, &config.version, "o", "biklmnostv"),
        NumericReply::isupport(&nick, &isupport_tokens(server)),
    ];
    for reply in replies {
        server.reply(id, reply);
    }

    send_motd(server, id);
}

fn send_motd(server: &mut Server, id: ClientId) {
    let nick = server.nick_of(id);
    let lines: Vec<String> = server
        .config
        .motd_lines()
        .into_iter()
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        server.reply(id, NumericReply::no_motd(&nick));
        return;
    }

    let server_name = server.config.server.name.clone();
    server.reply(id, NumericReply::motd_start(&nick, &server_name));
    for line in &lines {
        server.reply(id, NumericReply::motd_line(&nick, line));
    }
    server.reply(id, NumericReply::end_of_motd(&nick));
}

/// Handle MOTD command
pub fn handle_motd(server: &mut Server, id: ClientId, _message: &Message) {
    send_motd(server, id);
}

/// Handle PING command
pub fn handle_ping(server: &mut Server, id: ClientId, message: &Message) {
    let Some(token) = message.params.first() else {
        let nick = server.nick_of(id);
        server.reply(id, NumericReply::no_origin(&nick));
        return;
    };

    let pong = Message::new(
        MessageType::Pong,
        vec![server.config.server.name.clone(), token.clone()],
    );
    server.reply(id, pong);
}

/// Handle PONG command
///
/// Liveness was already refreshed when the line arrived.
pub fn handle_pong(_server: &mut Server, id: ClientId, _message: &Message) {
    tracing::trace!("PONG from {}", id);
}

/// Handle QUIT command
pub fn handle_quit(server: &mut Server, id: ClientId, message: &Message) {
    let reason = match message.params.first().filter(|r| !r.is_empty()) {
        Some(reason) => reason.clone(),
        None => server.nick_of(id),
    };
    server.disconnect(id, &reason);
}
