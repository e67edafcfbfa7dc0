//! Channel commands: JOIN, PART, MODE, TOPIC, KICK, INVITE, NAMES, LIST

use crate::channel::is_valid_channel_name;
use crate::client::ClientId;
use crate::modes::{format_mode_changes, parse_mode_changes, ChannelModes, MemberModes, ModeChange};
use crate::server::Server;
use crate::{Message, MessageType, NumericReply};

/// Longest NAMES payload before the list is split over several 353 lines
const NAMES_CHUNK: usize = 400;

/// Handle JOIN command
pub fn handle_join(server: &mut Server, id: ClientId, message: &Message) {
    if message.params[0] == "0" {
        part_all(server, id);
        return;
    }

    let keys: Vec<&str> = message
        .params
        .get(1)
        .map(|k| k.split(',').collect())
        .unwrap_or_default();

    for (i, name) in message.params[0].split(',').enumerate() {
        join_one(server, id, name, keys.get(i).copied());
    }
}

fn join_one(server: &mut Server, id: ClientId, name: &str, key: Option<&str>) {
    let nick = server.nick_of(id);

    if !is_valid_channel_name(name, server.config.server.max_channel_name_length) {
        server.reply(id, NumericReply::bad_chan_name(&nick, name));
        return;
    }

    let Some(client) = server.client(id) else {
        return;
    };
    let joined = client.channels.len();
    let prefix = client.prefix();

    if let Some(channel) = server.channels.find(name) {
        if channel.has_member(id) {
            return;
        }
        let refusal = if channel.key.is_some() && channel.key.as_deref() != key {
            Some(NumericReply::bad_channel_key(&nick, &channel.name))
        } else if channel.modes.contains(ChannelModes::INVITE_ONLY) && !channel.is_invited(id) {
            Some(NumericReply::invite_only_chan(&nick, &channel.name))
        } else if channel.is_full() {
            Some(NumericReply::channel_is_full(&nick, &channel.name))
        } else {
            None
        };
        if let Some(refusal) = refusal {
            server.reply(id, refusal);
            return;
        }
    }

    if joined >= server.config.server.max_channels_per_client {
        server.reply(id, NumericReply::too_many_channels(&nick, name));
        return;
    }

    server.join_channel(id, name);

    let Some(channel) = server.channels.find(name) else {
        return;
    };
    let channel_name = channel.name.clone();
    let topic = channel.topic.clone();

    let join = Message::with_prefix(prefix, MessageType::Join, vec![channel_name.clone()]);
    server.broadcast_channel(&channel_name, &join, None);

    match topic {
        Some(topic) => {
            server.reply(id, NumericReply::topic(&nick, &channel_name, &topic.text));
            server.reply(
                id,
                NumericReply::topic_who_time(&nick, &channel_name, &topic.set_by, topic.set_at.timestamp()),
            );
        }
        None => server.reply(id, NumericReply::no_topic(&nick, &channel_name)),
    }

    send_names(server, id, &channel_name);
    tracing::debug!("{} joined {}", nick, channel_name);
}

/// JOIN 0: leave every channel
fn part_all(server: &mut Server, id: ClientId) {
    let Some(client) = server.client(id) else {
        return;
    };
    let names: Vec<String> = client.channels.iter().cloned().collect();
    for name in names {
        part_one(server, id, &name, None);
    }
}

/// Handle PART command
pub fn handle_part(server: &mut Server, id: ClientId, message: &Message) {
    let reason = message.params.get(1).cloned();
    for name in message.params[0].split(',') {
        part_one(server, id, name, reason.clone());
    }
}

fn part_one(server: &mut Server, id: ClientId, name: &str, reason: Option<String>) {
    let nick = server.nick_of(id);
    let Some(channel) = server.channels.find(name) else {
        server.reply(id, NumericReply::no_such_channel(&nick, name));
        return;
    };
    if !channel.has_member(id) {
        let display = channel.name.clone();
        server.reply(id, NumericReply::not_on_channel(&nick, &display));
        return;
    }
    let display = channel.name.clone();

    let Some(client) = server.client(id) else {
        return;
    };
    let mut params = vec![display.clone()];
    params.extend(reason);
    let part = Message::with_prefix(client.prefix(), MessageType::Part, params);

    server.broadcast_channel(&display, &part, None);
    server.leave_channel(id, &display);
}

/// Handle TOPIC command
pub fn handle_topic(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let name = &message.params[0];

    let Some(channel) = server.channels.find(name) else {
        server.reply(id, NumericReply::no_such_channel(&nick, name));
        return;
    };
    let display = channel.name.clone();
    let is_member = channel.has_member(id);

    let Some(text) = message.params.get(1) else {
        if channel.is_secret() && !is_member {
            server.reply(id, NumericReply::not_on_channel(&nick, &display));
            return;
        }
        let reply = match channel.topic {
            Some(ref topic) => vec![
                NumericReply::topic(&nick, &display, &topic.text),
                NumericReply::topic_who_time(&nick, &display, &topic.set_by, topic.set_at.timestamp()),
            ],
            None => vec![NumericReply::no_topic(&nick, &display)],
        };
        for msg in reply {
            server.reply(id, msg);
        }
        return;
    };

    if !is_member {
        server.reply(id, NumericReply::not_on_channel(&nick, &display));
        return;
    }
    if channel.modes.contains(ChannelModes::TOPIC_LOCK) && !channel.is_operator(id) {
        server.reply(id, NumericReply::chanop_privs_needed(&nick, &display));
        return;
    }

    let text = truncate(text, server.config.server.max_topic_length);
    let Some(client) = server.client(id) else {
        return;
    };
    let prefix = client.prefix();
    let setter = prefix.to_string();

    if let Some(channel) = server.channels.find_mut(&display) {
        channel.set_topic(text, &setter);
    }

    let topic = Message::with_prefix(prefix, MessageType::Topic, vec![display.clone(), text.to_string()]);
    server.broadcast_channel(&display, &topic, None);
}

/// Cut a string to at most `max` bytes on a character boundary
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Handle MODE command
pub fn handle_mode(server: &mut Server, id: ClientId, message: &Message) {
    if message.params[0].starts_with('#') {
        channel_mode(server, id, message);
    } else {
        super::query::user_mode(server, id, message);
    }
}

fn channel_mode(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let name = &message.params[0];

    let Some(channel) = server.channels.find(name) else {
        server.reply(id, NumericReply::no_such_channel(&nick, name));
        return;
    };
    let display = channel.name.clone();

    let Some(mode_str) = message.params.get(1) else {
        let (modes, args) = channel.mode_string(channel.has_member(id));
        let created = channel.created_at.timestamp();
        server.reply(id, NumericReply::channel_mode_is(&nick, &display, &modes, &args));
        server.reply(id, NumericReply::creation_time(&nick, &display, created));
        return;
    };

    let changes = parse_mode_changes(mode_str, &message.params[2..]);
    let is_operator = channel.is_operator(id);
    let bans = channel.bans.clone();

    let (queries, changes): (Vec<ModeChange>, Vec<ModeChange>) = changes
        .into_iter()
        .partition(|c| c.mode == 'b' && c.param.is_none());

    if !queries.is_empty() {
        for mask in &bans {
            server.reply(id, NumericReply::ban_list(&nick, &display, mask));
        }
        server.reply(id, NumericReply::end_of_ban_list(&nick, &display));
    }

    if changes.is_empty() {
        return;
    }
    if !is_operator {
        server.reply(id, NumericReply::chanop_privs_needed(&nick, &display));
        return;
    }

    let mut applied = Vec::new();
    for change in changes {
        match apply_mode_change(server, &nick, &display, &change) {
            Some(reply) => server.reply(id, reply),
            None if is_effective(&change) => applied.push(change),
            None => {}
        }
    }

    if applied.is_empty() {
        return;
    }

    let Some(client) = server.client(id) else {
        return;
    };
    let (modes, args) = format_mode_changes(&applied);
    let mut params = vec![display.clone(), modes];
    params.extend(args);
    let mode = Message::with_prefix(client.prefix(), MessageType::Mode, params);
    server.broadcast_channel(&display, &mode, None);
}

/// Changes that were silently skipped for a missing argument are not echoed
fn is_effective(change: &ModeChange) -> bool {
    match change.mode {
        'o' | 'v' | 'b' => change.param.is_some(),
        'k' | 'l' => !change.adding || change.param.is_some(),
        _ => true,
    }
}

/// Apply one change to a channel. Returns an error reply when it is refused.
fn apply_mode_change(
    server: &mut Server,
    nick: &str,
    channel_name: &str,
    change: &ModeChange,
) -> Option<Message> {
    if let Some(flag) = MemberModes::from_char(change.mode) {
        let target_nick = change.param.as_deref()?;
        let Some(target) = server.find_nick(target_nick) else {
            return Some(NumericReply::no_such_nick(nick, target_nick));
        };
        let channel = server.channels.find_mut(channel_name)?;
        if !channel.set_member_mode(target, flag, change.adding) {
            return Some(NumericReply::user_not_in_channel(nick, target_nick, channel_name));
        }
        return None;
    }

    let channel = server.channels.find_mut(channel_name)?;

    if let Some(flag) = ChannelModes::from_char(change.mode) {
        channel.modes.set(flag, change.adding);
        return None;
    }

    match change.mode {
        'k' => {
            if change.adding {
                if let Some(ref key) = change.param {
                    channel.key = Some(key.clone());
                }
            } else {
                channel.key = None;
            }
            None
        }
        'l' => {
            if change.adding {
                match change.param.as_deref().map(str::parse::<usize>) {
                    Some(Ok(limit)) if limit > 0 => channel.limit = Some(limit),
                    _ => return Some(NumericReply::need_more_params(nick, "MODE")),
                }
            } else {
                channel.limit = None;
            }
            None
        }
        'b' => {
            if let Some(ref mask) = change.param {
                if change.adding {
                    if !channel.bans.contains(mask) {
                        channel.bans.push(mask.clone());
                    }
                } else {
                    channel.bans.retain(|b| b != mask);
                }
            }
            None
        }
        other => Some(NumericReply::unknown_mode(nick, other)),
    }
}

/// Handle KICK command
pub fn handle_kick(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let name = &message.params[0];

    let Some(channel) = server.channels.find(name) else {
        server.reply(id, NumericReply::no_such_channel(&nick, name));
        return;
    };
    let channel_name = channel.name.clone();
    if !channel.has_member(id) {
        server.reply(id, NumericReply::not_on_channel(&nick, &channel_name));
        return;
    }
    if !channel.is_operator(id) {
        server.reply(id, NumericReply::chanop_privs_needed(&nick, &channel_name));
        return;
    }

    let reason = message.params.get(2).cloned().unwrap_or_else(|| nick.clone());
    let Some(client) = server.client(id) else {
        return;
    };
    let prefix = client.prefix();

    for target_nick in message.params[1].split(',') {
        let Some(target) = server.find_nick(target_nick) else {
            server.reply(id, NumericReply::no_such_nick(&nick, target_nick));
            continue;
        };
        let on_channel = server
            .channels
            .find(&channel_name)
            .is_some_and(|c| c.has_member(target));
        if !on_channel {
            server.reply(id, NumericReply::user_not_in_channel(&nick, target_nick, &channel_name));
            continue;
        }

        let target_display = server.nick_of(target);
        let kick = Message::with_prefix(
            prefix.clone(),
            MessageType::Kick,
            vec![channel_name.clone(), target_display, reason.clone()],
        );
        server.broadcast_channel(&channel_name, &kick, None);
        server.leave_channel(target, &channel_name);
        tracing::debug!("{} kicked {} from {}", nick, target_nick, channel_name);
    }
}

/// Handle INVITE command
pub fn handle_invite(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let target_nick = &message.params[0];
    let name = &message.params[1];

    let Some(target) = server.find_nick(target_nick) else {
        server.reply(id, NumericReply::no_such_nick(&nick, target_nick));
        return;
    };
    let Some(channel) = server.channels.find(name) else {
        server.reply(id, NumericReply::no_such_channel(&nick, name));
        return;
    };
    let display = channel.name.clone();

    if !channel.has_member(id) {
        server.reply(id, NumericReply::not_on_channel(&nick, &display));
        return;
    }
    let target_display = server.nick_of(target);
    if channel.has_member(target) {
        server.reply(id, NumericReply::user_on_channel(&nick, &target_display, &display));
        return;
    }
    if channel.modes.contains(ChannelModes::INVITE_ONLY) && !channel.is_operator(id) {
        server.reply(id, NumericReply::chanop_privs_needed(&nick, &display));
        return;
    }

    if let Some(channel) = server.channels.find_mut(&display) {
        channel.invite(target);
    }

    server.reply(id, NumericReply::inviting(&nick, &target_display, &display));
    if let Some(away) = server.client(target).and_then(|c| c.away.clone()) {
        server.reply(id, NumericReply::away(&nick, &target_display, &away));
    }

    let Some(client) = server.client(id) else {
        return;
    };
    let invite = Message::with_prefix(
        client.prefix(),
        MessageType::Invite,
        vec![target_display, display],
    );
    server.send_to(target, &invite);
}

/// Handle NAMES command
pub fn handle_names(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);

    let Some(names) = message.params.first() else {
        let visible: Vec<String> = server
            .channels
            .iter_sorted()
            .into_iter()
            .filter(|c| !c.is_secret() || c.has_member(id))
            .map(|c| c.name.clone())
            .collect();
        for name in visible {
            send_names(server, id, &name);
        }
        return;
    };

    for name in names.split(',') {
        let visible = server
            .channels
            .find(name)
            .is_some_and(|c| !c.is_secret() || c.has_member(id));
        if visible {
            send_names(server, id, name);
        } else {
            server.reply(id, NumericReply::end_of_names(&nick, name));
        }
    }
}

/// 353 lines followed by 366, operators first then voiced then the rest
fn send_names(server: &mut Server, id: ClientId, name: &str) {
    let nick = server.nick_of(id);
    let Some(channel) = server.channels.find(name) else {
        return;
    };
    let display = channel.name.clone();
    let symbol = if channel.is_secret() { "@" } else { "=" };

    let mut members: Vec<(u8, String)> = channel
        .members()
        .filter_map(|(member, modes)| {
            let rank = match modes.prefix() {
                "@" => 0,
                "+" => 1,
                _ => 2,
            };
            server
                .client(member)
                .map(|c| (rank, format!("{}{}", modes.prefix(), c.nick())))
        })
        .collect();
    members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_ascii_lowercase().cmp(&b.1.to_ascii_lowercase())));

    let mut line = String::new();
    let mut lines = Vec::new();
    for (_, entry) in members {
        if !line.is_empty() && line.len() + entry.len() + 1 > NAMES_CHUNK {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&entry);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    for names in lines {
        server.reply(id, NumericReply::name_reply(&nick, symbol, &display, &names));
    }
    server.reply(id, NumericReply::end_of_names(&nick, &display));
}

/// Handle LIST command
pub fn handle_list(server: &mut Server, id: ClientId, message: &Message) {
    let nick = server.nick_of(id);
    let filter: Option<Vec<String>> = message
        .params
        .first()
        .map(|names| names.split(',').map(|n| n.to_ascii_lowercase()).collect());

    let entries: Vec<Message> = server
        .channels
        .iter_sorted()
        .into_iter()
        .filter(|c| !c.is_secret() || c.has_member(id))
        .filter(|c| {
            filter
                .as_ref()
                .map_or(true, |names| names.contains(&c.name.to_ascii_lowercase()))
        })
        .map(|c| {
            let topic = c.topic.as_ref().map(|t| t.text.as_str()).unwrap_or("");
            let (modes, _) = c.mode_string(false);
            NumericReply::list(&nick, &c.name, c.member_count(), &format!("[{}] {}", modes, topic))
        })
        .collect();

    server.reply(id, NumericReply::list_start(&nick));
    for entry in entries {
        server.reply(id, entry);
    }
    server.reply(id, NumericReply::list_end(&nick));
}
