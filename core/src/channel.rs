//! Channels and the channel registry

use crate::client::{casefold, ClientId};
use crate::modes::{ChannelModes, MemberModes};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Channel topic with its author and time
#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    /// `nick!user@host` of whoever set it
    pub set_by: String,
    pub set_at: DateTime<Utc>,
}

/// A named group of clients
#[derive(Debug, Clone)]
pub struct Channel {
    /// Channel name as first created (case preserved)
    pub name: String,
    /// Members and their privileges, ordered by connection id
    members: BTreeMap<ClientId, MemberModes>,
    pub modes: ChannelModes,
    /// +k
    pub key: Option<String>,
    /// +l
    pub limit: Option<usize>,
    /// +b masks, kept opaque
    pub bans: Vec<String>,
    /// Clients invited while the channel is +i
    invites: HashSet<ClientId>,
    pub topic: Option<Topic>,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: BTreeMap::new(),
            modes: ChannelModes::new_channel_defaults(),
            key: None,
            limit: None,
            bans: Vec::new(),
            invites: HashSet::new(),
            topic: None,
            created_at: Utc::now(),
        }
    }

    /// Add a member; returns false if it was already present
    pub fn add_member(&mut self, id: ClientId, modes: MemberModes) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        self.members.insert(id, modes);
        self.invites.remove(&id);
        true
    }

    /// Remove a member together with its privileges
    pub fn remove_member(&mut self, id: ClientId) -> bool {
        self.members.remove(&id).is_some()
    }

    pub fn has_member(&self, id: ClientId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn member_modes(&self, id: ClientId) -> Option<MemberModes> {
        self.members.get(&id).copied()
    }

    pub fn is_operator(&self, id: ClientId) -> bool {
        self.member_modes(id).is_some_and(|m| m.is_operator())
    }

    /// Grant or revoke a member privilege; false if `id` is not a member
    pub fn set_member_mode(&mut self, id: ClientId, mode: MemberModes, adding: bool) -> bool {
        match self.members.get_mut(&id) {
            Some(modes) => {
                modes.set(mode, adding);
                true
            }
            None => false,
        }
    }

    /// Member ids in deterministic order
    pub fn member_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.members.keys().copied()
    }

    pub fn members(&self) -> impl Iterator<Item = (ClientId, MemberModes)> + '_ {
        self.members.iter().map(|(id, modes)| (*id, *modes))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.members.len() >= limit)
    }

    pub fn invite(&mut self, id: ClientId) {
        self.invites.insert(id);
    }

    pub fn is_invited(&self, id: ClientId) -> bool {
        self.invites.contains(&id)
    }

    /// Forget a client that left the server
    pub fn forget_invite(&mut self, id: ClientId) {
        self.invites.remove(&id);
    }

    pub fn is_secret(&self) -> bool {
        self.modes.contains(ChannelModes::SECRET)
    }

    /// Set the topic, or clear it when `text` is empty
    pub fn set_topic(&mut self, text: &str, set_by: &str) {
        if text.is_empty() {
            self.topic = None;
        } else {
            self.topic = Some(Topic {
                text: text.to_string(),
                set_by: set_by.to_string(),
                set_at: Utc::now(),
            });
        }
    }

    /// Mode string and its arguments, e.g. `+klnt` with `[key, 10]`
    ///
    /// The key is only revealed to members.
    pub fn mode_string(&self, reveal_key: bool) -> (String, Vec<String>) {
        let mut letters = String::from("+");
        letters.push_str(&self.modes.letters());
        let mut args = Vec::new();

        if let Some(ref key) = self.key {
            letters.push('k');
            args.push(if reveal_key { key.clone() } else { "*".to_string() });
        }
        if let Some(limit) = self.limit {
            letters.push('l');
            args.push(limit.to_string());
        }

        (letters, args)
    }
}

/// Check if a string is a valid channel name
pub fn is_valid_channel_name(name: &str, max_len: usize) -> bool {
    if name.is_empty() || name.len() > max_len || !name.starts_with('#') {
        return false;
    }

    !name
        .chars()
        .any(|c| c == ' ' || c == ',' || c == ':' || c.is_control())
}

/// All live channels, keyed by case-folded name
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&casefold(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&casefold(name))
    }

    /// Look up a channel, creating it when absent. The flag is true on creation.
    pub fn get_or_create(&mut self, name: &str) -> (&mut Channel, bool) {
        let key = casefold(name);
        let created = !self.channels.contains_key(&key);
        if created {
            tracing::info!("Channel {} created", name);
        }
        let channel = self.channels.entry(key).or_insert_with(|| Channel::new(name));
        (channel, created)
    }

    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        let removed = self.channels.remove(&casefold(name));
        if let Some(ref channel) = removed {
            tracing::info!("Channel {} destroyed", channel.name);
        }
        removed
    }

    /// Destroy the channel if its last member has gone
    pub fn remove_if_empty(&mut self, name: &str) -> bool {
        if self.find(name).is_some_and(Channel::is_empty) {
            self.remove(name);
            return true;
        }
        false
    }

    /// Destroy every channel without members, returning their names
    pub fn gc(&mut self) -> Vec<String> {
        let empty: Vec<String> = self
            .channels
            .iter()
            .filter(|(_, channel)| channel.is_empty())
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = Vec::with_capacity(empty.len());
        for key in empty {
            if let Some(channel) = self.channels.remove(&key) {
                tracing::debug!("Garbage collected empty channel {}", channel.name);
                removed.push(channel.name);
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channels sorted by name
    pub fn iter_sorted(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.values().collect();
        channels.sort_by(|a, b| casefold(&a.name).cmp(&casefold(&b.name)));
        channels
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }
}
