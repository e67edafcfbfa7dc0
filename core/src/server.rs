//! Server state and client lifecycle
//!
//! [`Server`] owns every registry: live clients, the nickname index, channels
//! and per-IP connection counts. It is driven from a single task (see
//! [`crate::connection::run`]) so none of it needs locking. Sockets never
//! appear here; clients receive output through their send queues, which the
//! event loop flushes to per-connection writer tasks.

use crate::channel::ChannelRegistry;
use crate::client::{casefold, Client, ClientId};
use crate::commands;
use crate::modes::MemberModes;
use crate::{Config, Message, MessageType, Prefix};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;
use tokio::sync::mpsc;

/// The single authoritative IRC server state
#[derive(Debug)]
pub struct Server {
    pub config: Config,
    clients: BTreeMap<ClientId, Client>,
    /// Case-folded nickname to owner
    nicks: HashMap<String, ClientId>,
    pub channels: ChannelRegistry,
    connections_per_ip: HashMap<IpAddr, usize>,
    /// Disconnects requested while a handler was running
    pending_disconnects: Vec<(ClientId, String)>,
    /// Final output of closed clients that had no writer attached
    closed_output: HashMap<ClientId, Vec<String>>,
    next_id: u64,
    pub started_at: DateTime<Utc>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clients: BTreeMap::new(),
            nicks: HashMap::new(),
            channels: ChannelRegistry::new(),
            connections_per_ip: HashMap::new(),
            pending_disconnects: Vec::new(),
            closed_output: HashMap::new(),
            next_id: 1,
            started_at: Utc::now(),
        }
    }

    /// Prefix for server-originated messages
    pub fn prefix(&self) -> Prefix {
        Prefix::Server(self.config.server.name.clone())
    }

    /// Whether another connection from `ip` stays within the per-IP limit
    pub fn accepts_from(&self, ip: IpAddr) -> bool {
        self.connections_per_ip.get(&ip).copied().unwrap_or(0)
            < self.config.connection.max_connections_per_ip
    }

    /// Register a newly accepted connection
    pub fn add_client(&mut self, addr: SocketAddr, hostname: String) -> ClientId {
        self.add_client_at(addr, hostname, Instant::now())
    }

    pub fn add_client_at(&mut self, addr: SocketAddr, hostname: String, now: Instant) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;

        let client = Client::new(
            id,
            addr,
            hostname,
            self.config.connection.recv_buffer_size,
            self.config.connection.send_queue_size,
            now,
        );
        self.clients.insert(id, client);
        *self.connections_per_ip.entry(addr.ip()).or_insert(0) += 1;

        tracing::info!("Accepted connection {} from {}", id, addr);
        id
    }

    pub fn attach_sender(&mut self, id: ClientId, sender: mpsc::Sender<String>) {
        if let Some(client) = self.clients.get_mut(&id) {
            client.attach_sender(sender);
        }
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Find the owner of a nickname, case-insensitively
    pub fn find_nick(&self, nick: &str) -> Option<ClientId> {
        self.nicks.get(&casefold(nick)).copied()
    }

    /// Nickname of a client, `*` if unknown or not yet set
    pub fn nick_of(&self, id: ClientId) -> String {
        self.clients
            .get(&id)
            .map(|c| c.nick().to_string())
            .unwrap_or_else(|| "*".to_string())
    }

    /// Point the nick index at `id` for `new_nick`, dropping its old entry
    pub(crate) fn rename(&mut self, id: ClientId, new_nick: &str) {
        let Some(client) = self.clients.get_mut(&id) else {
            return;
        };
        if let Some(old) = client.nick.take() {
            self.nicks.remove(&casefold(&old));
        }
        client.nick = Some(new_nick.to_string());
        self.nicks.insert(casefold(new_nick), id);
    }

    // Message delivery

    /// Queue a message for one client as-is
    pub fn send_to(&mut self, id: ClientId, message: &Message) {
        let Some(client) = self.clients.get_mut(&id) else {
            return;
        };
        if !client.queue(message) {
            self.pending_disconnects.push((id, "SendQ exceeded".to_string()));
        }
    }

    /// Queue a server-originated message, adding the server prefix if missing
    pub fn reply(&mut self, id: ClientId, mut message: Message) {
        if message.prefix.is_none() {
            message.prefix = Some(self.prefix());
        }
        self.send_to(id, &message);
    }

    /// Send to every member of a channel, optionally skipping one
    pub fn broadcast_channel(&mut self, channel: &str, message: &Message, except: Option<ClientId>) {
        let Some(channel) = self.channels.find(channel) else {
            return;
        };
        let recipients: Vec<ClientId> = channel
            .member_ids()
            .filter(|member| Some(*member) != except)
            .collect();
        for recipient in recipients {
            self.send_to(recipient, message);
        }
    }

    /// Every other client sharing at least one channel with `id`
    pub fn peers_of(&self, id: ClientId) -> BTreeSet<ClientId> {
        let mut peers = BTreeSet::new();
        if let Some(client) = self.clients.get(&id) {
            for name in &client.channels {
                if let Some(channel) = self.channels.find(name) {
                    peers.extend(channel.member_ids().filter(|member| *member != id));
                }
            }
        }
        peers
    }

    /// Send once to each peer of `id`, and to `id` itself when asked
    pub fn broadcast_to_peers(&mut self, id: ClientId, message: &Message, include_self: bool) {
        let mut recipients = self.peers_of(id);
        if include_self {
            recipients.insert(id);
        }
        for recipient in recipients {
            self.send_to(recipient, message);
        }
    }

    // Membership

    /// Add `id` to a channel on both sides, creating the channel if needed.
    /// Returns true when the channel was created.
    pub fn join_channel(&mut self, id: ClientId, name: &str) -> bool {
        let Some(client) = self.clients.get_mut(&id) else {
            return false;
        };
        let (channel, created) = self.channels.get_or_create(name);
        let modes = if created {
            MemberModes::OPERATOR
        } else {
            MemberModes::empty()
        };
        channel.add_member(id, modes);
        client.channels.insert(casefold(name));
        created
    }

    /// Remove `id` from a channel on both sides, destroying it once empty
    pub fn leave_channel(&mut self, id: ClientId, name: &str) {
        if let Some(channel) = self.channels.find_mut(name) {
            channel.remove_member(id);
        }
        if let Some(client) = self.clients.get_mut(&id) {
            client.channels.remove(&casefold(name));
        }
        self.channels.remove_if_empty(name);
    }

    /// True when every channel member lists the channel and every listed
    /// channel has the client as member
    pub fn membership_consistent(&self) -> bool {
        let members_ok = self.channels.iter_sorted().into_iter().all(|channel| {
            channel.member_ids().all(|member| {
                self.clients
                    .get(&member)
                    .is_some_and(|c| c.channels.contains(&casefold(&channel.name)))
            })
        });
        let clients_ok = self.clients.values().all(|client| {
            client.channels.iter().all(|name| {
                self.channels
                    .find(name)
                    .is_some_and(|channel| channel.has_member(client.id))
            })
        });
        members_ok && clients_ok
    }

    // Input

    /// Feed raw socket bytes from a client
    pub fn handle_bytes(&mut self, id: ClientId, data: &[u8]) {
        self.handle_bytes_at(id, data, Instant::now());
    }

    pub fn handle_bytes_at(&mut self, id: ClientId, data: &[u8], now: Instant) {
        let lines = match self.clients.get_mut(&id) {
            Some(client) => {
                client.recvq.append(data);
                client.recvq.extract_lines()
            }
            None => return,
        };

        for line in lines {
            if !self.clients.contains_key(&id) {
                return;
            }
            self.handle_line_at(id, &line, now);
        }

        if self.clients.get(&id).is_some_and(|c| c.recvq.is_over_limit()) {
            tracing::warn!("Excess flood from {}", id);
            self.disconnect(id, "Excess Flood");
        }
    }

    /// Process one protocol line from a client
    pub fn handle_line(&mut self, id: ClientId, line: &str) {
        self.handle_line_at(id, line, Instant::now());
    }

    pub fn handle_line_at(&mut self, id: ClientId, line: &str, now: Instant) {
        let Some(client) = self.clients.get_mut(&id) else {
            return;
        };
        client.timing.update_activity(now);

        if line.trim().is_empty() {
            return;
        }

        let message = match Message::parse(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Ignoring unparsable line from {}: {}", id, e);
                return;
            }
        };

        tracing::debug!("{} -> {}", id, message);
        commands::dispatch(self, id, &message);
        self.process_pending_disconnects();
    }

    // Lifecycle

    /// Ask for a disconnect once the current handler has finished
    pub fn schedule_disconnect(&mut self, id: ClientId, reason: &str) {
        self.pending_disconnects.push((id, reason.to_string()));
    }

    fn process_pending_disconnects(&mut self) {
        while !self.pending_disconnects.is_empty() {
            let pending = std::mem::take(&mut self.pending_disconnects);
            for (id, reason) in pending {
                self.disconnect(id, &reason);
            }
        }
    }

    /// Tear a client down: leave every channel, notify each peer exactly
    /// once and close the link. Returns false if the client was already gone.
    pub fn disconnect(&mut self, id: ClientId, reason: &str) -> bool {
        if !self.clients.contains_key(&id) {
            return false;
        }

        let peers = self.peers_of(id);
        let Some(mut client) = self.clients.remove(&id) else {
            return false;
        };

        let quit = Message::with_prefix(
            client.prefix(),
            MessageType::Quit,
            vec![reason.to_string()],
        );
        for peer in peers {
            self.send_to(peer, &quit);
        }

        for name in std::mem::take(&mut client.channels) {
            if let Some(channel) = self.channels.find_mut(&name) {
                channel.remove_member(id);
            }
            self.channels.remove_if_empty(&name);
        }
        for channel in self.channels.iter_mut() {
            channel.forget_invite(id);
        }

        if let Some(ref nick) = client.nick {
            self.nicks.remove(&casefold(nick));
        }
        let ip = client.addr.ip();
        if let Some(count) = self.connections_per_ip.get_mut(&ip) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.connections_per_ip.remove(&ip);
            }
        }

        let error = Message::new(
            MessageType::Error,
            vec![format!("Closing Link: {} ({})", client.hostname, reason)],
        );
        if !client.queue(&error) {
            client.sendq.drain();
            client.queue(&error);
        }
        if let Err(e) = client.flush() {
            tracing::debug!("Final flush to {} failed: {}", id, e);
        }
        if client.take_sender().is_none() {
            self.closed_output.insert(id, client.take_output());
        }

        tracing::info!("Client {} ({}) disconnected: {}", id, client.nick(), reason);
        true
    }

    /// Disconnect silent clients and probe idle ones
    pub fn liveness_sweep(&mut self, now: Instant) {
        let timeout = self.config.connection.ping_timeout();
        let probe = Message::with_prefix(
            self.prefix(),
            MessageType::Ping,
            vec![self.config.server.name.clone()],
        );

        let mut timed_out = Vec::new();
        let mut to_probe = Vec::new();
        for client in self.clients.values() {
            if client.timing.is_timed_out(now, timeout) {
                timed_out.push(client.id);
            } else if client.timing.should_send_ping(now, timeout) {
                to_probe.push(client.id);
            }
        }

        for id in to_probe {
            self.send_to(id, &probe);
            if let Some(client) = self.clients.get_mut(&id) {
                client.timing.record_ping_sent();
            }
        }

        let reason = format!("Ping timeout: {} seconds", timeout.as_secs());
        for id in timed_out {
            tracing::info!("Ping timeout for {}", id);
            self.disconnect(id, &reason);
        }
    }

    /// Hand every queued line to its writer task
    pub fn flush_all(&mut self) {
        let mut broken = Vec::new();
        for client in self.clients.values_mut() {
            if let Err(e) = client.flush() {
                tracing::debug!("{}", e);
                broken.push(client.id);
            }
        }
        for id in broken {
            self.disconnect(id, "Write error");
        }
    }

    /// Per-iteration housekeeping of the event loop
    pub fn tick(&mut self, now: Instant) {
        self.process_pending_disconnects();
        self.liveness_sweep(now);
        self.process_pending_disconnects();
        self.channels.gc();
        self.flush_all();
    }

    /// Disconnect everyone with a shutdown reason
    pub fn shutdown(&mut self, reason: &str) {
        tracing::info!("Shutting down, closing {} connections", self.clients.len());
        let ids: Vec<ClientId> = self.clients.keys().copied().collect();
        for id in ids {
            self.disconnect(id, reason);
        }
    }

    /// Take all output queued for a client, including the final lines of a
    /// closed client without a writer
    pub fn take_output(&mut self, id: ClientId) -> Vec<String> {
        match self.clients.get_mut(&id) {
            Some(client) => client.take_output(),
            None => self.closed_output.remove(&id).unwrap_or_default(),
        }
    }

    pub fn registered_count(&self) -> usize {
        self.clients.values().filter(|c| c.is_registered()).count()
    }

    pub fn operator_count(&self) -> usize {
        self.clients.values().filter(|c| c.is_operator).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn register(server: &mut Server, nick: &str, now: Instant) -> ClientId {
        let id = server.add_client_at(addr(1000), "localhost".to_string(), now);
        server.handle_line_at(id, &format!("NICK {}", nick), now);
        server.handle_line_at(id, &format!("USER {} 0 * :{}", nick, nick), now);
        server.take_output(id);
        id
    }

    #[test]
    fn test_per_ip_limit() {
        let mut server = Server::new(Config::default());
        let ip = addr(1).ip();
        for port in 0..3 {
            assert!(server.accepts_from(ip));
            server.add_client(addr(port), "localhost".to_string());
        }
        assert!(!server.accepts_from(ip));

        server.disconnect(ClientId(1), "bye");
        assert!(server.accepts_from(ip));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut server = Server::new(Config::default());
        let id = server.add_client(addr(1), "localhost".to_string());
        assert!(server.disconnect(id, "first"));
        assert!(!server.disconnect(id, "second"));
        assert_eq!(
            server.take_output(id),
            vec!["ERROR :Closing Link: localhost (first)\r\n"]
        );
    }

    #[test]
    fn test_idle_client_gets_probe_then_timeout() {
        let mut server = Server::new(Config::default());
        let start = Instant::now();
        let id = register(&mut server, "alice", start);

        server.liveness_sweep(start + Duration::from_secs(61));
        assert_eq!(server.take_output(id), vec![":irc.localhost PING irc.localhost\r\n"]);

        server.liveness_sweep(start + Duration::from_secs(90));
        assert!(server.take_output(id).is_empty());

        server.liveness_sweep(start + Duration::from_secs(121));
        assert!(server.client(id).is_none());
        assert!(server.find_nick("alice").is_none());
        assert_eq!(
            server.take_output(id),
            vec!["ERROR :Closing Link: localhost (Ping timeout: 120 seconds)\r\n"]
        );
    }

    #[test]
    fn test_pong_resets_idle_clock() {
        let mut server = Server::new(Config::default());
        let start = Instant::now();
        let id = register(&mut server, "alice", start);

        server.liveness_sweep(start + Duration::from_secs(61));
        server.handle_line_at(id, "PONG :irc.localhost", start + Duration::from_secs(70));
        server.liveness_sweep(start + Duration::from_secs(125));
        assert!(server.client(id).is_some());
    }

    #[test]
    fn test_excess_flood() {
        let mut server = Server::new(Config::default());
        let id = server.add_client(addr(1), "localhost".to_string());
        server.handle_bytes(id, &[b'a'; 1025]);
        assert!(server.client(id).is_none());
        assert_eq!(
            server.take_output(id),
            vec!["ERROR :Closing Link: localhost (Excess Flood)\r\n"]
        );
    }

    #[test]
    fn test_sendq_exceeded_disconnects() {
        let mut config = Config::default();
        config.connection.send_queue_size = 200;
        config.server.motd = String::new();
        let mut server = Server::new(config);
        let id = server.add_client(addr(1), "localhost".to_string());
        server.handle_line(id, "NICK alice");
        server.handle_line(id, "USER a 0 * :Alice");
        assert!(server.client(id).is_none());
        let output = server.take_output(id);
        assert!(output.iter().any(|l| l.contains("SendQ exceeded")));
    }

    #[test]
    fn test_stalled_writer_hits_sendq_limit() {
        let mut config = Config::default();
        config.connection.send_queue_size = 4096;
        let mut server = Server::new(config);
        let now = Instant::now();
        let alice = register(&mut server, "alice", now);
        let bob = register(&mut server, "bob", now);
        server.handle_line_at(alice, "JOIN #t", now);
        server.handle_line_at(bob, "JOIN #t", now);
        server.take_output(alice);
        server.take_output(bob);

        let (tx, _rx) = mpsc::channel(8);
        server.attach_sender(bob, tx);

        let line = format!("PRIVMSG #t :{}", "x".repeat(200));
        for _ in 0..200 {
            if server.client(bob).is_none() {
                break;
            }
            server.handle_line_at(alice, &line, now);
            server.tick(now);
        }

        assert!(server.client(bob).is_none());
        assert!(server.client(alice).is_some());
        let output = server.take_output(alice);
        assert_eq!(
            output.last().unwrap(),
            ":bob!bob@localhost QUIT :SendQ exceeded\r\n"
        );
    }
}
