//! Buffer management for send and receive queues
//!
//! Every client owns a bounded receive buffer (raw bytes not yet forming a
//! complete line) and a bounded send queue (formatted lines not yet handed to
//! the socket writer). Both bounds exist so a single hostile or stuck client
//! cannot grow server memory without limit.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Send queue - manages outgoing lines with a byte limit
#[derive(Debug)]
pub struct SendQueue {
    /// Buffer of outgoing lines, already CRLF terminated
    buffer: VecDeque<String>,
    /// Current size in bytes
    current_size: usize,
    /// Maximum size in bytes
    max_size: usize,
    /// Number of messages dropped due to buffer overflow
    dropped_messages: u64,
}

impl SendQueue {
    /// Create a new send queue with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: VecDeque::new(),
            current_size: 0,
            max_size,
            dropped_messages: 0,
        }
    }

    /// Add a line to the send queue
    /// Returns true if added, false if dropped due to buffer full
    pub fn push(&mut self, line: String) -> bool {
        let line_size = line.len();

        if self.current_size + line_size > self.max_size {
            self.dropped_messages += 1;
            tracing::warn!(
                "SendQueue full ({}/{}), dropping message",
                self.current_size,
                self.max_size
            );
            return false;
        }

        self.current_size += line_size;
        self.buffer.push_back(line);
        true
    }

    /// Remove and return the next line from the queue
    pub fn pop(&mut self) -> Option<String> {
        let line = self.buffer.pop_front()?;
        self.current_size = self.current_size.saturating_sub(line.len());
        Some(line)
    }

    /// Put a line back at the head of the queue after a refused handoff.
    /// The line was already counted when it was pushed, so the limit is not checked.
    pub fn push_front(&mut self, line: String) {
        self.current_size += line.len();
        self.buffer.push_front(line);
    }

    /// Take every queued line, oldest first
    pub fn drain(&mut self) -> Vec<String> {
        self.current_size = 0;
        self.buffer.drain(..).collect()
    }

    /// Get the number of lines in the queue
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get current buffer size in bytes
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Get number of dropped messages
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }
}

/// Receive queue - accumulates inbound bytes and splits them into lines
#[derive(Debug)]
pub struct RecvQueue {
    /// Bytes received after the last complete line
    buffer: Vec<u8>,
    /// Maximum number of bytes allowed without a line terminator
    max_size: usize,
}

impl RecvQueue {
    /// Create a new receive queue with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_size,
        }
    }

    /// Append raw bytes read from the socket
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Extract complete lines, terminated by LF with an optional CR before it.
    ///
    /// Bytes after the last LF stay buffered. Invalid UTF-8 is replaced rather
    /// than rejected so a single bad byte cannot wedge a connection.
    pub fn extract_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }

        lines
    }

    /// True when the unterminated remainder is larger than the limit
    pub fn is_over_limit(&self) -> bool {
        self.buffer.len() > self.max_size
    }

    /// Get current buffer size in bytes
    pub fn current_size(&self) -> usize {
        self.buffer.len()
    }

    /// Get maximum buffer size in bytes
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Clear the receive buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Liveness tracking for ping-out detection
#[derive(Debug, Clone)]
pub struct ConnectionTiming {
    /// When the connection was established
    pub connected_at: Instant,
    /// Last time we received a line from this connection
    pub last_activity: Instant,
    /// Keepalive PING sent and not yet answered by any traffic
    pub ping_pending: bool,
}

impl ConnectionTiming {
    pub fn new(now: Instant) -> Self {
        Self {
            connected_at: now,
            last_activity: now,
            ping_pending: false,
        }
    }

    /// Record inbound traffic; any line counts as an answer to a keepalive
    pub fn update_activity(&mut self, now: Instant) {
        self.last_activity = now;
        self.ping_pending = false;
    }

    /// Record that we sent a keepalive PING
    pub fn record_ping_sent(&mut self) {
        self.ping_pending = true;
    }

    /// Idle for more than half the timeout and no probe outstanding
    pub fn should_send_ping(&self, now: Instant, ping_timeout: Duration) -> bool {
        !self.ping_pending && self.idle(now) > ping_timeout / 2
    }

    /// Idle for longer than the timeout
    pub fn is_timed_out(&self, now: Instant, ping_timeout: Duration) -> bool {
        self.idle(now) > ping_timeout
    }

    /// Time since last activity
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}
