//! Socket I/O and the event loop
//!
//! Every accepted socket gets a reader task and a writer task. The reader
//! forwards raw bytes to the loop; the writer drains formatted lines onto the
//! socket. Only the loop touches [`Server`], so handlers run one at a time.

use crate::client::ClientId;
use crate::lookup::DnsResolver;
use crate::server::Server;
use crate::{Config, Result};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Bytes requested per socket read
const READ_CHUNK: usize = 4096;

/// Lines handed to a writer task ahead of the socket; the rest wait in the
/// client's send queue
const WRITER_CHANNEL_CAPACITY: usize = 64;

/// Pending events before readers wait for the loop
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// How long shutdown waits for writers to drain
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Events delivered to the event loop
#[derive(Debug)]
pub enum ServerEvent {
    /// A socket was accepted and its hostname resolved
    Connected {
        stream: TcpStream,
        addr: SocketAddr,
        hostname: String,
    },
    /// Bytes read from a client socket
    Data { id: ClientId, bytes: Vec<u8> },
    /// The client socket reached EOF or failed
    Closed { id: ClientId, reason: String },
}

/// Forward everything read from `reader` to the event loop until EOF or error
pub async fn read_loop<R>(id: ClientId, mut reader: R, events: mpsc::Sender<ServerEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let event = match reader.read(&mut buf).await {
            Ok(0) => ServerEvent::Closed {
                id,
                reason: "Connection closed".to_string(),
            },
            Ok(n) => ServerEvent::Data {
                id,
                bytes: buf[..n].to_vec(),
            },
            Err(e) => ServerEvent::Closed {
                id,
                reason: format!("Read error: {}", e),
            },
        };

        let closed = matches!(event, ServerEvent::Closed { .. });
        if events.send(event).await.is_err() || closed {
            break;
        }
    }
}

/// Write queued lines to `writer` until the sending side is dropped
pub async fn write_loop<W>(id: ClientId, mut writer: W, mut lines: mpsc::Receiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = lines.recv().await {
        writer.write_all(line.as_bytes()).await?;
    }
    writer.flush().await?;
    writer.shutdown().await?;
    tracing::trace!("Writer for {} finished", id);
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let listener = TcpListener::bind(config.connection.bind_addr()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    serve(listener, config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    })
    .await
}

/// Run the event loop on an already bound listener until `shutdown` completes
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let resolver = match DnsResolver::new(&config.lookup) {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::warn!("{}; hostnames will not be resolved", e);
            DnsResolver::disabled()
        }
    };
    let resolver = Arc::new(resolver);

    let mut heartbeat = tokio::time::interval(config.connection.heartbeat_interval());
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut event_loop = EventLoop::new(Server::new(config));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let resolver = Arc::clone(&resolver);
                    let events = event_loop.events.clone();
                    tokio::spawn(async move {
                        let hostname = resolver.resolve_hostname(addr.ip()).await;
                        let _ = events.send(ServerEvent::Connected { stream, addr, hostname }).await;
                    });
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
            Some(event) = event_loop.receiver.recv() => event_loop.handle_event(event),
            _ = heartbeat.tick() => {}
            _ = &mut shutdown => break,
        }

        event_loop.after_iteration(Instant::now());
    }

    event_loop.shutdown("Server shutting down").await;
    drop(listener);
    Ok(())
}

/// Server state plus the I/O tasks attached to it
struct EventLoop {
    server: Server,
    events: mpsc::Sender<ServerEvent>,
    receiver: mpsc::Receiver<ServerEvent>,
    readers: HashMap<ClientId, JoinHandle<()>>,
    writers: HashMap<ClientId, JoinHandle<()>>,
}

impl EventLoop {
    fn new(server: Server) -> Self {
        let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            server,
            events,
            receiver,
            readers: HashMap::new(),
            writers: HashMap::new(),
        }
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected { stream, addr, hostname } => self.accept(stream, addr, hostname),
            ServerEvent::Data { id, bytes } => self.server.handle_bytes(id, &bytes),
            ServerEvent::Closed { id, reason } => {
                self.server.disconnect(id, &reason);
            }
        }
    }

    fn accept(&mut self, mut stream: TcpStream, addr: SocketAddr, hostname: String) {
        if !self.server.accepts_from(addr.ip()) {
            tracing::warn!("Refusing {}: too many connections from {}", addr, addr.ip());
            let line = format!(
                "ERROR :Closing Link: {} (Too many connections from your IP)\r\n",
                hostname
            );
            tokio::spawn(async move {
                let _ = stream.write_all(line.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
            return;
        }

        let id = self.server.add_client(addr, hostname);
        let (reader, writer) = stream.into_split();
        let (lines_tx, lines_rx) = mpsc::channel(WRITER_CHANNEL_CAPACITY);
        self.server.attach_sender(id, lines_tx);

        self.readers
            .insert(id, tokio::spawn(read_loop(id, reader, self.events.clone())));
        self.writers.insert(
            id,
            tokio::spawn(async move {
                if let Err(e) = write_loop(id, writer, lines_rx).await {
                    tracing::debug!("Write to {} failed: {}", id, e);
                }
            }),
        );
    }

    /// Housekeeping after each wakeup, then drop tasks of closed clients
    fn after_iteration(&mut self, now: Instant) {
        self.server.tick(now);

        let server = &self.server;
        self.readers.retain(|id, handle| {
            if server.client(*id).is_some() {
                return true;
            }
            handle.abort();
            false
        });
        self.writers.retain(|_, handle| !handle.is_finished());
    }

    async fn shutdown(mut self, reason: &str) {
        self.server.shutdown(reason);
        for (_, handle) in self.readers.drain() {
            handle.abort();
        }

        let writers: Vec<JoinHandle<()>> = self.writers.drain().map(|(_, h)| h).collect();
        let drained = tokio::time::timeout(WRITER_DRAIN_TIMEOUT, async {
            for handle in writers {
                let _ = handle.await;
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Timed out waiting for client writers to drain");
        }
    }
}
