//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::protocol::{write_response, Response};
use crate::router::Router;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// TCP server for userstore
///
/// ## Threading:
/// - The thread calling `run` is the acceptor
/// - `worker_threads` workers pull accepted streams off a bounded channel
/// - At most `max_connections` streams wait in the channel; beyond that new
///   clients get an ERROR frame and are closed
/// - On shutdown, live connections are hung up and queued ones are answered
///   with ERROR, so `run` returns even with idle clients and no read timeout
pub struct Server {
    config: Config,
    router: Arc<Router>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

/// Stops a running server from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Server {
    /// Validate the config and bind the listen address
    pub fn bind(config: Config, router: Arc<Router>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            StoreError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            router,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is actually bound to (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    /// Start the server (blocking)
    ///
    /// Returns once shutdown was requested and the workers have exited.
    /// Connections still open at that point are closed by the server.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.worker_threads
        );

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);

        let live = Arc::new(LiveConnections::default());

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for index in 0..self.config.worker_threads {
            let worker = Worker {
                receiver: receiver.clone(),
                router: Arc::clone(&self.router),
                live: Arc::clone(&live),
                read_ms: self.config.read_timeout_ms,
                write_ms: self.config.write_timeout_ms,
            };

            let handle = thread::Builder::new()
                .name(format!("userstore-worker-{}", index))
                .spawn(move || worker.run())?;
            workers.push(handle);
        }
        drop(receiver);

        let result = self.accept_loop(&sender);

        // Unblock workers parked in reads, then let them drain the queue
        live.close_all();
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        result
    }

    fn accept_loop(&self, sender: &Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // Accepted sockets may inherit non-blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }

                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            tracing::warn!("Connection queue full, rejecting {}", peer);
                            reject(stream, "server busy");
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(StoreError::Network(
                                "all worker threads have exited".to_string(),
                            ));
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutdown requested, no longer accepting connections");
        Ok(())
    }
}

/// Per-thread state of a connection worker
struct Worker {
    receiver: Receiver<TcpStream>,
    router: Arc<Router>,
    live: Arc<LiveConnections>,
    read_ms: u64,
    write_ms: u64,
}

impl Worker {
    fn run(self) {
        for stream in self.receiver.iter() {
            let id = match self.live.register(&stream) {
                Ok(Some(id)) => id,
                Ok(None) => {
                    reject(stream, "server shutting down");
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to track connection: {}", e);
                    continue;
                }
            };

            self.serve(stream);
            self.live.unregister(id);
        }
    }

    fn serve(&self, stream: TcpStream) {
        let mut connection = match Connection::new(stream, Arc::clone(&self.router)) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                return;
            }
        };

        if let Err(e) = connection.set_timeouts(self.read_ms, self.write_ms) {
            tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
            return;
        }

        if let Err(e) = connection.handle() {
            tracing::debug!("Connection {} closed with error: {}", connection.peer_addr(), e);
        }
    }
}

/// Streams being served right now, so shutdown can hang them up
#[derive(Default)]
struct LiveConnections {
    inner: Mutex<LiveSet>,
}

#[derive(Default)]
struct LiveSet {
    closed: bool,
    next_id: u64,
    streams: HashMap<u64, TcpStream>,
}

impl LiveConnections {
    /// Track a stream. Returns None once `close_all` has run.
    fn register(&self, stream: &TcpStream) -> std::io::Result<Option<u64>> {
        let mut set = self.inner.lock();
        if set.closed {
            return Ok(None);
        }

        let id = set.next_id;
        set.next_id += 1;
        set.streams.insert(id, stream.try_clone()?);
        Ok(Some(id))
    }

    fn unregister(&self, id: u64) {
        self.inner.lock().streams.remove(&id);
    }

    /// Refuse further registrations and hang up every tracked stream
    fn close_all(&self) {
        let mut set = self.inner.lock();
        set.closed = true;

        for (_, stream) in set.streams.drain() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

fn reject(stream: TcpStream, message: &str) {
    let mut writer = &stream;
    let _ = write_response(&mut writer, &Response::error(message));
}
