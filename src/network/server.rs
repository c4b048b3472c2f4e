//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io::{BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::error::{PostKvError, Result};
use crate::protocol::{write_response, Response};

use super::{middleware, CommandHandler, Connection};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for postkv
///
/// ## Concurrency:
/// - One acceptor (the thread calling `run`)
/// - `config.worker_threads` workers, each serving one connection at a time
/// - Pending connections queue in a bounded channel; when
///   `max_connections` are queued or active, new ones get an error response
pub struct Server {
    config: Config,
    listener: TcpListener,
    handler: Arc<dyn CommandHandler>,
    shutdown: ShutdownHandle,
    in_flight: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`
    ///
    /// `handler` is wrapped in request logging and panic recovery.
    pub fn bind(config: Config, handler: Arc<dyn CommandHandler>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            listener,
            handler: middleware::wrap(handler),
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Actual bound address (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Serve until shutdown is signalled (blocking)
    ///
    /// Workers finish the command in progress, close their connections and
    /// exit before `run` returns.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr()?,
            self.config.worker_threads
        );

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = self.spawn_workers(rx)?;

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Failed to configure connection from {}: {}", addr, e);
                        continue;
                    }

                    if self.in_flight.fetch_add(1, Ordering::SeqCst) >= self.config.max_connections {
                        self.in_flight.fetch_sub(1, Ordering::SeqCst);
                        reject(stream, "too many connections");
                        continue;
                    }

                    match tx.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) | Err(TrySendError::Disconnected(stream)) => {
                            self.in_flight.fetch_sub(1, Ordering::SeqCst);
                            reject(stream, "server busy");
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutdown requested, waiting for workers");
        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    fn spawn_workers(&self, rx: Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        (0..self.config.worker_threads)
            .map(|i| {
                let rx = rx.clone();
                let handler = Arc::clone(&self.handler);
                let in_flight = Arc::clone(&self.in_flight);
                let shutdown = self.shutdown.clone();
                let read_ms = self.config.read_timeout_ms;
                let write_ms = self.config.write_timeout_ms;

                thread::Builder::new()
                    .name(format!("postkv-worker-{}", i))
                    .spawn(move || {
                        for stream in rx.iter() {
                            let handler = Arc::clone(&handler);
                            let shutdown = shutdown.clone();
                            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                                serve(stream, handler, shutdown, read_ms, write_ms)
                            }));
                            if outcome.is_err() {
                                tracing::error!("Connection handling panicked");
                            }
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                        }
                    })
                    .map_err(PostKvError::from)
            })
            .collect()
    }
}

fn serve(
    stream: TcpStream,
    handler: Arc<dyn CommandHandler>,
    shutdown: ShutdownHandle,
    read_ms: u64,
    write_ms: u64,
) {
    let result = Connection::new(stream, handler, shutdown).and_then(|mut conn| {
        conn.set_timeouts(read_ms, write_ms)?;
        conn.handle()
    });
    if let Err(e) = result {
        tracing::debug!("Connection ended with error: {}", e);
    }
}

fn reject(stream: TcpStream, reason: &str) {
    tracing::warn!("Rejecting connection: {}", reason);
    let mut writer = BufWriter::new(stream);
    let _ = write_response(&mut writer, &Response::error(reason));
}
