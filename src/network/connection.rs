//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufRead, BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{PostKvError, Result};
use crate::protocol::{read_command, write_response, Response};

use super::{CommandHandler, ShutdownHandle};

/// Read timeout used while waiting for the next command, so an idle
/// connection notices shutdown
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Executes decoded commands
    handler: Arc<dyn CommandHandler>,

    /// Checked between commands
    shutdown: ShutdownHandle,

    /// How long a client may stay silent (None = forever)
    idle_timeout: Option<Duration>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on cloned read/write handles
    pub fn new(
        stream: TcpStream,
        handler: Arc<dyn CommandHandler>,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL))?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            handler,
            shutdown,
            idle_timeout: None,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    ///
    /// The read timeout bounds both idle time between commands and the time
    /// to receive one frame. Shutdown is still observed while idle.
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        self.idle_timeout = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects, goes idle past the read timeout,
    /// the server shuts down, or the client sends something undecodable.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            if !self.wait_for_command()? {
                return Ok(());
            }

            // A frame has started arriving; give it the full read timeout
            self.set_read_timeout(self.idle_timeout)?;
            let command = read_command(&mut self.reader);
            self.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL))?;

            let command = match command {
                Ok(cmd) => cmd,
                Err(PostKvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(PostKvError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::debug!("Read timeout mid-frame for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::from_error(&e));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.handler.handle(command);

            if let Err(e) = self.send_response(response) {
                if let PostKvError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) || io_err.kind() == ErrorKind::BrokenPipe {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Block until the next frame has bytes buffered
    ///
    /// Returns false on EOF, idle timeout or shutdown.
    fn wait_for_command(&mut self) -> Result<bool> {
        let idle_since = Instant::now();

        loop {
            if self.shutdown.is_shutdown() {
                tracing::debug!("Closing connection from {} for shutdown", self.peer_addr);
                return Ok(false);
            }

            let ready = self.reader.fill_buf().map(|buf| !buf.is_empty());
            match ready {
                Ok(true) => return Ok(true),
                Ok(false) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(false);
                }
                Err(ref e) if is_timeout(e.kind()) => {
                    if let Some(limit) = self.idle_timeout {
                        if idle_since.elapsed() >= limit {
                            tracing::debug!("Read timeout for client {}", self.peer_addr);
                            return Ok(false);
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(ref e) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

// Unix reports WouldBlock, Windows TimedOut
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
