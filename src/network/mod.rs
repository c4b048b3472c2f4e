//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls the shutdown flag)
//! - Worker thread pool fed over a crossbeam channel
//! - Commands routed through a `CommandHandler`, wrapped in request logging
//!   and panic recovery

mod server;
mod connection;
mod handler;
mod middleware;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use handler::CommandHandler;
pub use middleware::{Recovery, RequestLogging};
