//! Configuration for postkv
//!
//! Centralized configuration with sensible defaults.

use crate::codec::CodecKind;
use crate::error::{PostKvError, Result};
use crate::pagination::PageLimits;

/// Main configuration for a postkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Payload codec used at the store boundary
    pub codec: CodecKind,

    // -------------------------------------------------------------------------
    // Pagination Configuration
    // -------------------------------------------------------------------------
    /// Default and maximum page sizes
    pub page_limits: PageLimits,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codec: CodecKind::Json,
            page_limits: PageLimits::default(),
            listen_addr: "127.0.0.1:7070".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        let limits = &self.page_limits;
        if limits.default_limit == 0 || limits.max_limit == 0 {
            return Err(PostKvError::Config(
                "page limits must be at least 1".to_string(),
            ));
        }
        if limits.default_limit > limits.max_limit {
            return Err(PostKvError::Config(format!(
                "default page limit {} exceeds max page limit {}",
                limits.default_limit, limits.max_limit
            )));
        }
        if self.worker_threads == 0 {
            return Err(PostKvError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PostKvError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.listen_addr.is_empty() {
            return Err(PostKvError::Config("listen_addr is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the payload codec
    pub fn codec(mut self, codec: CodecKind) -> Self {
        self.config.codec = codec;
        self
    }

    /// Set the default page size
    pub fn default_page_limit(mut self, limit: usize) -> Self {
        self.config.page_limits.default_limit = limit;
        self
    }

    /// Set the maximum page size
    pub fn max_page_limit(mut self, limit: usize) -> Self {
        self.config.page_limits.max_limit = limit;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
